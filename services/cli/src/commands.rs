use std::sync::Arc;

use jobhound::config::AppConfig;
use jobhound::error::AppError;
use jobhound::net::{HttpTransport, TransportError};
use jobhound::telemetry;
use jobhound::workflows::applications::{
    status_counts, ApplicantProfile, Applicator, ApplyReport, CsvListingStore, ListingStore,
    RunSummary,
};
use jobhound::workflows::lever::{LeverApplyGateway, LeverSource};
use jobhound::workflows::listings::{CollectionReport, JobSource, ListingCollector, ScrapeHistory};
use jobhound::workflows::pacing::Pacer;
use jobhound::workflows::search::DuckDuckGo;
use tracing::info;

use crate::cli::{ApplyArgs, PathArgs, SearchArgs};

/// Loads configuration, applies path overrides and installs logging.
pub(crate) fn prepare(paths: &PathArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    paths.apply_to(&mut config);
    telemetry::init(&config.telemetry)?;
    info!(
        environment = ?config.environment,
        store = %config.paths.store.display(),
        "configuration loaded"
    );
    Ok(config)
}

pub(crate) fn collect(config: &AppConfig, search: &SearchArgs) -> Result<(), AppError> {
    let report = collect_listings(config, search)?;
    let mut summary = RunSummary::default();
    summary.record_collection(&report);
    println!("{summary}");
    Ok(())
}

pub(crate) fn apply(config: &AppConfig, apply: &ApplyArgs) -> Result<(), AppError> {
    let profile = ApplicantProfile::from_path(&config.paths.profile)?;
    let report = apply_pending(config, &profile, apply)?;
    let mut summary = RunSummary::default();
    summary.record_applications(&report);
    println!("{summary}");
    Ok(())
}

/// Profile problems abort before anything is collected.
pub(crate) fn run(
    config: &AppConfig,
    search: &SearchArgs,
    apply: &ApplyArgs,
) -> Result<(), AppError> {
    let options = apply.options();
    let profile = ApplicantProfile::from_path(&config.paths.profile)?;
    let required: Vec<&str> = options.required_keys.iter().map(String::as_str).collect();
    profile.validate(&required)?;

    let collection = collect_listings(config, search)?;
    let applications = apply_pending(config, &profile, apply)?;

    let mut summary = RunSummary::default();
    summary.record_collection(&collection);
    summary.record_applications(&applications);
    println!("{summary}");
    Ok(())
}

pub(crate) fn status(config: &AppConfig) -> Result<(), AppError> {
    let store = CsvListingStore::new(&config.paths.store);
    let rows = store.load()?;
    println!("{} listings in {}", rows.len(), store.path().display());
    for (status, count) in status_counts(&rows) {
        println!("  {}: {count}", status.label());
    }
    Ok(())
}

fn collect_listings(config: &AppConfig, search: &SearchArgs) -> Result<CollectionReport, AppError> {
    let transport = Arc::new(HttpTransport::new(&config.http)?);
    let pacer = Pacer::new(config.pacing);
    let engine = DuckDuckGo::new(transport.clone(), pacer)
        .map_err(|err| TransportError::Request(err.to_string()))?;
    let sources: Vec<Box<dyn JobSource>> = vec![Box::new(LeverSource::new(engine, transport))];
    let collector = ListingCollector::new(sources, pacer);

    let store = CsvListingStore::new(&config.paths.store);
    let mut history = ScrapeHistory::load(&config.paths.history)?;
    let criteria = search.criteria();
    info!(
        keywords = %criteria.keywords,
        sources = ?collector.source_names(),
        "collecting listings"
    );
    Ok(collector.collect_into(&criteria, &store, &mut history)?)
}

fn apply_pending(
    config: &AppConfig,
    profile: &ApplicantProfile,
    apply: &ApplyArgs,
) -> Result<ApplyReport, AppError> {
    let transport = Arc::new(HttpTransport::new(&config.http)?);
    let gateway = LeverApplyGateway::new(transport);
    let store = CsvListingStore::new(&config.paths.store);
    let applicator = Applicator::new(
        &store,
        &gateway,
        profile,
        Pacer::new(config.pacing),
        apply.options(),
    );
    Ok(applicator.run()?)
}
