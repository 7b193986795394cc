use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jobhound::config::AppConfig;
use jobhound::error::AppError;
use jobhound::workflows::applications::ApplyOptions;
use jobhound::workflows::listings::SearchCriteria;

use crate::commands;

#[derive(Parser, Debug)]
#[command(
    name = "jobhound",
    about = "Collect job postings and apply to them from a stored applicant profile",
    version
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) paths: PathArgs,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Search job boards and store new postings as pending applications
    Collect(SearchArgs),
    /// Apply to every pending posting in the store
    Apply(ApplyArgs),
    /// Collect, then apply
    Run {
        #[command(flatten)]
        search: SearchArgs,
        #[command(flatten)]
        apply: ApplyArgs,
    },
    /// Print application counts per status
    Status,
}

/// File locations; each one overrides the matching `JOBHOUND_*_PATH` variable.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct PathArgs {
    /// Applicant profile JSON
    #[arg(long, global = true)]
    pub(crate) profile: Option<PathBuf>,
    /// CSV file tracking listings and application status
    #[arg(long, global = true)]
    pub(crate) store: Option<PathBuf>,
    /// Scrape history of visited posting links
    #[arg(long, global = true)]
    pub(crate) history: Option<PathBuf>,
}

impl PathArgs {
    pub(crate) fn apply_to(&self, config: &mut AppConfig) {
        if let Some(profile) = &self.profile {
            config.paths.profile = profile.clone();
        }
        if let Some(store) = &self.store {
            config.paths.store = store.clone();
        }
        if let Some(history) = &self.history {
            config.paths.history = history.clone();
        }
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SearchArgs {
    /// Search keywords, e.g. "data engineer"
    #[arg(long, short)]
    pub(crate) keywords: String,
    /// Comma-separated location terms a posting must mention
    #[arg(long, short)]
    pub(crate) location: Option<String>,
    /// Result pages to read per source
    #[arg(long, default_value_t = 1)]
    pub(crate) pages: usize,
    /// Restrict collection to these sources (repeatable)
    #[arg(long = "source")]
    pub(crate) sources: Vec<String>,
}

impl SearchArgs {
    pub(crate) fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            keywords: self.keywords.clone(),
            location: self.location.clone(),
            pages: self.pages.max(1),
            sources: self.sources.clone(),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ApplyArgs {
    /// Stop after this many applications
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Map form fields and log them without submitting
    #[arg(long)]
    pub(crate) dry_run: bool,
}

impl ApplyArgs {
    pub(crate) fn options(&self) -> ApplyOptions {
        ApplyOptions {
            limit: self.limit,
            dry_run: self.dry_run,
            ..ApplyOptions::default()
        }
    }
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = commands::prepare(&cli.paths)?;

    match cli.command {
        Command::Collect(search) => commands::collect(&config, &search),
        Command::Apply(apply) => commands::apply(&config, &apply),
        Command::Run { search, apply } => commands::run(&config, &search, &apply),
        Command::Status => commands::status(&config),
    }
}
