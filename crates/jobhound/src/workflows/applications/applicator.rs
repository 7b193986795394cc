use chrono::Utc;
use tracing::{info, warn};
use url::Url;

use super::domain::{ApplicationStatus, TrackedListing, TransitionError};
use super::filter::pending_applications;
use super::form::{FormGateway, SubmissionError};
use super::mapping::map_form;
use super::profile::{ApplicantProfile, ProfileError, REQUIRED_KEYS};
use super::repository::{ListingStore, StoreError};
use crate::workflows::listings::ListingId;
use crate::workflows::pacing::Pacer;

/// Per-run knobs for the applicator.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Stop after this many attempts.
    pub limit: Option<usize>,
    /// Map fields and log them without submitting or touching the store.
    pub dry_run: bool,
    /// Profile keys that must be present before anything is submitted.
    pub required_keys: Vec<String>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            limit: None,
            dry_run: false,
            required_keys: REQUIRED_KEYS.iter().map(|key| key.to_string()).collect(),
        }
    }
}

/// What happened to one pending listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub listing_id: ListingId,
    pub status: ApplicationStatus,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub attempts: Vec<AttemptOutcome>,
    /// Listings whose form was mapped during a dry run.
    pub rehearsed: usize,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.count(ApplicationStatus::Applied)
    }

    pub fn failed(&self) -> usize {
        self.count(ApplicationStatus::Failed)
    }

    fn count(&self, status: ApplicationStatus) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| attempt.status == status)
            .count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Submits one application per pending listing, strictly one at a time,
/// and never retries within a run.
pub struct Applicator<'a, S: ?Sized, G: ?Sized> {
    store: &'a S,
    gateway: &'a G,
    profile: &'a ApplicantProfile,
    pacer: Pacer,
    options: ApplyOptions,
}

impl<'a, S, G> Applicator<'a, S, G>
where
    S: ListingStore + ?Sized,
    G: FormGateway + ?Sized,
{
    pub fn new(
        store: &'a S,
        gateway: &'a G,
        profile: &'a ApplicantProfile,
        pacer: Pacer,
        options: ApplyOptions,
    ) -> Self {
        Self {
            store,
            gateway,
            profile,
            pacer,
            options,
        }
    }

    pub fn run(&self) -> Result<ApplyReport, ApplyError> {
        let required: Vec<&str> = self
            .options
            .required_keys
            .iter()
            .map(String::as_str)
            .collect();
        self.profile.validate(&required)?;

        let pending = pending_applications(self.store)?;
        let budget = self.options.limit.unwrap_or(pending.len());
        info!(
            pending = pending.len(),
            budget,
            dry_run = self.options.dry_run,
            "starting applications"
        );

        let mut report = ApplyReport::default();
        for (index, tracked) in pending.into_iter().take(budget).enumerate() {
            if index > 0 {
                self.pacer.pause();
            }

            if self.options.dry_run {
                self.rehearse(&tracked);
                report.rehearsed += 1;
                continue;
            }

            report.attempts.push(self.attempt(tracked)?);
        }

        info!(
            applied = report.applied(),
            failed = report.failed(),
            "applications finished"
        );
        Ok(report)
    }

    fn attempt(&self, tracked: TrackedListing) -> Result<AttemptOutcome, ApplyError> {
        let TrackedListing {
            listing,
            mut application,
        } = tracked;

        match self.submit(&listing.apply_url) {
            Ok(()) => {
                application.mark_applied(Utc::now())?;
                info!(id = %listing.id, company = %listing.company, title = %listing.title, "applied");
            }
            Err(error) => {
                warn!(id = %listing.id, %error, "application failed");
                application.mark_failed(Utc::now(), error.reason())?;
            }
        }

        self.store.update(&application)?;
        Ok(AttemptOutcome {
            listing_id: application.listing_id,
            status: application.status,
            failure_reason: application.failure_reason,
        })
    }

    fn submit(&self, apply_url: &str) -> Result<(), SubmissionError> {
        let url = Url::parse(apply_url)
            .map_err(|err| SubmissionError::InvalidUrl(format!("{apply_url}: {err}")))?;
        let form = self.gateway.load_form(&url)?;
        let submission = map_form(&form, self.profile)?;
        self.gateway.submit(&submission)
    }

    fn rehearse(&self, tracked: &TrackedListing) {
        let listing = &tracked.listing;
        let mapped = Url::parse(&listing.apply_url)
            .map_err(|err| SubmissionError::InvalidUrl(err.to_string()))
            .and_then(|url| self.gateway.load_form(&url))
            .and_then(|form| map_form(&form, self.profile));
        match mapped {
            Ok(submission) => {
                let fields: Vec<&str> = submission
                    .values
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .chain(submission.attachments.iter().map(|a| a.field.as_str()))
                    .collect();
                info!(id = %listing.id, ?fields, "dry run: form mapped");
            }
            Err(error) => warn!(id = %listing.id, %error, "dry run: form would fail"),
        }
    }
}
