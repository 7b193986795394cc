use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::listings::{JobListing, ListingId};

/// Lifecycle of an application attempt. `Applied` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Applied,
    Failed,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Applied, Self::Failed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Applied => "applied",
            Self::Failed => "failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Durable log entry tracking whether a listing has been applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub listing_id: ListingId,
    pub status: ApplicationStatus,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
}

impl ApplicationRecord {
    pub fn pending(listing_id: ListingId) -> Self {
        Self {
            listing_id,
            status: ApplicationStatus::Pending,
            last_attempt_at: None,
            failure_reason: None,
        }
    }

    /// Marks a successful submission. Terminal records are left untouched.
    pub fn mark_applied(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.ensure_pending(ApplicationStatus::Applied)?;
        self.status = ApplicationStatus::Applied;
        self.last_attempt_at = Some(at);
        self.failure_reason = None;
        Ok(())
    }

    pub fn mark_failed(
        &mut self,
        at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.ensure_pending(ApplicationStatus::Failed)?;
        self.status = ApplicationStatus::Failed;
        self.last_attempt_at = Some(at);
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    fn ensure_pending(&self, to: ApplicationStatus) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError {
                listing_id: self.listing_id.clone(),
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{listing_id} cannot move from {} to {}", .from.label(), .to.label())]
pub struct TransitionError {
    pub listing_id: ListingId,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

/// One durable row: the listing and the state of its application.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedListing {
    pub listing: JobListing,
    pub application: ApplicationRecord,
}

impl TrackedListing {
    pub fn new(listing: JobListing) -> Self {
        let application = ApplicationRecord::pending(listing.id.clone());
        Self {
            listing,
            application,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.application.status == ApplicationStatus::Pending
    }
}
