use std::path::PathBuf;

use super::domain::{ApplicationRecord, TrackedListing};
use crate::workflows::listings::{JobListing, ListingId};

/// Storage abstraction so the collector and applicator can be exercised in
/// isolation. Listings are append-only; only the application state of an
/// existing row may change.
pub trait ListingStore {
    fn load(&self) -> Result<Vec<TrackedListing>, StoreError>;
    fn append(&self, listing: &JobListing) -> Result<TrackedListing, StoreError>;
    fn update(&self, record: &ApplicationRecord) -> Result<(), StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("listing {0} is already stored")]
    Conflict(ListingId),
    #[error("listing {0} is not stored")]
    NotFound(ListingId),
    #[error("storage file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "storage file {} has header '{found}', expected the jobhound columns",
        .path.display()
    )]
    HeaderMismatch { path: PathBuf, found: String },
    #[error("storage file {} is not valid CSV: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
