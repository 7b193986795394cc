//! Listing collection: sources, dedup against stored rows and scrape history,
//! and appending new postings to durable storage.

pub mod collector;
pub mod domain;
pub mod history;
pub mod source;


pub use collector::{
    CollectError, CollectionReport, CollectionRun, CollectionWarning, ListingCollector,
};
pub use domain::{JobListing, ListingId, PostingLink, SearchCriteria};
pub use history::{HistoryError, ScrapeHistory};
pub use source::{JobSource, RecordError, SourceError};
