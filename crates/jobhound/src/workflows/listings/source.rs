use super::domain::{JobListing, PostingLink, SearchCriteria};

/// A job board or aggregator the collector can query.
pub trait JobSource {
    fn name(&self) -> &str;

    /// Finds candidate postings for the criteria. Failing here marks the whole
    /// source unavailable for the run.
    fn discover(&self, criteria: &SearchCriteria) -> Result<Vec<PostingLink>, SourceError>;

    /// Fetches and normalizes one posting.
    fn fetch(&self, link: &PostingLink) -> Result<JobListing, RecordError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("source is not registered")]
    NotRegistered,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("could not fetch {url}: {detail}")]
    Fetch { url: String, detail: String },
    #[error("could not parse {url}: {detail}")]
    Parse { url: String, detail: String },
}
