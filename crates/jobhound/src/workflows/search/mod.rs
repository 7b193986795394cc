//! Search engines used to discover postings on job boards.

mod duckduckgo;

use std::fmt::Debug;

use url::Url;

use crate::net::TransportError;

pub use duckduckgo::DuckDuckGo;

/// Web search capability: return result links for a query.
pub trait SearchEngine: Debug {
    fn name(&self) -> &str;
    fn search(&self, query: &str, pages: usize) -> Result<Vec<Url>, SearchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected search results page: {0}")]
    Parse(String),
}
