//! Lever-hosted job boards (`jobs.lever.co`): discovery through a search
//! engine, posting scraping and form-based applications.

mod apply;
mod form;
mod links;
mod normalizer;
mod posting;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::net::PageFetcher;
use crate::workflows::listings::{
    JobListing, JobSource, PostingLink, RecordError, SearchCriteria, SourceError,
};
use crate::workflows::search::SearchEngine;

pub use apply::LeverApplyGateway;
pub use form::parse_application_form;
pub use links::posting_link;
pub use posting::parse_posting;

pub const SOURCE_NAME: &str = "lever";
const SITE_FILTER: &str = "site:jobs.lever.co";

/// Finds Lever postings with a `site:` web search and scrapes each hit.
#[derive(Debug)]
pub struct LeverSource<E, F: ?Sized> {
    engine: E,
    fetcher: Arc<F>,
}

impl<E, F> LeverSource<E, F>
where
    E: SearchEngine,
    F: PageFetcher + ?Sized,
{
    pub fn new(engine: E, fetcher: Arc<F>) -> Self {
        Self { engine, fetcher }
    }
}

/// `site:jobs.lever.co "<keywords>" <first location term>`
pub fn search_query(criteria: &SearchCriteria) -> String {
    let mut query = format!("{SITE_FILTER} \"{}\"", criteria.keywords.trim());
    if let Some(term) = criteria.location_terms().first() {
        query.push(' ');
        query.push_str(term);
    }
    query
}

impl<E, F> JobSource for LeverSource<E, F>
where
    E: SearchEngine,
    F: PageFetcher + ?Sized,
{
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn discover(&self, criteria: &SearchCriteria) -> Result<Vec<PostingLink>, SourceError> {
        let query = search_query(criteria);
        let hits = self
            .engine
            .search(&query, criteria.pages)
            .map_err(|err| SourceError::Unavailable(format!("{}: {err}", self.engine.name())))?;

        let mut seen = HashSet::new();
        let links: Vec<PostingLink> = hits
            .iter()
            .filter_map(posting_link)
            .filter(|link| seen.insert(link.id.clone()))
            .collect();
        info!(
            engine = self.engine.name(),
            hits = hits.len(),
            postings = links.len(),
            "lever search finished"
        );
        Ok(links)
    }

    fn fetch(&self, link: &PostingLink) -> Result<JobListing, RecordError> {
        debug!(url = %link.posting_url, "fetching lever posting");
        let html = self
            .fetcher
            .fetch_page(&link.posting_url)
            .map_err(|err| RecordError::Fetch {
                url: link.posting_url.to_string(),
                detail: err.to_string(),
            })?;
        parse_posting(&html, link, SOURCE_NAME, Utc::now())
    }
}
