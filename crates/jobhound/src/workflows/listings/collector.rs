use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, warn};

use super::domain::{JobListing, ListingId, PostingLink, SearchCriteria};
use super::history::{HistoryError, ScrapeHistory};
use super::source::{JobSource, RecordError, SourceError};
use crate::workflows::applications::repository::{ListingStore, StoreError};
use crate::workflows::pacing::Pacer;

/// Non-fatal problem met while collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionWarning {
    SourceUnavailable { source: String, error: SourceError },
    RecordSkipped { source: String, error: RecordError },
}

impl CollectionWarning {
    pub fn summary(&self) -> String {
        match self {
            Self::SourceUnavailable { source, error } => format!("{source}: {error}"),
            Self::RecordSkipped { source, error } => format!("{source}: {error}"),
        }
    }
}

/// Outcome of `ListingCollector::collect_into`.
#[derive(Debug, Default, Clone)]
pub struct CollectionReport {
    pub collected: Vec<ListingId>,
    pub rejected: usize,
    pub warnings: Vec<CollectionWarning>,
}

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Queries every registered source in order and yields new listings.
pub struct ListingCollector {
    sources: Vec<Box<dyn JobSource>>,
    pacer: Pacer,
}

impl ListingCollector {
    pub fn new(sources: Vec<Box<dyn JobSource>>, pacer: Pacer) -> Self {
        Self { sources, pacer }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Lazily walks the sources. Nothing is fetched until the iterator is
    /// advanced, and `known` ids are never yielded.
    pub fn run<'a>(
        &'a self,
        criteria: &'a SearchCriteria,
        known: HashSet<ListingId>,
    ) -> CollectionRun<'a> {
        let mut warnings = Vec::new();
        for wanted in &criteria.sources {
            let registered = self
                .sources
                .iter()
                .any(|source| source.name().eq_ignore_ascii_case(wanted));
            if !registered {
                warn!(source = %wanted, "requested source is not registered; skipping");
                warnings.push(CollectionWarning::SourceUnavailable {
                    source: wanted.clone(),
                    error: SourceError::NotRegistered,
                });
            }
        }

        CollectionRun {
            sources: self.sources.iter(),
            criteria,
            pacer: self.pacer,
            current: None,
            seen: known,
            visited: Vec::new(),
            rejected: 0,
            warnings,
        }
    }

    /// Runs the collector to completion, appending every new listing to the
    /// store as a pending application and recording visited links.
    pub fn collect_into<S>(
        &self,
        criteria: &SearchCriteria,
        store: &S,
        history: &mut ScrapeHistory,
    ) -> Result<CollectionReport, CollectError>
    where
        S: ListingStore + ?Sized,
    {
        let mut known: HashSet<ListingId> = store
            .load()?
            .into_iter()
            .map(|tracked| tracked.listing.id)
            .collect();
        known.extend(history.ids().cloned());

        let mut run = self.run(criteria, known);
        let mut collected = Vec::new();
        for listing in run.by_ref() {
            store.append(&listing)?;
            collected.push(listing.id);
        }

        let recorded = history.record(run.visited())?;
        debug!(recorded, "scrape history updated");

        let report = CollectionReport {
            collected,
            rejected: run.rejected(),
            warnings: run.into_warnings(),
        };
        info!(
            collected = report.collected.len(),
            rejected = report.rejected,
            warnings = report.warnings.len(),
            "collection finished"
        );
        Ok(report)
    }
}

/// Iterator state for one collection pass.
pub struct CollectionRun<'a> {
    sources: std::slice::Iter<'a, Box<dyn JobSource>>,
    criteria: &'a SearchCriteria,
    pacer: Pacer,
    current: Option<(&'a dyn JobSource, VecDeque<PostingLink>)>,
    seen: HashSet<ListingId>,
    visited: Vec<ListingId>,
    rejected: usize,
    warnings: Vec<CollectionWarning>,
}

impl<'a> CollectionRun<'a> {
    pub fn warnings(&self) -> &[CollectionWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<CollectionWarning> {
        self.warnings
    }

    /// Postings fetched so far, kept or not.
    pub fn visited(&self) -> &[ListingId] {
        &self.visited
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    fn open_next_source(&mut self) -> Option<()> {
        loop {
            let source: &'a dyn JobSource = self.sources.next()?.as_ref();
            if !self.criteria.wants_source(source.name()) {
                continue;
            }

            match source.discover(self.criteria) {
                Ok(links) => {
                    let total = links.len();
                    let fresh: VecDeque<PostingLink> = links
                        .into_iter()
                        .filter(|link| self.seen.insert(link.id.clone()))
                        .collect();
                    info!(
                        source = source.name(),
                        discovered = total,
                        new = fresh.len(),
                        "source searched"
                    );
                    self.current = Some((source, fresh));
                    return Some(());
                }
                Err(error) => {
                    warn!(source = source.name(), %error, "skipping unavailable source");
                    self.warnings.push(CollectionWarning::SourceUnavailable {
                        source: source.name().to_string(),
                        error,
                    });
                }
            }
        }
    }
}

impl<'a> Iterator for CollectionRun<'a> {
    type Item = JobListing;

    fn next(&mut self) -> Option<JobListing> {
        loop {
            let Some((source, queue)) = self.current.as_mut() else {
                self.open_next_source()?;
                continue;
            };
            let source: &'a dyn JobSource = *source;
            let Some(link) = queue.pop_front() else {
                self.current = None;
                continue;
            };

            self.pacer.pause();
            match source.fetch(&link) {
                Ok(listing) => {
                    self.visited.push(link.id.clone());
                    if listing.id != link.id && !self.seen.insert(listing.id.clone()) {
                        debug!(id = %listing.id, "duplicate posting after redirect");
                        continue;
                    }
                    if self.criteria.accepts(&listing) {
                        return Some(listing);
                    }
                    debug!(
                        id = %listing.id,
                        location = listing.location.as_deref().unwrap_or("unknown"),
                        "listing outside requested location"
                    );
                    self.rejected += 1;
                }
                Err(error) => {
                    warn!(source = source.name(), %error, "skipping posting");
                    self.warnings.push(CollectionWarning::RecordSkipped {
                        source: source.name().to_string(),
                        error,
                    });
                }
            }
        }
    }
}
