use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::domain::ListingId;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("scrape history {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Newline-delimited log of every posting the collector has already visited,
/// including the ones it decided not to keep.
#[derive(Debug, Clone)]
pub struct ScrapeHistory {
    path: PathBuf,
    visited: HashSet<ListingId>,
}

impl ScrapeHistory {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let visited = match fs::File::open(&path) {
            Ok(file) => read_ids(BufReader::new(file)).map_err(|source| HistoryError::Io {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(source) => return Err(HistoryError::Io { path, source }),
        };

        Ok(Self { path, visited })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &ListingId) -> bool {
        self.visited.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ListingId> {
        self.visited.iter()
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Appends ids not yet recorded. Returns how many lines were written.
    pub fn record<'a, I>(&mut self, ids: I) -> Result<usize, HistoryError>
    where
        I: IntoIterator<Item = &'a ListingId>,
    {
        let fresh: Vec<ListingId> = ids
            .into_iter()
            .filter(|id| self.visited.insert((*id).clone()))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        let io_err = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        for id in &fresh {
            writeln!(file, "{id}").map_err(io_err)?;
        }

        Ok(fresh.len())
    }
}

fn read_ids<R: BufRead>(reader: R) -> std::io::Result<HashSet<ListingId>> {
    let mut ids = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            ids.insert(ListingId(trimmed.to_string()));
        }
    }
    Ok(ids)
}
