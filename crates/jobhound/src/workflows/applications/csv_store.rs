use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{ByteRecord, StringRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{ApplicationRecord, ApplicationStatus, TrackedListing};
use super::repository::{ListingStore, StoreError};
use crate::workflows::listings::{JobListing, ListingId};

/// Column order of the storage file.
pub const COLUMNS: [&str; 18] = [
    "id",
    "title",
    "company",
    "location",
    "source",
    "team",
    "commitment",
    "workplace",
    "min_salary",
    "max_salary",
    "description",
    "qualifications",
    "posting_url",
    "apply_url",
    "discovered_at",
    "status",
    "last_attempt_at",
    "failure_reason",
];

/// Flat-file store: one CSV row per tracked listing. New listings are
/// appended; status changes rewrite the file through a temp file + rename.
#[derive(Debug, Clone)]
pub struct CsvListingStore {
    path: PathBuf,
}

impl CsvListingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> Result<Vec<RowEntry>, StoreError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(err)),
        };

        let StoredRows { header, entries } = read_rows(file).map_err(|err| self.csv_error(err))?;
        let empty_file = header.is_empty() && entries.is_empty();
        if !empty_file && !header.iter().eq(COLUMNS.iter().copied()) {
            return Err(StoreError::HeaderMismatch {
                path: self.path.clone(),
                found: header.iter().collect::<Vec<_>>().join(","),
            });
        }

        for entry in &entries {
            if let RowEntry::Malformed { line, error, .. } = entry {
                warn!(path = %self.path.display(), line, %error, "skipping unreadable storage row");
            }
        }
        Ok(entries)
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::create_dir_all(parent).map_err(|err| self.io_error(err)),
            None => Ok(()),
        }
    }
}

impl ListingStore for CsvListingStore {
    fn load(&self) -> Result<Vec<TrackedListing>, StoreError> {
        Ok(self
            .read_entries()?
            .into_iter()
            .filter_map(RowEntry::into_tracked)
            .collect())
    }

    fn append(&self, listing: &JobListing) -> Result<TrackedListing, StoreError> {
        let entries = self.read_entries()?;
        if entries
            .iter()
            .any(|entry| entry.listing_id() == Some(&listing.id))
        {
            return Err(StoreError::Conflict(listing.id.clone()));
        }

        self.ensure_parent()?;
        let needs_header = fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| self.io_error(err))?;

        let tracked = TrackedListing::new(listing.clone());
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record(COLUMNS)
                .map_err(|err| self.csv_error(err))?;
        }
        writer
            .serialize(StoredRow::from_tracked(&tracked))
            .map_err(|err| self.csv_error(err))?;
        writer.flush().map_err(|err| self.io_error(err))?;

        debug!(id = %listing.id, "listing appended");
        Ok(tracked)
    }

    fn update(&self, record: &ApplicationRecord) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        let row = entries
            .iter_mut()
            .find_map(|entry| match entry {
                RowEntry::Parsed(row) if row.id == record.listing_id => Some(row),
                _ => None,
            })
            .ok_or_else(|| StoreError::NotFound(record.listing_id.clone()))?;
        row.apply(record);

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        let file = fs::File::create(&temp_path).map_err(|err| self.io_error(err))?;
        write_rows(file, &entries).map_err(|err| self.csv_error(err))?;
        fs::rename(&temp_path, &self.path).map_err(|err| self.io_error(err))?;

        debug!(id = %record.listing_id, status = record.status.label(), "application updated");
        Ok(())
    }
}

/// A storage row as read from disk. Rows that fail to decode or deserialize
/// keep their raw bytes so rewrites never drop data.
#[derive(Debug, Clone)]
pub(crate) enum RowEntry {
    Parsed(StoredRow),
    Malformed {
        record: ByteRecord,
        line: u64,
        error: String,
    },
}

impl RowEntry {
    fn listing_id(&self) -> Option<&ListingId> {
        match self {
            RowEntry::Parsed(row) => Some(&row.id),
            RowEntry::Malformed { .. } => None,
        }
    }

    fn into_tracked(self) -> Option<TrackedListing> {
        match self {
            RowEntry::Parsed(row) => Some(row.into_tracked()),
            RowEntry::Malformed { .. } => None,
        }
    }
}

/// Header as found in the file (empty for an empty file) and its rows.
pub(crate) struct StoredRows {
    pub(crate) header: StringRecord,
    pub(crate) entries: Vec<RowEntry>,
}

pub(crate) fn read_rows<R: Read>(reader: R) -> Result<StoredRows, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let header = csv_reader.headers()?.clone();
    let mut entries = Vec::new();

    for record in csv_reader.byte_records() {
        let raw = record?;
        let line = raw.position().map(|pos| pos.line()).unwrap_or_default();
        let parsed = StringRecord::from_byte_record(raw.clone())
            .map_err(|err| err.to_string())
            .and_then(|record| {
                record
                    .deserialize::<StoredRow>(Some(&header))
                    .map_err(|err| err.to_string())
            });
        match parsed {
            Ok(row) => entries.push(RowEntry::Parsed(row)),
            Err(error) => entries.push(RowEntry::Malformed {
                record: raw,
                line,
                error,
            }),
        }
    }

    Ok(StoredRows { header, entries })
}

pub(crate) fn write_rows<W: Write>(writer: W, entries: &[RowEntry]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for entry in entries {
        match entry {
            RowEntry::Parsed(row) => csv_writer.serialize(row)?,
            RowEntry::Malformed { record, .. } => csv_writer.write_byte_record(record)?,
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Field order must match `COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredRow {
    id: ListingId,
    title: String,
    company: String,
    location: Option<String>,
    source: String,
    team: Option<String>,
    commitment: Option<String>,
    workplace: Option<String>,
    min_salary: Option<u32>,
    max_salary: Option<u32>,
    description: String,
    qualifications: Option<String>,
    posting_url: String,
    apply_url: String,
    discovered_at: DateTime<Utc>,
    status: ApplicationStatus,
    last_attempt_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,
}

impl StoredRow {
    fn from_tracked(tracked: &TrackedListing) -> Self {
        let listing = &tracked.listing;
        let application = &tracked.application;
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            company: listing.company.clone(),
            location: listing.location.clone(),
            source: listing.source.clone(),
            team: listing.team.clone(),
            commitment: listing.commitment.clone(),
            workplace: listing.workplace.clone(),
            min_salary: listing.min_salary,
            max_salary: listing.max_salary,
            description: listing.description.clone(),
            qualifications: listing.qualifications.clone(),
            posting_url: listing.posting_url.clone(),
            apply_url: listing.apply_url.clone(),
            discovered_at: listing.discovered_at,
            status: application.status,
            last_attempt_at: application.last_attempt_at,
            failure_reason: application.failure_reason.clone(),
        }
    }

    fn apply(&mut self, record: &ApplicationRecord) {
        self.status = record.status;
        self.last_attempt_at = record.last_attempt_at;
        self.failure_reason = record.failure_reason.clone();
    }

    fn into_tracked(self) -> TrackedListing {
        let application = ApplicationRecord {
            listing_id: self.id.clone(),
            status: self.status,
            last_attempt_at: self.last_attempt_at,
            failure_reason: self.failure_reason,
        };
        let listing = JobListing {
            id: self.id,
            title: self.title,
            company: self.company,
            location: self.location,
            source: self.source,
            team: self.team,
            commitment: self.commitment,
            workplace: self.workplace,
            min_salary: self.min_salary,
            max_salary: self.max_salary,
            description: self.description,
            qualifications: self.qualifications,
            posting_url: self.posting_url,
            apply_url: self.apply_url,
            discovered_at: self.discovered_at,
        };
        TrackedListing {
            listing,
            application,
        }
    }
}
