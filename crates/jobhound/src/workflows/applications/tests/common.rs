use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use url::Url;

use crate::workflows::applications::{
    ApplicantProfile, ApplicationForm, ApplicationRecord, FieldKind, FormField, FormGateway,
    FormSubmission, ListingStore, StoreError, SubmissionError, TrackedListing,
};
use crate::workflows::listings::{JobListing, ListingId};

pub(crate) fn discovered(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::minutes(minutes)
}

pub(crate) fn apply_url(id: &str) -> String {
    format!("https://jobs.example.com/{id}/apply")
}

pub(crate) fn listing(id: &str, minutes: i64) -> JobListing {
    JobListing {
        id: ListingId::from(id),
        title: "Data Engineer".to_string(),
        company: "Acme".to_string(),
        location: Some("Austin, TX".to_string()),
        source: "fake".to_string(),
        team: Some("Platform".to_string()),
        commitment: Some("Full-time".to_string()),
        workplace: None,
        min_salary: Some(120_000),
        max_salary: Some(150_000),
        description: "Build pipelines, own the \"feature\" store\nand mentor".to_string(),
        qualifications: None,
        posting_url: format!("https://jobs.example.com/{id}"),
        apply_url: apply_url(id),
        discovered_at: discovered(minutes),
    }
}

pub(crate) fn profile() -> ApplicantProfile {
    ApplicantProfile::from_pairs([
        ("name", "Ada Lovelace"),
        ("email", "ada@example.com"),
        ("phone", "555-0100"),
        ("current_company", "Analytical Engines"),
    ])
}

/// In-memory `ListingStore` keyed by listing id, in insertion order.
#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryStore {
    rows: Arc<Mutex<Vec<TrackedListing>>>,
}

impl MemoryStore {
    pub(crate) fn with_listings(listings: impl IntoIterator<Item = JobListing>) -> Self {
        let store = Self::default();
        for listing in listings {
            store.append(&listing).expect("fresh listing");
        }
        store
    }

    pub(crate) fn record(&self, id: &str) -> ApplicationRecord {
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .find(|row| row.listing.id.as_str() == id)
            .map(|row| row.application.clone())
            .unwrap_or_else(|| panic!("no row for {id}"))
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().expect("store mutex poisoned").len()
    }
}

impl ListingStore for MemoryStore {
    fn load(&self) -> Result<Vec<TrackedListing>, StoreError> {
        Ok(self.rows.lock().expect("store mutex poisoned").clone())
    }

    fn append(&self, listing: &JobListing) -> Result<TrackedListing, StoreError> {
        let mut guard = self.rows.lock().expect("store mutex poisoned");
        if guard.iter().any(|row| row.listing.id == listing.id) {
            return Err(StoreError::Conflict(listing.id.clone()));
        }
        let tracked = TrackedListing::new(listing.clone());
        guard.push(tracked.clone());
        Ok(tracked)
    }

    fn update(&self, record: &ApplicationRecord) -> Result<(), StoreError> {
        let mut guard = self.rows.lock().expect("store mutex poisoned");
        let row = guard
            .iter_mut()
            .find(|row| row.listing.id == record.listing_id)
            .ok_or_else(|| StoreError::NotFound(record.listing_id.clone()))?;
        row.application = record.clone();
        Ok(())
    }
}

/// Serves a fixed form for every apply URL and records what is submitted.
/// Failures are scripted per apply URL.
#[derive(Debug, Default, Clone)]
pub(crate) struct FakeGateway {
    failures: HashMap<String, SubmissionError>,
    extra_fields: Vec<FormField>,
    submissions: Arc<Mutex<Vec<FormSubmission>>>,
}

impl FakeGateway {
    pub(crate) fn failing(mut self, id: &str, error: SubmissionError) -> Self {
        self.failures.insert(apply_url(id), error);
        self
    }

    pub(crate) fn with_field(mut self, field: FormField) -> Self {
        self.extra_fields.push(field);
        self
    }

    pub(crate) fn submissions(&self) -> Vec<FormSubmission> {
        self.submissions
            .lock()
            .expect("gateway mutex poisoned")
            .clone()
    }

    pub(crate) fn submitted_actions(&self) -> Vec<String> {
        self.submissions()
            .into_iter()
            .map(|submission| submission.action.to_string())
            .collect()
    }
}

impl FormGateway for FakeGateway {
    fn load_form(&self, apply_url: &Url) -> Result<ApplicationForm, SubmissionError> {
        let mut fields = vec![
            FormField::new("name", FieldKind::Text).required(),
            FormField::new("email", FieldKind::Text).required(),
            FormField::new("phone", FieldKind::Text),
            FormField::new("resume", FieldKind::File),
        ];
        fields.extend(self.extra_fields.iter().cloned());
        Ok(ApplicationForm {
            action: apply_url.clone(),
            fields,
        })
    }

    fn submit(&self, submission: &FormSubmission) -> Result<(), SubmissionError> {
        self.submissions
            .lock()
            .expect("gateway mutex poisoned")
            .push(submission.clone());
        match self.failures.get(submission.action.as_str()) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
