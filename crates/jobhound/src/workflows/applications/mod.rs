//! Application tracking: durable rows, the pending filter, profile-to-form
//! field mapping and the sequential applicator.

pub mod applicator;
pub mod csv_store;
pub mod domain;
pub mod filter;
pub mod form;
pub mod mapping;
pub mod profile;
pub mod repository;
pub mod summary;

#[cfg(test)]
pub(crate) mod tests;

pub use applicator::{ApplyError, ApplyOptions, ApplyReport, Applicator, AttemptOutcome};
pub use csv_store::CsvListingStore;
pub use domain::{ApplicationRecord, ApplicationStatus, TrackedListing, TransitionError};
pub use filter::{pending_applications, pending_in_order, status_counts};
pub use form::{
    ApplicationForm, Attachment, FieldKind, FieldOption, FormField, FormGateway, FormSubmission,
    SubmissionError,
};
pub use mapping::map_form;
pub use profile::{ApplicantProfile, ProfileError, REQUIRED_KEYS};
pub use repository::{ListingStore, StoreError};
pub use summary::RunSummary;
