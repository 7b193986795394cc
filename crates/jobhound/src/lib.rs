//! Job-search automation: collect postings into a flat file, then apply to the
//! pending ones with a stored applicant profile.

pub mod config;
pub mod error;
pub mod net;
pub mod telemetry;
pub mod workflows;
