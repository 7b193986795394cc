use std::fmt;

use super::applicator::ApplyReport;
use crate::workflows::listings::CollectionReport;

/// End-of-run counts shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub collected: usize,
    pub applied: usize,
    pub failed: usize,
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn record_collection(&mut self, report: &CollectionReport) {
        self.collected += report.collected.len();
        self.warnings
            .extend(report.warnings.iter().map(|warning| warning.summary()));
    }

    pub fn record_applications(&mut self, report: &ApplyReport) {
        self.applied += report.applied();
        self.failed += report.failed();
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collected: {}, applied: {}, failed: {}",
            self.collected, self.applied, self.failed
        )?;
        for warning in &self.warnings {
            write!(f, "\nwarning: {warning}")?;
        }
        Ok(())
    }
}
