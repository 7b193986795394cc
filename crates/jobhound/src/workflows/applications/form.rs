use std::path::PathBuf;

use url::Url;

use crate::net::TransportError;

/// Input control kinds the field mapper knows how to fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Hidden,
    File,
    Checkbox,
    Select,
    Radio,
}

/// A selectable option of a `select` or radio group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

/// One named control of an application form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Question text shown next to the control, when the page has one.
    pub label: Option<String>,
    pub default_value: Option<String>,
    pub options: Vec<FieldOption>,
}

impl FormField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            label: None,
            default_value: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, V)>,
        V: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(value, label)| FieldOption {
                value: value.into(),
                label: label.into(),
            })
            .collect();
        self
    }
}

/// An application form as discovered on an apply page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationForm {
    pub action: Url,
    pub fields: Vec<FormField>,
}

/// File upload attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub field: String,
    pub path: PathBuf,
}

/// Field/value pairs ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub action: Url,
    pub values: Vec<(String, String)>,
    pub attachments: Vec<Attachment>,
}

impl FormSubmission {
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Outbound capability: load the form behind an apply URL and post a filled
/// submission. Site-specific details live behind this boundary.
pub trait FormGateway {
    fn load_form(&self, apply_url: &Url) -> Result<ApplicationForm, SubmissionError>;
    fn submit(&self, submission: &FormSubmission) -> Result<(), SubmissionError>;
}

/// Why a single application attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("timeout")]
    Timeout,
    #[error("field not found: {0}")]
    FieldNotFound(String),
    #[error("no application form on {0}")]
    FormMissing(String),
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("attachment {} unreadable: {detail}", .path.display())]
    Attachment { path: PathBuf, detail: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid apply url: {0}")]
    InvalidUrl(String),
}

impl SubmissionError {
    /// Reason string persisted on a failed application record.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<TransportError> for SubmissionError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::Timeout => Self::Timeout,
            TransportError::Status { status, .. } => Self::Rejected(format!("HTTP {status}")),
            other => Self::Network(other.to_string()),
        }
    }
}
