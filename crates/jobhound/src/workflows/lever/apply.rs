use std::fs;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use tracing::debug;
use url::Url;

use super::form::parse_application_form;
use crate::net::{HttpTransport, PageFetcher, PostResponse};
use crate::workflows::applications::{
    ApplicationForm, Attachment, FormGateway, FormSubmission, SubmissionError,
};

/// Posts Lever application forms as `multipart/form-data`, the way the
/// hosted form does.
#[derive(Debug, Clone)]
pub struct LeverApplyGateway {
    transport: Arc<HttpTransport>,
}

impl LeverApplyGateway {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }
}

impl FormGateway for LeverApplyGateway {
    fn load_form(&self, apply_url: &Url) -> Result<ApplicationForm, SubmissionError> {
        let html = self.transport.fetch_page(apply_url)?;
        parse_application_form(&html, apply_url)
    }

    fn submit(&self, submission: &FormSubmission) -> Result<(), SubmissionError> {
        let form = multipart_form(submission)?;
        let response = self.transport.post_multipart(&submission.action, form)?;
        check_response(&response)?;
        debug!(action = %submission.action, landed = %response.final_url, "application posted");
        Ok(())
    }
}

fn multipart_form(submission: &FormSubmission) -> Result<Form, SubmissionError> {
    let mut form = Form::new();
    for (name, value) in &submission.values {
        form = form.text(name.clone(), value.clone());
    }
    for attachment in &submission.attachments {
        form = form.part(attachment.field.clone(), file_part(attachment)?);
    }
    Ok(form)
}

fn file_part(attachment: &Attachment) -> Result<Part, SubmissionError> {
    let unreadable = |detail: String| SubmissionError::Attachment {
        path: attachment.path.clone(),
        detail,
    };

    let bytes = fs::read(&attachment.path).map_err(|err| unreadable(err.to_string()))?;
    let file_name = attachment
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume".to_string());
    let mime = mime_guess::from_path(&attachment.path).first_or_octet_stream();

    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime.essence_str())
        .map_err(|err| unreadable(err.to_string()))
}

/// Lever answers a bad submission with a 4xx/5xx page; anything else counts
/// as accepted.
fn check_response(response: &PostResponse) -> Result<(), SubmissionError> {
    if response.status >= 400 {
        return Err(SubmissionError::Rejected(format!("HTTP {}", response.status)));
    }
    Ok(())
}
