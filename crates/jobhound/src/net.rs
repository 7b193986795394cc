use std::fmt::Debug;

use reqwest::header::ACCEPT;
use reqwest::multipart::Form;
use tokio::runtime::Runtime;
use url::Url;

use crate::config::HttpConfig;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("timeout")]
    Timeout,
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request failed: {0}")]
    Request(String),
    #[error("http runtime unavailable: {0}")]
    Runtime(String),
}

impl TransportError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        match err.status() {
            Some(status) => Self::Status {
                url: err
                    .url()
                    .map(|url| url.to_string())
                    .unwrap_or_else(|| "remote".to_string()),
                status: status.as_u16(),
            },
            None => Self::Request(err.to_string()),
        }
    }
}

/// Read-only page access used by search engines and board scrapers.
pub trait PageFetcher: Debug {
    fn fetch_page(&self, url: &Url) -> Result<String, TransportError>;
}

/// Response metadata for a form post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostResponse {
    pub status: u16,
    pub final_url: String,
}

/// Blocking wrapper around an async reqwest client. Every call is driven to
/// completion on a private current-thread runtime, so requests never overlap.
pub struct HttpTransport {
    client: reqwest::Client,
    runtime: Runtime,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| TransportError::Runtime(err.to_string()))?;
        Ok(Self { client, runtime })
    }

    /// Posts a multipart form. Non-success statuses are returned, not raised,
    /// so callers can decide what counts as a rejection.
    pub fn post_multipart(&self, url: &Url, form: Form) -> Result<PostResponse, TransportError> {
        let result = self.runtime.block_on(async {
            let response = self
                .client
                .post(url.as_str())
                .multipart(form)
                .send()
                .await?;
            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            Ok::<_, reqwest::Error>(PostResponse { status, final_url })
        });

        result.map_err(TransportError::from_reqwest)
    }
}

impl PageFetcher for HttpTransport {
    fn fetch_page(&self, url: &Url) -> Result<String, TransportError> {
        let result = self.runtime.block_on(async {
            self.client
                .get(url.as_str())
                .header(ACCEPT, mime::TEXT_HTML.as_ref())
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        });

        result.map_err(TransportError::from_reqwest)
    }
}

impl Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}
