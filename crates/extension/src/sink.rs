//! Form submission sink: where new or updated customer details are sent.
//!
//! [`HttpFormSink`] posts JSON to `<base>/webex/form` with an API key header.
//! [`LoggingFormSink`] keeps submissions in memory and logs them, for
//! deployments without a form endpoint.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::config::FormSinkConfig;
use crate::models::SessionCustomer;

/// Path of the form endpoint, relative to the configured base URL.
const FORM_PATH: &str = "webex/form";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Sink future type alias.
pub type SinkFut<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

/// Errors that can occur when submitting a form.
#[derive(Debug, Error)]
pub enum SinkError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Unauthorized (invalid API key).
    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    /// The sink could not be built from its configuration.
    #[error("Invalid sink configuration: {0}")]
    InvalidConfig(String),
}

/// Customer details captured by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub group: String,
    pub state: String,
    pub postcode: String,
}

impl From<&SessionCustomer> for FormPayload {
    fn from(customer: &SessionCustomer) -> Self {
        Self {
            first_name: customer.identity.first_name.clone(),
            last_name: customer.identity.last_name.clone(),
            email: customer.identity.email.clone(),
            phone: customer.identity.phone.clone(),
            group: customer.segment.as_str().to_owned(),
            state: customer.address.state.clone(),
            postcode: customer.address.postcode.clone(),
        }
    }
}

/// Destination of submitted forms.
pub trait FormSubmissionSink: Send + Sync {
    fn submit<'a>(&'a self, payload: &'a FormPayload) -> SinkFut<'a>;
}

/// Form sink posting JSON over HTTP.
#[derive(Clone)]
pub struct HttpFormSink {
    inner: Arc<HttpFormSinkInner>,
}

struct HttpFormSinkInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl std::fmt::Debug for HttpFormSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFormSink")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpFormSink {
    /// Create a sink for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &FormSinkConfig) -> Result<Self, SinkError> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| SinkError::InvalidConfig(format!("Invalid API key format: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpFormSinkInner {
                client,
                endpoint: form_endpoint(&config.url)?,
            }),
        })
    }

    /// The URL submissions are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    #[instrument(skip_all, fields(endpoint = %self.inner.endpoint))]
    async fn post(&self, payload: &FormPayload) -> Result<(), SinkError> {
        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "Customer form submitted");
            return Ok(());
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(SinkError::Unauthorized);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SinkError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl FormSubmissionSink for HttpFormSink {
    fn submit<'a>(&'a self, payload: &'a FormPayload) -> SinkFut<'a> {
        Box::pin(self.post(payload))
    }
}

/// Append the form path to `base`, keeping any path prefix it carries.
fn form_endpoint(base: &Url) -> Result<Url, SinkError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(FORM_PATH)
        .map_err(|e| SinkError::InvalidConfig(format!("Invalid form URL: {e}")))
}

/// Form sink that only logs and remembers submissions.
#[derive(Debug, Default)]
pub struct LoggingFormSink {
    submitted: Mutex<Vec<FormPayload>>,
}

impl LoggingFormSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every payload received so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<FormPayload> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FormSubmissionSink for LoggingFormSink {
    fn submit<'a>(&'a self, payload: &'a FormPayload) -> SinkFut<'a> {
        Box::pin(async move {
            info!(email = %payload.email, group = %payload.group, "Customer form recorded");
            self.submitted
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(payload.clone());
            Ok(())
        })
    }
}
