//! Site API Client
//!
//! Thin JSON client for the services, courses and contact-form endpoints.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fetch::{FetchError, Fetcher, HttpFetcher, Request};

/// Backend origin used when `PIXO_API_BASE` is unset.
const DEFAULT_BASE: &str = "http://127.0.0.1:8000";

/// Request timeout for API calls.
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// A service offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub description: String,
    pub created: String,
}

/// A course listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    pub created: String,
}

/// Contact form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub subject: String,
    pub message: String,
}

/// API error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Fetch(#[from] FetchError),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the site backend.
pub struct ApiClient {
    base: url::Url,
    fetcher: Arc<dyn Fetcher>,
}

impl ApiClient {
    /// Client against `PIXO_API_BASE`, or the local dev backend.
    pub fn from_env() -> Result<Self, ApiError> {
        let base = std::env::var("PIXO_API_BASE").unwrap_or_else(|_| DEFAULT_BASE.to_string());
        Self::new(&base)
    }

    pub fn new(base: &str) -> Result<Self, ApiError> {
        let fetcher = HttpFetcher::with_timeout(API_TIMEOUT)?;
        Self::with_fetcher(base, Arc::new(fetcher))
    }

    /// Client over a custom transport.
    pub fn with_fetcher(base: &str, fetcher: Arc<dyn Fetcher>) -> Result<Self, ApiError> {
        let base = url::Url::parse(base)
            .map_err(|e| ApiError::Fetch(FetchError::InvalidUrl(format!("{base}: {e}"))))?;
        Ok(Self { base, fetcher })
    }

    /// All service offerings.
    pub async fn get_services(&self) -> Result<Vec<Service>, ApiError> {
        self.get_json("/api/services/").await
    }

    /// All course listings.
    pub async fn get_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.get_json("/api/courses/").await
    }

    /// Submit the contact form.
    pub async fn submit_contact(&self, form: &ContactForm) -> Result<(), ApiError> {
        let url = self.endpoint("/api/contact-form/")?;
        let body = serde_json::to_string(form)?;
        let response = self.fetcher.run(Request::post(&url).with_json(&body)).await?;
        if !response.ok() {
            return Err(ApiError::Status { status: response.status, url });
        }
        Ok(())
    }

    /// Whether the backend reports itself healthy.
    pub async fn health(&self) -> bool {
        let Ok(url) = self.endpoint("/health/") else {
            return false;
        };
        match self.fetcher.fetch(&url).await {
            Ok(response) => response.ok(),
            Err(err) => {
                tracing::debug!("health check failed: {err}");
                false
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.fetcher.fetch(&url).await?;
        if !response.ok() {
            return Err(ApiError::Status { status: response.status, url });
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    fn endpoint(&self, path: &str) -> Result<String, ApiError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| ApiError::Fetch(FetchError::InvalidUrl(format!("{path}: {e}"))))?;
        Ok(url.into())
    }
}
