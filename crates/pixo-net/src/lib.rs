//! Pixo Networking
//!
//! HTTP transport seam and the site API client.

mod api;
mod fetch;

pub use api::{ApiClient, ApiError, ContactForm, Course, Service};
pub use fetch::{FetchError, Fetcher, HttpFetcher, Method, Request, Response};

/// Fetch a URL with the default HTTP transport.
pub async fn fetch(url: &str) -> Result<Response, FetchError> {
    HttpFetcher::new()?.fetch(url).await
}
