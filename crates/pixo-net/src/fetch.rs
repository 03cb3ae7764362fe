//! HTTP Transport
//!
//! Async fetch seam over a blocking HTTP client.

use std::time::Duration;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Request configuration
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn get(url: &str) -> Self {
        Self {
            method: Method::Get,
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn post(url: &str) -> Self {
        Self {
            method: Method::Post,
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_json(self, json: &str) -> Self {
        self.with_header("Content-Type", "application/json")
            .with_body(json.as_bytes().to_vec())
    }
}

/// HTTP Response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Check if the status is 2xx
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("client setup failed: {0}")]
    Setup(String),
}

/// Asynchronous byte transport.
///
/// Implementations must be cheap to share across many loaders.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Execute a request, returning the full response.
    async fn run(&self, request: Request) -> Result<Response, FetchError>;

    /// GET a URL.
    async fn fetch(&self, url: &str) -> Result<Response, FetchError> {
        self.run(Request::get(url)).await
    }
}

/// Fetcher backed by a blocking HTTP client.
///
/// Requests run on the blocking thread pool so async callers never stall.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("pixo/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Setup(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn run(&self, request: Request) -> Result<Response, FetchError> {
        let url = url::Url::parse(&request.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", request.url)))?;
        tracing::info!("HTTP {} {}", request.method.as_str(), url);

        let client = self.client.clone();
        let Request { method, headers, body, .. } = request;
        smol::unblock(move || {
            let mut builder = match method {
                Method::Get => client.get(url),
                Method::Post => client.post(url),
            };
            for (key, value) in &headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder.send().map_err(|e| FetchError::Network(e.to_string()))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(key, value)| {
                    (key.to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
                })
                .collect();
            let body = response
                .bytes()
                .map_err(|e| FetchError::Network(e.to_string()))?
                .to_vec();

            Ok(Response { status, headers, body })
        })
        .await
    }
}
