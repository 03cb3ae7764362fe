//! Existence Probing
//!
//! Decode-based existence checks for candidate URLs.

use std::io::Cursor;
use std::sync::Arc;

use pixo_net::Fetcher;

/// Outcome of probing one candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The URL serves a decodable image with these natural dimensions.
    Exists { width: u32, height: u32 },
    /// Fetch or decode failed; the candidate is unusable.
    Missing,
}

impl ProbeResult {
    pub fn exists(&self) -> bool {
        matches!(self, ProbeResult::Exists { .. })
    }
}

/// Async existence check. Absence is a value, never an error.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

/// Prober that fetches a candidate and reads its image header.
pub struct DecodeProber {
    fetcher: Arc<dyn Fetcher>,
}

impl DecodeProber {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl Prober for DecodeProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        if url.is_empty() {
            return ProbeResult::Missing;
        }
        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!("probe fetch failed for {url}: {err}");
                return ProbeResult::Missing;
            }
        };
        if !response.ok() {
            tracing::debug!("probe got status {} for {url}", response.status);
            return ProbeResult::Missing;
        }
        match decode_dimensions(&response.body) {
            Some((width, height)) => ProbeResult::Exists { width, height },
            None => {
                tracing::debug!("probe body for {url} is not a decodable image");
                ProbeResult::Missing
            }
        }
    }
}

/// Natural dimensions if the bytes decode as a supported image.
fn decode_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
