use std::time::Duration;

use anyhow::{Context, Result};
use image::DynamicImage;
use log::warn;
use reqwest::blocking::Client;

// ---------------------------------------------------------------------------
// Poster download – best effort, bounded, never fatal
// ---------------------------------------------------------------------------

/// Default per-request timeout for poster fetches.
pub const POSTER_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for per-film poster images. One failed fetch must not abort
/// the remaining rows, so every failure path degrades to `None`.
pub struct PosterFetcher {
    client: Client,
}

impl PosterFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("building poster HTTP client")?;
        Ok(PosterFetcher { client })
    }

    /// Fetch and decode a poster. Timeouts, non-2xx responses, and
    /// undecodable payloads all become `None`, logged at warn level.
    pub fn fetch(&self, url: &str) -> Option<DynamicImage> {
        let response = match self.client.get(url).send() {
            Ok(r) => r,
            Err(e) => {
                warn!("poster fetch failed for {url}: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("poster fetch for {url} returned {}", response.status());
            return None;
        }
        let bytes = match response.bytes() {
            Ok(b) => b,
            Err(e) => {
                warn!("poster body read failed for {url}: {e}");
                return None;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("poster decode failed for {url}: {e}");
                None
            }
        }
    }
}
