//! Mock image fetcher for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::fetcher::{FetchedImage, ImageFetchError, ImageFetcher};

/// Serves images of configured sizes and records every requested URL.
#[derive(Clone, Default)]
pub struct MockImageFetcher {
    sizes: Arc<RwLock<HashMap<String, usize>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    /// Return oversized payloads instead of rejecting them.
    ignore_budget: bool,
    delay: Duration,
    requests: Arc<RwLock<Vec<String>>>,
}

#[allow(dead_code)]
impl MockImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, url: &str, size: usize) -> Self {
        self.sizes.write().unwrap().insert(url.to_string(), size);
        self
    }

    pub fn with_failure(self, url: &str) -> Self {
        self.failing.write().unwrap().insert(url.to_string());
        self
    }

    pub fn ignoring_budget(mut self) -> Self {
        self.ignore_budget = true;
        self
    }

    /// Delay applied to every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<FetchedImage, ImageFetchError> {
        self.requests.write().unwrap().push(url.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.read().unwrap().contains(url) {
            return Err(ImageFetchError::Status(500));
        }
        let size = self
            .sizes
            .read()
            .unwrap()
            .get(url)
            .copied()
            .ok_or(ImageFetchError::Status(404))?;

        if size as u64 > max_bytes && !self.ignore_budget {
            return Err(ImageFetchError::TooLarge {
                size: size as u64,
                budget: max_bytes,
            });
        }

        Ok(FetchedImage {
            bytes: Bytes::from(vec![0xAB; size]),
            mime_type: "image/png".to_string(),
        })
    }
}
