//! Image downloads bounded by a byte budget.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use mime::Mime;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ImageFetchError {
    #[error("Failed to download image: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(u16),
    #[error("Invalid image format: {0}")]
    InvalidFormat(String),
    #[error("Image too large: {size} bytes exceeds budget of {budget} bytes")]
    TooLarge { size: u64, budget: u64 },
}

#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub mime_type: String,
}

/// Downloads a single image, giving up once it is known to exceed `max_bytes`.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<FetchedImage, ImageFetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    http_client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ImageFetchError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

/// MIME type from the `Content-Type` header, else guessed from the URL path.
fn image_mime(content_type: Option<&str>, url: &str) -> Result<String, ImageFetchError> {
    let declared = content_type.and_then(|ct| ct.parse::<Mime>().ok());
    if let Some(mime) = &declared {
        if mime.type_() == mime::IMAGE {
            return Ok(mime.essence_str().to_string());
        }
    }

    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or(url).to_string());
    let guessed = mime_guess::from_path(&path)
        .first()
        .filter(|m| m.type_() == mime::IMAGE);

    match (declared, guessed) {
        // Generic binary types are common for attachment storage, trust the extension then.
        (Some(d), Some(g)) if d == mime::APPLICATION_OCTET_STREAM => Ok(g.essence_str().to_string()),
        (None, Some(g)) => Ok(g.essence_str().to_string()),
        (Some(d), _) => Err(ImageFetchError::InvalidFormat(d.to_string())),
        (None, None) => Err(ImageFetchError::InvalidFormat(format!(
            "unknown type for {path}"
        ))),
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<FetchedImage, ImageFetchError> {
        let mut response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let mime_type = image_mime(content_type, url)?;

        // Dropping the response here aborts the transfer before the body is read.
        if let Some(size) = response.content_length() {
            if size > max_bytes {
                debug!(url, size, budget = max_bytes, "Declared size exceeds budget");
                return Err(ImageFetchError::TooLarge {
                    size,
                    budget: max_bytes,
                });
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            let size = (body.len() + chunk.len()) as u64;
            if size > max_bytes {
                debug!(url, received = size, budget = max_bytes, "Download exceeds budget");
                return Err(ImageFetchError::TooLarge {
                    size,
                    budget: max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchedImage {
            bytes: body.freeze(),
            mime_type,
        })
    }
}
