//! Image budget allocator.
//!
//! Bounds the payload of a content list in two passes. First only the `max_count` most
//! recent image references are kept (blocks are ordered oldest first). Then the byte budget
//! left after the text blocks is split evenly between the surviving references, and each
//! one resolves to the first candidate URL that fits its share.

use base64::{engine::general_purpose::STANDARD, Engine};
use futures::future::join_all;
use tracing::{debug, warn};

use super::fetcher::{ImageFetchError, ImageFetcher};
use super::types::{ContentBlock, ImageReference};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBudget {
    pub max_count: usize,
    pub max_total_bytes: u64,
}

impl ImageBudget {
    pub fn new(max_count: usize, max_total_bytes: u64) -> Self {
        Self {
            max_count,
            max_total_bytes,
        }
    }

    pub fn from_megabytes(max_count: usize, max_size_mb: f64) -> Self {
        let bytes = (max_size_mb.max(0.0) * BYTES_PER_MEGABYTE) as u64;
        Self::new(max_count, bytes)
    }
}

impl Default for ImageBudget {
    fn default() -> Self {
        Self::from_megabytes(4, 4.0)
    }
}

fn count_placeholder(alt: &str, max_count: usize) -> ContentBlock {
    ContentBlock::text(format!(
        "[Image omitted: {alt} (only the {max_count} most recent images are included)]"
    ))
}

fn size_placeholder(alt: &str, budget: u64) -> ContentBlock {
    ContentBlock::text(format!(
        "[Image omitted: {alt} (exceeds size limit of {budget} bytes)]"
    ))
}

fn download_placeholder(alt: &str) -> ContentBlock {
    ContentBlock::text(format!("[Image omitted: {alt} (could not be downloaded)]"))
}

/// Serialized size of everything that is not an image.
fn text_bytes(blocks: &[ContentBlock]) -> u64 {
    blocks
        .iter()
        .filter(|b| !b.is_image() && !b.is_image_ref())
        .map(|b| serde_json::to_string(b).map(|s| s.len() as u64).unwrap_or(0))
        .sum()
}

/// Resolve every image reference in `blocks` within `budget`.
///
/// The returned list has the same length and order as the input. References become
/// `Image` blocks or text placeholders; other blocks pass through untouched.
pub async fn allocate<F>(
    blocks: Vec<ContentBlock>,
    budget: &ImageBudget,
    fetcher: &F,
) -> Vec<ContentBlock>
where
    F: ImageFetcher + ?Sized,
{
    let references = blocks.iter().filter(|b| b.is_image_ref()).count();
    let mut excess = references.saturating_sub(budget.max_count);
    if excess > 0 {
        debug!(references, max = budget.max_count, "Dropping oldest images");
    }

    let blocks: Vec<ContentBlock> = blocks
        .into_iter()
        .map(|block| match block {
            ContentBlock::ImageRef(reference) if excess > 0 => {
                excess -= 1;
                count_placeholder(&reference.alt, budget.max_count)
            }
            other => other,
        })
        .collect();

    let survivors = blocks.iter().filter(|b| b.is_image_ref()).count() as u64;
    if survivors == 0 {
        return blocks;
    }

    let text = text_bytes(&blocks);
    let per_image = budget.max_total_bytes.saturating_sub(text) / survivors;
    debug!(text_bytes = text, per_image, survivors, "Allocating image budget");

    join_all(blocks.into_iter().map(|block| async move {
        match block {
            ContentBlock::ImageRef(reference) => resolve(&reference, per_image, fetcher).await,
            other => other,
        }
    }))
    .await
}

/// Try each candidate URL in order until one fits `budget`.
async fn resolve<F>(reference: &ImageReference, budget: u64, fetcher: &F) -> ContentBlock
where
    F: ImageFetcher + ?Sized,
{
    if budget == 0 {
        return size_placeholder(&reference.alt, budget);
    }

    let mut too_large = false;
    for url in &reference.urls {
        match fetcher.fetch(url, budget).await {
            Ok(image) if image.bytes.len() as u64 <= budget => {
                return ContentBlock::Image {
                    data: STANDARD.encode(&image.bytes),
                    mime_type: image.mime_type,
                };
            }
            Ok(image) => {
                too_large = true;
                debug!(url, size = image.bytes.len(), budget, "Candidate exceeds budget");
            }
            Err(ImageFetchError::TooLarge { size, .. }) => {
                too_large = true;
                debug!(url, size, budget, "Candidate exceeds budget");
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to fetch image candidate");
            }
        }
    }

    if too_large {
        size_placeholder(&reference.alt, budget)
    } else {
        download_placeholder(&reference.alt)
    }
}
