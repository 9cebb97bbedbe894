//! Content blocks returned to the caller.

use serde::{Deserialize, Serialize};

/// One piece of mixed text and image output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        /// Base64 encoded payload
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    /// Not yet downloaded. Resolved into `Image` or `Text` by the allocator.
    ImageRef(ImageReference),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image { .. })
    }

    pub fn is_image_ref(&self) -> bool {
        matches!(self, ContentBlock::ImageRef(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// An image with one or more candidate URLs, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub urls: Vec<String>,
    pub alt: String,
}

impl ImageReference {
    pub fn new(urls: Vec<String>, alt: impl Into<String>) -> Self {
        Self {
            urls,
            alt: alt.into(),
        }
    }
}
