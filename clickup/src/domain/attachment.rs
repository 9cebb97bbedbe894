use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::de;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub thumbnail_small: Option<String>,
    #[serde(default)]
    pub thumbnail_medium: Option<String>,
    #[serde(default)]
    pub thumbnail_large: Option<String>,
    #[serde(default, deserialize_with = "de::option_millis")]
    pub date: Option<OffsetDateTime>,
    #[serde(default)]
    pub deleted: bool,
}

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

impl Attachment {
    pub fn is_image(&self) -> bool {
        if let Some(mime) = &self.mimetype {
            return mime.starts_with("image/");
        }
        self.extension
            .as_deref()
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Download candidates ordered from the largest rendition to the smallest.
    pub fn candidate_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::with_capacity(4);
        let renditions = [
            Some(&self.url),
            self.thumbnail_large.as_ref(),
            self.thumbnail_medium.as_ref(),
            self.thumbnail_small.as_ref(),
        ];
        for url in renditions.into_iter().flatten() {
            if !url.is_empty() && !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment() -> Attachment {
        serde_json::from_str(
            r#"{
                "id": "a1",
                "title": "screenshot.png",
                "url": "https://files.test/full.png",
                "mimetype": "image/png",
                "extension": "png",
                "thumbnail_small": "https://files.test/s.png",
                "thumbnail_medium": "https://files.test/m.png",
                "thumbnail_large": "https://files.test/full.png",
                "date": 1700000000000
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn candidates_are_largest_first_and_unique() {
        assert_eq!(
            attachment().candidate_urls(),
            vec![
                "https://files.test/full.png",
                "https://files.test/m.png",
                "https://files.test/s.png",
            ]
        );
    }

    #[test]
    fn image_detection_uses_mimetype_then_extension() {
        let mut a = attachment();
        assert!(a.is_image());

        a.mimetype = Some("application/pdf".to_string());
        assert!(!a.is_image());

        a.mimetype = None;
        a.extension = Some("JPG".to_string());
        assert!(a.is_image());
    }
}
