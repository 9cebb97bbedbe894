//! Text and image content under a payload budget.
//!
//! Content is assembled as text blocks and unresolved [`ImageReference`]s, then passed
//! through [`allocate`], which downloads as many of the most recent images as fit the
//! [`ImageBudget`] and replaces the rest with short placeholders.

mod allocator;
mod attachments;
mod fetcher;
#[cfg(test)]
mod mock;
mod types;

pub use allocator::{allocate, ImageBudget};
pub use attachments::{attachment_images, markdown_images, task_content_blocks};
pub use fetcher::{FetchedImage, HttpImageFetcher, ImageFetchError, ImageFetcher};
#[cfg(test)]
pub use mock::MockImageFetcher;
pub use types::{ContentBlock, ImageReference};

use tracing::instrument;

use crate::domain::search::{IndexedRecord, RecordSource, Result, SearchError};

/// Fetch a task and resolve its text and images within `budget`.
#[instrument(skip(source, budget, fetcher))]
pub async fn task_content<S, F>(
    source: &S,
    task_id: &str,
    budget: &ImageBudget,
    fetcher: &F,
) -> Result<Vec<ContentBlock>>
where
    S: RecordSource + ?Sized,
    F: ImageFetcher + ?Sized,
{
    let task = match source.fetch_by_id(task_id).await? {
        Some(IndexedRecord::Task(task)) => task,
        _ => return Err(SearchError::NotFound(format!("task {task_id}"))),
    };

    let blocks = task_content_blocks(&task);
    Ok(allocate(blocks, budget, fetcher).await)
}

#[cfg(test)]
mod tests {
    use clickup::Attachment;

    use super::*;
    use crate::domain::search::fixtures::task;
    use crate::domain::search::source::MockRecordSource;

    fn image(id: &str) -> Attachment {
        Attachment {
            id: id.to_string(),
            title: Some(format!("{id}.png")),
            url: format!("https://files.test/{id}.png"),
            mimetype: Some("image/png".to_string()),
            extension: None,
            thumbnail_small: None,
            thumbnail_medium: None,
            thumbnail_large: None,
            date: None,
            deleted: false,
        }
    }

    #[tokio::test]
    async fn task_content_resolves_images_within_budget() {
        let mut t = task("abc123", "Crash on save");
        t.attachments = vec![image("first"), image("second")];
        let source = MockRecordSource::new().with_lookup(IndexedRecord::Task(t));
        let fetcher = MockImageFetcher::new()
            .with_image("https://files.test/first.png", 100)
            .with_image("https://files.test/second.png", 100);

        let blocks = task_content(&source, "abc123", &ImageBudget::new(1, 4096), &fetcher)
            .await
            .unwrap();

        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].as_text().unwrap().starts_with("Task: Crash on save"));
        assert!(blocks[1].as_text().unwrap().contains("first.png"));
        assert!(blocks[2].is_image());
        assert_eq!(fetcher.requests(), vec!["https://files.test/second.png"]);
    }

    #[tokio::test]
    async fn unknown_task_is_not_found() {
        let source = MockRecordSource::new();
        let fetcher = MockImageFetcher::new();

        let err = task_content(&source, "nope123", &ImageBudget::default(), &fetcher)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::NotFound(_)));
    }
}
