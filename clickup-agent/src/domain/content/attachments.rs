//! Mixed text and image content for a task.

use std::sync::LazyLock;

use clickup::{Attachment, Task};
use itertools::Itertools;
use regex::Regex;

use super::types::{ContentBlock, ImageReference};
use crate::domain::search::format_task;

static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"!\[([^\]]*)\]\((\S+?)(?:\s+"[^"]*")?\)"#).unwrap());

/// `![alt](url)` images in a markdown description, in document order.
pub fn markdown_images(markdown: &str) -> Vec<ImageReference> {
    MARKDOWN_IMAGE
        .captures_iter(markdown)
        .filter_map(|caps| {
            let url = caps.get(2)?.as_str();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return None;
            }
            let alt = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let alt = if alt.is_empty() { "image" } else { alt };
            Some(ImageReference::new(vec![url.to_string()], alt))
        })
        .unique_by(|r| r.urls.clone())
        .collect()
}

fn attachment_alt(attachment: &Attachment) -> String {
    attachment
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("attachment {}", attachment.id))
}

/// Live image attachments, oldest first.
pub fn attachment_images(task: &Task) -> Vec<ImageReference> {
    task.attachments
        .iter()
        .filter(|a| a.is_image() && !a.deleted)
        .sorted_by_key(|a| a.date)
        .map(|a| ImageReference::new(a.candidate_urls(), attachment_alt(a)))
        .filter(|r| !r.urls.is_empty())
        .collect()
}

/// The task as text followed by its images, oldest first.
///
/// Description images come before attachments. Description images that are also
/// attachments are only listed once, as the attachment.
pub fn task_content_blocks(task: &Task) -> Vec<ContentBlock> {
    let attachments = attachment_images(task);
    let attached: Vec<&String> = attachments.iter().flat_map(|r| &r.urls).collect();

    let inline = task
        .markdown_description
        .as_deref()
        .map(markdown_images)
        .unwrap_or_default()
        .into_iter()
        .filter(|r| !r.urls.iter().any(|u| attached.contains(&u)));

    std::iter::once(ContentBlock::text(format_task(task)))
        .chain(inline.map(ContentBlock::ImageRef))
        .chain(attachments.iter().cloned().map(ContentBlock::ImageRef))
        .collect()
}
