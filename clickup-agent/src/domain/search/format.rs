//! Plain text rendering of search results and tasks.

use std::fmt::Write;

use clickup::Task;
use itertools::Itertools;

use super::types::{IndexedRecord, ScoredMatch, SearchRequest};

fn describe_query(request: &SearchRequest) -> String {
    match &request.terms {
        Some(terms) if terms.iter().any(|t| !t.trim().is_empty()) => terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| format!("\"{t}\""))
            .join(", "),
        _ if request.filters.is_filtered() => "the given filters".to_string(),
        _ => "any criteria".to_string(),
    }
}

/// One line per record, with a header naming the count and the query.
pub fn format_results(request: &SearchRequest, results: &[ScoredMatch]) -> String {
    let query = describe_query(request);
    if results.is_empty() {
        return format!("No {} found matching {}", request.kind.noun(0), query);
    }

    let mut out = format!(
        "Found {} {} matching {}\n",
        results.len(),
        request.kind.noun(results.len()),
        query
    );
    for m in results {
        out.push('\n');
        out.push_str(&format_line(m));
    }
    out
}

fn format_line(m: &ScoredMatch) -> String {
    let mut parts = vec![format!("- [{}] {}", m.record.id(), m.record.name())];

    match &m.record {
        IndexedRecord::Task(task) => {
            if let Some(status) = task.status_name() {
                parts.push(format!("status: {status}"));
            }
            if let Some(list) = task.list.as_ref().and_then(|l| l.name.as_deref()) {
                parts.push(format!("list: {list}"));
            }
            let assignees = task.assignee_names();
            if !assignees.is_empty() {
                parts.push(format!("assignees: {}", assignees.join(", ")));
            }
            if let Some(url) = &task.url {
                parts.push(url.clone());
            }
        }
        IndexedRecord::Document(doc) => {
            if let Some(parent) = &doc.parent {
                parts.push(format!("parent: {}", parent.id));
            }
        }
        IndexedRecord::Space(space) => {
            parts.push(if space.private { "private" } else { "public" }.to_string());
        }
    }

    if !m.matched_terms.is_empty() {
        parts.push(format!("matched: {}", m.matched_terms.join(", ")));
    }

    parts.join(" | ")
}

/// Detailed multi-line view of a single task.
pub fn format_task(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Task: {} [{}]", task.name, task.id);
    if let Some(custom_id) = &task.custom_id {
        let _ = writeln!(out, "Custom ID: {custom_id}");
    }
    if let Some(status) = task.status_name() {
        let _ = writeln!(out, "Status: {status}");
    }
    if let Some(priority) = &task.priority {
        let _ = writeln!(out, "Priority: {}", priority.priority);
    }
    let assignees = task.assignee_names();
    if !assignees.is_empty() {
        let _ = writeln!(out, "Assignees: {}", assignees.join(", "));
    }
    let tags = task.tag_names();
    if !tags.is_empty() {
        let _ = writeln!(out, "Tags: {}", tags.join(", "));
    }
    if let Some(list) = task.list.as_ref().and_then(|l| l.name.as_deref()) {
        let _ = writeln!(out, "List: {list}");
    }
    if let Some(url) = &task.url {
        let _ = writeln!(out, "URL: {url}");
    }

    let description = task
        .markdown_description
        .as_deref()
        .or(task.text_content.as_deref())
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if let Some(description) = description {
        let _ = write!(out, "\n{description}\n");
    }

    out.trim_end().to_string()
}
