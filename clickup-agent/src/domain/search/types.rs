//! Core types for the search domain.

use clickup::{Doc, Space, Task, TaskQuery};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of remote collection an index is built over.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum RecordKind {
    #[default]
    #[strum(to_string = "task", serialize = "tasks")]
    Task,
    #[strum(
        to_string = "document",
        serialize = "documents",
        serialize = "doc",
        serialize = "docs"
    )]
    Document,
    #[strum(to_string = "space", serialize = "spaces")]
    Space,
}

/// How the upstream pages a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Page numbers, every page can be requested independently.
    Indexed,
    /// Opaque continuation cursors, pages must be walked in order.
    Cursor,
    /// The whole collection comes back in one response.
    Single,
}

impl RecordKind {
    pub fn pagination(self) -> Pagination {
        match self {
            RecordKind::Task => Pagination::Indexed,
            RecordKind::Document => Pagination::Cursor,
            RecordKind::Space => Pagination::Single,
        }
    }

    pub fn noun(self, count: usize) -> &'static str {
        match (self, count == 1) {
            (RecordKind::Task, true) => "task",
            (RecordKind::Task, false) => "tasks",
            (RecordKind::Document, true) => "document",
            (RecordKind::Document, false) => "documents",
            (RecordKind::Space, true) => "space",
            (RecordKind::Space, false) => "spaces",
        }
    }
}

/// A record that can be placed in a search index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexedRecord {
    Task(Task),
    Document(Doc),
    Space(Space),
}

/// One weighted, searchable text field projected from a record.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchField {
    pub name: &'static str,
    pub weight: f64,
    pub text: String,
}

impl SearchField {
    fn new(name: &'static str, weight: f64, text: impl Into<String>) -> Self {
        Self {
            name,
            weight,
            text: text.into(),
        }
    }
}

impl IndexedRecord {
    pub fn id(&self) -> &str {
        match self {
            IndexedRecord::Task(task) => &task.id,
            IndexedRecord::Document(doc) => &doc.id,
            IndexedRecord::Space(space) => &space.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            IndexedRecord::Task(_) => RecordKind::Task,
            IndexedRecord::Document(_) => RecordKind::Document,
            IndexedRecord::Space(_) => RecordKind::Space,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            IndexedRecord::Task(task) => &task.name,
            IndexedRecord::Document(doc) => &doc.name,
            IndexedRecord::Space(space) => &space.name,
        }
    }

    /// Searchable fields with their static weights. Empty fields are skipped.
    pub fn search_fields(&self) -> Vec<SearchField> {
        let mut fields = vec![
            SearchField::new("name", 0.7, self.name()),
            SearchField::new("id", 0.6, self.id()),
        ];

        match self {
            IndexedRecord::Task(task) => {
                if let Some(custom_id) = &task.custom_id {
                    fields.push(SearchField::new("custom_id", 0.6, custom_id));
                }
                if let Some(text) = &task.text_content {
                    fields.push(SearchField::new("text_content", 0.5, text));
                }
                fields.push(SearchField::new("tags", 0.4, task.tag_names().join(" ")));
                fields.push(SearchField::new(
                    "assignees",
                    0.4,
                    task.assignee_names().join(" "),
                ));
                if let Some(name) = task.list.as_ref().and_then(|l| l.name.as_ref()) {
                    fields.push(SearchField::new("list", 0.3, name));
                }
                if let Some(name) = task.folder.as_ref().and_then(|f| f.name.as_ref()) {
                    fields.push(SearchField::new("folder", 0.2, name));
                }
                if let Some(space) = &task.space {
                    fields.push(SearchField::new("space", 0.1, &space.id));
                }
            }
            IndexedRecord::Document(doc) => {
                if let Some(parent) = &doc.parent {
                    fields.push(SearchField::new("parent", 0.3, &parent.id));
                }
            }
            IndexedRecord::Space(_) => {}
        }

        fields.retain(|f| !f.text.trim().is_empty());
        fields
    }
}

/// Identifier sets narrowing what an index is built over. Absent sets mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub space_ids: Vec<String>,
    #[serde(default)]
    pub folder_ids: Vec<String>,
    #[serde(default)]
    pub list_ids: Vec<String>,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub include_closed: bool,
}

fn canonical_set(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .sorted()
        .dedup()
        .map(str::to_string)
        .collect()
}

impl SearchFilters {
    /// Trimmed, de-duplicated and sorted copy, so set order never matters.
    pub fn normalized(&self) -> Self {
        Self {
            space_ids: canonical_set(&self.space_ids),
            folder_ids: canonical_set(&self.folder_ids),
            list_ids: canonical_set(&self.list_ids),
            assignee_ids: canonical_set(&self.assignee_ids),
            tags: canonical_set(&self.tags),
            statuses: canonical_set(&self.statuses),
            include_closed: self.include_closed,
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.to_task_query().is_filtered()
    }

    pub fn key(&self) -> FilterKey {
        let normalized = self.normalized();
        let value = serde_json::json!({
            "space_ids": normalized.space_ids,
            "folder_ids": normalized.folder_ids,
            "list_ids": normalized.list_ids,
            "assignee_ids": normalized.assignee_ids,
            "tags": normalized.tags,
            "statuses": normalized.statuses,
            "include_closed": normalized.include_closed,
        });
        FilterKey(value.to_string())
    }

    pub fn to_task_query(&self) -> TaskQuery {
        let normalized = self.normalized();
        TaskQuery {
            space_ids: normalized.space_ids,
            folder_ids: normalized.folder_ids,
            list_ids: normalized.list_ids,
            assignees: normalized.assignee_ids,
            tags: normalized.tags,
            statuses: normalized.statuses,
            include_closed: normalized.include_closed,
        }
    }
}

/// Order-independent cache key for a filter combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKey(String);

impl FilterKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ranked search hit. Lower scores are better, 0.0 is an exact or direct match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub record: IndexedRecord,
    pub score: f64,
    pub matched_terms: Vec<String>,
}

/// A search over one record kind.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub kind: RecordKind,
    /// `None` browses the whole index, `Some` ranks by the given terms.
    pub terms: Option<Vec<String>>,
    pub filters: SearchFilters,
    pub limit: Option<usize>,
}

/// Which page of a collection to request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u32,
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn indexed(index: u32) -> Self {
        Self {
            index,
            cursor: None,
        }
    }

    pub fn after(index: u32, cursor: Option<String>) -> Self {
        Self { index, cursor }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub records: Vec<IndexedRecord>,
    pub next_cursor: Option<String>,
}
