//! ClickUp record source implementation.
//!
//! Adapts the gateway client to the paginated [`RecordSource`] contract.

use async_trait::async_trait;
use clickup::{ClickUpClient, ClickUpFetchError, Doc};
use tracing::debug;

use crate::domain::search::traits::{RecordSource, Result};
use crate::domain::search::types::{
    IndexedRecord, PageRequest, RecordKind, RecordPage, SearchFilters,
};

/// Record source backed by the ClickUp REST API.
///
/// # Example
///
/// ```ignore
/// let client = ClickUpClient::new(token, team_id)?;
/// let source = ClickUpRecordSource::new(client);
/// let page = source.fetch_page(RecordKind::Task, &filters, &PageRequest::indexed(0)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ClickUpRecordSource {
    client: ClickUpClient,
}

impl ClickUpRecordSource {
    pub fn new(client: ClickUpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ClickUpClient {
        &self.client
    }
}

/// Docs have no server side space filter, so it is applied to each page.
fn doc_in_scope(doc: &Doc, space_ids: &[String]) -> bool {
    if doc.deleted {
        return false;
    }
    space_ids.is_empty()
        || doc
            .space_id()
            .is_some_and(|id| space_ids.iter().any(|s| s == id))
}

#[async_trait]
impl RecordSource for ClickUpRecordSource {
    async fn fetch_page(
        &self,
        kind: RecordKind,
        filters: &SearchFilters,
        page: &PageRequest,
    ) -> Result<RecordPage> {
        match kind {
            RecordKind::Task => {
                let response = self
                    .client
                    .fetch_tasks_page(&filters.to_task_query(), page.index)
                    .await?;
                Ok(RecordPage {
                    records: response.tasks.into_iter().map(IndexedRecord::Task).collect(),
                    next_cursor: None,
                })
            }
            RecordKind::Document => {
                let space_ids = filters.normalized().space_ids;
                let response = self.client.fetch_docs_page(page.cursor.as_deref()).await?;
                let records = response
                    .docs
                    .into_iter()
                    .filter(|doc| doc_in_scope(doc, &space_ids))
                    .map(IndexedRecord::Document)
                    .collect();
                Ok(RecordPage {
                    records,
                    next_cursor: response.next_cursor.filter(|c| !c.is_empty()),
                })
            }
            RecordKind::Space => {
                let space_ids = filters.normalized().space_ids;
                let spaces = self.client.fetch_spaces(false).await?;
                let records = spaces
                    .into_iter()
                    .filter(|s| space_ids.is_empty() || space_ids.contains(&s.id))
                    .map(IndexedRecord::Space)
                    .collect();
                Ok(RecordPage {
                    records,
                    next_cursor: None,
                })
            }
        }
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<IndexedRecord>> {
        match self.client.fetch_task(id).await {
            Ok(task) => Ok(Some(IndexedRecord::Task(task))),
            Err(ClickUpFetchError::NotFound) => {
                debug!(id, "Task not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use clickup::DocParent;

    use super::*;

    fn doc(id: &str, parent: Option<(&str, i64)>, deleted: bool) -> Doc {
        Doc {
            id: id.to_string(),
            name: format!("Doc {id}"),
            parent: parent.map(|(id, parent_type)| DocParent {
                id: id.to_string(),
                parent_type: Some(parent_type),
            }),
            workspace_id: None,
            creator: None,
            date_created: None,
            date_updated: None,
            deleted,
        }
    }

    #[test]
    fn docs_are_scoped_to_filtered_spaces() {
        let spaces = vec!["790".to_string()];
        assert!(doc_in_scope(&doc("d1", Some(("790", 4)), false), &spaces));
        assert!(!doc_in_scope(&doc("d2", Some(("111", 4)), false), &spaces));
        assert!(!doc_in_scope(&doc("d3", None, false), &spaces));
        assert!(doc_in_scope(&doc("d3", None, false), &[]));
    }

    #[test]
    fn deleted_docs_are_skipped() {
        assert!(!doc_in_scope(&doc("d1", Some(("790", 4)), true), &[]));
    }
}
