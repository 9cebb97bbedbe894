//! Mock record source for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::search::traits::{RecordSource, Result, SearchError};
use crate::domain::search::types::{
    IndexedRecord, PageRequest, Pagination, RecordKind, RecordPage, SearchFilters,
};

const DEFAULT_PAGE_SIZE: usize = 100;

/// In-memory record source that pages fixed record lists and counts calls.
///
/// # Examples
///
/// ```ignore
/// let source = MockRecordSource::new()
///     .with_records(RecordKind::Task, vec![task_record("t1", "Fix login")])
///     .with_failing_page(1);
/// ```
#[derive(Clone)]
pub struct MockRecordSource {
    records: Arc<RwLock<HashMap<RecordKind, Vec<IndexedRecord>>>>,
    by_id: Arc<RwLock<HashMap<String, IndexedRecord>>>,
    failing_pages: Arc<RwLock<HashSet<u32>>>,
    failing_ids: Arc<RwLock<HashSet<String>>>,
    fail_with: Arc<RwLock<Option<SearchError>>>,
    page_size: usize,
    delay: Duration,
    lookup_delay: Duration,
    page_calls: Arc<AtomicUsize>,
    id_calls: Arc<AtomicUsize>,
}

impl Default for MockRecordSource {
    fn default() -> Self {
        Self {
            records: Arc::default(),
            by_id: Arc::default(),
            failing_pages: Arc::default(),
            failing_ids: Arc::default(),
            fail_with: Arc::default(),
            page_size: DEFAULT_PAGE_SIZE,
            delay: Duration::ZERO,
            lookup_delay: Duration::ZERO,
            page_calls: Arc::default(),
            id_calls: Arc::default(),
        }
    }
}

#[allow(dead_code)]
impl MockRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(self, kind: RecordKind, records: Vec<IndexedRecord>) -> Self {
        self.records
            .write()
            .unwrap()
            .entry(kind)
            .or_default()
            .extend(records);
        self
    }

    /// Records reachable only through `fetch_by_id`.
    pub fn with_lookup(self, record: IndexedRecord) -> Self {
        self.by_id
            .write()
            .unwrap()
            .insert(record.id().to_string(), record);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay applied to every `fetch_by_id` call.
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }

    pub fn with_failing_page(self, index: u32) -> Self {
        self.failing_pages.write().unwrap().insert(index);
        self
    }

    pub fn with_failing_id(self, id: &str) -> Self {
        self.failing_ids.write().unwrap().insert(id.to_string());
        self
    }

    /// Every page request fails with `error`.
    pub fn failing_with(self, error: SearchError) -> Self {
        *self.fail_with.write().unwrap() = Some(error);
        self
    }

    /// Clear an error set with [`Self::failing_with`].
    pub fn recover(&self) {
        *self.fail_with.write().unwrap() = None;
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn id_calls(&self) -> usize {
        self.id_calls.load(Ordering::SeqCst)
    }

    fn slice(&self, kind: RecordKind, index: usize) -> (Vec<IndexedRecord>, bool) {
        let records = self.records.read().unwrap();
        let all = records.get(&kind).map(Vec::as_slice).unwrap_or_default();
        let start = (index * self.page_size).min(all.len());
        let end = (start + self.page_size).min(all.len());
        (all[start..end].to_vec(), end < all.len())
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn fetch_page(
        &self,
        kind: RecordKind,
        _filters: &SearchFilters,
        page: &PageRequest,
    ) -> Result<RecordPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(error) = self.fail_with.read().unwrap().clone() {
            return Err(error);
        }
        if self.failing_pages.read().unwrap().contains(&page.index) {
            return Err(SearchError::SourceError(format!(
                "page {} unavailable",
                page.index
            )));
        }

        let page = match kind.pagination() {
            Pagination::Indexed => RecordPage {
                records: self.slice(kind, page.index as usize).0,
                next_cursor: None,
            },
            Pagination::Cursor => {
                let index = page
                    .cursor
                    .as_deref()
                    .and_then(|c| c.parse::<usize>().ok())
                    .unwrap_or(0);
                let (records, more) = self.slice(kind, index);
                RecordPage {
                    records,
                    next_cursor: more.then(|| (index + 1).to_string()),
                }
            }
            Pagination::Single => RecordPage {
                records: self
                    .records
                    .read()
                    .unwrap()
                    .get(&kind)
                    .cloned()
                    .unwrap_or_default(),
                next_cursor: None,
            },
        };

        Ok(page)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<IndexedRecord>> {
        self.id_calls.fetch_add(1, Ordering::SeqCst);
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }

        if self.failing_ids.read().unwrap().contains(id) {
            return Err(SearchError::SourceError(format!("lookup of {id} failed")));
        }
        Ok(self.by_id.read().unwrap().get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::types::fixtures::task_record;

    #[tokio::test]
    async fn cursor_pages_walk_in_order() {
        let source = MockRecordSource::new()
            .with_page_size(2)
            .with_records(
                RecordKind::Document,
                (0..3)
                    .map(|i| task_record(&format!("d{i}"), "doc"))
                    .collect(),
            );

        let first = source
            .fetch_page(
                RecordKind::Document,
                &SearchFilters::default(),
                &PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.next_cursor.as_deref(), Some("1"));

        let second = source
            .fetch_page(
                RecordKind::Document,
                &SearchFilters::default(),
                &PageRequest::after(1, first.next_cursor),
            )
            .await
            .unwrap();
        assert_eq!(second.records.len(), 1);
        assert!(second.next_cursor.is_none());
        assert_eq!(source.page_calls(), 2);
    }
}
