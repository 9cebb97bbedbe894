//! Collects records for an index from a paginated source.
//!
//! Pagination stops at a fixed page ceiling rather than at the end of the data, which
//! bounds request volume against a rate limited upstream. Large workspaces may therefore
//! be truncated.

use futures::{stream, StreamExt};
use itertools::Itertools;
use tracing::{debug, info, warn};

use super::fuzzy::{FuzzyIndex, FuzzyOptions};
use super::traits::{RecordSource, Result, SearchError};
use super::types::{IndexedRecord, PageRequest, Pagination, RecordKind, SearchFilters};

/// Page ceilings and fan-out for index builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePolicy {
    /// Pages fetched when any filter narrows the query.
    pub filtered_ceiling: u32,
    /// Pages fetched for the whole workspace.
    pub unfiltered_ceiling: u32,
    /// Indexed pages requested at the same time.
    pub concurrency: usize,
}

impl Default for PagePolicy {
    fn default() -> Self {
        Self {
            filtered_ceiling: 10,
            unfiltered_ceiling: 30,
            concurrency: 5,
        }
    }
}

impl PagePolicy {
    pub fn ceiling(&self, filters: &SearchFilters) -> u32 {
        if filters.is_filtered() {
            self.filtered_ceiling
        } else {
            self.unfiltered_ceiling
        }
    }
}

/// Records gathered for one index build.
#[derive(Debug, Default)]
pub struct Collected {
    pub records: Vec<IndexedRecord>,
    /// Last error when every requested page failed.
    pub unreachable: Option<SearchError>,
}

/// Fetch every page of `kind` the policy allows and de-duplicate by id.
///
/// Failed pages contribute no records. When no page succeeds the result is empty and
/// `unreachable` carries the last error.
pub async fn collect_records<S>(
    source: &S,
    kind: RecordKind,
    filters: &SearchFilters,
    policy: &PagePolicy,
) -> Collected
where
    S: RecordSource + ?Sized,
{
    let ceiling = policy.ceiling(filters).max(1);

    let pages: Vec<Result<Vec<IndexedRecord>>> = match kind.pagination() {
        Pagination::Indexed => {
            stream::iter(0..ceiling)
                .map(|index| async move {
                    source
                        .fetch_page(kind, filters, &PageRequest::indexed(index))
                        .await
                        .map(|page| page.records)
                })
                .buffered(policy.concurrency.max(1))
                .collect()
                .await
        }
        Pagination::Cursor => {
            let mut pages = Vec::new();
            let mut cursor = None;
            for index in 0..ceiling {
                match source
                    .fetch_page(kind, filters, &PageRequest::after(index, cursor.take()))
                    .await
                {
                    Ok(page) => {
                        pages.push(Ok(page.records));
                        match page.next_cursor {
                            Some(next) => cursor = Some(next),
                            None => break,
                        }
                    }
                    Err(e) => {
                        // Without a cursor the walk cannot continue.
                        pages.push(Err(e));
                        break;
                    }
                }
            }
            pages
        }
        Pagination::Single => vec![source
            .fetch_page(kind, filters, &PageRequest::default())
            .await
            .map(|page| page.records)],
    };

    let requested = pages.len();
    let mut last_error: Option<SearchError> = None;
    let mut succeeded = 0;
    let mut records = Vec::new();

    for (index, page) in pages.into_iter().enumerate() {
        match page {
            Ok(page) => {
                succeeded += 1;
                records.extend(page);
            }
            Err(e) => {
                warn!(kind = %kind, page = index, error = %e, "Skipping failed page");
                last_error = Some(e);
            }
        }
    }

    let unreachable = if succeeded == 0 { last_error } else { None };
    if let Some(e) = &unreachable {
        warn!(kind = %kind, pages = requested, error = %e, "Every page failed");
    }

    let records: Vec<_> = records
        .into_iter()
        .unique_by(|r| r.id().to_string())
        .collect();

    debug!(
        kind = %kind,
        pages = requested,
        failed = requested - succeeded,
        records = records.len(),
        "Collected records"
    );
    Collected {
        records,
        unreachable,
    }
}

/// Collect records and build a fresh index over them.
///
/// Returns the upstream error when every page failed, so callers can serve an empty
/// result without caching it.
pub async fn build_index<S>(
    source: &S,
    kind: RecordKind,
    filters: &SearchFilters,
    policy: &PagePolicy,
    options: &FuzzyOptions,
) -> Result<FuzzyIndex>
where
    S: RecordSource + ?Sized,
{
    let collected = collect_records(source, kind, filters, policy).await;
    if let Some(e) = collected.unreachable {
        return Err(e);
    }
    let index = FuzzyIndex::build(collected.records, options.clone());
    info!(kind = %kind, records = index.len(), "Built search index");
    Ok(index)
}
