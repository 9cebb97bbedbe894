//! Trait definitions for search domain abstractions.
//!
//! These traits enable dependency injection and easy testing through mocking.

use std::sync::Arc;

use async_trait::async_trait;
use clickup::ClickUpFetchError;

use super::types::{IndexedRecord, PageRequest, RecordKind, RecordPage, SearchFilters};

/// Error type for search operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("Unauthorized against the upstream API")]
    Unauthorized,

    #[error("Source fetch error: {0}")]
    SourceError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index build failed: {0}")]
    BuildError(Arc<SearchError>),
}

impl SearchError {
    /// Whether the root cause is a credential problem rather than a transient failure.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            SearchError::Unauthorized => true,
            SearchError::BuildError(inner) => inner.is_unauthorized(),
            _ => false,
        }
    }
}

impl From<ClickUpFetchError> for SearchError {
    fn from(e: ClickUpFetchError) -> Self {
        match e {
            ClickUpFetchError::Unauthorized => SearchError::Unauthorized,
            other => SearchError::SourceError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Paginated access to the remote collections an index is built from.
///
/// Abstracts the upstream API for testing without real network requests.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of `kind` records matching `filters`.
    async fn fetch_page(
        &self,
        kind: RecordKind,
        filters: &SearchFilters,
        page: &PageRequest,
    ) -> Result<RecordPage>;

    /// Point lookup of a task by id. Returns `None` when the upstream does not know it.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<IndexedRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_source_object_safe(_: &dyn RecordSource) {}

    #[test]
    fn unauthorized_is_seen_through_build_errors() {
        let err = SearchError::BuildError(Arc::new(SearchError::Unauthorized));
        assert!(err.is_unauthorized());
        assert!(!SearchError::SourceError("timeout".to_string()).is_unauthorized());
    }

    #[test]
    fn fetch_errors_map_to_search_errors() {
        assert!(matches!(
            SearchError::from(ClickUpFetchError::Unauthorized),
            SearchError::Unauthorized
        ));
        assert!(matches!(
            SearchError::from(ClickUpFetchError::RateLimited),
            SearchError::SourceError(_)
        ));
    }
}
