//! Fuzzy search over ClickUp tasks, documents and spaces.
//!
//! Indexes are built in memory from the upstream API on first use and cached per filter
//! combination for a short, fixed window.
//!
//! # Architecture
//!
//! - [`FuzzyIndex`] - typo-tolerant, field-weighted matching of single terms
//! - [`booster`] - multi-term ranking that rewards records matching more terms
//! - [`IndexCache`] - keyed cache sharing in-flight builds between callers
//! - [`RecordSource`] - paginated data access (ClickUp API, mocks)
//! - [`fallback`] - direct lookups for terms shaped like task ids
//!
//! # Example
//!
//! ```ignore
//! use clickup_agent::domain::search::{ClickUpRecordSource, SearchConfig, SearchService};
//!
//! let service = SearchService::new(ClickUpRecordSource::new(client), SearchConfig::default());
//! let results = service.search(&SearchRequest {
//!     kind: RecordKind::Task,
//!     terms: Some(vec!["login".into(), "86b1abc2x".into()]),
//!     ..Default::default()
//! }).await?;
//! println!("{}", format_results(&request, &results));
//! ```

pub mod booster;
mod cache;
pub mod fallback;
mod format;
mod fuzzy;
mod index;
mod service;
mod traits;
mod types;

pub mod source;

pub use booster::BoostOptions;
pub use cache::{IndexCache, DEFAULT_TTL};
pub use format::{format_results, format_task};
pub use fuzzy::{FuzzyIndex, FuzzyOptions, IndexHit};
pub use index::{build_index, collect_records, Collected, PagePolicy};
pub use service::{SearchConfig, SearchService};
pub use source::ClickUpRecordSource;
pub use traits::{RecordSource, Result, SearchError};
pub use types::{
    FilterKey, IndexedRecord, PageRequest, Pagination, RecordKind, RecordPage, ScoredMatch,
    SearchField, SearchFilters, SearchRequest,
};

#[cfg(test)]
pub(crate) use types::fixtures;
