//! Search service tying index caching, ranking and direct lookups together.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use super::booster::{self, BoostOptions};
use super::cache::{IndexCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use super::fallback;
use super::fuzzy::{FuzzyIndex, FuzzyOptions};
use super::index::{build_index, PagePolicy};
use super::traits::{RecordSource, Result};
use super::types::{RecordKind, ScoredMatch, SearchFilters, SearchRequest};
use crate::domain::content::{self, ContentBlock, ImageBudget, ImageFetcher};

/// Configuration for the search service.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Results returned when a request sets no limit
    pub default_limit: usize,
    /// Upper bound for any requested limit
    pub max_limit: usize,
    pub fuzzy: FuzzyOptions,
    pub boost: BoostOptions,
    pub pages: PagePolicy,
    /// How long a built index is served before it is rebuilt
    pub cache_ttl: Duration,
    /// Filter combinations cached per record kind
    pub cache_capacity: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 200,
            fuzzy: FuzzyOptions::default(),
            boost: BoostOptions::default(),
            pages: PagePolicy::default(),
            cache_ttl: DEFAULT_TTL,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Search over tasks, documents and spaces with one index cache per kind.
///
/// # Type Parameters
///
/// * `S` - RecordSource implementation the indexes are built from
///
/// # Examples
///
/// ```ignore
/// let source = ClickUpRecordSource::new(client);
/// let service = SearchService::new(source, SearchConfig::default());
/// let results = service.search(&SearchRequest {
///     kind: RecordKind::Task,
///     terms: Some(vec!["login".into(), "bug".into()]),
///     ..Default::default()
/// }).await?;
/// ```
pub struct SearchService<S>
where
    S: RecordSource,
{
    source: Arc<S>,
    tasks: IndexCache<Arc<FuzzyIndex>>,
    documents: IndexCache<Arc<FuzzyIndex>>,
    spaces: IndexCache<Arc<FuzzyIndex>>,
    config: SearchConfig,
}

impl<S> SearchService<S>
where
    S: RecordSource,
{
    pub fn new(source: S, config: SearchConfig) -> Self {
        Self {
            source: Arc::new(source),
            tasks: IndexCache::with_capacity(config.cache_ttl, config.cache_capacity),
            documents: IndexCache::with_capacity(config.cache_ttl, config.cache_capacity),
            spaces: IndexCache::with_capacity(config.cache_ttl, config.cache_capacity),
            config,
        }
    }

    #[allow(dead_code)]
    pub fn with_defaults(source: S) -> Self {
        Self::new(source, SearchConfig::default())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn cache(&self, kind: RecordKind) -> &IndexCache<Arc<FuzzyIndex>> {
        match kind {
            RecordKind::Task => &self.tasks,
            RecordKind::Document => &self.documents,
            RecordKind::Space => &self.spaces,
        }
    }

    fn effective_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit.max(1))
    }

    /// The cached index for `kind` under `filters`, built on first use.
    ///
    /// When the upstream cannot be reached an empty index is returned and nothing is
    /// cached, so the next call tries again.
    pub async fn index(&self, kind: RecordKind, filters: &SearchFilters) -> Arc<FuzzyIndex> {
        let built = self
            .cache(kind)
            .get_or_build(filters.key(), async {
                build_index(
                    self.source.as_ref(),
                    kind,
                    filters,
                    &self.config.pages,
                    &self.config.fuzzy,
                )
                .await
                .map(Arc::new)
            })
            .await;

        match built {
            Ok(index) => index,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Index build failed, searching an empty index");
                Arc::new(FuzzyIndex::build(Vec::new(), self.config.fuzzy.clone()))
            }
        }
    }

    /// Execute a search.
    ///
    /// Without terms every indexed record is returned in index order with score 0.0.
    /// With terms, records are ranked by the booster and, for tasks, identifier-shaped
    /// terms missing from the ranking are looked up directly.
    ///
    /// # Returns
    ///
    /// Matches sorted best first (lower scores are better), at most `limit` of them.
    #[instrument(skip(self, request), fields(kind = %request.kind))]
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<ScoredMatch>> {
        let limit = self.effective_limit(request.limit);
        let index = self.index(request.kind, &request.filters).await;

        let mut results = match &request.terms {
            None => index
                .records()
                .iter()
                .map(|record| ScoredMatch {
                    record: record.clone(),
                    score: 0.0,
                    matched_terms: vec![],
                })
                .collect(),
            Some(terms) => {
                let ranked = booster::search(&index, terms, &self.config.boost);
                fallback::apply(self.source.as_ref(), request.kind, terms, ranked).await
            }
        };

        results.truncate(limit);
        info!(results = results.len(), indexed = index.len(), "Search complete");
        Ok(results)
    }

    /// Drop every cached index of `kind` so the next search sees fresh data.
    pub fn invalidate(&self, kind: RecordKind) {
        info!(kind = %kind, "Invalidating search indexes");
        self.cache(kind).invalidate_all();
    }

    /// A task rendered as text plus its images, resolved within `budget`.
    pub async fn task_content<F>(
        &self,
        task_id: &str,
        budget: &ImageBudget,
        fetcher: &F,
    ) -> Result<Vec<ContentBlock>>
    where
        F: ImageFetcher + ?Sized,
    {
        content::task_content(self.source.as_ref(), task_id, budget, fetcher).await
    }
}
