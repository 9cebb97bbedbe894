//! Direct-fetch fallback for identifier-shaped terms.
//!
//! A term that looks like a task id but is missing from the ranked results is looked up
//! directly. Hits are placed in front of the fuzzy results with a perfect score.

use std::sync::LazyLock;

use futures::future::join_all;
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, warn};

use super::traits::RecordSource;
use super::types::{RecordKind, ScoredMatch};

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6,9}$").unwrap());

pub fn looks_like_id(term: &str) -> bool {
    ID_PATTERN.is_match(term)
}

/// Identifier-shaped terms not already among `results`, compared case-insensitively.
pub fn candidate_ids(terms: &[String], results: &[ScoredMatch]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| looks_like_id(t))
        .filter(|t| {
            !results
                .iter()
                .any(|m| m.record.id().eq_ignore_ascii_case(t))
        })
        .unique_by(|t| t.to_ascii_lowercase())
        .map(str::to_string)
        .collect()
}

/// Merge direct lookups for identifier-shaped terms into `results`.
///
/// Lookups run concurrently. Misses and failures are dropped.
pub async fn apply<S>(
    source: &S,
    kind: RecordKind,
    terms: &[String],
    mut results: Vec<ScoredMatch>,
) -> Vec<ScoredMatch>
where
    S: RecordSource + ?Sized,
{
    if kind != RecordKind::Task {
        return results;
    }

    let candidates = candidate_ids(terms, &results);
    if candidates.is_empty() {
        return results;
    }

    let lookups = candidates.iter().map(|id| async move {
        match source.fetch_by_id(id).await {
            Ok(Some(record)) => Some(ScoredMatch {
                record,
                score: 0.0,
                matched_terms: vec![id.clone()],
            }),
            Ok(None) => {
                debug!(id = %id, "Direct lookup found nothing");
                None
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Direct lookup failed");
                None
            }
        }
    });

    let mut direct: Vec<ScoredMatch> = join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .unique_by(|m| m.record.id().to_string())
        .collect();

    // A lookup may resolve to a record the fuzzy pass already returned under another id.
    direct.retain(|d| !results.iter().any(|m| m.record.id() == d.record.id()));

    if !direct.is_empty() {
        debug!(count = direct.len(), "Merged direct lookups");
    }

    direct.append(&mut results);
    direct
}
