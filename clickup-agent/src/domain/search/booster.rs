//! Multi-term relevance booster.
//!
//! Runs every term through the fuzzy index and rewards records that match more of the
//! supplied terms: `final = best * base ^ (matched / total * scale)`. Lower is better.

use std::collections::BTreeMap;

use itertools::Itertools;

use super::fuzzy::{FuzzyIndex, IndexHit};
use super::types::ScoredMatch;

/// Shape of the boost curve. The defaults reward full agreement by four orders of magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostOptions {
    pub base: f64,
    pub exponent_scale: f64,
}

impl Default for BoostOptions {
    fn default() -> Self {
        Self {
            base: 0.1,
            exponent_scale: 4.0,
        }
    }
}

impl BoostOptions {
    pub fn factor(&self, match_ratio: f64) -> f64 {
        self.base.powf(match_ratio * self.exponent_scale)
    }
}

/// Trimmed, non-blank terms with case-insensitive duplicates removed, first spelling kept.
pub fn valid_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .unique_by(|t| t.to_lowercase())
        .map(str::to_string)
        .collect()
}

/// A boosted hit before it is joined back to its record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RankedHit {
    pub position: usize,
    pub score: f64,
    pub matched_terms: Vec<String>,
}

/// Rank all records matched by at least one term, best first.
pub fn search(index: &FuzzyIndex, terms: &[String], options: &BoostOptions) -> Vec<ScoredMatch> {
    let terms = valid_terms(terms);
    if terms.is_empty() {
        return Vec::new();
    }

    let per_term = terms
        .iter()
        .map(|term| (term.clone(), index.search(term)))
        .collect();

    rank_hits(per_term, terms.len(), options)
        .into_iter()
        .filter_map(|hit| {
            index.record(hit.position).map(|record| ScoredMatch {
                record: record.clone(),
                score: hit.score,
                matched_terms: hit.matched_terms,
            })
        })
        .collect()
}

/// Aggregate per-term hits into boosted scores. Ties keep index order.
pub(crate) fn rank_hits(
    per_term: Vec<(String, Vec<IndexHit>)>,
    total_terms: usize,
    options: &BoostOptions,
) -> Vec<RankedHit> {
    if total_terms == 0 {
        return Vec::new();
    }

    // position -> (best score, matched terms)
    let mut by_record: BTreeMap<usize, (f64, Vec<String>)> = BTreeMap::new();
    for (term, hits) in per_term {
        for hit in hits {
            let entry = by_record
                .entry(hit.position)
                .or_insert((f64::INFINITY, Vec::new()));
            entry.0 = entry.0.min(hit.score);
            if !entry.1.contains(&term) {
                entry.1.push(term.clone());
            }
        }
    }

    let mut ranked: Vec<RankedHit> = by_record
        .into_iter()
        .map(|(position, (best, matched_terms))| {
            let ratio = matched_terms.len() as f64 / total_terms as f64;
            RankedHit {
                position,
                score: best * options.factor(ratio),
                matched_terms,
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::fuzzy::FuzzyOptions;
    use crate::domain::search::types::fixtures::task_record;

    fn hit(position: usize, score: f64) -> IndexHit {
        IndexHit { position, score }
    }

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_and_duplicate_terms_are_dropped() {
        assert_eq!(
            valid_terms(&terms(&["  Bug ", "", "bug", "fix", "   "])),
            terms(&["Bug", "fix"])
        );
    }

    #[test]
    fn no_valid_terms_returns_empty() {
        let index = FuzzyIndex::build(vec![task_record("t1", "bug")], FuzzyOptions::default());
        assert!(search(&index, &terms(&["", "  "]), &BoostOptions::default()).is_empty());
    }

    #[test]
    fn records_matching_all_terms_outrank_partial_matches() {
        // X matches "bug" only at 0.3, Y matches "fix" only at 0.2, Z matches both.
        let per_term = vec![
            ("bug".to_string(), vec![hit(2, 0.35), hit(0, 0.3)]),
            ("fix".to_string(), vec![hit(1, 0.2), hit(2, 0.25)]),
        ];

        let ranked = rank_hits(per_term, 2, &BoostOptions::default());
        let order: Vec<_> = ranked.iter().map(|h| h.position).collect();
        assert_eq!(order, vec![2, 1, 0]);

        assert!((ranked[0].score - 0.25 * 1e-4).abs() < 1e-12);
        assert!((ranked[1].score - 0.2 * 1e-2).abs() < 1e-12);
        assert!((ranked[2].score - 0.3 * 1e-2).abs() < 1e-12);
        assert_eq!(ranked[0].matched_terms, terms(&["bug", "fix"]));
    }

    #[test]
    fn full_agreement_never_scores_worse_than_single_match() {
        let options = BoostOptions::default();
        for k in 2..6 {
            for raw in [0.0, 0.05, 0.2, 0.4, 1.0] {
                let all: Vec<_> = (0..k)
                    .map(|t| (format!("t{t}"), vec![hit(0, raw)]))
                    .chain(std::iter::once(("t0".to_string(), vec![hit(1, raw)])))
                    .collect();
                let ranked = rank_hits(all, k, &options);
                let full = ranked.iter().find(|h| h.position == 0).unwrap();
                let single = ranked.iter().find(|h| h.position == 1).unwrap();
                assert!(full.score <= single.score, "k={k} raw={raw}");
            }
        }
    }

    #[test]
    fn ties_keep_index_order() {
        let per_term = vec![("a".to_string(), vec![hit(3, 0.1), hit(1, 0.1), hit(2, 0.1)])];
        let ranked = rank_hits(per_term, 1, &BoostOptions::default());
        let order: Vec<_> = ranked.iter().map(|h| h.position).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn search_joins_records_and_matched_terms() {
        let index = FuzzyIndex::build(
            vec![
                task_record("t1", "Fix login bug"),
                task_record("t2", "Login page"),
                task_record("t3", "Quarterly report"),
            ],
            FuzzyOptions::default(),
        );

        let results = search(&index, &terms(&["login", "bug"]), &BoostOptions::default());
        let ids: Vec<_> = results.iter().map(|m| m.record.id()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(results[0].matched_terms, terms(&["login", "bug"]));
        assert_eq!(results[1].matched_terms, terms(&["login"]));
    }
}
