//! Fuzzy index engine: weighted, typo-tolerant term lookup over record fields.
//!
//! Each field is matched by approximate substring search: the score of a field is the
//! smallest edit distance between the term and any substring of the field, divided by the
//! term length. A field matches when that ratio is within [`FuzzyOptions::threshold`].
//! Matched fields combine multiplicatively, each raised to its relative weight, so a hit
//! in a heavy field (the name) pulls the record score toward 0 harder than a hit in a
//! light one (the parent container).

use super::types::IndexedRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyOptions {
    /// Maximum normalized edit distance (0.0 exact .. 1.0 anything) a field may have.
    pub threshold: f64,
    /// Terms shorter than this many characters never match.
    pub min_match_len: usize,
    /// Fields are indexed up to this many characters. Text past it never matches.
    pub max_field_chars: usize,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            min_match_len: 2,
            max_field_chars: 2_000,
        }
    }
}

/// A single-term match against an indexed record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    /// Position of the record in the index, which is also its fetch order.
    pub position: usize,
    /// Normalized score, 0.0 exact and 1.0 weakest.
    pub score: f64,
}

#[derive(Debug)]
struct IndexedField {
    /// Weight relative to the heaviest field in the index, in (0, 1].
    weight: f64,
    text: String,
    chars: Vec<char>,
}

/// Immutable searchable index over one record set. Refreshing means building a new one.
#[derive(Debug)]
pub struct FuzzyIndex {
    records: Vec<IndexedRecord>,
    fields: Vec<Vec<IndexedField>>,
    options: FuzzyOptions,
}

impl FuzzyIndex {
    pub fn build(records: Vec<IndexedRecord>, options: FuzzyOptions) -> Self {
        let projected: Vec<_> = records.iter().map(IndexedRecord::search_fields).collect();
        let max_weight = projected
            .iter()
            .flatten()
            .map(|f| f.weight)
            .fold(0.0_f64, f64::max);
        let max_weight = if max_weight > 0.0 { max_weight } else { 1.0 };

        let fields = projected
            .into_iter()
            .map(|record_fields| {
                record_fields
                    .into_iter()
                    .map(|field| {
                        let text: String = field
                            .text
                            .to_lowercase()
                            .chars()
                            .take(options.max_field_chars)
                            .collect();
                        IndexedField {
                            weight: field.weight / max_weight,
                            chars: text.chars().collect(),
                            text,
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            records,
            fields,
            options,
        }
    }

    pub fn empty() -> Self {
        Self::build(Vec::new(), FuzzyOptions::default())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[IndexedRecord] {
        &self.records
    }

    pub fn record(&self, position: usize) -> Option<&IndexedRecord> {
        self.records.get(position)
    }

    /// Look up a single term. Hits are sorted best first, ties in index order.
    pub fn search(&self, term: &str) -> Vec<IndexHit> {
        let term = term.trim().to_lowercase();
        let pattern: Vec<char> = term.chars().collect();
        if pattern.len() < self.options.min_match_len.max(1) {
            return Vec::new();
        }

        let term_len = pattern.len() as f64;
        let max_distance = (self.options.threshold * term_len).floor() as usize;

        let mut hits: Vec<IndexHit> = self
            .fields
            .iter()
            .enumerate()
            .filter_map(|(position, fields)| {
                let mut combined = 1.0_f64;
                let mut matched = false;

                for field in fields {
                    let Some(distance) = field_distance(&term, &pattern, field, max_distance)
                    else {
                        continue;
                    };
                    let score = distance as f64 / term_len;
                    combined *= score.max(f64::EPSILON).powf(field.weight);
                    matched = true;
                }

                matched.then_some(IndexHit {
                    position,
                    score: combined.clamp(0.0, 1.0),
                })
            })
            .collect();

        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits
    }
}

fn field_distance(
    term: &str,
    pattern: &[char],
    field: &IndexedField,
    max_distance: usize,
) -> Option<usize> {
    if field.text.contains(term) {
        return Some(0);
    }
    // A substring needs at least `len - max` characters to be within reach.
    if field.chars.len() + max_distance < pattern.len() {
        return None;
    }
    substring_distance(pattern, &field.chars, max_distance)
}

/// Smallest edit distance between `pattern` and any substring of `text`, if within `max`.
///
/// Semi-global Levenshtein: the first row is all zeros so a match may start anywhere in
/// `text`, and the minimum of the last row lets it end anywhere.
fn substring_distance(pattern: &[char], text: &[char], max: usize) -> Option<usize> {
    let m = pattern.len();
    if m == 0 {
        return Some(0);
    }

    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr: Vec<usize> = vec![0; m + 1];
    let mut best = m;

    for &tc in text {
        curr[0] = 0;
        for i in 1..=m {
            let cost = usize::from(pattern[i - 1] != tc);
            curr[i] = (prev[i - 1] + cost).min(prev[i] + 1).min(curr[i - 1] + 1);
        }
        best = best.min(curr[m]);
        if best == 0 {
            break;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best <= max).then_some(best)
}
