use std::collections::{BTreeMap, HashSet};

use derive_new::new;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::model::{Candidate, RawRecord, MIN_BODY_CHARS};

/// How the filtered corpus is narrowed down to the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Highest popularity first, ties keep source order.
    Rank,
    /// Deterministic shuffle seeded with `seed`.
    Sample { seed: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Selector {
    pub policy: Policy,
    pub target: usize,
    #[new(default)]
    pub min_score: Option<u64>,
}

/// Why a record did not make it into the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    MissingTitle,
    MissingBody,
    BodyTooShort,
    Duplicate,
    BelowMinScore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    pub seen: usize,
    pub accepted: usize,
    pub selected: usize,
    pub rejected: BTreeMap<Rejection, usize>,
    pub score_range: Option<(u64, u64)>,
}

impl SelectionSummary {
    pub fn reject(&mut self, reason: Rejection) {
        *self.rejected.entry(reason).or_default() += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub candidates: Vec<Candidate>,
    pub summary: SelectionSummary,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Validate a single raw record.
pub fn validate(record: RawRecord) -> Result<Candidate, Rejection> {
    let popularity = record.popularity();

    let title = record.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(Rejection::MissingTitle);
    }

    let body = record.body.as_deref().map(str::trim).unwrap_or_default();
    if body.is_empty() {
        return Err(Rejection::MissingBody);
    }
    if body.chars().count() < MIN_BODY_CHARS {
        return Err(Rejection::BodyTooShort);
    }

    let top_comment = record
        .top_comment
        .as_deref()
        .map(str::trim)
        .filter(|comment| !comment.is_empty())
        .map(str::to_owned);

    Ok(Candidate::new(
        title.to_owned(),
        body.to_owned(),
        popularity,
        top_comment,
    ))
}

impl Selector {
    /// Filter, dedupe and narrow `records` down to at most `target` candidates.
    ///
    /// An empty result is not an error, callers decide what to do with it.
    pub fn select(&self, records: impl IntoIterator<Item = RawRecord>) -> Selection {
        let mut summary = SelectionSummary::default();
        let mut seen = HashSet::new();
        let mut pool = Vec::new();

        for record in records {
            summary.seen += 1;

            let candidate = match validate(record) {
                Ok(candidate) => candidate,
                Err(reason) => {
                    summary.reject(reason);
                    continue;
                }
            };

            if self
                .min_score
                .is_some_and(|min| candidate.popularity < min)
            {
                summary.reject(Rejection::BelowMinScore);
                continue;
            }

            if !seen.insert((candidate.title.clone(), candidate.body.clone())) {
                summary.reject(Rejection::Duplicate);
                continue;
            }

            pool.push(candidate);
        }

        summary.accepted = pool.len();

        match self.policy {
            // stable sort keeps source order between equal scores
            Policy::Rank => pool.sort_by(|a, b| b.popularity.cmp(&a.popularity)),
            Policy::Sample { seed } => pool.shuffle(&mut StdRng::seed_from_u64(seed)),
        }
        pool.truncate(self.target);

        summary.selected = pool.len();
        summary.score_range = score_range(&pool);

        tracing::info!(
            seen = summary.seen,
            accepted = summary.accepted,
            selected = summary.selected,
            rejected = ?summary.rejected,
            "selected candidates"
        );

        Selection {
            candidates: pool,
            summary,
        }
    }
}

fn score_range(pool: &[Candidate]) -> Option<(u64, u64)> {
    let min = pool.iter().map(|c| c.popularity).min()?;
    let max = pool.iter().map(|c| c.popularity).max()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(tag: &str) -> String {
        format!("{tag} {}", "lorem ipsum ".repeat(12))
    }

    fn record(title: &str, body: &str, score: Option<i64>) -> RawRecord {
        RawRecord::new(Some(title.into()), Some(body.into()), score, None)
    }

    fn corpus() -> Vec<RawRecord> {
        (0..50)
            .map(|i| {
                let score = (i * 37 % 11) as i64 * 100;
                record(&format!("story {i}"), &body(&i.to_string()), Some(score))
            })
            .collect()
    }

    #[test]
    fn short_body_is_dropped() {
        let selector = Selector::new(Policy::Rank, 10);
        let selection = selector.select(vec![record("X", &"a".repeat(40), Some(100))]);

        assert!(selection.is_empty());
        assert_eq!(selection.summary.rejected[&Rejection::BodyTooShort], 1);
    }

    #[test]
    fn body_length_is_measured_after_trimming() {
        let padded = format!("   {}   ", "b".repeat(MIN_BODY_CHARS - 1));
        assert_eq!(validate(record("t", &padded, None)), Err(Rejection::BodyTooShort));

        let exact = "b".repeat(MIN_BODY_CHARS);
        assert!(validate(record("t", &exact, None)).is_ok());
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_eq!(validate(record("   ", &body("x"), None)), Err(Rejection::MissingTitle));
        assert_eq!(validate(record("t", "  \n ", None)), Err(Rejection::MissingBody));
        assert_eq!(validate(RawRecord::default()), Err(Rejection::MissingTitle));
    }

    #[test]
    fn fields_are_trimmed_and_score_coerced() {
        let raw = RawRecord::new(
            Some("  A title \n".into()),
            Some(format!("\t{}  ", body("x"))),
            Some(-40),
            Some("   ".into()),
        );

        let candidate = validate(raw).unwrap();
        assert_eq!(candidate.title, "A title");
        assert_eq!(candidate.body, body("x").trim());
        assert_eq!(candidate.popularity, 0);
        assert_eq!(candidate.top_comment, None);
    }

    #[test]
    fn rank_orders_by_score_with_stable_ties() {
        let records = vec![
            record("a", &body("a"), Some(5)),
            record("b", &body("b"), Some(90)),
            record("c", &body("c"), None),
            record("d", &body("d"), Some(90)),
            record("e", &body("e"), Some(20)),
        ];

        let selection = Selector::new(Policy::Rank, 4).select(records);
        let titles: Vec<_> = selection.candidates.iter().map(|c| c.title.as_str()).collect();

        assert_eq!(titles, vec!["b", "d", "e", "a"]);
        assert_eq!(selection.summary.score_range, Some((5, 90)));
    }

    #[test]
    fn rank_output_is_already_sorted() {
        let selection = Selector::new(Policy::Rank, 30).select(corpus());

        let mut resorted = selection.candidates.clone();
        resorted.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        assert_eq!(resorted, selection.candidates);
    }

    #[test]
    fn sample_is_reproducible() {
        let selector = Selector::new(Policy::Sample { seed: 42 }, 20);

        let first = selector.select(corpus());
        let second = selector.select(corpus());
        assert_eq!(first, second);
        assert_eq!(first.candidates.len(), 20);

        let other = Selector::new(Policy::Sample { seed: 43 }, 20).select(corpus());
        assert_ne!(first.candidates, other.candidates);
    }

    #[test]
    fn min_score_filters_before_sampling() {
        let selector = Selector {
            min_score: Some(500),
            ..Selector::new(Policy::Sample { seed: 1 }, 100)
        };

        let selection = selector.select(corpus());
        assert!(!selection.is_empty());
        assert!(selection.candidates.iter().all(|c| c.popularity >= 500));
        assert_eq!(
            selection.summary.selected + selection.summary.rejected[&Rejection::BelowMinScore],
            50
        );
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let records = vec![
            record("same", &body("1"), Some(1)),
            record(" same ", &format!("{}\n", body("1")), Some(999)),
            record("same", &body("2"), Some(2)),
        ];

        let selection = Selector::new(Policy::Rank, 10).select(records);
        let scores: Vec<_> = selection.candidates.iter().map(|c| c.popularity).collect();

        assert_eq!(scores, vec![2, 1]);
        assert_eq!(selection.summary.rejected[&Rejection::Duplicate], 1);
    }

    #[test]
    fn nothing_valid_gives_empty_selection() {
        let records = vec![record("", "", None), record("x", "short", Some(10))];

        let selection = Selector::new(Policy::Sample { seed: 9 }, 10).select(records);
        assert!(selection.is_empty());
        assert_eq!(selection.summary.seen, 2);
        assert_eq!(selection.summary.score_range, None);
    }
}
