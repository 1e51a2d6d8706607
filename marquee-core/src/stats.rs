use std::collections::{BTreeMap, HashMap};

use marquee_model::{MovieRecord, Summary};

use crate::store::Snapshot;

/// Aggregates over a loaded snapshot: mean runtime and the modal rating set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsEngine;

impl StatisticsEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, snapshot: &Snapshot) -> Summary {
        self.summarize_records(snapshot.records())
    }

    pub fn summarize_records(&self, records: &[MovieRecord]) -> Summary {
        let (average_length, measured_records) = average_length(records);
        let (modal_ratings, modal_count) = modal_ratings(records);

        Summary {
            average_length,
            modal_ratings,
            modal_count,
            total_records: records.len(),
            measured_records,
        }
    }

    /// Occurrences of every rating, fallbacks included.
    pub fn rating_counts(&self, records: &[MovieRecord]) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(record.rating.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Records carrying a real rating rather than a fallback sentinel.
    pub fn rated_count(&self, records: &[MovieRecord]) -> usize {
        records.iter().filter(|record| record.is_rated()).count()
    }
}

/// Mean of the known lengths, rounded half-up, and how many lengths were known.
fn average_length(records: &[MovieRecord]) -> (u32, usize) {
    let lengths: Vec<u64> = records
        .iter()
        .filter_map(|record| record.length_minutes)
        .map(u64::from)
        .collect();

    if lengths.is_empty() {
        return (0, 0);
    }

    let n = lengths.len() as u64;
    let sum: u64 = lengths.iter().sum();
    // floor(sum / n + 1/2) without leaving integers
    let rounded = (2 * sum + n) / (2 * n);
    (u32::try_from(rounded).unwrap_or(u32::MAX), lengths.len())
}

fn modal_ratings(records: &[MovieRecord]) -> (Vec<String>, usize) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.rating.as_str()).or_insert(0) += 1;
    }

    let Some(max) = counts.values().copied().max() else {
        return (Vec::new(), 0);
    };

    let mut tied: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(rating, _)| rating.to_string())
        .collect();
    tied.sort();
    (tied, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_model::NOT_RATED;

    fn records(entries: &[(&str, Option<u32>)]) -> Vec<MovieRecord> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (rating, length))| {
                MovieRecord::new(format!("Movie {i}"), "Drama", *rating, *length)
            })
            .collect()
    }

    fn summarize(entries: &[(&str, Option<u32>)]) -> Summary {
        StatisticsEngine::new().summarize_records(&records(entries))
    }

    #[test]
    fn empty_input_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.average_length, 0);
        assert!(summary.modal_ratings.is_empty());
        assert_eq!(summary.modal_count, 0);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.measured_records, 0);
    }

    #[test]
    fn single_modal_rating() {
        let summary = summarize(&[("PG", None), ("PG", None), ("R", None)]);
        assert_eq!(summary.modal_ratings, ["PG"]);
        assert_eq!(summary.modal_count, 2);
    }

    #[test]
    fn tied_ratings_are_all_reported_sorted() {
        let summary = summarize(&[("R", None), ("PG", None)]);
        assert_eq!(summary.modal_ratings, ["PG", "R"]);
        assert_eq!(summary.modal_count, 1);
        assert!(summary.is_tied());
    }

    #[test]
    fn fallback_ratings_count_as_real_values() {
        let summary = summarize(&[(NOT_RATED, None), (NOT_RATED, None), ("G", None)]);
        assert_eq!(summary.modal_ratings, [NOT_RATED]);
    }

    #[test]
    fn average_rounds_half_up() {
        assert_eq!(summarize(&[("PG", Some(100)), ("PG", Some(101))]).average_length, 101);
        assert_eq!(
            summarize(&[("PG", Some(100)), ("PG", Some(100)), ("PG", Some(101))]).average_length,
            100
        );
        assert_eq!(
            summarize(&[("PG", Some(100)), ("PG", Some(101)), ("PG", Some(101))]).average_length,
            101
        );
    }

    #[test]
    fn absent_lengths_do_not_drag_the_average() {
        let summary = summarize(&[("PG", Some(120)), ("R", None), ("R", Some(90))]);
        assert_eq!(summary.average_length, 105);
        assert_eq!(summary.measured_records, 2);
        assert_eq!(summary.total_records, 3);
    }

    #[test]
    fn no_known_lengths_reports_zero_with_no_measurements() {
        let summary = summarize(&[("PG", None)]);
        assert_eq!(summary.average_length, 0);
        assert_eq!(summary.measured_records, 0);
        assert_eq!(summary.total_records, 1);
    }

    #[test]
    fn rated_count_skips_sentinels() {
        use marquee_model::{NO_RATING, UNKNOWN_RATING};

        let records = records(&[
            ("PG", None),
            (NOT_RATED, None),
            (NO_RATING, None),
            (UNKNOWN_RATING, None),
            ("R", None),
        ]);
        assert_eq!(StatisticsEngine::new().rated_count(&records), 2);
    }

    #[test]
    fn rating_counts_are_sorted_by_label() {
        let counts = StatisticsEngine::new()
            .rating_counts(&records(&[("R", None), ("G", None), ("R", None)]));
        let pairs: Vec<_> = counts.into_iter().collect();
        assert_eq!(pairs, [("G".to_string(), 1), ("R".to_string(), 2)]);
    }
}
