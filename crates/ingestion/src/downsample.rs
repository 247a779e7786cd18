//! Relevance filter and downsampler
//!
//! Keeps complete records with enough citations, ranks them by citation
//! count and truncates to a target size. Equal citation counts keep their
//! input order, so the output is a pure function of the input sequence.

use scholargraph_common::config::CleaningConfig;
use scholargraph_common::Record;
use std::cmp::Reverse;
use tracing::info;

/// Whether a record survives the relevance filter
pub fn is_relevant(record: &Record, min_citations: u64) -> bool {
    record.is_complete() && record.citations() >= min_citations
}

/// Filter, rank by citation count (descending, stable) and keep at most `target` records
pub fn clean_and_downsample(records: Vec<Record>, target: usize, min_citations: u64) -> Vec<Record> {
    let input = records.len();

    let mut kept: Vec<Record> = records
        .into_iter()
        .filter(|r| is_relevant(r, min_citations))
        .collect();

    info!(input, survivors = kept.len(), min_citations, "Filtered records");

    // sort_by_key is stable
    kept.sort_by_key(|r| Reverse(r.citations()));

    if kept.len() > target {
        kept.truncate(target);
        info!(kept = kept.len(), "Downsampled to top relevant records");
    }

    kept
}

/// [`clean_and_downsample`] with configured parameters
pub fn clean_with_config(records: Vec<Record>, config: &CleaningConfig) -> Vec<Record> {
    clean_and_downsample(records, config.target, config.min_citations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholargraph_common::config::DEFAULT_MIN_CITATIONS;

    fn record(id: &str, title: Option<&str>, year: Option<i32>, citations: Option<u64>) -> Record {
        Record {
            paper_id: id.to_string(),
            title: title.map(String::from),
            abstract_text: Some(format!("abstract of {}", id)),
            year,
            citation_count: citations,
            ..Default::default()
        }
    }

    fn complete(id: &str, citations: u64) -> Record {
        record(id, Some(id), Some(2020), Some(citations))
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.paper_id.as_str()).collect()
    }

    #[test]
    fn test_filter_and_threshold_example() {
        let mut b = record("2", None, Some(2019), Some(50));
        b.abstract_text = Some("y".into());
        let records = vec![
            record("1", Some("A"), Some(2020), Some(15)),
            b,
            record("3", Some("B"), Some(2021), Some(5)),
        ];

        let cleaned = clean_and_downsample(records, 10, DEFAULT_MIN_CITATIONS);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn test_missing_fields_are_excluded() {
        let mut no_abstract = complete("no-abstract", 100);
        no_abstract.abstract_text = None;
        let records = vec![
            no_abstract,
            record("no-year", Some("t"), None, Some(100)),
            record("no-title", None, Some(2020), Some(100)),
            complete("ok", 100),
        ];

        assert_eq!(ids(&clean_and_downsample(records, 10, 10)), vec!["ok"]);
    }

    #[test]
    fn test_missing_citation_count_counts_as_zero() {
        let records = vec![record("none", Some("t"), Some(2020), None), complete("ten", 10)];

        assert_eq!(ids(&clean_and_downsample(records.clone(), 10, 10)), vec!["ten"]);
        assert_eq!(ids(&clean_and_downsample(records, 10, 0)), vec!["ten", "none"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            complete("first", 20),
            complete("top", 99),
            complete("second", 20),
            complete("third", 20),
        ];

        let cleaned = clean_and_downsample(records, 10, 10);

        assert_eq!(ids(&cleaned), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_tie_order_follows_input_permutation() {
        let forward = vec![complete("x", 30), complete("y", 30), complete("z", 40)];
        let swapped = vec![complete("y", 30), complete("z", 40), complete("x", 30)];

        assert_eq!(ids(&clean_and_downsample(forward, 10, 10)), vec!["z", "x", "y"]);
        assert_eq!(ids(&clean_and_downsample(swapped, 10, 10)), vec!["z", "y", "x"]);
    }

    #[test]
    fn test_output_length_is_min_of_survivors_and_target() {
        let records: Vec<Record> = (0..8).map(|i| complete(&i.to_string(), 10 + i)).collect();

        assert_eq!(clean_and_downsample(records.clone(), 3, 10).len(), 3);
        assert_eq!(clean_and_downsample(records.clone(), 8, 10).len(), 8);
        assert_eq!(clean_and_downsample(records.clone(), 100, 10).len(), 8);
        assert_eq!(clean_and_downsample(records, 0, 10).len(), 0);
    }

    #[test]
    fn test_truncation_keeps_highest_cited() {
        let records = vec![complete("low", 11), complete("high", 500), complete("mid", 50)];

        assert_eq!(ids(&clean_and_downsample(records, 2, 10)), vec!["high", "mid"]);
    }

    #[test]
    fn test_is_deterministic() {
        let records: Vec<Record> = (0..20).map(|i| complete(&i.to_string(), 10 + (i % 4))).collect();

        assert_eq!(
            clean_and_downsample(records.clone(), 7, 10),
            clean_and_downsample(records, 7, 10)
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(clean_and_downsample(Vec::new(), 500, 10).is_empty());
    }

    #[test]
    fn test_clean_with_config() {
        let config = CleaningConfig {
            min_citations: 100,
            target: 1,
        };
        let records = vec![complete("a", 150), complete("b", 200), complete("c", 99)];

        assert_eq!(ids(&clean_with_config(records, &config)), vec!["b"]);
    }
}
