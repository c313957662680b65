use std::collections::BTreeMap;

use super::{BucketKey, Series};

/// Lines up the sparse per-bucket sums against the full, ordered label list.
/// Buckets missing from `partial_sums` are zero-filled; keys not present in
/// `labels` are dropped.
pub fn merge(labels: Vec<BucketKey>, partial_sums: &BTreeMap<BucketKey, i64>) -> Series {
    let dataset = labels
        .iter()
        .map(|label| partial_sums.get(label).copied().unwrap_or(0))
        .collect();

    Series { dataset, labels }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<BucketKey> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn zero_fills_and_preserves_order() {
        let partial_sums = BTreeMap::from([
            ("2022-10-03T00:00:00".to_owned(), 300),
            ("2022-10-01T00:00:00".to_owned(), 100),
        ]);

        let series = merge(
            labels(&[
                "2022-10-01T00:00:00",
                "2022-10-02T00:00:00",
                "2022-10-03T00:00:00",
                "2022-10-04T00:00:00",
            ]),
            &partial_sums,
        );

        assert_eq!(series.dataset, vec![100, 0, 300, 0]);
        assert_eq!(series.labels[1], "2022-10-02T00:00:00");
        assert_eq!(series.dataset.len(), series.labels.len());
    }

    #[test]
    fn ignores_sums_for_unknown_labels() {
        let partial_sums = BTreeMap::from([("1999-01-01T00:00:00".to_owned(), 9)]);
        let series = merge(labels(&["2022-10-01T00:00:00"]), &partial_sums);
        assert_eq!(series.dataset, vec![0]);
    }

    #[test]
    fn empty_labels_give_empty_series() {
        let partial_sums = BTreeMap::from([("2022-10-01T00:00:00".to_owned(), 1)]);
        assert!(merge(Vec::new(), &partial_sums).is_empty());
    }
}
