use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::{PaymentRecord, PaymentStore, StoreError};
use crate::aggregation::{BucketKey, Granularity};

/// Fixed set of records held in memory. Answers the same query contract as
/// the MongoDB store and counts how many queries it has served.
#[derive(Debug, Default)]
pub struct MemoryPaymentStore {
    records: Vec<PaymentRecord>,
    queries: AtomicUsize,
}

impl MemoryPaymentStore {
    pub fn new(records: Vec<PaymentRecord>) -> Self {
        Self {
            records,
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of `sum_by_bucket` calls served so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl FromIterator<PaymentRecord> for MemoryPaymentStore {
    fn from_iter<I: IntoIterator<Item = PaymentRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn sum_by_bucket(
        &self,
        dt_from: NaiveDateTime,
        dt_upto: NaiveDateTime,
        granularity: Granularity,
    ) -> Result<BTreeMap<BucketKey, i64>, StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let mut sums: BTreeMap<BucketKey, i64> = BTreeMap::new();
        for record in self
            .records
            .iter()
            .filter(|r| r.dt >= dt_from && r.dt <= dt_upto)
        {
            let sum = sums.entry(granularity.label(record.dt)).or_default();
            *sum = sum.saturating_add(record.value);
        }
        Ok(sums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").unwrap()
    }

    #[tokio::test]
    async fn groups_and_sums_within_closed_range() {
        let store: MemoryPaymentStore = [
            ("2022-09-10T10:00:00", 1000),
            ("2022-09-20T12:00:00", 1500),
            ("2022-10-05T15:00:00", 2000),
            ("2022-11-30T23:59:59.500", 500),
        ]
        .into_iter()
        .map(|(at, value)| PaymentRecord { value, dt: dt(at) })
        .collect();

        let sums = store
            .sum_by_bucket(
                dt("2022-09-10T10:00:00"),
                dt("2022-11-30T23:59:59.500"),
                Granularity::Month,
            )
            .await
            .unwrap();

        assert_eq!(sums["2022-09-01T00:00:00"], 2500);
        assert_eq!(sums["2022-10-01T00:00:00"], 2000);
        assert_eq!(sums["2022-11-01T00:00:00"], 500);
    }

    #[tokio::test]
    async fn sums_saturate_instead_of_overflowing() {
        let store: MemoryPaymentStore = [i64::MAX, 1, i64::MAX]
            .into_iter()
            .map(|value| PaymentRecord {
                value,
                dt: dt("2022-10-01T01:00:00"),
            })
            .collect();

        let sums = store
            .sum_by_bucket(
                dt("2022-10-01T00:00:00"),
                dt("2022-10-01T23:59:59"),
                Granularity::Day,
            )
            .await
            .unwrap();

        assert_eq!(sums["2022-10-01T00:00:00"], i64::MAX);
    }

    #[tokio::test]
    async fn keys_come_back_in_ascending_order() {
        let store: MemoryPaymentStore = ["2022-10-03T01:00:00", "2022-10-01T01:00:00"]
            .into_iter()
            .map(|at| PaymentRecord {
                value: 1,
                dt: dt(at),
            })
            .collect();

        let sums = store
            .sum_by_bucket(
                dt("2022-10-01T00:00:00"),
                dt("2022-10-31T00:00:00"),
                Granularity::Day,
            )
            .await
            .unwrap();

        let keys: Vec<_> = sums.keys().cloned().collect();
        assert_eq!(keys, vec!["2022-10-01T00:00:00", "2022-10-03T00:00:00"]);
    }
}
