use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::{debug, error};

use super::{BucketKey, Granularity};
use crate::store::{PaymentStore, StoreError};

/// Per-bucket payment sums for records with `dt` in `[dt_from, dt_upto]`.
/// Buckets without records are absent. Issues exactly one read against `store`.
pub async fn fetch_partial_sums(
    store: &dyn PaymentStore,
    dt_from: NaiveDateTime,
    dt_upto: NaiveDateTime,
    granularity: Granularity,
) -> Result<BTreeMap<BucketKey, i64>, StoreError> {
    let sums = store
        .sum_by_bucket(dt_from, dt_upto, granularity)
        .await
        .inspect_err(|err| error!(error = %err, %granularity, "payment store query failed"))?;

    debug!(%granularity, buckets = sums.len(), "fetched partial sums");
    Ok(sums)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::store::{MemoryPaymentStore, PaymentRecord};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn record(value: i64, at: &str) -> PaymentRecord {
        PaymentRecord { value, dt: dt(at) }
    }

    struct BrokenStore;

    #[async_trait]
    impl PaymentStore for BrokenStore {
        async fn sum_by_bucket(
            &self,
            _dt_from: NaiveDateTime,
            _dt_upto: NaiveDateTime,
            _granularity: Granularity,
        ) -> Result<BTreeMap<BucketKey, i64>, StoreError> {
            Err(StoreError::MalformedRow("no _id".to_owned()))
        }
    }

    #[tokio::test]
    async fn returns_only_non_empty_buckets() {
        let store = MemoryPaymentStore::new(vec![
            record(50, "2022-02-01T00:15:00"),
            record(25, "2022-02-01T00:45:00"),
            record(100, "2022-02-01T02:30:00"),
        ]);

        let sums = fetch_partial_sums(
            &store,
            dt("2022-02-01T00:00:00"),
            dt("2022-02-01T02:59:59"),
            Granularity::Hour,
        )
        .await
        .unwrap();

        assert_eq!(
            sums,
            BTreeMap::from([
                ("2022-02-01T00:00:00".to_owned(), 75),
                ("2022-02-01T02:00:00".to_owned(), 100),
            ])
        );
        assert_eq!(store.queries(), 1);
    }

    #[tokio::test]
    async fn propagates_store_failures() {
        let err = fetch_partial_sums(
            &BrokenStore,
            dt("2022-02-01T00:00:00"),
            dt("2022-02-01T02:59:59"),
            Granularity::Day,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StoreError::MalformedRow(_)));
    }
}
