//! Read access to stored payment records.

mod memory;
mod mongo;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregation::{BucketKey, Granularity};

pub use memory::MemoryPaymentStore;
pub use mongo::MongoPaymentStore;

/// One stored payment. `dt` is naive local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub value: i64,
    pub dt: NaiveDateTime,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("payment store unavailable: {0}")]
    Unavailable(#[from] mongodb::error::Error),

    #[error("malformed aggregation row: {0}")]
    MalformedRow(String),
}

/// A source of payment records that can answer a range-filtered,
/// bucket-grouped sum.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Sums `value` per bucket for records with `dt_from <= dt <= dt_upto`.
    /// Only buckets with at least one record appear in the result.
    async fn sum_by_bucket(
        &self,
        dt_from: NaiveDateTime,
        dt_upto: NaiveDateTime,
        granularity: Granularity,
    ) -> Result<BTreeMap<BucketKey, i64>, StoreError>;
}
