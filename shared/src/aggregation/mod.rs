//! Dense, gap-filled payment time series.
//!
//! A call to [`aggregate`] asks the store for sparse per-bucket sums, derives
//! the full bucket calendar for the range on its own, and merges the two so
//! every bucket between `dt_from` and `dt_upto` shows up exactly once.

pub mod calendar;
pub mod merge;
pub mod query;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::store::{PaymentStore, StoreError};

pub use calendar::generate_labels;
pub use merge::merge;
pub use query::fetch_partial_sums;

/// Canonical bucket label, e.g. `2022-09-01T00:00:00`.
pub type BucketKey = String;

pub const INVALID_GRANULARITY_MESSAGE: &str =
    "Invalid grouping type. Allowed values: 'hour', 'day', 'month'.";

/// Width of one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            other => Err(AggregationError::InvalidGranularity(other.to_owned())),
        }
    }
}

#[derive(Debug, Error)]
pub enum AggregationError {
    /// The requested grouping is not one of `hour`, `day`, `month`.
    /// Holds the rejected value; the message is always the allowed-values text.
    #[error("{}", INVALID_GRANULARITY_MESSAGE)]
    InvalidGranularity(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Output of an aggregation: `dataset[i]` is the sum for `labels[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub dataset: Vec<i64>,
    pub labels: Vec<BucketKey>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Sums payments between `dt_from` and `dt_upto` (both inclusive) per
/// `group_type` bucket, zero-filling buckets with no records.
///
/// `group_type` is validated before the store is touched. A reversed range
/// yields an empty series rather than an error.
pub async fn aggregate(
    store: &dyn PaymentStore,
    dt_from: NaiveDateTime,
    dt_upto: NaiveDateTime,
    group_type: &str,
) -> Result<Series, AggregationError> {
    let granularity: Granularity = group_type.parse()?;

    let partial_sums = fetch_partial_sums(store, dt_from, dt_upto, granularity).await?;
    let labels = generate_labels(dt_from, dt_upto, granularity);
    let series = merge(labels, &partial_sums);

    debug!(
        %dt_from,
        %dt_upto,
        %granularity,
        buckets = series.len(),
        non_empty = partial_sums.len(),
        "aggregated payments"
    );

    Ok(series)
}
