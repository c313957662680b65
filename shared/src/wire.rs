//! JSON bodies exchanged over `POST /aggregate`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use crate::aggregation::Series as AggregationResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRequest {
    /// Start of the range, inclusive. ISO-8601.
    #[serde(deserialize_with = "iso_datetime::deserialize")]
    pub dt_from: NaiveDateTime,
    /// End of the range, inclusive. ISO-8601.
    #[serde(deserialize_with = "iso_datetime::deserialize")]
    pub dt_upto: NaiveDateTime,
    /// One of `hour`, `day`, `month`. Kept as a string so an unknown value
    /// reaches the aggregation and is rejected there with a 400.
    pub group_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Lenient ISO-8601 parsing for request timestamps.
///
/// Accepts `T` or space separators, optional seconds and fractions, bare
/// dates (midnight) and RFC 3339 with an offset, which is converted to UTC.
pub mod iso_datetime {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
    use serde::{Deserialize, Deserializer, de};

    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.naive_utc())
            })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 datetime: {raw:?}")))
    }
}
