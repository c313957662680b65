use std::iter;

use chrono::{Datelike, Days, Months, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use super::{BucketKey, Granularity};

const LABEL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl Granularity {
    /// Rounds `dt` down to the start of its bucket.
    pub fn truncate(&self, dt: NaiveDateTime) -> NaiveDateTime {
        let date = dt.date();
        match self {
            Granularity::Hour => {
                date.and_time(NaiveTime::MIN + TimeDelta::hours(i64::from(dt.hour())))
            }
            Granularity::Day => date.and_time(NaiveTime::MIN),
            Granularity::Month => {
                (date - TimeDelta::days(i64::from(date.day0()))).and_time(NaiveTime::MIN)
            }
        }
    }

    /// Start of the bucket after the one starting at `bucket_start`, or `None`
    /// past the end of the representable calendar.
    ///
    /// Months advance the month field (rolling December into January) rather
    /// than adding a fixed number of days.
    pub fn next(&self, bucket_start: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Granularity::Hour => bucket_start.checked_add_signed(TimeDelta::hours(1)),
            Granularity::Day => bucket_start.checked_add_days(Days::new(1)),
            Granularity::Month => bucket_start.checked_add_months(Months::new(1)),
        }
    }

    /// Bucket key for the bucket containing `dt`.
    pub fn label(&self, dt: NaiveDateTime) -> BucketKey {
        self.truncate(dt).format(LABEL_FORMAT).to_string()
    }
}

/// Start instants of every bucket from the one containing `dt_from` up to the
/// last one starting at or before `dt_upto`. Empty when `dt_from > dt_upto`.
pub fn bucket_starts(
    dt_from: NaiveDateTime,
    dt_upto: NaiveDateTime,
    granularity: Granularity,
) -> impl Iterator<Item = NaiveDateTime> {
    let first = (dt_from <= dt_upto).then(|| granularity.truncate(dt_from));
    iter::successors(first, move |current| granularity.next(*current))
        .take_while(move |start| *start <= dt_upto)
}

/// Every bucket key covering `[dt_from, dt_upto]`, in ascending order, whether
/// or not any records fall inside.
pub fn generate_labels(
    dt_from: NaiveDateTime,
    dt_upto: NaiveDateTime,
    granularity: Granularity,
) -> Vec<BucketKey> {
    bucket_starts(dt_from, dt_upto, granularity)
        .map(|start| start.format(LABEL_FORMAT).to_string())
        .collect()
}
