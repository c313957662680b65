use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use tracing::{debug, info};

use super::{PaymentRecord, PaymentStore, StoreError};
use crate::aggregation::{BucketKey, Granularity};

/// Payment records in a MongoDB collection of `{value, dt}` documents.
///
/// `dt` is stored as a BSON date holding the naive timestamp read as UTC, so
/// the server-side `$dateToString` (UTC by default) renders the same bucket
/// keys as the client-side calendar. BSON dates carry milliseconds, so the
/// range's lower bound is rounded up and its upper bound down to whole
/// milliseconds.
pub struct MongoPaymentStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoPaymentStore {
    /// Builds a pooled client. No round-trip happens until the first query.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;
        let collection = client.database(database).collection::<Document>(collection);

        info!(database, collection = collection.name(), "configured payment store");
        Ok(Self { client, collection })
    }

    /// Writes records into the collection. Only used to seed data; the
    /// aggregation path never writes.
    pub async fn insert_many(&self, records: &[PaymentRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let docs = records.iter().map(|r| {
            doc! {
                "value": r.value,
                "dt": to_bson_date(r.dt),
            }
        });
        self.collection.insert_many(docs, None).await?;
        Ok(())
    }

    /// Closes pooled connections.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[async_trait]
impl PaymentStore for MongoPaymentStore {
    async fn sum_by_bucket(
        &self,
        dt_from: NaiveDateTime,
        dt_upto: NaiveDateTime,
        granularity: Granularity,
    ) -> Result<BTreeMap<BucketKey, i64>, StoreError> {
        let cursor = self
            .collection
            .aggregate(pipeline(dt_from, dt_upto, granularity), None)
            .await?;
        let rows: Vec<Document> = cursor.try_collect().await?;
        debug!(rows = rows.len(), %granularity, "aggregation pipeline returned");

        rows.iter().map(parse_row).collect()
    }
}

/// BSON dates hold whole milliseconds; sub-millisecond precision is dropped.
fn to_bson_date(dt: NaiveDateTime) -> bson::DateTime {
    bson::DateTime::from_millis(dt.and_utc().timestamp_millis())
}

/// Smallest BSON date not before `dt`, so a `$gte` filter never admits a
/// stored millisecond that lies before a sub-millisecond lower bound.
fn to_bson_date_ceil(dt: NaiveDateTime) -> bson::DateTime {
    let utc = dt.and_utc();
    let millis = utc.timestamp_millis();
    if utc.timestamp_subsec_nanos() % 1_000_000 == 0 {
        bson::DateTime::from_millis(millis)
    } else {
        bson::DateTime::from_millis(millis.saturating_add(1))
    }
}

/// `$dateToString` format rendering a date as its bucket key.
fn bucket_format(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Hour => "%Y-%m-%dT%H:00:00",
        Granularity::Day => "%Y-%m-%dT00:00:00",
        Granularity::Month => "%Y-%m-01T00:00:00",
    }
}

fn pipeline(
    dt_from: NaiveDateTime,
    dt_upto: NaiveDateTime,
    granularity: Granularity,
) -> Vec<Document> {
    vec![
        doc! {
            "$match": {
                "dt": {
                    "$gte": to_bson_date_ceil(dt_from),
                    "$lte": to_bson_date(dt_upto),
                }
            }
        },
        doc! {
            "$group": {
                "_id": {
                    "$dateToString": {
                        "format": bucket_format(granularity),
                        "date": "$dt",
                    }
                },
                "total_value": { "$sum": "$value" },
            }
        },
        doc! { "$sort": { "_id": 1 } },
    ]
}

fn parse_row(row: &Document) -> Result<(BucketKey, i64), StoreError> {
    let key = row
        .get_str("_id")
        .map_err(|err| StoreError::MalformedRow(format!("_id: {err}")))?;

    let total = match row.get("total_value") {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        other => {
            return Err(StoreError::MalformedRow(format!(
                "total_value for {key}: {other:?}"
            )));
        }
    };

    Ok((key.to_owned(), total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").unwrap()
    }

    #[test]
    fn pipeline_filters_inclusively_then_groups_and_sorts() {
        let stages = pipeline(
            dt("2022-09-01T00:00:00"),
            dt("2022-11-30T23:59:59"),
            Granularity::Month,
        );

        assert_eq!(stages.len(), 3);
        let range = stages[0]
            .get_document("$match")
            .unwrap()
            .get_document("dt")
            .unwrap();
        assert_eq!(
            range.get_datetime("$gte").unwrap().timestamp_millis(),
            dt("2022-09-01T00:00:00").and_utc().timestamp_millis()
        );
        assert!(range.contains_key("$lte"));

        let format = stages[1]
            .get_document("$group")
            .unwrap()
            .get_document("_id")
            .unwrap()
            .get_document("$dateToString")
            .unwrap()
            .get_str("format")
            .unwrap();
        assert_eq!(format, "%Y-%m-01T00:00:00");
        assert_eq!(stages[2], doc! { "$sort": { "_id": 1 } });
    }

    #[test]
    fn server_format_matches_calendar_labels() {
        // `$dateToString` and strftime share these specifiers.
        let at = dt("2022-10-05T15:42:07");
        for granularity in [Granularity::Hour, Granularity::Day, Granularity::Month] {
            assert_eq!(
                at.format(bucket_format(granularity)).to_string(),
                granularity.label(at)
            );
        }
    }

    #[test]
    fn bson_dates_keep_sub_second_precision() {
        let at = dt("2022-10-05T15:42:07.123");
        assert_eq!(to_bson_date(at).timestamp_millis() % 1000, 123);
    }

    #[test]
    fn lower_bound_rounds_up_to_the_next_millisecond() {
        let exact = dt("2022-10-05T10:00:00.001");
        assert_eq!(to_bson_date_ceil(exact), to_bson_date(exact));

        let partial = dt("2022-10-05T10:00:00.000500");
        let record = dt("2022-10-05T10:00:00");
        assert!(to_bson_date_ceil(partial) > to_bson_date(record));
        assert_eq!(
            to_bson_date_ceil(partial).timestamp_millis(),
            to_bson_date(record).timestamp_millis() + 1
        );

        // Upper bounds truncate, which keeps a record stamped at the same millisecond.
        let stages = pipeline(partial, partial, Granularity::Hour);
        let range = stages[0]
            .get_document("$match")
            .unwrap()
            .get_document("dt")
            .unwrap();
        assert_eq!(
            range.get_datetime("$lte").unwrap().timestamp_millis(),
            to_bson_date(record).timestamp_millis()
        );
    }

    #[test]
    fn parses_numeric_totals_of_any_width() {
        for total in [Bson::Int32(7), Bson::Int64(7), Bson::Double(7.0)] {
            let row = doc! { "_id": "2022-10-01T00:00:00", "total_value": total };
            assert_eq!(
                parse_row(&row).unwrap(),
                ("2022-10-01T00:00:00".to_owned(), 7)
            );
        }
    }

    #[test]
    fn rejects_rows_without_key_or_total() {
        let missing_key = doc! { "_id": Bson::Null, "total_value": 1 };
        assert!(matches!(parse_row(&missing_key), Err(StoreError::MalformedRow(_))));

        let missing_total = doc! { "_id": "2022-10-01T00:00:00" };
        assert!(matches!(parse_row(&missing_total), Err(StoreError::MalformedRow(_))));
    }
}
