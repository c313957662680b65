//! Loads payment records from a JSON-lines file into the configured MongoDB
//! collection. Each line is `{"value": <int>, "dt": "<ISO-8601 datetime>"}`.

use anyhow::{Context, Result, bail};
use shared::PaymentRecord;
use shared::store::MongoPaymentStore;
use tracing::info;

fn parse_lines(content: &str) -> Result<Vec<PaymentRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: invalid record", i + 1))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing!()?;
    let config = shared::load_server_config!()?;

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: seed_payments <records.jsonl>");
    };
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {path}"))?;
    let records = parse_lines(&content)?;

    let store = MongoPaymentStore::connect(
        &config.mongo_uri,
        &config.mongo_db_name,
        &config.mongo_collection_name,
    )
    .await
    .context("Error creating MongoDB client")?;
    store
        .insert_many(&records)
        .await
        .context("failed to insert records")?;
    info!(count = records.len(), path = %path, "seeded payments");

    store.shutdown().await;
    Ok(())
}
