use std::sync::Arc;

use anyhow::{Context, Result};
use shared::PaymentStore;
use shared::store::{MemoryPaymentStore, MongoPaymentStore};
use tracing::{info, warn};

use crate::state::AppState;

mod error;
mod routes;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing!()?;
    let config = shared::load_server_config!()?;

    // `--memory` serves an empty in-process store instead of MongoDB.
    let in_memory = std::env::args().any(|arg| arg == "--memory");

    let mongo = if in_memory {
        None
    } else {
        let store = MongoPaymentStore::connect(
            &config.mongo_uri,
            &config.mongo_db_name,
            &config.mongo_collection_name,
        )
        .await
        .context("Error creating MongoDB client")?;
        Some(Arc::new(store))
    };

    let store: Arc<dyn PaymentStore> = match &mongo {
        Some(store) => Arc::clone(store) as Arc<dyn PaymentStore>,
        None => {
            warn!("serving from an empty in-memory store");
            Arc::new(MemoryPaymentStore::default())
        }
    };

    let app = routes::router(Arc::new(AppState::new(store)));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;
    info!(bind = %config.bind, "aggregation API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(mongo) = mongo {
        match Arc::try_unwrap(mongo) {
            Ok(store) => store.shutdown().await,
            Err(_) => warn!("payment store still referenced; skipping shutdown"),
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
