use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::routing::{get, post};
use shared::wire::{AggregationRequest, AggregationResponse};
use tracing::info;

use crate::error::AppResult;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/aggregate", post(aggregate))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

pub async fn aggregate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AggregationRequest>, JsonRejection>,
) -> AppResult<Json<AggregationResponse>> {
    let Json(request) = payload?;
    info!(
        dt_from = %request.dt_from,
        dt_upto = %request.dt_upto,
        group_type = %request.group_type,
        "aggregation requested"
    );

    let series = shared::aggregate(
        state.store.as_ref(),
        request.dt_from,
        request.dt_upto,
        &request.group_type,
    )
    .await?;

    Ok(Json(series))
}
