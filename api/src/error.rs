use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::AggregationError;
use shared::wire::ErrorBody;
use tracing::{error, warn};

pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error.";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub detail: String,
}

impl AppError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.detail))).into_response()
    }
}

/// Any body that fails to decode into the request schema is a 422.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "rejected aggregation request body");
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

impl From<AggregationError> for AppError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::InvalidGranularity(ref group_type) => {
                warn!(group_type = %group_type, "invalid grouping type");
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            AggregationError::Store(err) => {
                error!(error = %err, "aggregation failed");
                Self::internal()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
