use reqwest::{Client, StatusCode};
use shared::wire::{AggregationRequest, AggregationResponse, ErrorBody};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BotError {
    /// The aggregation service could not be reached.
    #[error("{0}")]
    Network(#[source] reqwest::Error),

    /// The aggregation service answered with a non-200 status.
    #[error("{detail} (Code: {status})")]
    Api { status: u16, detail: String },

    /// A 200 response whose body was not a series.
    #[error("undecodable aggregation response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Calls `POST /aggregate` on the HTTP API.
pub struct AggregationClient {
    client: Client,
    url: String,
}

impl AggregationClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub async fn aggregate(
        &self,
        request: &AggregationRequest,
    ) -> Result<AggregationResponse, BotError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(BotError::Network)?;

        let status = response.status();
        debug!(%status, url = %self.url, "aggregation API responded");

        if status != StatusCode::OK {
            let detail = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.detail)
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(BotError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        response.json().await.map_err(BotError::Decode)
    }
}
