use serenity::all::UserId;
use shared::wire::{AggregationRequest, AggregationResponse};
use tracing::{error, info};

use crate::client::{AggregationClient, BotError};

pub const NO_TEXT: &str = "Please send a text message containing JSON.";
pub const MALFORMED_JSON: &str = "Error: malformed JSON. Please check your request.";
pub const INTERNAL_ERROR: &str = "An internal error occurred. Please try again later.";

/// Discord rejects message content longer than this.
pub const MESSAGE_LIMIT: usize = 2000;

/// What the bot answers to one user message.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Aggregation(AggregationResponse),
}

impl Reply {
    /// Message text, with a successful series pretty-printed in a code block.
    pub fn render(&self) -> String {
        match self {
            Reply::Text(text) => text.clone(),
            Reply::Aggregation(series) => format!(
                "Aggregation result:\n```json\n{}\n```",
                pretty_json(series)
            ),
        }
    }
}

/// Text of a message the bot should answer, with its mentions removed.
///
/// Direct messages are always answered. In guild channels the bot only
/// answers messages that mention it, so ordinary chat is left alone.
pub fn request_text(content: &str, in_guild: bool, bot_id: UserId) -> Option<String> {
    if !in_guild {
        return Some(content.to_owned());
    }

    let mentions = [format!("<@{bot_id}>"), format!("<@!{bot_id}>")];
    if !mentions.iter().any(|mention| content.contains(mention.as_str())) {
        return None;
    }

    let stripped = mentions
        .iter()
        .fold(content.to_owned(), |text, mention| text.replace(mention.as_str(), ""));
    Some(stripped)
}

pub fn pretty_json(series: &AggregationResponse) -> String {
    serde_json::to_string_pretty(series).unwrap_or_else(|_| format!("{series:?}"))
}

/// Turns a user's message into a request, forwards it to the aggregation API
/// and builds the answer. Every failure becomes a user-facing message.
pub async fn reply_for(client: &AggregationClient, text: &str) -> Reply {
    let text = text.trim();
    if text.is_empty() {
        return Reply::Text(NO_TEXT.to_owned());
    }

    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return Reply::Text(MALFORMED_JSON.to_owned()),
    };

    // Shape errors are reported the way the API reports its own 422s.
    let request: AggregationRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(err) => return Reply::Text(processing_error(&err.to_string(), 422)),
    };

    info!(group_type = %request.group_type, "forwarding aggregation request");
    match client.aggregate(&request).await {
        Ok(series) => Reply::Aggregation(series),
        Err(BotError::Api { status, detail }) => Reply::Text(processing_error(&detail, status)),
        Err(BotError::Network(err)) => Reply::Text(format!(
            "Network error: could not reach the aggregation service. {err}"
        )),
        Err(err) => {
            error!(error = %err, "unexpected error while handling message");
            Reply::Text(INTERNAL_ERROR.to_owned())
        }
    }
}

fn processing_error(detail: &str, status: u16) -> String {
    format!("Error processing request: {detail} (Code: {status})")
}
