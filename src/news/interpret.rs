//! Turns an HTTP status and raw body into a typed outcome.
//!
//! The API wraps its own success/failure semantics in a JSON envelope, even on
//! 4xx responses. Anything outside 2xx/4xx is assumed not to carry that
//! envelope, so the body is left undecoded.

use crate::news::{ApiErrorKind, Article};
use serde::Deserialize;

pub(crate) const DEFAULT_API_MESSAGE: &str = "An error occurred";
pub(crate) const SERVER_ERROR_MESSAGE: &str = "A server error occurred";

const STATUS_OK: &str = "ok";

/// Decoded response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    pub status: String,
    #[serde(default)]
    pub articles: Option<Vec<Article>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// What a single response means.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Articles(Vec<Article>),
    Api { kind: ApiErrorKind, message: String },
    Transport { message: String },
}

/// Interpret a response using the JSON envelope decoder.
pub fn interpret(status: u16, body: &[u8]) -> Result<Outcome, serde_json::Error> {
    interpret_with(status, body, |bytes| serde_json::from_slice(bytes))
}

/// Interpret a response with a caller-supplied envelope decoder.
///
/// `decode` is only invoked for 2xx and 4xx statuses.
pub fn interpret_with<F>(status: u16, body: &[u8], decode: F) -> Result<Outcome, serde_json::Error>
where
    F: FnOnce(&[u8]) -> Result<ApiEnvelope, serde_json::Error>,
{
    match status {
        200..=299 | 400..=499 => {}
        _ => {
            return Ok(Outcome::Transport {
                message: SERVER_ERROR_MESSAGE.to_string(),
            })
        }
    }

    let envelope = decode(body)?;

    if envelope.status == STATUS_OK {
        tracing::trace!(
            total_results = ?envelope.total_results,
            "API envelope decoded"
        );
        return Ok(Outcome::Articles(envelope.articles.unwrap_or_default()));
    }

    let kind = if status == 401 {
        ApiErrorKind::Authentication
    } else {
        ApiErrorKind::Generic
    };
    tracing::debug!(status, code = ?envelope.code, kind = ?kind, "API reported failure");

    Ok(Outcome::Api {
        kind,
        message: envelope
            .message
            .unwrap_or_else(|| DEFAULT_API_MESSAGE.to_string()),
    })
}
