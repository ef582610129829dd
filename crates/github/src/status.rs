//! Translation of HTTP failures into [`HostError`] categories.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::Deserialize;
use storage::HostError;

/// Longest response excerpt carried in an error message.
const MAX_ERROR_CHARS: usize = 800;

/// The parts of a failed response that decide its category.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailedResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
    pub(crate) retry_after: Option<Duration>,
    pub(crate) rate_limit_exhausted: bool,
}

impl FailedResponse {
    pub(crate) fn new(status: u16, headers: &HeaderMap, body: String) -> Self {
        Self {
            status,
            body,
            retry_after: parse_retry_after(headers),
            rate_limit_exhausted: headers
                .get("x-ratelimit-remaining")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.trim() == "0"),
        }
    }
}

pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get("retry-after")?.to_str().ok()?;
    let seconds = raw.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Categorises a non-success response for `resource`.
pub(crate) fn error_for_response(resource: &str, response: FailedResponse) -> HostError {
    let message = api_message(&response.body);
    match response.status {
        429 => HostError::RateLimited {
            retry_after: response.retry_after,
        },
        403 if response.rate_limit_exhausted || response.retry_after.is_some() => {
            HostError::RateLimited {
                retry_after: response.retry_after,
            }
        }
        401 | 403 => HostError::Unauthorized { message },
        404 => HostError::NotFound {
            resource: resource.to_string(),
        },
        409 => HostError::Conflict {
            resource: resource.to_string(),
            message,
        },
        422 if is_conflict_message(&message) => HostError::Conflict {
            resource: resource.to_string(),
            message,
        },
        status => HostError::Rejected { status, message },
    }
}

pub(crate) fn transport_error(resource: &str, error: &reqwest::Error) -> HostError {
    HostError::Transport {
        message: format!("{resource}: {error}"),
    }
}

pub(crate) fn decode_error(resource: &str, detail: impl std::fmt::Display) -> HostError {
    HostError::Decode {
        message: format!("{resource}: {detail}"),
    }
}

/// Extracts GitHub's `message` field, falling back to a truncated raw body.
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }

    match serde_json::from_str::<ApiError>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => truncate_for_error(body, MAX_ERROR_CHARS),
    }
}

/// GitHub reports content conflicts on the contents API as 422 as well as 409.
fn is_conflict_message(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("already exists")
        || lowered.contains("does not match")
        || (lowered.contains("\"sha\"") && lowered.contains("wasn't supplied"))
}

fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
