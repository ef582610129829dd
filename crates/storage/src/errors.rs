//! Error and retry-policy types for the hosting storage domain.
//!
//! [`HostError`] is the categorised failure every port implementation returns.
//! It is propagated to callers unmodified: nothing in this crate retries,
//! swallows, or rewrites a remote failure.
//!
//! [`StorageError`] adds the failures that originate locally (archive writes,
//! cursor persistence) to the remote ones.
//!
//! [`RetryPolicy`] is advisory. This crate never retries; callers that do can
//! ask any [`HostError`] whether retrying makes sense.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// ## Rules
///
/// - `Retryable` errors: transport failures, rate-limit responses.
/// - `NonRetryable` errors: missing resources, conflicts, authentication
///   failures, validation rejections, undecodable responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying (e.g.
    /// derived from the `Retry-After` response header).
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried without a change of input.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Remote failures
// ---------------------------------------------------------------------------

/// A failure reported by (or while talking to) the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The addressed resource does not exist or is not visible to the caller.
    #[error("Not found: {resource}")]
    NotFound {
        /// Description of the missing resource (usually the request path).
        resource: String,
    },

    /// The host refused a mutation because it conflicts with current state.
    ///
    /// Produced by: update with a stale content hash, create on a path that
    /// already exists.
    #[error("Conflict on {resource}: {message}")]
    Conflict {
        resource: String,
        /// Host-supplied explanation.
        message: String,
    },

    /// Credentials are missing, invalid, or lack the required scope.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The host's rate limit has been exhausted.
    #[error("Rate limited")]
    RateLimited {
        /// Delay the host asked for, when it supplied one.
        retry_after: Option<Duration>,
    },

    /// The host rejected the request for any other reason (validation
    /// failure, server error).
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Transport failure: {message}")]
    Transport { message: String },

    /// The host responded but the body could not be interpreted.
    #[error("Could not decode response: {message}")]
    Decode { message: String },
}

impl HostError {
    /// Returns the advisory retry policy for this failure.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            HostError::RateLimited { retry_after } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            HostError::Transport { .. } => RetryPolicy::Retryable { after: None },
            HostError::Rejected { status, .. } if *status >= 500 => {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }

    /// Returns `true` for [`HostError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::NotFound { .. })
    }

    /// Returns `true` for [`HostError::Conflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, HostError::Conflict { .. })
    }
}

// ---------------------------------------------------------------------------
// Operation-level failures
// ---------------------------------------------------------------------------

/// Failures of operations that combine remote calls with local effects.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A remote call failed; the inner error is exactly what the port returned.
    #[error(transparent)]
    Remote(#[from] HostError),

    /// Writing to local storage failed.
    #[error("Local I/O failed for '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cursor store could not load or save the watermark.
    #[error("Cursor store failure: {message}")]
    CursorStore { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_carry_their_delay_into_the_retry_policy() {
        let error = HostError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(
            error.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(30))
            }
        );
    }

    #[test]
    fn conflicts_and_client_rejections_are_not_retryable() {
        let conflict = HostError::Conflict {
            resource: "docs/readme.md".into(),
            message: "sha mismatch".into(),
        };
        assert_eq!(conflict.retry_policy(), RetryPolicy::NonRetryable);

        let rejected = HostError::Rejected {
            status: 422,
            message: "Validation Failed".into(),
        };
        assert_eq!(rejected.retry_policy(), RetryPolicy::NonRetryable);

        let server = HostError::Rejected {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(server.retry_policy(), RetryPolicy::Retryable { after: None });
    }

    #[test]
    fn remote_errors_pass_through_storage_error_unchanged() {
        let original = HostError::NotFound {
            resource: "/orgs/acme/migrations/7/archive".into(),
        };
        let wrapped = StorageError::from(original.clone());
        assert_eq!(wrapped.to_string(), original.to_string());
        assert!(matches!(wrapped, StorageError::Remote(inner) if inner == original));
    }
}
