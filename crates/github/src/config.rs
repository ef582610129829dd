//! Connection settings for [`crate::GithubClient`].

use std::time::Duration;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Sent as `User-Agent` unless overridden; GitHub rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = "remote-storage";

/// REST API version pinned through the `X-GitHub-Api-Version` header.
pub const API_VERSION: &str = "2022-11-28";

/// Settings needed to construct a [`crate::GithubClient`].
#[derive(Clone)]
pub struct GithubClientConfig {
    /// Base URL of the REST API. GitHub Enterprise Server uses
    /// `https://<host>/api/v3`.
    pub api_base: String,
    /// Personal access token or installation token, sent as a bearer token.
    pub token: String,
    pub user_agent: String,
    /// Upper bound on a single request, including reading the body.
    pub request_timeout: Duration,
}

impl GithubClientConfig {
    /// Settings for the public API with default user agent and timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for GithubClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClientConfig")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_the_token() {
        let config = GithubClientConfig::new("ghp_secret_value");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_secret_value"));
        assert!(rendered.contains("<redacted>"));
    }
}
