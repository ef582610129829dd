//! [`GithubClient`] construction and the request plumbing shared by every
//! port implementation.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use storage::{HostResult, PageOptions};
use thiserror::Error;

use crate::config::{GithubClientConfig, API_VERSION};
use crate::status::{decode_error, error_for_response, transport_error, FailedResponse};

/// GitHub caps `per_page` at this value.
pub(crate) const MAX_PAGE_SIZE: u32 = 100;

/// Failures constructing a [`GithubClient`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("API base '{0}' is not a valid base URL")]
    InvalidApiBase(String),

    #[error("Token or user agent contains characters not allowed in an HTTP header")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to build HTTP client")]
    Http(#[from] reqwest::Error),
}

/// GitHub REST client implementing every `storage` port.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: Url,
}

impl GithubClient {
    pub fn new(config: &GithubClientConfig) -> Result<Self, ClientBuildError> {
        let api_base = Url::parse(config.api_base.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientBuildError::InvalidApiBase(config.api_base.clone()))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { http, api_base })
    }

    /// Builds `{api_base}/{segments...}`, percent-encoding each segment.
    ///
    /// Segments containing `/` (file paths, branch names) are split so the
    /// separators stay literal.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/').filter(|part| !part.is_empty()));
            }
        }
        url
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.http.get(url)
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.http.post(url)
    }

    pub(crate) fn put(&self, url: Url) -> RequestBuilder {
        self.http.put(url)
    }

    pub(crate) fn patch(&self, url: Url) -> RequestBuilder {
        self.http.patch(url)
    }

    /// Sends `request` and returns the response if its status is a success.
    pub(crate) async fn send(&self, request: RequestBuilder) -> HostResult<Response> {
        let request = request
            .build()
            .map_err(|error| transport_error("request", &error))?;
        let resource = request.url().path().to_string();
        tracing::trace!(method = %request.method(), resource = %resource, "GitHub request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|error| transport_error(&resource, &error))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        let error = error_for_response(&resource, FailedResponse::new(status.as_u16(), &headers, body));
        tracing::debug!(status = status.as_u16(), resource = %resource, error = %error, "GitHub request failed");
        Err(error)
    }

    /// Sends `request` and decodes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> HostResult<T> {
        let response = self.send(request).await?;
        let resource = response.url().path().to_string();
        response
            .json::<T>()
            .await
            .map_err(|error| decode_error(&resource, error))
    }

    /// Sends `request` and returns the raw body bytes.
    pub(crate) async fn send_bytes(&self, request: RequestBuilder) -> HostResult<Vec<u8>> {
        let response = self.send(request).await?;
        let resource = response.url().path().to_string();
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|error| transport_error(&resource, &error))
    }

    /// Fetches every page of a list endpoint.
    ///
    /// Stops at the first short page, or after `pages.page_count` pages.
    pub(crate) async fn paginate<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        pages: PageOptions,
    ) -> HostResult<Vec<T>> {
        let page_size = pages.page_size.clamp(1, MAX_PAGE_SIZE);
        let mut page = pages.start_page.max(1);
        let mut fetched = 0_u32;
        let mut rows = Vec::new();
        loop {
            let chunk: Vec<T> = self
                .send_json(
                    self.get(url.clone())
                        .query(query)
                        .query(&[("per_page", page_size), ("page", page)]),
                )
                .await?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            fetched = fetched.saturating_add(1);
            if chunk_len < page_size as usize
                || pages.page_count.is_some_and(|count| fetched >= count)
            {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> GithubClient {
        GithubClient::new(&GithubClientConfig::new("token").with_api_base(api_base)).unwrap()
    }

    #[test]
    fn endpoint_splits_paths_and_encodes_segments() {
        let client = client("https://api.github.com");
        let url = client.endpoint(&["repositories", "42", "contents", "docs/my notes.md"]);
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repositories/42/contents/docs/my%20notes.md"
        );
    }

    #[test]
    fn endpoint_keeps_enterprise_path_prefix() {
        let client = client("https://ghe.example.com/api/v3/");
        let url = client.endpoint(&["orgs", "acme", "migrations"]);
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/orgs/acme/migrations"
        );
    }

    #[test]
    fn invalid_api_base_is_rejected() {
        let error = GithubClient::new(&GithubClientConfig::new("t").with_api_base("not a url"))
            .unwrap_err();
        assert!(matches!(error, ClientBuildError::InvalidApiBase(_)));
    }
}
