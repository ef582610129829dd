//! GitHub infrastructure adapter for the `storage` crate.
//!
//! [`GithubClient`] implements every Remote Host Client port defined in
//! [`storage::ports`] against the GitHub REST API (v3), so a
//! [`storage::HostStorage`] can be built on top of it.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. HTTP
//! transport, authentication headers, pagination, URL encoding, base64
//! content encoding, and status-code classification all live here; the
//! [`storage`] crate never sees them.
//!
//! ## Failure mapping
//!
//! | Response | [`storage::HostError`] |
//! |----------|------------------------|
//! | 401, 403 | `Unauthorized` |
//! | 403 with exhausted rate limit, 429 | `RateLimited` |
//! | 404 | `NotFound` |
//! | 409; 422 reporting an existing file or stale sha | `Conflict` |
//! | any other non-2xx | `Rejected` |
//! | no response | `Transport` |
//! | undecodable body | `Decode` |
//!
//! Nothing here retries.

mod client;
mod config;
mod issues;
mod migrations;
mod organizations;
mod pulls;
mod repositories;
mod status;
mod wire;

pub use client::{ClientBuildError, GithubClient};
pub use config::{GithubClientConfig, API_VERSION, DEFAULT_API_BASE, DEFAULT_USER_AGENT};
