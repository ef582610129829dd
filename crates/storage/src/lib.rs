//! Client-side storage façade over a remote version-control host.
//!
//! This crate holds the domain types, the port traits a host client must
//! implement, and the two pieces of logic that are more than a pass-through:
//!
//! - [`PollCursor`]: returns only issues created since the last successful
//!   poll, by tracking a creation-time watermark.
//! - [`ContentReconciler`]: makes "write this file on this branch" idempotent
//!   by scanning the branch tree and choosing between create and update.
//!
//! ## Architectural Layer
//!
//! **Domain logic + port definitions.** No transport code lives here. The
//! `github` crate implements the [`ports`] over HTTP; tests use in-memory
//! fakes.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepositoryId`, `BranchName`, etc.) |
//! | [`types`] | Value types (`Timestamp`, queries, file mutation requests) |
//! | [`resources`] | Snapshots of remote resources (`Issue`, `TreeEntry`, etc.) |
//! | [`errors`] | `HostError`, `StorageError`, `RetryPolicy` |
//! | [`ports`] | Remote Host Client traits |
//! | [`poll_cursor`] | Issue watermark and its persistence seam |
//! | [`reconciler`] | Create-or-update file logic |
//! | [`issues`] | Issue closing |
//! | [`migrations`] | Migration requests and archive download |
//! | [`host_storage`] | The `HostStorage` façade |

pub mod errors;
pub mod host_storage;
pub mod identifiers;
pub mod issues;
pub mod migrations;
pub mod poll_cursor;
pub mod ports;
pub mod reconciler;
pub mod resources;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{HostError, RetryPolicy, StorageError};
pub use host_storage::{HostStorage, REPOSITORY_ISSUE_WINDOW_MONTHS};
pub use identifiers::{
    BranchName, CommentId, CommitSha, ContentHash, IssueNumber, MigrationId, OrganizationName,
    OwnerName, PullRequestNumber, RepositoryId, RepositoryName, RepositoryPath, UserId,
};
pub use issues::IssueCloser;
pub use migrations::MigrationArchives;
pub use poll_cursor::{CursorStore, EphemeralCursorStore, PollCursor, MINIMUM_AGE_FLOOR_DAYS};
pub use ports::{
    CodeRepository, HostResult, IssueTracker, MigrationService, OrganizationDirectory,
    PullRequestSource, RemoteHost,
};
pub use reconciler::{plan_mutation, ContentReconciler, WriteFileRequest};
pub use resources::{
    Branch, ChangeSet, Commit, FileContent, Issue, IssueComment, Migration, NewReference,
    PullRequest, Reference, Repository, RepositoryRef, TreeEntry, TreeEntryKind, User,
    DEPENDABOT_USER_ID,
};
pub use types::{
    CommitQuery, CommitRef, CreateFileRequest, FileMutationIntent, InteractionInterval,
    IssueFilter, IssueQuery, ItemState, MigrationState, PageOptions, Timestamp,
    UpdateFileRequest,
};
