//! Read-only snapshots of remote resources returned by the port traits.
//!
//! These are plain data: they are produced by a [`crate::ports`]
//! implementation from the host's responses and are never persisted by this
//! crate.

use serde::{Deserialize, Serialize};

use crate::identifiers::{
    BranchName, CommentId, CommitSha, ContentHash, IssueNumber, MigrationId, OrganizationName,
    OwnerName, PullRequestNumber, RepositoryId, RepositoryName, RepositoryPath, UserId,
};
use crate::types::{CommitRef, ItemState, MigrationState, Timestamp};

/// Account id of the dependabot bot on the public host.
pub const DEPENDABOT_USER_ID: UserId = UserId::new(49699333);

/// A user or bot account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
}

impl User {
    /// Returns `true` if this account is the dependabot bot.
    pub fn is_dependabot(&self) -> bool {
        self.id == DEPENDABOT_USER_ID
    }
}

/// `owner/name` coordinates of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: OwnerName,
    pub name: RepositoryName,
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub coordinates: RepositoryRef,
    pub default_branch: Option<BranchName>,
    pub private: bool,
}

/// An issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Host-wide id (not the per-repository number).
    pub id: u64,
    pub number: IssueNumber,
    pub title: String,
    pub state: ItemState,
    pub created_at: Timestamp,
    pub repository: RepositoryRef,
    pub author: Option<User>,
    pub html_url: Option<String>,
}

/// A comment posted on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: CommentId,
    pub body: String,
    pub html_url: Option<String>,
}

/// A branch and the commit at its head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: BranchName,
    pub head: CommitRef,
}

/// Kind of object a [`TreeEntry`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeEntryKind {
    /// A file.
    Blob,
    /// A directory.
    Tree,
    /// A submodule commit.
    Commit,
}

/// One item of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub content_hash: ContentHash,
    pub kind: TreeEntryKind,
}

impl TreeEntry {
    /// Creates a blob entry.
    pub fn blob(path: impl Into<String>, content_hash: ContentHash) -> Self {
        Self {
            path: path.into(),
            content_hash,
            kind: TreeEntryKind::Blob,
        }
    }
}

/// The current content of one file on a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub path: RepositoryPath,
    pub content_hash: ContentHash,
    pub size: u64,
    /// Decoded file bytes. Empty when the host omits content for large files.
    pub bytes: Vec<u8>,
}

/// Result of a successful file create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// The commit the mutation produced.
    pub commit: CommitRef,
    /// Path of the written file.
    pub path: RepositoryPath,
    /// Hash of the content as now stored.
    pub content_hash: ContentHash,
}

/// A commit in a repository's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: CommitSha,
    pub message: String,
    pub author_login: Option<String>,
    pub authored_at: Option<Timestamp>,
}

/// A pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub number: PullRequestNumber,
    pub title: String,
    pub state: ItemState,
    pub head_ref: String,
    pub base_ref: String,
    pub author: Option<User>,
    pub created_at: Timestamp,
}

/// A Git reference (`refs/heads/...`, `refs/tags/...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub object: CommitRef,
}

/// Parameters for creating a Git reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReference {
    /// Fully qualified name, e.g. `refs/heads/feature`.
    pub name: String,
    pub sha: CommitSha,
}

/// An organization migration (bulk export) job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub id: MigrationId,
    pub organization: OrganizationName,
    pub state: MigrationState,
    pub repositories: Vec<RepositoryName>,
    pub created_at: Option<Timestamp>,
}
