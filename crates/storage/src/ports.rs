//! Remote Host Client port traits.
//!
//! The domain logic in this crate depends only on these traits. The `github`
//! crate implements them over the GitHub REST API; tests implement them with
//! in-memory fakes.
//!
//! Every method is a single request/response unit against the host. None of
//! them retry, and every failure is reported as a [`HostError`].

use async_trait::async_trait;

use crate::errors::HostError;
use crate::identifiers::{
    BranchName, CommitSha, IssueNumber, MigrationId, OrganizationName, PullRequestNumber,
    RepositoryId, RepositoryName, RepositoryPath,
};
use crate::resources::{
    Branch, ChangeSet, Commit, FileContent, Issue, IssueComment, Migration, NewReference,
    PullRequest, Reference, Repository, RepositoryRef, TreeEntry, User,
};
use crate::types::{
    CommitQuery, CreateFileRequest, IssueQuery, ItemState, PageOptions, Timestamp,
    UpdateFileRequest,
};

/// Result alias used by every port method.
pub type HostResult<T> = Result<T, HostError>;

/// Issue reads and mutations.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Lists issues across every repository visible to the authenticated user.
    ///
    /// Only issues created at or after `query.since` are returned.
    async fn list_issues(&self, query: &IssueQuery) -> HostResult<Vec<Issue>>;

    /// Lists issues of one repository updated at or after `since`.
    async fn list_repository_issues(
        &self,
        repository: &RepositoryRef,
        since: Timestamp,
    ) -> HostResult<Vec<Issue>>;

    /// Sets the state of an issue.
    async fn update_issue_state(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
        state: ItemState,
    ) -> HostResult<()>;

    /// Posts a comment on an issue.
    async fn create_issue_comment(
        &self,
        repository: RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> HostResult<IssueComment>;
}

/// Branch, tree, content, commit, and reference operations.
#[async_trait]
pub trait CodeRepository: Send + Sync {
    async fn get_branch(&self, repository: RepositoryId, branch: &BranchName)
        -> HostResult<Branch>;

    /// Lists every entry reachable from `commit`, recursively.
    async fn get_tree_recursive(
        &self,
        repository: RepositoryId,
        commit: &CommitSha,
    ) -> HostResult<Vec<TreeEntry>>;

    /// Reads one file as it exists on `branch`.
    async fn get_file_content(
        &self,
        repository: RepositoryId,
        path: &RepositoryPath,
        branch: &BranchName,
    ) -> HostResult<FileContent>;

    /// Creates a file. Fails with [`HostError::Conflict`] if the path exists.
    async fn create_file(
        &self,
        repository: RepositoryId,
        request: &CreateFileRequest,
    ) -> HostResult<ChangeSet>;

    /// Replaces a file. Fails with [`HostError::Conflict`] if
    /// `request.base_content_hash` is not the current hash.
    async fn update_file(
        &self,
        repository: RepositoryId,
        request: &UpdateFileRequest,
    ) -> HostResult<ChangeSet>;

    async fn list_commits(
        &self,
        repository: RepositoryId,
        query: &CommitQuery,
    ) -> HostResult<Vec<Commit>>;

    async fn create_reference(
        &self,
        repository: RepositoryId,
        reference: &NewReference,
    ) -> HostResult<Reference>;
}

/// Pull request reads.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Lists open pull requests of a repository addressed by coordinates.
    async fn list_pull_requests(&self, repository: &RepositoryRef)
        -> HostResult<Vec<PullRequest>>;

    /// Lists open pull requests of a repository addressed by id.
    async fn list_pull_requests_by_id(
        &self,
        repository: RepositoryId,
        pages: PageOptions,
    ) -> HostResult<Vec<PullRequest>>;

    async fn get_pull_request(
        &self,
        repository: RepositoryId,
        number: PullRequestNumber,
    ) -> HostResult<PullRequest>;
}

/// Organization migrations (bulk exports).
#[async_trait]
pub trait MigrationService: Send + Sync {
    async fn start_migration(
        &self,
        organization: &OrganizationName,
        repositories: &[RepositoryName],
    ) -> HostResult<Migration>;

    async fn list_migrations(&self, organization: &OrganizationName)
        -> HostResult<Vec<Migration>>;

    /// Downloads the archive of an exported migration.
    async fn get_migration_archive(
        &self,
        organization: &OrganizationName,
        migration: MigrationId,
    ) -> HostResult<Vec<u8>>;
}

/// Organization membership and repository listings.
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    async fn list_members(&self, organization: &OrganizationName) -> HostResult<Vec<User>>;

    async fn list_repositories(
        &self,
        organization: &OrganizationName,
    ) -> HostResult<Vec<Repository>>;
}

/// Everything a hosting client provides.
///
/// Implemented automatically for any type that implements every port.
pub trait RemoteHost:
    IssueTracker + CodeRepository + PullRequestSource + MigrationService + OrganizationDirectory
{
}

impl<T> RemoteHost for T where
    T: IssueTracker + CodeRepository + PullRequestSource + MigrationService + OrganizationDirectory
{
}
