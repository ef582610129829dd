//! [`HostStorage`]: the façade callers use.
//!
//! Owns one [`RemoteHost`] client and one issue [`PollCursor`], and exposes
//! every operation of the crate as a method. Operations with logic of their
//! own delegate to [`PollCursor`], [`ContentReconciler`], [`IssueCloser`], and
//! [`MigrationArchives`]; the rest are single port calls.

use std::path::Path;

use crate::errors::StorageError;
use crate::identifiers::{
    BranchName, IssueNumber, MigrationId, OrganizationName, OwnerName, PullRequestNumber,
    RepositoryId, RepositoryName,
};
use crate::issues::IssueCloser;
use crate::migrations::MigrationArchives;
use crate::poll_cursor::{CursorStore, EphemeralCursorStore, PollCursor};
use crate::ports::{HostResult, RemoteHost};
use crate::reconciler::{ContentReconciler, WriteFileRequest};
use crate::resources::{
    Branch, ChangeSet, Commit, Issue, IssueComment, Migration, NewReference, PullRequest,
    Reference, Repository, RepositoryRef, User,
};
use crate::types::{CommitQuery, InteractionInterval, PageOptions, Timestamp};

/// How far back [`HostStorage::repository_issues`] looks.
pub const REPOSITORY_ISSUE_WINDOW_MONTHS: u32 = 1;

/// Read/write access to one owner's repositories on a remote host.
pub struct HostStorage<H, S = EphemeralCursorStore> {
    host: H,
    owner: OwnerName,
    cursor: PollCursor<S>,
    minimum_interaction_interval: InteractionInterval,
}

impl<H: RemoteHost> HostStorage<H> {
    /// Creates a façade with an in-memory issue cursor starting two weeks ago.
    pub fn new(host: H, owner: OwnerName) -> Self {
        Self::with_cursor(host, owner, PollCursor::new())
    }
}

impl<H, S> HostStorage<H, S>
where
    H: RemoteHost,
    S: CursorStore,
{
    /// Creates a façade around an existing cursor (e.g. one restored from a
    /// [`CursorStore`]).
    pub fn with_cursor(host: H, owner: OwnerName, cursor: PollCursor<S>) -> Self {
        Self {
            host,
            owner,
            cursor,
            minimum_interaction_interval: InteractionInterval::default(),
        }
    }

    /// Overrides the minimum spacing between issue polls.
    pub fn with_minimum_interaction_interval(mut self, interval: InteractionInterval) -> Self {
        self.minimum_interaction_interval = interval;
        self
    }

    /// The underlying host client.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The owner this façade was created for.
    pub fn owner(&self) -> &OwnerName {
        &self.owner
    }

    /// Minimum spacing callers should leave between [`Self::poll_issues`] calls.
    pub fn minimum_interaction_interval(&self) -> InteractionInterval {
        self.minimum_interaction_interval
    }

    /// Current issue watermark.
    pub fn issue_watermark(&self) -> Timestamp {
        self.cursor.since()
    }

    // -----------------------------------------------------------------------
    // Issues
    // -----------------------------------------------------------------------

    /// Returns open issues created since the previous successful poll.
    pub async fn poll_issues(&mut self) -> Result<Vec<Issue>, StorageError> {
        self.cursor.poll(&self.host).await
    }

    /// Issues of one repository updated within the last month.
    pub async fn repository_issues(&self, repository: &RepositoryRef) -> HostResult<Vec<Issue>> {
        let since = Timestamp::now().months_before(REPOSITORY_ISSUE_WINDOW_MONTHS);
        self.host.list_repository_issues(repository, since).await
    }

    pub async fn close_issue(&self, issue: &Issue) -> HostResult<()> {
        IssueCloser::new(&self.host).close(issue).await
    }

    pub async fn close_issue_number(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
    ) -> HostResult<()> {
        IssueCloser::new(&self.host)
            .close_number(repository, number)
            .await
    }

    pub async fn create_issue_comment(
        &self,
        repository: RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> HostResult<IssueComment> {
        self.host.create_issue_comment(repository, number, body).await
    }

    // -----------------------------------------------------------------------
    // Content, commits, references
    // -----------------------------------------------------------------------

    /// Creates or updates one file; see [`ContentReconciler::reconcile`].
    pub async fn create_or_update_file(&self, request: &WriteFileRequest) -> HostResult<ChangeSet> {
        ContentReconciler::new(&self.host).reconcile(request).await
    }

    pub async fn commits(
        &self,
        repository: RepositoryId,
        query: &CommitQuery,
    ) -> HostResult<Vec<Commit>> {
        self.host.list_commits(repository, query).await
    }

    pub async fn branch(&self, repository: RepositoryId, name: &BranchName) -> HostResult<Branch> {
        self.host.get_branch(repository, name).await
    }

    pub async fn create_reference(
        &self,
        repository: RepositoryId,
        reference: &NewReference,
    ) -> HostResult<Reference> {
        self.host.create_reference(repository, reference).await
    }

    // -----------------------------------------------------------------------
    // Pull requests
    // -----------------------------------------------------------------------

    pub async fn pull_requests(&self, repository: &RepositoryRef) -> HostResult<Vec<PullRequest>> {
        self.host.list_pull_requests(repository).await
    }

    pub async fn pull_requests_by_id(
        &self,
        repository: RepositoryId,
        pages: PageOptions,
    ) -> HostResult<Vec<PullRequest>> {
        self.host.list_pull_requests_by_id(repository, pages).await
    }

    pub async fn pull_request(
        &self,
        repository: RepositoryId,
        number: PullRequestNumber,
    ) -> HostResult<PullRequest> {
        self.host.get_pull_request(repository, number).await
    }

    // -----------------------------------------------------------------------
    // Organizations
    // -----------------------------------------------------------------------

    pub async fn organization_members(
        &self,
        organization: &OrganizationName,
    ) -> HostResult<Vec<User>> {
        self.host.list_members(organization).await
    }

    pub async fn repositories(
        &self,
        organization: &OrganizationName,
    ) -> HostResult<Vec<Repository>> {
        self.host.list_repositories(organization).await
    }

    // -----------------------------------------------------------------------
    // Migrations
    // -----------------------------------------------------------------------

    pub async fn start_migration(
        &self,
        organization: &OrganizationName,
        repositories: &[RepositoryName],
    ) -> HostResult<Migration> {
        MigrationArchives::new(&self.host)
            .start(organization, repositories)
            .await
    }

    pub async fn migrations(&self, organization: &OrganizationName) -> HostResult<Vec<Migration>> {
        MigrationArchives::new(&self.host).list(organization).await
    }

    /// Saves an exported migration's archive to `destination`.
    pub async fn save_migration_archive(
        &self,
        organization: &OrganizationName,
        migration: MigrationId,
        destination: &Path,
    ) -> Result<u64, StorageError> {
        MigrationArchives::new(&self.host)
            .download_archive(organization, migration, destination)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{hash, issue_created_at, repo_ref, ts, Call, FakeHost};
    use crate::resources::TreeEntry;

    fn storage() -> HostStorage<FakeHost> {
        HostStorage::new(FakeHost::default(), OwnerName::new("octo").unwrap())
    }

    #[tokio::test]
    async fn poll_issues_advances_the_facade_watermark() {
        let mut storage = HostStorage::with_cursor(
            FakeHost::default(),
            OwnerName::new("octo").unwrap(),
            PollCursor::starting_at(ts("2024-05-01T00:00:00Z")),
        );
        storage
            .host()
            .push_issue_batch(Ok(vec![issue_created_at(1, "2024-05-01T01:00:00Z")]));

        let issues = storage.poll_issues().await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(storage.issue_watermark(), ts("2024-05-01T01:00:00Z"));
    }

    #[tokio::test]
    async fn create_or_update_file_routes_through_the_tree_scan() {
        let storage = storage();
        storage
            .host()
            .set_tree(vec![TreeEntry::blob("docs/readme.md", hash("abc123"))]);

        let request = WriteFileRequest {
            repository: RepositoryId::new(7),
            branch: BranchName::new("main").unwrap(),
            path: crate::identifiers::RepositoryPath::new("docs/readme.md").unwrap(),
            content: "new text".into(),
            message: "update docs".into(),
        };
        storage.create_or_update_file(&request).await.unwrap();

        assert!(storage
            .host()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::UpdateFile(_, u) if u.base_content_hash == hash("abc123"))));
    }

    #[tokio::test]
    async fn repository_issues_look_back_one_month() {
        let storage = storage();
        let before = Timestamp::now().months_before(1);
        storage
            .repository_issues(&repo_ref("octo", "widgets"))
            .await
            .unwrap();
        let after = Timestamp::now().months_before(1);

        match storage.host().calls().as_slice() {
            [Call::ListRepositoryIssues(repository, since)] => {
                assert_eq!(repository, &repo_ref("octo", "widgets"));
                assert!(*since >= before && *since <= after);
            }
            other => panic!("unexpected calls {other:?}"),
        }
    }

    #[tokio::test]
    async fn pass_through_accessors_reach_the_host_once_each() {
        let storage = storage();
        let org = OrganizationName::new("acme").unwrap();

        storage.organization_members(&org).await.unwrap();
        storage.repositories(&org).await.unwrap();
        storage.migrations(&org).await.unwrap();
        storage
            .commits(RepositoryId::new(1), &CommitQuery::default())
            .await
            .unwrap();
        storage
            .pull_requests_by_id(RepositoryId::new(1), PageOptions::default())
            .await
            .unwrap();
        storage
            .create_issue_comment(RepositoryId::new(1), IssueNumber::new(4), "thanks")
            .await
            .unwrap();

        assert_eq!(
            storage.host().calls(),
            vec![
                Call::ListMembers(org.clone()),
                Call::ListRepositories(org.clone()),
                Call::ListMigrations(org),
                Call::ListCommits(RepositoryId::new(1), CommitQuery::default()),
                Call::ListPullRequestsById(RepositoryId::new(1), PageOptions::default()),
                Call::CreateIssueComment(RepositoryId::new(1), IssueNumber::new(4), "thanks".into()),
            ]
        );
    }

    #[test]
    fn default_interaction_interval_can_be_overridden() {
        let storage = storage().with_minimum_interaction_interval(InteractionInterval::new(
            std::time::Duration::from_secs(5),
        ));
        assert_eq!(
            storage.minimum_interaction_interval().as_duration(),
            std::time::Duration::from_secs(5)
        );
    }
}
