//! In-memory port fakes shared by this crate's unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::HostError;
use crate::identifiers::{
    BranchName, CommentId, CommitSha, ContentHash, IssueNumber, MigrationId, OrganizationName,
    OwnerName, PullRequestNumber, RepositoryId, RepositoryName, RepositoryPath,
};
use crate::ports::{
    CodeRepository, HostResult, IssueTracker, MigrationService, OrganizationDirectory,
    PullRequestSource,
};
use crate::resources::{
    Branch, ChangeSet, Commit, FileContent, Issue, IssueComment, Migration, NewReference,
    PullRequest, Reference, Repository, RepositoryRef, TreeEntry, User,
};
use crate::types::{
    CommitQuery, CommitRef, CreateFileRequest, IssueQuery, ItemState, MigrationState,
    PageOptions, Timestamp, UpdateFileRequest,
};

pub(crate) fn ts(value: &str) -> Timestamp {
    Timestamp::parse_rfc3339(value).expect("valid RFC 3339 timestamp")
}

pub(crate) fn hash(value: &str) -> ContentHash {
    ContentHash::new(value).expect("non-empty hash")
}

pub(crate) fn repo_ref(owner: &str, name: &str) -> RepositoryRef {
    RepositoryRef {
        owner: OwnerName::new(owner).expect("owner"),
        name: RepositoryName::new(name).expect("name"),
    }
}

pub(crate) fn issue_created_at(number: u64, created_at: &str) -> Issue {
    Issue {
        id: 1000 + number,
        number: IssueNumber::new(number),
        title: format!("Issue {number}"),
        state: ItemState::Open,
        created_at: ts(created_at),
        repository: repo_ref("octo", "widgets"),
        author: None,
        html_url: None,
    }
}

/// Every call a [`FakeHost`] has received, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListIssues(IssueQuery),
    ListRepositoryIssues(RepositoryRef, Timestamp),
    UpdateIssueState(RepositoryRef, IssueNumber, ItemState),
    CreateIssueComment(RepositoryId, IssueNumber, String),
    GetBranch(RepositoryId, BranchName),
    GetTree(RepositoryId, CommitSha),
    GetFileContent(RepositoryId, RepositoryPath, BranchName),
    CreateFile(RepositoryId, CreateFileRequest),
    UpdateFile(RepositoryId, UpdateFileRequest),
    ListCommits(RepositoryId, CommitQuery),
    CreateReference(RepositoryId, NewReference),
    ListPullRequests(RepositoryRef),
    ListPullRequestsById(RepositoryId, PageOptions),
    GetPullRequest(RepositoryId, PullRequestNumber),
    StartMigration(OrganizationName, Vec<RepositoryName>),
    ListMigrations(OrganizationName),
    GetMigrationArchive(OrganizationName, MigrationId),
    ListMembers(OrganizationName),
    ListRepositories(OrganizationName),
}

/// Scriptable, recording implementation of every port.
#[derive(Default)]
pub(crate) struct FakeHost {
    calls: Mutex<Vec<Call>>,
    issue_batches: Mutex<VecDeque<HostResult<Vec<Issue>>>>,
    branch_head: Mutex<Option<HostResult<CommitSha>>>,
    tree: Mutex<Vec<TreeEntry>>,
    file_content_error: Mutex<Option<HostError>>,
    create_error: Mutex<Option<HostError>>,
    update_error: Mutex<Option<HostError>>,
    issue_update_error: Mutex<Option<HostError>>,
    archive: Mutex<Option<HostResult<Vec<u8>>>>,
}

impl FakeHost {
    pub(crate) fn push_issue_batch(&self, batch: HostResult<Vec<Issue>>) {
        self.issue_batches.lock().unwrap().push_back(batch);
    }

    pub(crate) fn set_branch_head(&self, head: HostResult<&str>) {
        *self.branch_head.lock().unwrap() =
            Some(head.map(|sha| CommitSha::new(sha).expect("sha")));
    }

    pub(crate) fn set_tree(&self, entries: Vec<TreeEntry>) {
        *self.tree.lock().unwrap() = entries;
    }

    pub(crate) fn fail_file_content(&self, error: HostError) {
        *self.file_content_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fail_create(&self, error: HostError) {
        *self.create_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fail_update(&self, error: HostError) {
        *self.update_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fail_issue_update(&self, error: HostError) {
        *self.issue_update_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn set_archive(&self, archive: HostResult<Vec<u8>>) {
        *self.archive.lock().unwrap() = Some(archive);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn issue_queries(&self) -> Vec<IssueQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ListIssues(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn tree_hash_for(&self, path: &RepositoryPath) -> Option<ContentHash> {
        self.tree
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.path == path.as_str())
            .map(|entry| entry.content_hash.clone())
    }

    fn change_set(path: &RepositoryPath) -> ChangeSet {
        ChangeSet {
            commit: CommitRef {
                sha: CommitSha::new("c0ffee").expect("sha"),
            },
            path: path.clone(),
            content_hash: hash("new-blob"),
        }
    }
}

#[async_trait]
impl IssueTracker for FakeHost {
    async fn list_issues(&self, query: &IssueQuery) -> HostResult<Vec<Issue>> {
        self.record(Call::ListIssues(query.clone()));
        self.issue_batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_repository_issues(
        &self,
        repository: &RepositoryRef,
        since: Timestamp,
    ) -> HostResult<Vec<Issue>> {
        self.record(Call::ListRepositoryIssues(repository.clone(), since));
        Ok(Vec::new())
    }

    async fn update_issue_state(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
        state: ItemState,
    ) -> HostResult<()> {
        self.record(Call::UpdateIssueState(repository.clone(), number, state));
        match self.issue_update_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn create_issue_comment(
        &self,
        repository: RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> HostResult<IssueComment> {
        self.record(Call::CreateIssueComment(repository, number, body.to_string()));
        Ok(IssueComment {
            id: CommentId::new(1),
            body: body.to_string(),
            html_url: None,
        })
    }
}

#[async_trait]
impl CodeRepository for FakeHost {
    async fn get_branch(
        &self,
        repository: RepositoryId,
        branch: &BranchName,
    ) -> HostResult<Branch> {
        self.record(Call::GetBranch(repository, branch.clone()));
        let head = self
            .branch_head
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(CommitSha::new("head-sha").expect("sha")))?;
        Ok(Branch {
            name: branch.clone(),
            head: CommitRef { sha: head },
        })
    }

    async fn get_tree_recursive(
        &self,
        repository: RepositoryId,
        commit: &CommitSha,
    ) -> HostResult<Vec<TreeEntry>> {
        self.record(Call::GetTree(repository, commit.clone()));
        Ok(self.tree.lock().unwrap().clone())
    }

    async fn get_file_content(
        &self,
        repository: RepositoryId,
        path: &RepositoryPath,
        branch: &BranchName,
    ) -> HostResult<FileContent> {
        self.record(Call::GetFileContent(repository, path.clone(), branch.clone()));
        if let Some(error) = self.file_content_error.lock().unwrap().clone() {
            return Err(error);
        }
        let content_hash = self.tree_hash_for(path).ok_or_else(|| HostError::NotFound {
            resource: path.to_string(),
        })?;
        Ok(FileContent {
            path: path.clone(),
            content_hash,
            size: 0,
            bytes: Vec::new(),
        })
    }

    async fn create_file(
        &self,
        repository: RepositoryId,
        request: &CreateFileRequest,
    ) -> HostResult<ChangeSet> {
        self.record(Call::CreateFile(repository, request.clone()));
        match self.create_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(Self::change_set(&request.path)),
        }
    }

    async fn update_file(
        &self,
        repository: RepositoryId,
        request: &UpdateFileRequest,
    ) -> HostResult<ChangeSet> {
        self.record(Call::UpdateFile(repository, request.clone()));
        match self.update_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(Self::change_set(&request.path)),
        }
    }

    async fn list_commits(
        &self,
        repository: RepositoryId,
        query: &CommitQuery,
    ) -> HostResult<Vec<Commit>> {
        self.record(Call::ListCommits(repository, query.clone()));
        Ok(Vec::new())
    }

    async fn create_reference(
        &self,
        repository: RepositoryId,
        reference: &NewReference,
    ) -> HostResult<Reference> {
        self.record(Call::CreateReference(repository, reference.clone()));
        Ok(Reference {
            name: reference.name.clone(),
            object: CommitRef {
                sha: reference.sha.clone(),
            },
        })
    }
}

#[async_trait]
impl PullRequestSource for FakeHost {
    async fn list_pull_requests(
        &self,
        repository: &RepositoryRef,
    ) -> HostResult<Vec<PullRequest>> {
        self.record(Call::ListPullRequests(repository.clone()));
        Ok(Vec::new())
    }

    async fn list_pull_requests_by_id(
        &self,
        repository: RepositoryId,
        pages: PageOptions,
    ) -> HostResult<Vec<PullRequest>> {
        self.record(Call::ListPullRequestsById(repository, pages));
        Ok(Vec::new())
    }

    async fn get_pull_request(
        &self,
        repository: RepositoryId,
        number: PullRequestNumber,
    ) -> HostResult<PullRequest> {
        self.record(Call::GetPullRequest(repository, number));
        Err(HostError::NotFound {
            resource: format!("pull request {number}"),
        })
    }
}

#[async_trait]
impl MigrationService for FakeHost {
    async fn start_migration(
        &self,
        organization: &OrganizationName,
        repositories: &[RepositoryName],
    ) -> HostResult<Migration> {
        self.record(Call::StartMigration(
            organization.clone(),
            repositories.to_vec(),
        ));
        Ok(Migration {
            id: MigrationId::new(79),
            organization: organization.clone(),
            state: MigrationState::Pending,
            repositories: repositories.to_vec(),
            created_at: None,
        })
    }

    async fn list_migrations(
        &self,
        organization: &OrganizationName,
    ) -> HostResult<Vec<Migration>> {
        self.record(Call::ListMigrations(organization.clone()));
        Ok(Vec::new())
    }

    async fn get_migration_archive(
        &self,
        organization: &OrganizationName,
        migration: MigrationId,
    ) -> HostResult<Vec<u8>> {
        self.record(Call::GetMigrationArchive(organization.clone(), migration));
        self.archive
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl OrganizationDirectory for FakeHost {
    async fn list_members(&self, organization: &OrganizationName) -> HostResult<Vec<User>> {
        self.record(Call::ListMembers(organization.clone()));
        Ok(Vec::new())
    }

    async fn list_repositories(
        &self,
        organization: &OrganizationName,
    ) -> HostResult<Vec<Repository>> {
        self.record(Call::ListRepositories(organization.clone()));
        Ok(Vec::new())
    }
}
