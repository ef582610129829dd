//! GitHub REST payloads and their conversion into `storage` resources.
//!
//! Only the fields this crate reads are declared; everything else GitHub sends
//! is ignored. Conversion fails with [`HostError::Decode`] when a field the
//! domain requires is empty or malformed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use storage::{
    Branch, BranchName, ChangeSet, Commit, CommitRef, CommitSha, CommentId, ContentHash,
    FileContent, HostResult, Issue, IssueComment, IssueNumber, ItemState, Migration,
    MigrationId, MigrationState, OrganizationName, OwnerName, PullRequest, PullRequestNumber,
    Reference, Repository, RepositoryId, RepositoryName, RepositoryPath, RepositoryRef,
    Timestamp, TreeEntry, TreeEntryKind, User, UserId,
};

use crate::status::decode_error;

fn required<T>(value: Option<T>, field: &str) -> HostResult<T> {
    value.ok_or_else(|| decode_error(field, "missing or empty"))
}

fn item_state(raw: &str) -> HostResult<ItemState> {
    match raw {
        "open" => Ok(ItemState::Open),
        "closed" => Ok(ItemState::Closed),
        other => Err(decode_error("state", format!("unknown value '{other}'"))),
    }
}

// ---------------------------------------------------------------------------
// Users and repositories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
    id: u64,
    login: String,
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        User {
            id: UserId::new(wire.id),
            login: wire.login,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRepository {
    id: u64,
    name: String,
    owner: WireUser,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    private: bool,
}

impl WireRepository {
    fn coordinates(&self) -> HostResult<RepositoryRef> {
        Ok(RepositoryRef {
            owner: required(OwnerName::new(self.owner.login.clone()), "repository.owner.login")?,
            name: required(RepositoryName::new(self.name.clone()), "repository.name")?,
        })
    }

    pub(crate) fn into_repository(self) -> HostResult<Repository> {
        Ok(Repository {
            id: RepositoryId::new(self.id),
            coordinates: self.coordinates()?,
            default_branch: self.default_branch.and_then(BranchName::new),
            private: self.private,
        })
    }
}

/// Recovers `owner/name` from an API URL ending in `/repos/{owner}/{name}`.
fn repository_from_url(url: &str) -> HostResult<RepositoryRef> {
    let mut segments = url.trim_end_matches('/').rsplit('/');
    let name = segments.next().and_then(RepositoryName::new);
    let owner = segments.next().and_then(OwnerName::new);
    match (owner, name) {
        (Some(owner), Some(name)) => Ok(RepositoryRef { owner, name }),
        _ => Err(decode_error("repository_url", format!("cannot parse '{url}'"))),
    }
}

// ---------------------------------------------------------------------------
// Issues and comments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireIssue {
    id: u64,
    number: u64,
    title: String,
    state: String,
    pub(crate) created_at: Timestamp,
    repository_url: String,
    #[serde(default)]
    repository: Option<WireRepository>,
    #[serde(default)]
    user: Option<WireUser>,
    #[serde(default)]
    html_url: Option<String>,
}

impl WireIssue {
    pub(crate) fn into_issue(self) -> HostResult<Issue> {
        let repository = match &self.repository {
            Some(repository) => repository.coordinates()?,
            None => repository_from_url(&self.repository_url)?,
        };
        Ok(Issue {
            id: self.id,
            number: IssueNumber::new(self.number),
            title: self.title,
            state: item_state(&self.state)?,
            created_at: self.created_at,
            repository,
            author: self.user.map(User::from),
            html_url: self.html_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
}

impl From<WireComment> for IssueComment {
    fn from(wire: WireComment) -> Self {
        IssueComment {
            id: CommentId::new(wire.id),
            body: wire.body.unwrap_or_default(),
            html_url: wire.html_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Git data: branches, trees, commits, references
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireSha {
    sha: String,
}

impl WireSha {
    fn into_commit_ref(self, field: &str) -> HostResult<CommitRef> {
        Ok(CommitRef {
            sha: required(CommitSha::new(self.sha), field)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireBranch {
    name: String,
    commit: WireSha,
}

impl WireBranch {
    pub(crate) fn into_branch(self) -> HostResult<Branch> {
        Ok(Branch {
            name: required(BranchName::new(self.name), "branch.name")?,
            head: self.commit.into_commit_ref("branch.commit.sha")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTree {
    tree: Vec<WireTreeItem>,
    #[serde(default)]
    pub(crate) truncated: bool,
}

#[derive(Debug, Deserialize)]
struct WireTreeItem {
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

impl WireTree {
    pub(crate) fn into_entries(self) -> HostResult<Vec<TreeEntry>> {
        self.tree
            .into_iter()
            .map(|item| {
                let kind = match item.kind.as_str() {
                    "blob" => TreeEntryKind::Blob,
                    "tree" => TreeEntryKind::Tree,
                    "commit" => TreeEntryKind::Commit,
                    other => {
                        return Err(decode_error("tree.type", format!("unknown value '{other}'")))
                    }
                };
                Ok(TreeEntry {
                    path: item.path,
                    content_hash: required(ContentHash::new(item.sha), "tree.sha")?,
                    kind,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCommit {
    sha: String,
    commit: WireCommitDetail,
    #[serde(default)]
    author: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
struct WireCommitDetail {
    message: String,
    #[serde(default)]
    author: Option<WireSignature>,
}

#[derive(Debug, Deserialize)]
struct WireSignature {
    #[serde(default)]
    date: Option<Timestamp>,
}

impl WireCommit {
    pub(crate) fn into_commit(self) -> HostResult<Commit> {
        Ok(Commit {
            sha: required(CommitSha::new(self.sha), "commit.sha")?,
            message: self.commit.message,
            author_login: self.author.map(|user| user.login),
            authored_at: self.commit.author.and_then(|signature| signature.date),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireReference {
    #[serde(rename = "ref")]
    name: String,
    object: WireSha,
}

impl WireReference {
    pub(crate) fn into_reference(self) -> HostResult<Reference> {
        Ok(Reference {
            name: self.name,
            object: self.object.into_commit_ref("ref.object.sha")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireContent {
    path: String,
    sha: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl WireContent {
    pub(crate) fn into_file_content(self) -> HostResult<FileContent> {
        let bytes = match (self.content.as_deref(), self.encoding.as_deref()) {
            (Some(content), Some("base64")) => decode_base64(content)?,
            (Some(content), _) => content.as_bytes().to_vec(),
            (None, _) => Vec::new(),
        };
        Ok(FileContent {
            path: required(RepositoryPath::new(self.path), "content.path")?,
            content_hash: required(ContentHash::new(self.sha), "content.sha")?,
            size: self.size,
            bytes,
        })
    }
}

/// GitHub wraps base64 content at 60 columns.
fn decode_base64(content: &str) -> HostResult<Vec<u8>> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|error| decode_error("content", error))
}

pub(crate) fn encode_base64(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireContentChange {
    content: Option<WireContentInfo>,
    commit: WireSha,
}

#[derive(Debug, Deserialize)]
struct WireContentInfo {
    path: String,
    sha: String,
}

impl WireContentChange {
    pub(crate) fn into_change_set(self) -> HostResult<ChangeSet> {
        let content = required(self.content, "content")?;
        Ok(ChangeSet {
            commit: self.commit.into_commit_ref("commit.sha")?,
            path: required(RepositoryPath::new(content.path), "content.path")?,
            content_hash: required(ContentHash::new(content.sha), "content.sha")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WirePullRequest {
    id: u64,
    number: u64,
    title: String,
    state: String,
    head: WireGitRef,
    base: WireGitRef,
    #[serde(default)]
    user: Option<WireUser>,
    created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
struct WireGitRef {
    #[serde(rename = "ref")]
    name: String,
}

impl WirePullRequest {
    pub(crate) fn into_pull_request(self) -> HostResult<PullRequest> {
        Ok(PullRequest {
            id: self.id,
            number: PullRequestNumber::new(self.number),
            title: self.title,
            state: item_state(&self.state)?,
            head_ref: self.head.name,
            base_ref: self.base.name,
            author: self.user.map(User::from),
            created_at: self.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Migrations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireMigration {
    id: u64,
    state: String,
    #[serde(default)]
    repositories: Vec<WireRepository>,
    #[serde(default)]
    created_at: Option<Timestamp>,
}

impl WireMigration {
    pub(crate) fn into_migration(self, organization: &OrganizationName) -> HostResult<Migration> {
        let state = match self.state.as_str() {
            "pending" => MigrationState::Pending,
            "exporting" => MigrationState::Exporting,
            "exported" => MigrationState::Exported,
            "failed" => MigrationState::Failed,
            other => {
                return Err(decode_error(
                    "migration.state",
                    format!("unknown value '{other}'"),
                ))
            }
        };
        let repositories = self
            .repositories
            .into_iter()
            .map(|repository| required(RepositoryName::new(repository.name), "repository.name"))
            .collect::<HostResult<Vec<_>>>()?;
        Ok(Migration {
            id: MigrationId::new(self.id),
            organization: organization.clone(),
            state,
            repositories,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storage::HostError;

    use super::*;

    #[test]
    fn issue_without_repository_object_takes_coordinates_from_url() {
        let wire: WireIssue = serde_json::from_value(json!({
            "id": 1,
            "number": 1347,
            "title": "Found a bug",
            "state": "open",
            "created_at": "2011-04-22T13:33:48Z",
            "repository_url": "https://api.github.com/repos/octocat/Hello-World",
            "user": { "id": 583231, "login": "octocat" }
        }))
        .unwrap();

        let issue = wire.into_issue().unwrap();
        assert_eq!(issue.repository.to_string(), "octocat/Hello-World");
        assert_eq!(issue.number, IssueNumber::new(1347));
        assert_eq!(issue.author.map(|u| u.login), Some("octocat".into()));
    }

    #[test]
    fn content_with_wrapped_base64_is_decoded() {
        let wire: WireContent = serde_json::from_value(json!({
            "type": "file",
            "path": "docs/readme.md",
            "sha": "abc123",
            "size": 11,
            "encoding": "base64",
            "content": "aGVsbG8g\nd29ybGQ=\n"
        }))
        .unwrap();

        let content = wire.into_file_content().unwrap();
        assert_eq!(content.bytes, b"hello world");
        assert_eq!(content.content_hash.as_str(), "abc123");
    }

    #[test]
    fn unknown_migration_state_is_a_decode_error() {
        let wire: WireMigration = serde_json::from_value(json!({
            "id": 79,
            "state": "archived",
            "repositories": []
        }))
        .unwrap();
        let error = wire
            .into_migration(&OrganizationName::new("acme").unwrap())
            .unwrap_err();
        assert!(matches!(error, HostError::Decode { .. }));
    }

    #[test]
    fn empty_tree_sha_is_rejected() {
        let wire: WireTree = serde_json::from_value(json!({
            "sha": "root",
            "tree": [{ "path": "a.txt", "mode": "100644", "type": "blob", "sha": "" }],
            "truncated": false
        }))
        .unwrap();
        assert!(wire.into_entries().is_err());
    }
}
