//! [`CodeRepository`] over the branches, git data, contents, and commits APIs.
//!
//! All routes address the repository by numeric id through
//! `/repositories/{id}/...`, so renames between calls do not matter.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use storage::{
    Branch, BranchName, ChangeSet, CodeRepository, Commit, CommitQuery, CommitSha,
    CreateFileRequest, FileContent, HostResult, NewReference, PageOptions, Reference,
    RepositoryId, RepositoryPath, TreeEntry, UpdateFileRequest,
};

use crate::client::GithubClient;
use crate::wire::{
    encode_base64, WireBranch, WireCommit, WireContent, WireContentChange, WireReference,
    WireTree,
};

/// Body of `PUT /repositories/{id}/contents/{path}`.
#[derive(Debug, Serialize)]
struct ContentWrite<'a> {
    message: &'a str,
    /// Base64 of the new content.
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

impl GithubClient {
    async fn put_content(
        &self,
        repository: RepositoryId,
        path: &RepositoryPath,
        body: ContentWrite<'_>,
    ) -> HostResult<ChangeSet> {
        let url = self.endpoint(&[
            "repositories",
            &repository.to_string(),
            "contents",
            path.as_str(),
        ]);
        let change: WireContentChange = self.send_json(self.put(url).json(&body)).await?;
        change.into_change_set()
    }
}

#[async_trait]
impl CodeRepository for GithubClient {
    async fn get_branch(
        &self,
        repository: RepositoryId,
        branch: &BranchName,
    ) -> HostResult<Branch> {
        let url = self.endpoint(&[
            "repositories",
            &repository.to_string(),
            "branches",
            branch.as_str(),
        ]);
        let wire: WireBranch = self.send_json(self.get(url)).await?;
        wire.into_branch()
    }

    async fn get_tree_recursive(
        &self,
        repository: RepositoryId,
        commit: &CommitSha,
    ) -> HostResult<Vec<TreeEntry>> {
        let url = self.endpoint(&[
            "repositories",
            &repository.to_string(),
            "git",
            "trees",
            commit.as_str(),
        ]);
        let tree: WireTree = self
            .send_json(self.get(url).query(&[("recursive", "1")]))
            .await?;
        if tree.truncated {
            // Paths past the cut-off will look absent to a tree scan.
            tracing::warn!(repository = %repository, commit = %commit, "Recursive tree listing was truncated");
        }
        tree.into_entries()
    }

    async fn get_file_content(
        &self,
        repository: RepositoryId,
        path: &RepositoryPath,
        branch: &BranchName,
    ) -> HostResult<FileContent> {
        let url = self.endpoint(&[
            "repositories",
            &repository.to_string(),
            "contents",
            path.as_str(),
        ]);
        let content: WireContent = self
            .send_json(self.get(url).query(&[("ref", branch.as_str())]))
            .await?;
        content.into_file_content()
    }

    #[tracing::instrument(skip(self, request), fields(path = %request.path, branch = %request.branch))]
    async fn create_file(
        &self,
        repository: RepositoryId,
        request: &CreateFileRequest,
    ) -> HostResult<ChangeSet> {
        self.put_content(
            repository,
            &request.path,
            ContentWrite {
                message: &request.message,
                content: encode_base64(&request.content),
                branch: request.branch.as_str(),
                sha: None,
            },
        )
        .await
    }

    #[tracing::instrument(skip(self, request), fields(path = %request.path, branch = %request.branch, base = %request.base_content_hash))]
    async fn update_file(
        &self,
        repository: RepositoryId,
        request: &UpdateFileRequest,
    ) -> HostResult<ChangeSet> {
        self.put_content(
            repository,
            &request.path,
            ContentWrite {
                message: &request.message,
                content: encode_base64(&request.content),
                branch: request.branch.as_str(),
                sha: Some(request.base_content_hash.as_str()),
            },
        )
        .await
    }

    async fn list_commits(
        &self,
        repository: RepositoryId,
        query: &CommitQuery,
    ) -> HostResult<Vec<Commit>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(sha) = &query.sha {
            params.push(("sha", sha.clone()));
        }
        if let Some(path) = &query.path {
            params.push(("path", path.clone()));
        }
        if let Some(author) = &query.author {
            params.push(("author", author.clone()));
        }
        if let Some(since) = query.since {
            params.push(("since", since.to_string()));
        }
        if let Some(until) = query.until {
            params.push(("until", until.to_string()));
        }

        let rows: Vec<WireCommit> = self
            .paginate(
                self.endpoint(&["repositories", &repository.to_string(), "commits"]),
                &params,
                PageOptions::default(),
            )
            .await?;
        rows.into_iter().map(WireCommit::into_commit).collect()
    }

    async fn create_reference(
        &self,
        repository: RepositoryId,
        reference: &NewReference,
    ) -> HostResult<Reference> {
        let url = self.endpoint(&["repositories", &repository.to_string(), "git", "refs"]);
        let wire: WireReference = self
            .send_json(self.post(url).json(&json!({
                "ref": reference.name,
                "sha": reference.sha.as_str(),
            })))
            .await?;
        wire.into_reference()
    }
}
