//! [`IssueTracker`] over `/issues` and `/repos/{owner}/{repo}/issues`.

use async_trait::async_trait;
use serde_json::json;
use storage::{
    HostResult, Issue, IssueComment, IssueNumber, IssueQuery, IssueTracker, ItemState,
    PageOptions, RepositoryId, RepositoryRef, Timestamp,
};

use crate::client::GithubClient;
use crate::wire::{WireComment, WireIssue};

#[async_trait]
impl IssueTracker for GithubClient {
    /// GitHub's `since` parameter filters on update time, so issues created
    /// before `query.since` are dropped here.
    #[tracing::instrument(skip_all, fields(filter = query.filter.as_str(), since = %query.since))]
    async fn list_issues(&self, query: &IssueQuery) -> HostResult<Vec<Issue>> {
        let rows: Vec<WireIssue> = self
            .paginate(
                self.endpoint(&["issues"]),
                &[
                    ("filter", query.filter.as_str().to_string()),
                    ("state", query.state.as_str().to_string()),
                    ("since", query.since.to_string()),
                ],
                PageOptions::default(),
            )
            .await?;
        let issues = rows
            .into_iter()
            .filter(|row| row.created_at >= query.since)
            .map(WireIssue::into_issue)
            .collect::<HostResult<Vec<_>>>()?;
        tracing::debug!(count = issues.len(), "Listed issues");
        Ok(issues)
    }

    async fn list_repository_issues(
        &self,
        repository: &RepositoryRef,
        since: Timestamp,
    ) -> HostResult<Vec<Issue>> {
        let rows: Vec<WireIssue> = self
            .paginate(
                self.endpoint(&[
                    "repos",
                    repository.owner.as_str(),
                    repository.name.as_str(),
                    "issues",
                ]),
                &[("since", since.to_string())],
                PageOptions::default(),
            )
            .await?;
        rows.into_iter().map(WireIssue::into_issue).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn update_issue_state(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
        state: ItemState,
    ) -> HostResult<()> {
        let url = self.endpoint(&[
            "repos",
            repository.owner.as_str(),
            repository.name.as_str(),
            "issues",
            &number.to_string(),
        ]);
        self.send(self.patch(url).json(&json!({ "state": state.as_str() })))
            .await?;
        Ok(())
    }

    async fn create_issue_comment(
        &self,
        repository: RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> HostResult<IssueComment> {
        let url = self.endpoint(&[
            "repositories",
            &repository.to_string(),
            "issues",
            &number.to_string(),
            "comments",
        ]);
        let comment: WireComment = self
            .send_json(self.post(url).json(&json!({ "body": body })))
            .await?;
        Ok(comment.into())
    }
}
