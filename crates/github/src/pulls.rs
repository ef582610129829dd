//! [`PullRequestSource`] over the pulls API.

use async_trait::async_trait;
use storage::{
    HostResult, PageOptions, PullRequest, PullRequestNumber, PullRequestSource, RepositoryId,
    RepositoryRef,
};

use crate::client::GithubClient;
use crate::wire::WirePullRequest;

#[async_trait]
impl PullRequestSource for GithubClient {
    async fn list_pull_requests(
        &self,
        repository: &RepositoryRef,
    ) -> HostResult<Vec<PullRequest>> {
        let rows: Vec<WirePullRequest> = self
            .paginate(
                self.endpoint(&[
                    "repos",
                    repository.owner.as_str(),
                    repository.name.as_str(),
                    "pulls",
                ]),
                &[],
                PageOptions::default(),
            )
            .await?;
        rows.into_iter()
            .map(WirePullRequest::into_pull_request)
            .collect()
    }

    async fn list_pull_requests_by_id(
        &self,
        repository: RepositoryId,
        pages: PageOptions,
    ) -> HostResult<Vec<PullRequest>> {
        let rows: Vec<WirePullRequest> = self
            .paginate(
                self.endpoint(&["repositories", &repository.to_string(), "pulls"]),
                &[],
                pages,
            )
            .await?;
        rows.into_iter()
            .map(WirePullRequest::into_pull_request)
            .collect()
    }

    async fn get_pull_request(
        &self,
        repository: RepositoryId,
        number: PullRequestNumber,
    ) -> HostResult<PullRequest> {
        let url = self.endpoint(&[
            "repositories",
            &repository.to_string(),
            "pulls",
            &number.to_string(),
        ]);
        let wire: WirePullRequest = self.send_json(self.get(url)).await?;
        wire.into_pull_request()
    }
}
