//! [`OrganizationDirectory`] over `/orgs/{org}/members` and `/orgs/{org}/repos`.

use async_trait::async_trait;
use storage::{HostResult, OrganizationDirectory, OrganizationName, PageOptions, Repository, User};

use crate::client::GithubClient;
use crate::wire::{WireRepository, WireUser};

#[async_trait]
impl OrganizationDirectory for GithubClient {
    async fn list_members(&self, organization: &OrganizationName) -> HostResult<Vec<User>> {
        let rows: Vec<WireUser> = self
            .paginate(
                self.endpoint(&["orgs", organization.as_str(), "members"]),
                &[],
                PageOptions::default(),
            )
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn list_repositories(
        &self,
        organization: &OrganizationName,
    ) -> HostResult<Vec<Repository>> {
        let rows: Vec<WireRepository> = self
            .paginate(
                self.endpoint(&["orgs", organization.as_str(), "repos"]),
                &[],
                PageOptions::default(),
            )
            .await?;
        rows.into_iter()
            .map(WireRepository::into_repository)
            .collect()
    }
}
