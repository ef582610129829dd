//! [`MigrationService`] over `/orgs/{org}/migrations`.

use async_trait::async_trait;
use serde_json::json;
use storage::{
    HostResult, Migration, MigrationId, MigrationService, OrganizationName, PageOptions,
    RepositoryName,
};

use crate::client::GithubClient;
use crate::wire::WireMigration;

#[async_trait]
impl MigrationService for GithubClient {
    #[tracing::instrument(skip(self, repositories), fields(repositories = repositories.len()))]
    async fn start_migration(
        &self,
        organization: &OrganizationName,
        repositories: &[RepositoryName],
    ) -> HostResult<Migration> {
        let names: Vec<&str> = repositories.iter().map(RepositoryName::as_str).collect();
        let url = self.endpoint(&["orgs", organization.as_str(), "migrations"]);
        let wire: WireMigration = self
            .send_json(self.post(url).json(&json!({ "repositories": names })))
            .await?;
        wire.into_migration(organization)
    }

    async fn list_migrations(
        &self,
        organization: &OrganizationName,
    ) -> HostResult<Vec<Migration>> {
        let rows: Vec<WireMigration> = self
            .paginate(
                self.endpoint(&["orgs", organization.as_str(), "migrations"]),
                &[],
                PageOptions::default(),
            )
            .await?;
        rows.into_iter()
            .map(|row| row.into_migration(organization))
            .collect()
    }

    /// GitHub answers with a redirect to short-lived blob storage; the HTTP
    /// client follows it and drops the authorization header on the way.
    async fn get_migration_archive(
        &self,
        organization: &OrganizationName,
        migration: MigrationId,
    ) -> HostResult<Vec<u8>> {
        let url = self.endpoint(&[
            "orgs",
            organization.as_str(),
            "migrations",
            &migration.to_string(),
            "archive",
        ]);
        self.send_bytes(self.get(url)).await
    }
}
