//! Organization migration requests and archive retrieval.
//!
//! Waiting for a migration to reach [`MigrationState::Exported`] is the
//! caller's job; [`MigrationArchives::download_archive`] assumes it already
//! has.
//!
//! [`MigrationState::Exported`]: crate::types::MigrationState::Exported

use std::path::Path;

use tracing::debug;

use crate::errors::StorageError;
use crate::identifiers::{MigrationId, OrganizationName, RepositoryName};
use crate::ports::{HostResult, MigrationService};
use crate::resources::Migration;

/// Starts migrations and saves their archives.
pub struct MigrationArchives<'a, M: ?Sized> {
    service: &'a M,
}

impl<'a, M> MigrationArchives<'a, M>
where
    M: MigrationService + ?Sized,
{
    pub fn new(service: &'a M) -> Self {
        Self { service }
    }

    /// Requests an export of `repositories` from `organization`.
    #[tracing::instrument(skip_all, fields(organization = %organization, repositories = repositories.len()))]
    pub async fn start(
        &self,
        organization: &OrganizationName,
        repositories: &[RepositoryName],
    ) -> HostResult<Migration> {
        let migration = self
            .service
            .start_migration(organization, repositories)
            .await?;
        debug!(migration = %migration.id, state = ?migration.state, "Migration requested");
        Ok(migration)
    }

    /// Lists the organization's recent migrations.
    pub async fn list(&self, organization: &OrganizationName) -> HostResult<Vec<Migration>> {
        self.service.list_migrations(organization).await
    }

    /// Fetches the archive of `migration` and writes it to `destination`,
    /// replacing any existing file.
    ///
    /// Returns the number of bytes written. The bytes are not verified.
    #[tracing::instrument(skip_all, fields(organization = %organization, migration = %migration, destination = %destination.display()))]
    pub async fn download_archive(
        &self,
        organization: &OrganizationName,
        migration: MigrationId,
        destination: &Path,
    ) -> Result<u64, StorageError> {
        let archive = self
            .service
            .get_migration_archive(organization, migration)
            .await?;
        tokio::fs::write(destination, &archive)
            .await
            .map_err(|source| StorageError::Io {
                path: destination.to_path_buf(),
                source,
            })?;
        debug!(bytes = archive.len(), "Migration archive saved");
        Ok(archive.len() as u64)
    }
}
