//! Subcommand implementations over [`HostStorage`].

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Serialize;
use storage::{
    BranchName, CommitQuery, CursorStore, HostStorage, IssueNumber, MigrationId,
    OwnerName, PageOptions, PollCursor, PullRequestNumber, RemoteHost, RepositoryId,
    RepositoryPath, RetryPolicy, StorageError, Timestamp, WriteFileRequest,
};
use tracing::{info, warn};

use crate::config::Settings;
use crate::cursor_file::JsonFileCursorStore;
use crate::Command;

pub(crate) async fn dispatch<H>(
    command: Command,
    host: H,
    owner: OwnerName,
    settings: &Settings,
) -> anyhow::Result<()>
where
    H: RemoteHost,
{
    match command {
        Command::PollIssues {
            watch,
            interval_secs,
        } => {
            let interval = Duration::from_secs(interval_secs);
            poll_command(host, owner, settings, watch, interval).await
        }
        command => storage_command(command, &HostStorage::new(host, owner)).await,
    }
}

async fn poll_command<H>(
    host: H,
    owner: OwnerName,
    settings: &Settings,
    watch: bool,
    interval: Duration,
) -> anyhow::Result<()>
where
    H: RemoteHost,
{
    match &settings.cursor_path {
        Some(path) => {
            let store = JsonFileCursorStore::new(path);
            let cursor = PollCursor::restore(store, Timestamp::now())
                .await
                .with_context(|| format!("Failed to restore cursor from '{}'", path.display()))?;
            let storage = HostStorage::with_cursor(host, owner, cursor)
                .with_minimum_interaction_interval(settings.minimum_interaction_interval);
            poll_issues(storage, watch, interval).await
        }
        None => {
            let storage = HostStorage::new(host, owner)
                .with_minimum_interaction_interval(settings.minimum_interaction_interval);
            poll_issues(storage, watch, interval).await
        }
    }
}

async fn storage_command<H>(command: Command, storage: &HostStorage<H>) -> anyhow::Result<()>
where
    H: RemoteHost,
{
    match command {
        Command::PollIssues { .. } => anyhow::bail!("poll-issues needs a cursor-aware façade"),
        Command::PutFile {
            repository_id,
            branch,
            path,
            message,
            from_file,
        } => {
            let content = tokio::fs::read_to_string(&from_file)
                .await
                .with_context(|| format!("Failed to read '{}'", from_file.display()))?;
            let request = WriteFileRequest {
                repository: RepositoryId::new(repository_id),
                branch: BranchName::new(branch).context("Branch must not be empty")?,
                path: RepositoryPath::new(path).context("Path must not be empty")?,
                content,
                message,
            };
            let change = storage
                .create_or_update_file(&request)
                .await
                .with_context(|| format!("Failed to write '{}'", request.path))?;
            info!(commit = %change.commit.sha, path = %change.path, "File written");
            print_json(&change)
        }
        Command::CloseIssue { repo, number } => {
            storage
                .close_issue_number(&repo, IssueNumber::new(number))
                .await
                .with_context(|| format!("Failed to close {repo}#{number}"))?;
            info!(repository = %repo, number, "Issue closed");
            Ok(())
        }
        Command::StartMigration { org, repositories } => {
            let migration = storage
                .start_migration(&org, &repositories)
                .await
                .with_context(|| format!("Failed to start migration for {org}"))?;
            print_json(&migration)
        }
        Command::ListMigrations { org } => {
            let migrations = storage
                .migrations(&org)
                .await
                .with_context(|| format!("Failed to list migrations for {org}"))?;
            print_json(&migrations)
        }
        Command::DownloadMigration { org, id, output } => {
            let written = storage
                .save_migration_archive(&org, MigrationId::new(id), &output)
                .await
                .with_context(|| format!("Failed to download migration {id} of {org}"))?;
            info!(bytes = written, output = %output.display(), "Archive saved");
            Ok(())
        }
        Command::Members { org } => {
            let members = storage
                .organization_members(&org)
                .await
                .with_context(|| format!("Failed to list members of {org}"))?;
            print_json(&members)
        }
        Command::Pulls {
            repo,
            repository_id,
            number,
            page,
            pages,
        } => {
            let result = match (repo, repository_id, number) {
                (_, Some(id), Some(number)) => storage
                    .pull_request(RepositoryId::new(id), PullRequestNumber::new(number))
                    .await
                    .map(|pull| vec![pull]),
                (_, Some(id), None) => {
                    let options = PageOptions {
                        start_page: page,
                        page_count: pages,
                        ..PageOptions::default()
                    };
                    storage
                        .pull_requests_by_id(RepositoryId::new(id), options)
                        .await
                }
                (Some(repo), None, _) => storage.pull_requests(&repo).await,
                (None, None, _) => anyhow::bail!("Pass --repo or --repository-id"),
            };
            print_json(&result.context("Failed to list pull requests")?)
        }
        Command::Commits {
            repository_id,
            sha,
            path,
            author,
            since,
            until,
        } => {
            let query = CommitQuery {
                sha,
                path,
                author,
                since: since.as_deref().map(parse_timestamp).transpose()?,
                until: until.as_deref().map(parse_timestamp).transpose()?,
            };
            let commits = storage
                .commits(RepositoryId::new(repository_id), &query)
                .await
                .context("Failed to list commits")?;
            print_json(&commits)
        }
        Command::Repos { org } => {
            let repositories = storage
                .repositories(&org)
                .await
                .with_context(|| format!("Failed to list repositories of {org}"))?;
            print_json(&repositories)
        }
    }
}

async fn poll_issues<H, S>(
    mut storage: HostStorage<H, S>,
    watch: bool,
    interval: Duration,
) -> anyhow::Result<()>
where
    H: RemoteHost,
    S: CursorStore,
{
    let interval = interval.max(storage.minimum_interaction_interval().as_duration());
    loop {
        let started = Instant::now();
        let outcome = storage.poll_issues().await;
        let mut wait = interval;
        match outcome {
            Ok(issues) => {
                info!(count = issues.len(), since = %storage.issue_watermark(), "Polled issues");
                for issue in &issues {
                    print_json_line(issue)?;
                }
            }
            Err(error) => match watch_retry_delay(&error) {
                Some(delay) if watch => {
                    warn!(error = %error, "Issue poll failed; will retry");
                    wait = wait.max(delay);
                }
                _ => return Err(error).context("Failed to poll issues"),
            },
        }

        if !watch {
            return Ok(());
        }
        let remaining = wait.saturating_sub(started.elapsed());
        tokio::select! {
            _ = tokio::time::sleep(remaining) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; stopping watch");
                return Ok(());
            }
        }
    }
}

/// How long watch mode should back off after `error`, or `None` if the error
/// should end the run.
fn watch_retry_delay(error: &StorageError) -> Option<Duration> {
    let StorageError::Remote(remote) = error else {
        return None;
    };
    match remote.retry_policy() {
        RetryPolicy::Retryable { after } => Some(after.unwrap_or_default()),
        RetryPolicy::NonRetryable => None,
    }
}

fn parse_timestamp(value: &str) -> anyhow::Result<Timestamp> {
    Timestamp::parse_rfc3339(value)
        .with_context(|| format!("'{value}' is not an RFC 3339 timestamp"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write output")?;
    writeln!(stdout).context("Failed to write output")?;
    Ok(())
}

fn print_json_line<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, value).context("Failed to write output")?;
    writeln!(stdout).context("Failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::HostError;

    #[test]
    fn rate_limits_are_retried_after_the_requested_delay() {
        let error = StorageError::Remote(HostError::RateLimited {
            retry_after: Some(Duration::from_secs(90)),
        });
        assert_eq!(watch_retry_delay(&error), Some(Duration::from_secs(90)));
    }

    #[test]
    fn transport_failures_are_retried_on_the_normal_schedule() {
        let error = StorageError::Remote(HostError::Transport {
            message: "connection reset".into(),
        });
        assert_eq!(watch_retry_delay(&error), Some(Duration::ZERO));
    }

    #[test]
    fn authentication_and_local_failures_end_the_watch() {
        let unauthorized = StorageError::Remote(HostError::Unauthorized {
            message: "Bad credentials".into(),
        });
        assert_eq!(watch_retry_delay(&unauthorized), None);

        let store = StorageError::CursorStore {
            message: "disk full".into(),
        };
        assert_eq!(watch_retry_delay(&store), None);
    }

    #[test]
    fn timestamps_must_be_rfc3339() {
        assert!(parse_timestamp("2024-05-01T00:00:00Z").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
