//! `remote-storage` command-line entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load `remote-storage.toml` and merge flags and
//!    environment overrides into [`config::Settings`].
//! 2. **Wire observability**: install the `tracing-subscriber` stack and, when
//!    configured, the OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: build the [`github::GithubClient`] and the
//!    [`storage::HostStorage`] façade over it, with a file-backed issue cursor
//!    when `cursor_path` is set.
//! 4. **Run one subcommand**, printing results as JSON on stdout.

mod commands;
mod config;
mod cursor_file;
mod telemetry;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use storage::{OrganizationName, OwnerName, RepositoryName, RepositoryRef};
use tracing::Instrument;

use crate::config::{FileConfig, LogFormat, Overrides, Settings, DEFAULT_CONFIG_PATH};

#[derive(Debug, Parser)]
#[command(name = "remote-storage", version, about = "Read and write repositories, issues, and migrations on GitHub")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Config file. Defaults to `remote-storage.toml` in the working directory.
    #[arg(long, global = true, env = "REMOTE_STORAGE_CONFIG")]
    config: Option<PathBuf>,

    /// API token sent as a bearer token.
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Owner (user or organization) the façade is created for.
    #[arg(long, global = true, env = "REMOTE_STORAGE_OWNER")]
    owner: Option<String>,

    #[arg(long, global = true, env = "REMOTE_STORAGE_API_BASE")]
    api_base: Option<String>,

    #[arg(long, global = true)]
    user_agent: Option<String>,

    #[arg(long, global = true)]
    request_timeout_ms: Option<u64>,

    #[arg(long, global = true)]
    minimum_interaction_interval_ms: Option<u64>,

    /// JSON file holding the issue watermark between runs.
    #[arg(long, global = true, env = "REMOTE_STORAGE_CURSOR")]
    cursor_path: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_base: self.api_base.clone(),
            user_agent: self.user_agent.clone(),
            request_timeout_ms: self.request_timeout_ms,
            minimum_interaction_interval_ms: self.minimum_interaction_interval_ms,
            cursor_path: self.cursor_path.clone(),
            log_format: self.log_format,
            otlp_endpoint: self.otlp_endpoint.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print open issues created since the last poll.
    PollIssues {
        /// Keep polling until interrupted.
        #[arg(long)]
        watch: bool,
        /// Seconds between polls in watch mode; never shorter than the
        /// minimum interaction interval.
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
    },
    /// Create a file, or update it if the branch already has it.
    PutFile {
        #[arg(long)]
        repository_id: u64,
        #[arg(long)]
        branch: String,
        /// Path inside the repository.
        #[arg(long)]
        path: String,
        #[arg(long)]
        message: String,
        /// Local UTF-8 file whose text becomes the new content.
        #[arg(long)]
        from_file: PathBuf,
    },
    /// Close one issue.
    CloseIssue {
        /// `owner/name`
        #[arg(long, value_parser = parse_repository)]
        repo: RepositoryRef,
        #[arg(long)]
        number: u64,
    },
    /// Ask the host to export repositories into a migration archive.
    StartMigration {
        #[arg(long, value_parser = parse_organization)]
        org: OrganizationName,
        #[arg(required = true, value_parser = parse_repository_name)]
        repositories: Vec<RepositoryName>,
    },
    ListMigrations {
        #[arg(long, value_parser = parse_organization)]
        org: OrganizationName,
    },
    /// Save an exported migration's archive to a local file.
    DownloadMigration {
        #[arg(long, value_parser = parse_organization)]
        org: OrganizationName,
        #[arg(long)]
        id: u64,
        #[arg(long)]
        output: PathBuf,
    },
    Members {
        #[arg(long, value_parser = parse_organization)]
        org: OrganizationName,
    },
    /// List pull requests, or show one with `--number`.
    Pulls {
        #[arg(long, value_parser = parse_repository, required_unless_present = "repository_id", conflicts_with = "repository_id")]
        repo: Option<RepositoryRef>,
        #[arg(long)]
        repository_id: Option<u64>,
        #[arg(long, requires = "repository_id")]
        number: Option<u64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Stop after this many pages.
        #[arg(long)]
        pages: Option<u32>,
    },
    Commits {
        #[arg(long)]
        repository_id: u64,
        /// Branch or commit to list from.
        #[arg(long)]
        sha: Option<String>,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        author: Option<String>,
        /// RFC 3339 lower bound.
        #[arg(long)]
        since: Option<String>,
        /// RFC 3339 upper bound.
        #[arg(long)]
        until: Option<String>,
    },
    Repos {
        #[arg(long, value_parser = parse_organization)]
        org: OrganizationName,
    },
}

fn parse_repository(value: &str) -> Result<RepositoryRef, String> {
    let (owner, name) = value
        .split_once('/')
        .ok_or_else(|| format!("expected owner/name, got '{value}'"))?;
    Ok(RepositoryRef {
        owner: OwnerName::new(owner).ok_or("owner must not be empty")?,
        name: RepositoryName::new(name)
            .filter(|name| !name.as_str().contains('/'))
            .ok_or("name must be a single non-empty segment")?,
    })
}

fn parse_repository_name(value: &str) -> Result<RepositoryName, String> {
    RepositoryName::new(value).ok_or_else(|| "repository name must not be empty".to_string())
}

fn parse_organization(value: &str) -> Result<OrganizationName, String> {
    OrganizationName::new(value).ok_or_else(|| "organization must not be empty".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config_path, required) = match &cli.global.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    let file = FileConfig::load(&config_path, required)?;
    let settings = Settings::resolve(file, cli.global.overrides());

    let _telemetry = telemetry::init(settings.log_format, settings.otlp_endpoint.as_deref())?;

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("remote_storage", run_id = %run_id);
    run(cli, settings).instrument(span).await
}

async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let token = cli
        .global
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .context("No API token: pass --token or set GITHUB_TOKEN")?;
    let owner = cli
        .global
        .owner
        .as_deref()
        .and_then(|owner| OwnerName::new(owner))
        .context("No owner: pass --owner or set REMOTE_STORAGE_OWNER")?;

    let client = github::GithubClient::new(&settings.client_config(token))
        .context("Failed to construct GitHub client")?;
    tracing::debug!(api_base = %settings.api_base, owner = %owner, "Client ready");

    commands::dispatch(cli.command, client, owner, &settings).await
}
