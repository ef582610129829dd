//! Shared value types for the hosting storage domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. a timestamp is always UTC, a page
//! size is never zero) and participate in domain computations.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{BranchName, CommitSha, ContentHash, RepositoryPath};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an RFC 3339 string (the format the host uses on the wire).
    ///
    /// Returns `None` if the string is not a valid RFC 3339 timestamp.
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value.trim())
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Returns this timestamp moved `days` whole days into the past.
    ///
    /// Saturates at the earliest representable instant.
    pub fn days_before(self, days: u32) -> Self {
        self.0
            .checked_sub_signed(chrono::Duration::days(i64::from(days)))
            .map_or(Self(DateTime::<Utc>::MIN_UTC), Self)
    }

    /// Returns this timestamp moved `months` calendar months into the past.
    pub fn months_before(self, months: u32) -> Self {
        self.0
            .checked_sub_months(chrono::Months::new(months))
            .map_or(Self(DateTime::<Utc>::MIN_UTC), Self)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Issue state and queries
// ---------------------------------------------------------------------------

/// Open/closed state of an issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Open,
    Closed,
}

impl ItemState {
    /// The lowercase wire name (`"open"` / `"closed"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ItemState::Open => "open",
            ItemState::Closed => "closed",
        }
    }
}

/// Which issues visible to the authenticated user a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueFilter {
    /// Issues assigned to the authenticated user.
    Assigned,
    /// Issues created by the authenticated user.
    Created,
    /// Issues mentioning the authenticated user.
    Mentioned,
    /// Issues the authenticated user is subscribed to.
    Subscribed,
    /// Every issue the authenticated user can see.
    All,
}

impl IssueFilter {
    /// The lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            IssueFilter::Assigned => "assigned",
            IssueFilter::Created => "created",
            IssueFilter::Mentioned => "mentioned",
            IssueFilter::Subscribed => "subscribed",
            IssueFilter::All => "all",
        }
    }
}

/// Parameters of an issue listing across every repository the authenticated
/// user can see.
///
/// Implementations must only return issues whose creation time is at or after
/// [`IssueQuery::since`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueQuery {
    pub filter: IssueFilter,
    pub state: ItemState,
    pub since: Timestamp,
}

/// Parameters of a commit listing on one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitQuery {
    /// Branch name or commit SHA to start listing from. `None` means the
    /// repository's default branch.
    pub sha: Option<String>,
    /// Only commits touching this path.
    pub path: Option<String>,
    /// Only commits authored by this login or email.
    pub author: Option<String>,
    pub since: Option<Timestamp>,
    pub until: Option<Timestamp>,
}

/// Paging controls for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    /// First page to fetch (1-based).
    pub start_page: u32,
    /// Number of pages to fetch. `None` fetches until the listing is exhausted.
    pub page_count: Option<u32>,
    /// Items per page; the host caps this at 100.
    pub page_size: u32,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            page_count: None,
            page_size: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Migration state
// ---------------------------------------------------------------------------

/// Remote state of an organization migration.
///
/// A migration moves `Pending → Exporting → Exported`, or ends in `Failed`.
/// Downloading the archive is a local action and is not reflected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    Pending,
    Exporting,
    Exported,
    Failed,
}

impl MigrationState {
    /// Returns `true` once the archive can be downloaded.
    pub fn is_exported(self) -> bool {
        self == MigrationState::Exported
    }
}

// ---------------------------------------------------------------------------
// File mutations
// ---------------------------------------------------------------------------

/// Parameters for creating a file that does not yet exist on a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFileRequest {
    pub path: RepositoryPath,
    pub content: String,
    pub message: String,
    pub branch: BranchName,
}

/// Parameters for replacing the content of an existing file.
///
/// `base_content_hash` must equal the host's current hash for `path` on
/// `branch`, otherwise the host rejects the update as a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFileRequest {
    pub path: RepositoryPath,
    pub content: String,
    pub message: String,
    pub branch: BranchName,
    pub base_content_hash: ContentHash,
}

/// The remote mutation chosen for a create-or-update write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileMutationIntent {
    Create(CreateFileRequest),
    Update(UpdateFileRequest),
}

impl FileMutationIntent {
    /// Returns `true` for [`FileMutationIntent::Update`].
    pub fn is_update(&self) -> bool {
        matches!(self, FileMutationIntent::Update(_))
    }
}

// ---------------------------------------------------------------------------
// Miscellaneous
// ---------------------------------------------------------------------------

/// Minimum spacing between successive issue polls against the host.
///
/// Defaults to 1200 ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InteractionInterval(Duration);

impl InteractionInterval {
    /// Creates an interval from a duration.
    pub fn new(interval: Duration) -> Self {
        Self(interval)
    }

    /// Returns the interval as a [`Duration`].
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl Default for InteractionInterval {
    fn default() -> Self {
        Self(Duration::from_millis(1200))
    }
}

/// A commit identified only by its SHA.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: CommitSha,
}
