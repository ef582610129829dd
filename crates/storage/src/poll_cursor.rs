//! Watermark-based issue polling.
//!
//! A [`PollCursor`] remembers the newest issue creation time it has seen so
//! that repeated polls against a busy tracker only return issues created since
//! the last successful poll.
//!
//! ## Watermark rules
//!
//! - The watermark starts [`MINIMUM_AGE_FLOOR_DAYS`] days before construction,
//!   unless a [`CursorStore`] supplies a persisted value.
//! - A poll that returns nothing leaves the watermark untouched.
//! - A poll that returns issues moves the watermark to the largest
//!   `created_at` in the batch (not to the time of the query), and never
//!   backwards.
//! - A failed poll leaves the watermark untouched.
//!
//! An issue the host reports late, with a creation time already below the
//! watermark, is never surfaced.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::StorageError;
use crate::ports::IssueTracker;
use crate::resources::Issue;
use crate::types::{IssueFilter, IssueQuery, ItemState, Timestamp};

/// How far before construction time a fresh cursor starts looking.
pub const MINIMUM_AGE_FLOOR_DAYS: u32 = 14;

// ---------------------------------------------------------------------------
// Persistence seam
// ---------------------------------------------------------------------------

/// Persists a cursor's watermark across process restarts.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Returns the persisted watermark, or `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<Timestamp>, StorageError>;

    /// Persists a new watermark.
    async fn save(&self, since: Timestamp) -> Result<(), StorageError>;
}

/// A [`CursorStore`] that keeps nothing; the watermark lives only as long as
/// the cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralCursorStore;

#[async_trait]
impl CursorStore for EphemeralCursorStore {
    async fn load(&self) -> Result<Option<Timestamp>, StorageError> {
        Ok(None)
    }

    async fn save(&self, _since: Timestamp) -> Result<(), StorageError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Tracks the issue-creation watermark between polls.
///
/// [`PollCursor::poll`] takes `&mut self`; sharing one cursor between tasks
/// needs an external lock.
#[derive(Debug)]
pub struct PollCursor<S = EphemeralCursorStore> {
    since: Timestamp,
    store: S,
}

impl PollCursor<EphemeralCursorStore> {
    /// Creates an in-memory cursor whose watermark is two weeks before now.
    pub fn new() -> Self {
        Self::starting_at(Timestamp::now())
    }

    /// Creates an in-memory cursor as if constructed at `now`.
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            since: now.days_before(MINIMUM_AGE_FLOOR_DAYS),
            store: EphemeralCursorStore,
        }
    }
}

impl Default for PollCursor<EphemeralCursorStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CursorStore> PollCursor<S> {
    /// Creates a cursor backed by `store`, resuming from its persisted
    /// watermark when there is one.
    pub async fn restore(store: S, now: Timestamp) -> Result<Self, StorageError> {
        let since = match store.load().await? {
            Some(saved) => {
                debug!(since = %saved, "Resuming issue cursor from store");
                saved
            }
            None => now.days_before(MINIMUM_AGE_FLOOR_DAYS),
        };
        Ok(Self { since, store })
    }

    /// The current watermark.
    pub fn since(&self) -> Timestamp {
        self.since
    }

    /// Fetches open issues created at or after the watermark and advances it.
    ///
    /// Any error from the tracker or the store is returned as-is and leaves
    /// the watermark where it was.
    #[tracing::instrument(skip_all, fields(since = %self.since))]
    pub async fn poll<T>(&mut self, tracker: &T) -> Result<Vec<Issue>, StorageError>
    where
        T: IssueTracker + ?Sized,
    {
        let query = IssueQuery {
            filter: IssueFilter::All,
            state: ItemState::Open,
            since: self.since,
        };
        let issues = tracker.list_issues(&query).await?;

        let Some(newest) = issues.iter().map(|issue| issue.created_at).max() else {
            debug!("No new issues");
            return Ok(issues);
        };

        let next = newest.max(self.since);
        if next != self.since {
            self.store.save(next).await?;
            debug!(count = issues.len(), next = %next, "Advancing issue cursor");
            self.since = next;
        }
        Ok(issues)
    }
}
