//! Issue state transitions.

use tracing::debug;

use crate::identifiers::IssueNumber;
use crate::ports::{HostResult, IssueTracker};
use crate::resources::{Issue, RepositoryRef};
use crate::types::ItemState;

/// Closes issues through an [`IssueTracker`].
pub struct IssueCloser<'a, T: ?Sized> {
    tracker: &'a T,
}

impl<'a, T> IssueCloser<'a, T>
where
    T: IssueTracker + ?Sized,
{
    pub fn new(tracker: &'a T) -> Self {
        Self { tracker }
    }

    /// Sets `issue` to closed in its owning repository.
    ///
    /// The issue's local `state` is not consulted; closing an already-closed
    /// issue is left to the host.
    pub async fn close(&self, issue: &Issue) -> HostResult<()> {
        self.close_number(&issue.repository, issue.number).await
    }

    /// Closes issue `number` of `repository` without needing the issue body.
    #[tracing::instrument(skip(self))]
    pub async fn close_number(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
    ) -> HostResult<()> {
        self.tracker
            .update_issue_state(repository, number, ItemState::Closed)
            .await?;
        debug!("Closed issue");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HostError;
    use crate::testing::{issue_created_at, repo_ref, Call, FakeHost};

    #[tokio::test]
    async fn close_targets_the_issue_repository_and_number() {
        let host = FakeHost::default();
        let issue = issue_created_at(17, "2024-05-01T00:00:00Z");

        IssueCloser::new(&host).close(&issue).await.unwrap();

        assert_eq!(
            host.calls(),
            vec![Call::UpdateIssueState(
                repo_ref("octo", "widgets"),
                IssueNumber::new(17),
                ItemState::Closed
            )]
        );
    }

    #[tokio::test]
    async fn already_closed_issue_is_still_sent_to_the_host() {
        let host = FakeHost::default();
        let mut issue = issue_created_at(3, "2024-05-01T00:00:00Z");
        issue.state = ItemState::Closed;

        IssueCloser::new(&host).close(&issue).await.unwrap();
        assert_eq!(host.calls().len(), 1);
    }

    #[tokio::test]
    async fn close_number_needs_only_coordinates() {
        let host = FakeHost::default();

        IssueCloser::new(&host)
            .close_number(&repo_ref("octo", "gadgets"), IssueNumber::new(9))
            .await
            .unwrap();

        assert_eq!(
            host.calls(),
            vec![Call::UpdateIssueState(
                repo_ref("octo", "gadgets"),
                IssueNumber::new(9),
                ItemState::Closed
            )]
        );
    }

    #[tokio::test]
    async fn host_failure_is_returned_unmodified() {
        let host = FakeHost::default();
        let error = HostError::Unauthorized {
            message: "Resource not accessible by integration".into(),
        };
        host.fail_issue_update(error.clone());

        let issue = issue_created_at(3, "2024-05-01T00:00:00Z");
        assert_eq!(IssueCloser::new(&host).close(&issue).await, Err(error));
    }
}
