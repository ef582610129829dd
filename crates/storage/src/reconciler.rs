//! Create-or-update for a single file on a branch.
//!
//! The host has no upsert verb: creating a file fails if the path exists, and
//! updating one requires the hash of the version being replaced. The
//! reconciler reads the branch's tree once, decides which mutation applies
//! ([`plan_mutation`]), and issues exactly that mutation.
//!
//! ## Consistency
//!
//! The tree read and the mutation are not atomic. Another writer can create
//! the path after the scan (the create then fails with
//! [`HostError::Conflict`]) or change it (the update then fails the same way).
//! Both failures reach the caller untouched.
//!
//! [`HostError::Conflict`]: crate::errors::HostError::Conflict

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::identifiers::{BranchName, RepositoryId, RepositoryPath};
use crate::ports::{CodeRepository, HostResult};
use crate::resources::{ChangeSet, TreeEntry};
use crate::types::{CreateFileRequest, FileMutationIntent, UpdateFileRequest};

/// "Write this content to this path on this branch."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteFileRequest {
    pub repository: RepositoryId,
    pub branch: BranchName,
    pub path: RepositoryPath,
    pub content: String,
    pub message: String,
}

/// Chooses the mutation for `request` given a snapshot of the branch's tree.
///
/// The first entry whose path equals `request.path` byte-for-byte selects an
/// update carrying that entry's hash; no match selects a create.
pub fn plan_mutation(tree: &[TreeEntry], request: &WriteFileRequest) -> FileMutationIntent {
    match tree
        .iter()
        .find(|entry| entry.path == request.path.as_str())
    {
        Some(existing) => FileMutationIntent::Update(UpdateFileRequest {
            path: request.path.clone(),
            content: request.content.clone(),
            message: request.message.clone(),
            branch: request.branch.clone(),
            base_content_hash: existing.content_hash.clone(),
        }),
        None => FileMutationIntent::Create(CreateFileRequest {
            path: request.path.clone(),
            content: request.content.clone(),
            message: request.message.clone(),
            branch: request.branch.clone(),
        }),
    }
}

/// Applies [`WriteFileRequest`]s against a [`CodeRepository`].
pub struct ContentReconciler<'a, C: ?Sized> {
    repository: &'a C,
}

impl<'a, C> ContentReconciler<'a, C>
where
    C: CodeRepository + ?Sized,
{
    pub fn new(repository: &'a C) -> Self {
        Self { repository }
    }

    /// Writes `request.content` to `request.path`, creating or updating it as
    /// the branch's current tree dictates.
    ///
    /// Every remote failure is returned unmodified; nothing is retried.
    #[tracing::instrument(
        skip_all,
        fields(repository = %request.repository, branch = %request.branch, path = %request.path)
    )]
    pub async fn reconcile(&self, request: &WriteFileRequest) -> HostResult<ChangeSet> {
        let branch = self
            .repository
            .get_branch(request.repository, &request.branch)
            .await?;
        let tree = self
            .repository
            .get_tree_recursive(request.repository, &branch.head.sha)
            .await?;
        debug!(head = %branch.head.sha, entries = tree.len(), "Scanned branch tree");

        match plan_mutation(&tree, request) {
            FileMutationIntent::Update(update) => {
                let current = self
                    .repository
                    .get_file_content(request.repository, &request.path, &request.branch)
                    .await?;
                if current.content_hash != update.base_content_hash {
                    // The branch moved after the tree read; the host will
                    // reject the stale hash.
                    debug!(
                        tree_hash = %update.base_content_hash,
                        current_hash = %current.content_hash,
                        "Content changed since tree scan"
                    );
                }
                debug!(base = %update.base_content_hash, "Updating existing file");
                self.repository
                    .update_file(request.repository, &update)
                    .await
            }
            FileMutationIntent::Create(create) => {
                debug!("Creating new file");
                self.repository
                    .create_file(request.repository, &create)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HostError;
    use crate::identifiers::CommitSha;
    use crate::testing::{hash, Call, FakeHost};

    fn request(path: &str) -> WriteFileRequest {
        WriteFileRequest {
            repository: RepositoryId::new(42),
            branch: BranchName::new("main").unwrap(),
            path: RepositoryPath::new(path).unwrap(),
            content: "new text".into(),
            message: "update docs".into(),
        }
    }

    fn creates(calls: &[Call]) -> usize {
        calls
            .iter()
            .filter(|c| matches!(c, Call::CreateFile(..)))
            .count()
    }

    fn updates(calls: &[Call]) -> Vec<UpdateFileRequest> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::UpdateFile(_, update) => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plan_selects_the_hash_of_the_matching_path() {
        let tree = vec![
            TreeEntry::blob("a.txt", hash("h1")),
            TreeEntry::blob("b.txt", hash("h2")),
        ];
        match plan_mutation(&tree, &request("b.txt")) {
            FileMutationIntent::Update(update) => {
                assert_eq!(update.base_content_hash, hash("h2"))
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn plan_matches_paths_case_sensitively() {
        let tree = vec![TreeEntry::blob("Docs/README.md", hash("h1"))];
        let intent = plan_mutation(&tree, &request("docs/readme.md"));
        assert!(!intent.is_update());
    }

    #[test]
    fn plan_uses_first_match_when_paths_repeat() {
        let tree = vec![
            TreeEntry::blob("dup.txt", hash("first")),
            TreeEntry::blob("dup.txt", hash("second")),
        ];
        match plan_mutation(&tree, &request("dup.txt")) {
            FileMutationIntent::Update(update) => {
                assert_eq!(update.base_content_hash, hash("first"))
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn existing_path_issues_exactly_one_update_with_tree_hash() {
        let host = FakeHost::default();
        host.set_branch_head(Ok("abcdef0"));
        host.set_tree(vec![
            TreeEntry::blob("README.md", hash("root")),
            TreeEntry::blob("docs/readme.md", hash("abc123")),
        ]);

        let change = ContentReconciler::new(&host)
            .reconcile(&request("docs/readme.md"))
            .await
            .unwrap();
        assert_eq!(change.path.as_str(), "docs/readme.md");

        let calls = host.calls();
        assert_eq!(creates(&calls), 0);
        let updates = updates(&calls);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].base_content_hash, hash("abc123"));
        assert_eq!(updates[0].content, "new text");
        assert_eq!(updates[0].message, "update docs");
        assert_eq!(updates[0].branch.as_str(), "main");
    }

    #[tokio::test]
    async fn tree_is_read_at_the_branch_head() {
        let host = FakeHost::default();
        host.set_branch_head(Ok("abcdef0"));

        ContentReconciler::new(&host)
            .reconcile(&request("new.md"))
            .await
            .unwrap();

        let calls = host.calls();
        assert_eq!(
            calls[0],
            Call::GetBranch(RepositoryId::new(42), BranchName::new("main").unwrap())
        );
        assert_eq!(
            calls[1],
            Call::GetTree(RepositoryId::new(42), CommitSha::new("abcdef0").unwrap())
        );
    }

    #[tokio::test]
    async fn absent_path_issues_exactly_one_create() {
        let host = FakeHost::default();
        host.set_tree(vec![TreeEntry::blob("other.md", hash("h9"))]);

        ContentReconciler::new(&host)
            .reconcile(&request("docs/new.md"))
            .await
            .unwrap();

        let calls = host.calls();
        assert_eq!(creates(&calls), 1);
        assert!(updates(&calls).is_empty());
        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::GetFileContent(..))));
        match calls.last() {
            Some(Call::CreateFile(_, create)) => {
                assert_eq!(create.path.as_str(), "docs/new.md");
                assert_eq!(create.branch.as_str(), "main");
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn branch_lookup_failure_stops_before_any_mutation() {
        let host = FakeHost::default();
        host.set_branch_head(Err(HostError::NotFound {
            resource: "branch main".into(),
        }));

        let error = ContentReconciler::new(&host)
            .reconcile(&request("docs/readme.md"))
            .await
            .unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(host.calls().len(), 1);
    }

    #[tokio::test]
    async fn create_conflict_from_a_concurrent_writer_is_surfaced() {
        let host = FakeHost::default();
        let conflict = HostError::Conflict {
            resource: "docs/new.md".into(),
            message: "file already exists".into(),
        };
        host.fail_create(conflict.clone());

        let error = ContentReconciler::new(&host)
            .reconcile(&request("docs/new.md"))
            .await
            .unwrap_err();
        assert_eq!(error, conflict);
        assert!(updates(&host.calls()).is_empty());
    }

    #[tokio::test]
    async fn stale_hash_conflict_on_update_is_surfaced() {
        let host = FakeHost::default();
        host.set_tree(vec![TreeEntry::blob("a.txt", hash("old"))]);
        let conflict = HostError::Conflict {
            resource: "a.txt".into(),
            message: "a.txt does not match old".into(),
        };
        host.fail_update(conflict.clone());

        let error = ContentReconciler::new(&host)
            .reconcile(&request("a.txt"))
            .await
            .unwrap_err();
        assert_eq!(error, conflict);
        assert_eq!(creates(&host.calls()), 0);
    }

    #[tokio::test]
    async fn confirmation_read_failure_prevents_the_update() {
        let host = FakeHost::default();
        host.set_tree(vec![TreeEntry::blob("a.txt", hash("h1"))]);
        host.fail_file_content(HostError::Transport {
            message: "connection reset".into(),
        });

        let error = ContentReconciler::new(&host)
            .reconcile(&request("a.txt"))
            .await
            .unwrap_err();
        assert!(matches!(error, HostError::Transport { .. }));
        assert!(updates(&host.calls()).is_empty());
    }
}
