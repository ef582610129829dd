//! Newtype identifiers for remote hosting resources.
//!
//! Every remote concept with an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`RepositoryId`] with a [`MigrationId`] even though both are `u64` under
//! the hood, or passing a [`BranchName`] where a [`RepositoryPath`] is expected.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (host-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub const fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: host-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Stable numeric identity of a repository.
    ///
    /// Survives renames and ownership transfers, which is why file and tree
    /// operations are addressed by id rather than by `owner/name`.
    RepositoryId
}

u64_id! {
    /// Per-repository issue number (the `#42` a human sees).
    IssueNumber
}

u64_id! {
    /// Per-repository pull request number.
    PullRequestNumber
}

u64_id! {
    /// Identifies an organization migration (bulk export) job.
    MigrationId
}

u64_id! {
    /// Numeric identity of a user or bot account.
    UserId
}

u64_id! {
    /// Identifies an issue comment.
    CommentId
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (names, hashes, paths)
// ---------------------------------------------------------------------------

string_id! {
    /// Login of the user or organization that owns a repository.
    OwnerName
}

string_id! {
    /// Short repository name, without the owner prefix.
    RepositoryName
}

string_id! {
    /// Login of an organization.
    OrganizationName
}

string_id! {
    /// A Git branch name (e.g. `"main"`, `"feature/docs"`).
    BranchName
}

string_id! {
    /// A Git commit SHA.
    CommitSha
}

string_id! {
    /// Opaque identifier the host assigns to one version of a file's bytes.
    ///
    /// Supplied back on update so the host can reject edits based on a stale
    /// version.
    ContentHash
}

string_id! {
    /// A file path relative to the repository root, using `/` separators.
    ///
    /// Compared byte-for-byte: `Docs/README.md` and `docs/readme.md` are
    /// different paths.
    RepositoryPath
}
