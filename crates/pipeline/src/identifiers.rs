//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`BranchName`] with a [`BranchUuid`] even though both are strings under the
//! hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and
// serde conversions that reject the empty string.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
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

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
                    .ok_or_else(|| concat!(stringify!($name), " must not be empty").to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single decoration pass.
///
/// Generated fresh for every pass; recorded on the decoration span and in the
/// resulting report so all provider calls from one pass can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecorationRunId(Uuid);

impl DecorationRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`DecorationRunId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for DecorationRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (host / provider assigned)
// ---------------------------------------------------------------------------

string_id! {
    /// A Git branch name (e.g. `"master"`, `"feature/x"`).
    BranchName
}

impl BranchName {
    /// The conventional default branch name, [`crate::DEFAULT_BRANCH_NAME`].
    pub fn conventional_default() -> Self {
        Self(crate::DEFAULT_BRANCH_NAME.to_string())
    }
}

string_id! {
    /// The host-assigned identity of a branch record in the branch registry.
    ///
    /// Used as the `referenceId` of a descriptor to scope diffs against the
    /// upstream branch.
    BranchUuid
}

string_id! {
    /// The provider-specific key of a pull request (e.g. `"99"`).
    PullRequestKey
}

string_id! {
    /// A provider-assigned comment identifier.
    ///
    /// Providers may return numeric identifiers; they are carried as strings
    /// because they are only ever echoed back into URLs.
    CommentId
}

string_id! {
    /// A file path relative to the repository root, as understood by the provider.
    SourcePath
}

string_id! {
    /// The key of the analysis rule that raised an issue (e.g. `"rust:S1481"`).
    RuleKey
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
