//! Error types for branch resolution, branch loading and configuration.
//!
//! [`ResolutionError`] and [`LoadError`] are fatal to the analysis run: they
//! propagate up and the run stops. [`ConfigurationError`] aborts a decoration
//! pass before any network call is made. Provider I/O failures are *not* here;
//! they are defined next to the provider port in [`crate::provider`] and are
//! only ever summarised in a [`crate::DecorationReport`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BranchType;

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

/// Headline shown to users when a requested target branch cannot be used.
pub const TARGET_BRANCH_HEADLINE: &str = "Could not target requested branch";

/// Errors produced while resolving scan parameters into a branch descriptor.
///
/// Every variant aborts the analysis run. [`ResolutionError::user_message`]
/// gives the headline to present to the user and [`ResolutionError::detail`]
/// the cause, which names the offending branch where one exists.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ResolutionError {
    /// A non-default branch was requested but the project has never been analysed.
    #[error("No branches currently exist in this project. Please scan the main branch without passing any branch parameters.")]
    NoBranchesExist,

    /// The requested target (or pull-request base) is not in the registry.
    #[error("Could not target requested branch: Target branch '{branch}' does not exist")]
    TargetNotFound {
        /// Name of the missing branch.
        branch: String,
    },

    /// The requested target exists but cannot be merged into.
    #[error("Could not target requested branch: Expected branch type of {expected} but got {actual}")]
    TargetWrongType {
        /// Name of the target branch.
        branch: String,
        /// Acceptable types for the current host, e.g. `"LONG_LIVED or BRANCH"`.
        expected: String,
        /// Type actually recorded for the target.
        actual: BranchType,
    },

    /// An existing branch record carries a type that cannot be analysed as a
    /// branch on this host.
    #[error("Invalid branch type '{branch_type}' for branch '{branch}'")]
    InvalidBranchType {
        /// Name of the branch.
        branch: String,
        /// Recorded type.
        branch_type: BranchType,
    },

    /// The configured long-lived branch pattern is not a valid regular expression.
    #[error("Invalid long-lived branch pattern '{pattern}': {reason}")]
    InvalidLongLivedPattern {
        /// The configured pattern.
        pattern: String,
        /// Why it failed to compile.
        reason: String,
    },

    /// Pull-request parameters were given without a pull-request key.
    #[error("Pull request analysis of branch '{branch}' requires a pull request key")]
    MissingPullRequestKey {
        /// Source branch of the pull request.
        branch: String,
    },
}

impl ResolutionError {
    /// The headline to present to the user, without internal detail.
    pub fn user_message(&self) -> String {
        match self {
            Self::TargetNotFound { .. } | Self::TargetWrongType { .. } => {
                TARGET_BRANCH_HEADLINE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// The underlying cause, naming the offending branch, if the headline
    /// does not already carry it.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::TargetNotFound { branch } => {
                Some(format!("Target branch '{branch}' does not exist"))
            }
            Self::TargetWrongType {
                expected, actual, ..
            } => Some(format!("Expected branch type of {expected} but got {actual}")),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loader errors
// ---------------------------------------------------------------------------

/// Errors produced while loading the analysed branch from report metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// No branch name was reported and the project's main branch is unknown.
    #[error("Could not find main branch")]
    MainBranchNotFound,

    /// The reported merge branch is not in the registry.
    #[error("Could not find target branch '{branch}' in project")]
    TargetBranchMissing {
        /// Name of the missing branch.
        branch: String,
    },

    /// The report carries a branch type that cannot be loaded.
    #[error("Invalid branch type '{found}'")]
    InvalidBranchType {
        /// Reported type, or `UNSET` when none was reported.
        found: String,
    },
}

// ---------------------------------------------------------------------------
// Descriptor errors
// ---------------------------------------------------------------------------

/// Violations of the [`crate::BranchDescriptor`] invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The pull-request key was requested from a non pull-request descriptor.
    #[error("Only a branch of type PULL_REQUEST can have a Pull Request key")]
    NotAPullRequest,

    /// A pull-request descriptor was built without a key.
    #[error("A branch of type PULL_REQUEST requires a Pull Request key")]
    MissingPullRequestKey,

    /// A key was supplied for a non pull-request descriptor.
    #[error("A branch of type {0} cannot carry a Pull Request key")]
    UnexpectedPullRequestKey(BranchType),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Provider configuration problems detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A mandatory setting is absent or blank.
    #[error("Missing mandatory setting '{setting}'")]
    MissingSetting {
        /// Dotted key of the setting, e.g. `"provider.workspace"`.
        setting: String,
    },

    /// A setting is present but unusable.
    #[error("Invalid value for setting '{setting}': {reason}")]
    InvalidSetting {
        /// Dotted key of the setting.
        setting: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigurationError {
    /// Shorthand for [`ConfigurationError::MissingSetting`].
    pub fn missing(setting: &str) -> Self {
        Self::MissingSetting {
            setting: setting.to_string(),
        }
    }
}
