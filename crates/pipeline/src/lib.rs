//! Core domain for branch resolution and pull-request decoration.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and error type used by the decorator. Provider crates implement the
//! [`ProviderClient`] port defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`BranchName`, `CommentId`, etc.) |
//! | [`types`] | Shared value types (`AnalysisResult`, `Issue`, `HostVersion`, etc.) |
//! | [`errors`] | Resolution, loading and configuration errors |
//! | [`capabilities`] | Branch types supported by a host version |
//! | [`branch`] | Branch types, the branch registry and `BranchDescriptor` |
//! | [`resolver`] | `BranchResolver`: scan parameters to descriptor |
//! | [`loader`] | Report metadata to analysed branch |
//! | [`config`] | Raw and validated provider configuration |
//! | [`provider`] | The `ProviderClient` port and its error type |
//! | [`comments`] | Decoration marker and `CommentSynchronizer` |
//! | [`render`] | Markdown comment bodies |
//! | [`decoration`] | `DecorationOrchestrator` and `DecorationReport` |

pub mod branch;
pub mod capabilities;
pub mod comments;
pub mod config;
pub mod decoration;
pub mod errors;
pub mod identifiers;
pub mod loader;
pub mod provider;
pub mod render;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use branch::{
    BranchDescriptor, BranchRecord, BranchRegistry, BranchType, KnownBranches,
    DEFAULT_BRANCH_NAME,
};
pub use capabilities::HostCapabilities;
pub use comments::{ClearOutcome, CommentSynchronizer, FailedDeletion, COMMENT_MARKER, MARKER_TOKEN};
pub use config::{
    Credentials, DecorationToggles, ProviderConfig, RawDecorationSection, RawDecoratorConfig,
    RawProviderSection,
};
pub use decoration::{
    DecorationOrchestrator, DecorationReport, DecorationStatus, DecorationStep, StepOutcome,
};
pub use errors::{ConfigurationError, DescriptorError, LoadError, ResolutionError};
pub use identifiers::{
    BranchName, BranchUuid, CommentId, DecorationRunId, PullRequestKey, RuleKey, SourcePath,
};
pub use loader::{load_analysed_branch, AnalysedBranch, ReportMetadata};
pub use provider::{ProviderClient, ProviderError};
pub use resolver::{BranchResolver, DEFAULT_LONG_LIVED_PATTERN};
pub use types::{
    AnalysisResult, HostVersion, Issue, IssueStatus, QualityGateCondition, QualityGateStatus,
    QualityGateSummary, Severity, Timestamp,
};
