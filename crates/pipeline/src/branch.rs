//! Branch model: branch types, registry records, the registry port, and the
//! [`BranchDescriptor`] attached to every analysis run.

use serde::{Deserialize, Serialize};

use crate::{BranchName, BranchUuid, DescriptorError, PullRequestKey};

/// Name of the branch assumed to be the project default when nothing else is known.
pub const DEFAULT_BRANCH_NAME: &str = "master";

// ---------------------------------------------------------------------------
// Branch type
// ---------------------------------------------------------------------------

/// Classification of an analysed branch.
///
/// `LongLived`/`ShortLived` are the legacy two-way classification; `Branch` is
/// the unified type that replaces both on newer hosts. Which of them a host
/// understands is negotiated through [`crate::HostCapabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchType {
    Main,
    #[serde(alias = "LONG")]
    LongLived,
    #[serde(alias = "SHORT")]
    ShortLived,
    Branch,
    PullRequest,
}

impl BranchType {
    /// Returns the upper-case wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::LongLived => "LONG_LIVED",
            Self::ShortLived => "SHORT_LIVED",
            Self::Branch => "BRANCH",
            Self::PullRequest => "PULL_REQUEST",
        }
    }

    /// Returns `true` for the types a branch (as opposed to pull-request)
    /// analysis can produce.
    pub const fn is_branch_analysis(self) -> bool {
        matches!(self, Self::LongLived | Self::ShortLived | Self::Branch)
    }
}

impl std::fmt::Display for BranchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A branch previously analysed and recorded by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: BranchName,
    #[serde(rename = "type")]
    pub branch_type: BranchType,
    pub uuid: BranchUuid,
    /// Whether this record is the project's main branch.
    #[serde(default)]
    pub is_main: bool,
}

/// Read access to the host's registry of known branches.
///
/// The registry may be stale with respect to the repository; the resolver only
/// trusts it for branches it has already classified.
pub trait BranchRegistry {
    /// Looks up a branch record by name.
    fn get(&self, name: &str) -> Option<&BranchRecord>;

    /// Looks up a branch record by its host identity.
    fn get_by_uuid(&self, uuid: &BranchUuid) -> Option<&BranchRecord>;

    /// Returns `true` if no branch has ever been recorded for the project.
    fn is_empty(&self) -> bool;

    /// Name of the project's default branch.
    fn default_branch_name(&self) -> &str;
}

/// In-memory [`BranchRegistry`], typically deserialised from a JSON export of
/// the host's branch table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownBranches {
    default_branch: BranchName,
    #[serde(default)]
    branches: Vec<BranchRecord>,
}

impl KnownBranches {
    /// Creates a registry with the given default branch name and records.
    pub fn new(default_branch: BranchName, branches: Vec<BranchRecord>) -> Self {
        Self {
            default_branch,
            branches,
        }
    }

    /// A registry for a project that has never been analysed.
    pub fn empty() -> Self {
        Self {
            default_branch: BranchName::conventional_default(),
            branches: Vec::new(),
        }
    }
}

impl BranchRegistry for KnownBranches {
    fn get(&self, name: &str) -> Option<&BranchRecord> {
        self.branches.iter().find(|b| b.name.as_str() == name)
    }

    fn get_by_uuid(&self, uuid: &BranchUuid) -> Option<&BranchRecord> {
        self.branches.iter().find(|b| &b.uuid == uuid)
    }

    fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    fn default_branch_name(&self) -> &str {
        self.default_branch.as_str()
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// The resolved identity of the branch or pull request being analysed.
///
/// Created once per analysis run by the resolver and attached read-only to the
/// analysis metadata. A pull-request key is present if and only if the type is
/// [`BranchType::PullRequest`]; this is enforced by every constructor and by
/// deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorFields", into = "DescriptorFields")]
pub struct BranchDescriptor {
    name: BranchName,
    branch_type: BranchType,
    target_name: Option<BranchName>,
    reference_id: Option<BranchUuid>,
    pull_request_key: Option<PullRequestKey>,
}

impl BranchDescriptor {
    /// A descriptor for an analysis of the project's main line.
    pub fn main(name: BranchName) -> Self {
        Self {
            name,
            branch_type: BranchType::Main,
            target_name: None,
            reference_id: None,
            pull_request_key: None,
        }
    }

    /// A descriptor for a branch analysis.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::MissingPullRequestKey`] if `branch_type` is
    /// [`BranchType::PullRequest`]; use [`BranchDescriptor::pull_request`] instead.
    pub fn branch(
        name: BranchName,
        branch_type: BranchType,
        target_name: Option<BranchName>,
        reference_id: Option<BranchUuid>,
    ) -> Result<Self, DescriptorError> {
        Self::from_parts(name, branch_type, target_name, reference_id, None)
    }

    /// A descriptor for a pull-request analysis.
    pub fn pull_request(
        name: BranchName,
        key: PullRequestKey,
        target_name: BranchName,
        reference_id: BranchUuid,
    ) -> Self {
        Self {
            name,
            branch_type: BranchType::PullRequest,
            target_name: Some(target_name),
            reference_id: Some(reference_id),
            pull_request_key: Some(key),
        }
    }

    fn from_parts(
        name: BranchName,
        branch_type: BranchType,
        target_name: Option<BranchName>,
        reference_id: Option<BranchUuid>,
        pull_request_key: Option<PullRequestKey>,
    ) -> Result<Self, DescriptorError> {
        match (branch_type, &pull_request_key) {
            (BranchType::PullRequest, None) => return Err(DescriptorError::MissingPullRequestKey),
            (other, Some(_)) if other != BranchType::PullRequest => {
                return Err(DescriptorError::UnexpectedPullRequestKey(other))
            }
            _ => {}
        }
        Ok(Self {
            name,
            branch_type,
            target_name,
            reference_id,
            pull_request_key,
        })
    }

    pub fn name(&self) -> &BranchName {
        &self.name
    }

    pub fn branch_type(&self) -> BranchType {
        self.branch_type
    }

    /// The branch this one is expected to merge into, if any.
    pub fn target_name(&self) -> Option<&BranchName> {
        self.target_name.as_ref()
    }

    /// Identity of the upstream branch used to scope diffs.
    pub fn reference_id(&self) -> Option<&BranchUuid> {
        self.reference_id.as_ref()
    }

    /// Returns `true` for pull-request descriptors.
    pub fn is_pull_request(&self) -> bool {
        self.branch_type == BranchType::PullRequest
    }

    /// The pull-request key.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::NotAPullRequest`] for any other type.
    pub fn pull_request_key(&self) -> Result<&PullRequestKey, DescriptorError> {
        if self.branch_type != BranchType::PullRequest {
            return Err(DescriptorError::NotAPullRequest);
        }
        self.pull_request_key
            .as_ref()
            .ok_or(DescriptorError::MissingPullRequestKey)
    }
}

/// Serialised shape of a [`BranchDescriptor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DescriptorFields {
    name: BranchName,
    #[serde(rename = "type")]
    branch_type: BranchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_name: Option<BranchName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_id: Option<BranchUuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pull_request_key: Option<PullRequestKey>,
}

impl TryFrom<DescriptorFields> for BranchDescriptor {
    type Error = DescriptorError;

    fn try_from(f: DescriptorFields) -> Result<Self, Self::Error> {
        Self::from_parts(
            f.name,
            f.branch_type,
            f.target_name,
            f.reference_id,
            f.pull_request_key,
        )
    }
}

impl From<BranchDescriptor> for DescriptorFields {
    fn from(d: BranchDescriptor) -> Self {
        Self {
            name: d.name,
            branch_type: d.branch_type,
            target_name: d.target_name,
            reference_id: d.reference_id,
            pull_request_key: d.pull_request_key,
        }
    }
}

#[cfg(test)]
#[path = "branch_tests.rs"]
mod tests;
