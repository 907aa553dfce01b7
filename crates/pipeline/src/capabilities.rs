//! Host capability negotiation.
//!
//! Older analysis hosts classify branches as long-lived or short-lived; newer
//! hosts collapse both into a single unified branch type, and for a window of
//! releases both schemes coexist. Rather than probing the host at every call
//! site, the capabilities are resolved once at startup into a
//! [`HostCapabilities`] value and passed to the resolver and loader.

use serde::{Deserialize, Serialize};

use crate::{BranchType, HostVersion};

/// First host version exposing the unified [`BranchType::Branch`].
const UNIFIED_BRANCH_SINCE: (u32, u32) = (8, 1);

/// First host version that no longer knows the legacy long/short types.
const LEGACY_TYPES_REMOVED_IN: (u32, u32) = (9, 0);

/// Which branch-type values the current host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCapabilities {
    /// The host exposes [`BranchType::Branch`]. When set, every newly seen
    /// branch is classified as `Branch` regardless of its name.
    pub unified_branch_type: bool,

    /// The host still understands [`BranchType::LongLived`] and
    /// [`BranchType::ShortLived`].
    pub legacy_branch_types: bool,
}

impl HostCapabilities {
    /// Resolves the capabilities of the given host version.
    pub fn for_version(version: HostVersion) -> Self {
        let (unified_major, unified_minor) = UNIFIED_BRANCH_SINCE;
        let (removed_major, removed_minor) = LEGACY_TYPES_REMOVED_IN;
        let caps = Self {
            unified_branch_type: version.is_at_least(unified_major, unified_minor),
            legacy_branch_types: !version.is_at_least(removed_major, removed_minor),
        };
        tracing::debug!(
            host_version = %version,
            unified_branch_type = caps.unified_branch_type,
            legacy_branch_types = caps.legacy_branch_types,
            "Resolved host capabilities"
        );
        caps
    }

    /// Capabilities of a host that only knows the legacy long/short scheme.
    pub fn legacy() -> Self {
        Self {
            unified_branch_type: false,
            legacy_branch_types: true,
        }
    }

    /// Capabilities of a host that only knows the unified branch type.
    pub fn unified() -> Self {
        Self {
            unified_branch_type: true,
            legacy_branch_types: false,
        }
    }

    /// Returns `true` if the host understands `branch_type` at all.
    pub fn supports(&self, branch_type: BranchType) -> bool {
        match branch_type {
            BranchType::Main | BranchType::PullRequest => true,
            BranchType::LongLived | BranchType::ShortLived => self.legacy_branch_types,
            BranchType::Branch => self.unified_branch_type,
        }
    }

    /// Returns `true` if a branch recorded with `branch_type` may be the target
    /// of a branch or pull-request analysis.
    ///
    /// Only an exact long-lived or unified type qualifies, and only when the
    /// host exposes that type.
    pub fn is_merge_target(&self, branch_type: BranchType) -> bool {
        match branch_type {
            BranchType::LongLived => self.legacy_branch_types,
            BranchType::Branch => self.unified_branch_type,
            _ => false,
        }
    }

    /// Human-readable list of the acceptable merge-target types, used in
    /// error messages.
    pub fn merge_target_types(&self) -> String {
        let mut types = Vec::new();
        if self.legacy_branch_types {
            types.push(BranchType::LongLived.as_str());
        }
        if self.unified_branch_type {
            types.push(BranchType::Branch.as_str());
        }
        types.join(" or ")
    }
}

impl Default for HostCapabilities {
    /// Capabilities of the oldest host still shipping both schemes.
    fn default() -> Self {
        Self::for_version(HostVersion::new(UNIFIED_BRANCH_SINCE.0, UNIFIED_BRANCH_SINCE.1))
    }
}

#[cfg(test)]
#[path = "capabilities_tests.rs"]
mod tests;
