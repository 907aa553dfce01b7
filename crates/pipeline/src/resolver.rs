//! Branch resolution: turns scan-time parameters and the registry of known
//! branches into the [`BranchDescriptor`] for an analysis run.
//!
//! Resolution is a pure function over its inputs. Any error it returns is fatal
//! to the analysis run.

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::{
    BranchDescriptor, BranchName, BranchRecord, BranchRegistry, BranchType, BranchUuid,
    HostCapabilities, PullRequestKey, ResolutionError, DEFAULT_BRANCH_NAME,
};

/// Scan-parameter keys understood by the resolver.
pub mod params {
    /// Name of the branch being analysed.
    pub const BRANCH_NAME: &str = "branch.name";
    /// Branch the analysed branch merges into.
    pub const BRANCH_TARGET: &str = "branch.target";
    /// Source branch of the pull request.
    pub const PULL_REQUEST_BRANCH: &str = "pullrequest.branch";
    /// Branch the pull request merges into.
    pub const PULL_REQUEST_BASE: &str = "pullrequest.base";
    /// Provider key of the pull request.
    pub const PULL_REQUEST_KEY: &str = "pullrequest.key";
    /// Regular expression classifying long-lived branches on legacy hosts.
    pub const LONG_LIVED_BRANCHES_REGEX: &str = "branch.longLivedBranches.regex";

    pub(crate) const BRANCH_ANALYSIS: [&str; 2] = [BRANCH_NAME, BRANCH_TARGET];
    pub(crate) const PULL_REQUEST_ANALYSIS: [&str; 3] =
        [PULL_REQUEST_BRANCH, PULL_REQUEST_KEY, PULL_REQUEST_BASE];
}

/// Pattern for long-lived branches when none is configured.
pub const DEFAULT_LONG_LIVED_PATTERN: &str = "(branch|release).*";

/// Resolves scan parameters into a [`BranchDescriptor`].
#[derive(Debug, Clone)]
pub struct BranchResolver {
    capabilities: HostCapabilities,
    long_lived_pattern: Option<String>,
}

impl BranchResolver {
    /// Creates a resolver for a host with the given capabilities.
    pub fn new(capabilities: HostCapabilities) -> Self {
        Self {
            capabilities,
            long_lived_pattern: None,
        }
    }

    /// Overrides the long-lived branch pattern.
    ///
    /// Takes precedence over a pattern passed in the scan parameters.
    pub fn with_long_lived_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.long_lived_pattern = Some(pattern.into());
        self
    }

    /// Resolves the descriptor for one analysis run.
    ///
    /// Branch parameters take priority over pull-request parameters when both
    /// are present. With no parameters at all the main line is analysed.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::NoBranchesExist`] when a non-default branch is
    ///   requested for a project with no recorded branches.
    /// - [`ResolutionError::TargetNotFound`] / [`ResolutionError::TargetWrongType`]
    ///   when the target or base cannot be merged into.
    /// - [`ResolutionError::InvalidBranchType`] when an existing record cannot
    ///   be analysed as a branch on this host.
    /// - [`ResolutionError::InvalidLongLivedPattern`] and
    ///   [`ResolutionError::MissingPullRequestKey`] for malformed input.
    #[instrument(level = "debug", skip_all, fields(known_branches = !registry.is_empty()))]
    pub fn resolve<R>(
        &self,
        scan_params: &HashMap<String, String>,
        registry: &R,
    ) -> Result<BranchDescriptor, ResolutionError>
    where
        R: BranchRegistry + ?Sized,
    {
        let param = move |key: &str| trim_to_none(scan_params.get(key));

        if registry.is_empty() {
            if targets_default_branch(param(params::BRANCH_NAME), param(params::BRANCH_TARGET)) {
                let name = param(params::BRANCH_NAME).unwrap_or(DEFAULT_BRANCH_NAME);
                info!(branch = name, "No known branches, analysing main branch");
                return Ok(BranchDescriptor::main(branch_name(name)));
            }
            return Err(ResolutionError::NoBranchesExist);
        }

        if has_any(scan_params, &params::BRANCH_ANALYSIS) {
            let pattern = self
                .long_lived_pattern
                .as_deref()
                .or_else(|| param(params::LONG_LIVED_BRANCHES_REGEX));
            return self.resolve_branch(
                param(params::BRANCH_NAME).unwrap_or_else(|| registry.default_branch_name()),
                param(params::BRANCH_TARGET),
                pattern,
                registry,
            );
        }

        if has_any(scan_params, &params::PULL_REQUEST_ANALYSIS) {
            return self.resolve_pull_request(
                param(params::PULL_REQUEST_BRANCH),
                param(params::PULL_REQUEST_BASE),
                param(params::PULL_REQUEST_KEY),
                registry,
            );
        }

        debug!("No branch parameters given, analysing main branch");
        Ok(BranchDescriptor::main(branch_name(
            registry.default_branch_name(),
        )))
    }

    fn resolve_branch<R>(
        &self,
        name: &str,
        target: Option<&str>,
        long_lived_pattern: Option<&str>,
        registry: &R,
    ) -> Result<BranchDescriptor, ResolutionError>
    where
        R: BranchRegistry + ?Sized,
    {
        let target = target.unwrap_or_else(|| registry.default_branch_name());

        if let Some(existing) = registry.get(name) {
            debug!(
                branch = name,
                recorded_type = %existing.branch_type,
                "Reusing recorded branch type"
            );
            return self.resolve_existing_branch(existing, target, registry);
        }

        let branch_type = self.classify(name, long_lived_pattern)?;
        let target_record = self.find_target(target, registry)?;
        info!(branch = name, %branch_type, target, "Resolved new branch");
        build_branch(
            name,
            branch_type,
            Some(branch_name(target)),
            Some(target_record.uuid.clone()),
        )
    }

    fn resolve_existing_branch<R>(
        &self,
        existing: &BranchRecord,
        target: &str,
        registry: &R,
    ) -> Result<BranchDescriptor, ResolutionError>
    where
        R: BranchRegistry + ?Sized,
    {
        let name = existing.name.as_str();
        let recorded = existing.branch_type;
        if !self.capabilities.supports(recorded) {
            return Err(invalid_type(name, recorded));
        }

        match recorded {
            BranchType::Main => Ok(BranchDescriptor::main(existing.name.clone())),
            // A long-lived branch is its own reference; the target override is ignored.
            BranchType::LongLived => build_branch(
                name,
                recorded,
                None,
                Some(existing.uuid.clone()),
            ),
            BranchType::ShortLived | BranchType::Branch => {
                let target_record = self.find_target(target, registry)?;
                build_branch(
                    name,
                    recorded,
                    Some(branch_name(target)),
                    Some(target_record.uuid.clone()),
                )
            }
            BranchType::PullRequest => Err(invalid_type(name, recorded)),
        }
    }

    fn resolve_pull_request<R>(
        &self,
        branch: Option<&str>,
        base: Option<&str>,
        key: Option<&str>,
        registry: &R,
    ) -> Result<BranchDescriptor, ResolutionError>
    where
        R: BranchRegistry + ?Sized,
    {
        let base = base.unwrap_or_else(|| registry.default_branch_name());
        let base_record = self.find_target(base, registry)?;

        let key = key.and_then(PullRequestKey::new).ok_or_else(|| {
            ResolutionError::MissingPullRequestKey {
                branch: branch.unwrap_or_default().to_string(),
            }
        })?;
        // Without a source branch name the key is the only stable identity.
        let name = branch_name(branch.unwrap_or(key.as_str()));

        info!(pull_request = %key, branch = %name, base, "Resolved pull request");
        Ok(BranchDescriptor::pull_request(
            name,
            key,
            branch_name(base),
            base_record.uuid.clone(),
        ))
    }

    /// Classifies a branch that has never been recorded.
    fn classify(&self, name: &str, pattern: Option<&str>) -> Result<BranchType, ResolutionError> {
        if self.capabilities.unified_branch_type {
            return Ok(BranchType::Branch);
        }

        let pattern = pattern.unwrap_or(DEFAULT_LONG_LIVED_PATTERN);
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            ResolutionError::InvalidLongLivedPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;

        if regex.is_match(name) {
            Ok(BranchType::LongLived)
        } else {
            Ok(BranchType::ShortLived)
        }
    }

    /// Finds `target` in the registry and checks it can be merged into.
    fn find_target<'r, R>(
        &self,
        target: &str,
        registry: &'r R,
    ) -> Result<&'r BranchRecord, ResolutionError>
    where
        R: BranchRegistry + ?Sized,
    {
        let record = registry
            .get(target)
            .ok_or_else(|| ResolutionError::TargetNotFound {
                branch: target.to_string(),
            })?;

        if self.capabilities.is_merge_target(record.branch_type) {
            Ok(record)
        } else {
            Err(ResolutionError::TargetWrongType {
                branch: target.to_string(),
                expected: self.capabilities.merge_target_types(),
                actual: record.branch_type,
            })
        }
    }
}

impl Default for BranchResolver {
    fn default() -> Self {
        Self::new(HostCapabilities::default())
    }
}

/// Returns `true` if the parameters address the default branch: no name (or
/// the conventional default name) and no target other than the name itself.
fn targets_default_branch(name: Option<&str>, target: Option<&str>) -> bool {
    let default_name = name.map_or(true, |n| n == DEFAULT_BRANCH_NAME);
    let no_other_target = match (target, name) {
        (None, _) => true,
        (Some(t), Some(n)) => t == n,
        (Some(_), None) => false,
    };
    default_name && no_other_target
}

fn has_any(scan_params: &HashMap<String, String>, keys: &[&str]) -> bool {
    keys.iter().any(|key| scan_params.contains_key(*key))
}

fn trim_to_none(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn branch_name(name: &str) -> BranchName {
    BranchName::new(name).unwrap_or_else(BranchName::conventional_default)
}

fn invalid_type(name: &str, branch_type: BranchType) -> ResolutionError {
    ResolutionError::InvalidBranchType {
        branch: name.to_string(),
        branch_type,
    }
}

fn build_branch(
    name: &str,
    branch_type: BranchType,
    target: Option<BranchName>,
    reference: Option<BranchUuid>,
) -> Result<BranchDescriptor, ResolutionError> {
    BranchDescriptor::branch(branch_name(name), branch_type, target, reference)
        .map_err(|_| invalid_type(name, branch_type))
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
