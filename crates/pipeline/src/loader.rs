//! Loading the analysed branch on the processing side.
//!
//! The scanner resolves a [`BranchDescriptor`] and ships it inside the analysis
//! report as [`ReportMetadata`]. When the report is processed, the metadata is
//! checked against the registry again (it may have changed in between) and
//! turned into the [`AnalysedBranch`] the rest of the processing works with.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    BranchDescriptor, BranchName, BranchRegistry, BranchType, BranchUuid, LoadError,
    PullRequestKey,
};

/// Branch information carried in an analysis report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Analysed branch; `None` for an analysis of the main line.
    pub branch_name: Option<BranchName>,
    /// Reported type; `None` when the scanner did not set one.
    pub branch_type: Option<BranchType>,
    /// Branch the analysed branch targets in the SCM.
    pub target_branch_name: Option<BranchName>,
    /// Branch whose analysis is used as the diff reference.
    pub merge_branch_name: Option<BranchName>,
    pub pull_request_key: Option<PullRequestKey>,
}

impl From<&BranchDescriptor> for ReportMetadata {
    fn from(descriptor: &BranchDescriptor) -> Self {
        if descriptor.branch_type() == BranchType::Main {
            return Self::default();
        }
        Self {
            branch_name: Some(descriptor.name().clone()),
            branch_type: Some(descriptor.branch_type()),
            target_branch_name: descriptor.target_name().cloned(),
            merge_branch_name: descriptor.target_name().cloned(),
            pull_request_key: descriptor.pull_request_key().ok().cloned(),
        }
    }
}

/// The branch a processed report belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysedBranch {
    pub name: BranchName,
    pub branch_type: BranchType,
    pub is_main: bool,
    /// Identity of the branch used as the diff reference.
    pub reference_uuid: Option<BranchUuid>,
    pub pull_request_key: Option<PullRequestKey>,
    pub target_branch_name: Option<BranchName>,
}

/// Loads the analysed branch for a report of the project identified by
/// `project_uuid` (which is also the uuid of the project's main branch).
///
/// # Errors
///
/// - [`LoadError::MainBranchNotFound`] when no branch was reported and the
///   main branch record is missing.
/// - [`LoadError::TargetBranchMissing`] when the merge branch is not recorded.
/// - [`LoadError::InvalidBranchType`] when the reported type is unset or not a
///   branch/pull-request type.
pub fn load_analysed_branch<R>(
    metadata: &ReportMetadata,
    project_uuid: &BranchUuid,
    registry: &R,
) -> Result<AnalysedBranch, LoadError>
where
    R: BranchRegistry + ?Sized,
{
    let Some(branch_name) = metadata.branch_name.clone() else {
        let main = registry
            .get_by_uuid(project_uuid)
            .ok_or(LoadError::MainBranchNotFound)?;
        debug!(branch = %main.name, "Loaded main branch");
        return Ok(AnalysedBranch {
            name: main.name.clone(),
            branch_type: main.branch_type,
            is_main: main.is_main,
            reference_uuid: None,
            pull_request_key: None,
            target_branch_name: metadata.target_branch_name.clone(),
        });
    };

    let target_branch_name = metadata
        .target_branch_name
        .clone()
        .or_else(|| metadata.merge_branch_name.clone());

    match metadata.branch_type {
        Some(BranchType::PullRequest) => {
            let merge = metadata
                .merge_branch_name
                .as_ref()
                .map(BranchName::as_str)
                .unwrap_or_else(|| registry.default_branch_name());
            let reference = registry
                .get(merge)
                .ok_or_else(|| LoadError::TargetBranchMissing {
                    branch: merge.to_string(),
                })?;
            Ok(AnalysedBranch {
                name: branch_name,
                branch_type: BranchType::PullRequest,
                is_main: false,
                reference_uuid: Some(reference.uuid.clone()),
                pull_request_key: metadata.pull_request_key.clone(),
                target_branch_name,
            })
        }
        Some(branch_type) if branch_type.is_branch_analysis() => {
            let reference_uuid = match &metadata.merge_branch_name {
                None => project_uuid.clone(),
                Some(merge) => registry
                    .get(merge.as_str())
                    .map(|record| record.uuid.clone())
                    .ok_or_else(|| LoadError::TargetBranchMissing {
                        branch: merge.to_string(),
                    })?,
            };
            let is_main = registry
                .get(branch_name.as_str())
                .is_some_and(|record| record.is_main);
            Ok(AnalysedBranch {
                name: branch_name,
                branch_type,
                is_main,
                reference_uuid: Some(reference_uuid),
                pull_request_key: None,
                target_branch_name,
            })
        }
        other => Err(LoadError::InvalidBranchType {
            found: other.map_or_else(|| "UNSET".to_string(), |t| t.to_string()),
        }),
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
