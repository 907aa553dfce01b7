//! Subcommand implementations.

use std::collections::HashMap;

use anyhow::Result;
use bitbucket::BitbucketCloudDecorator;
use pipeline::config::keys;
use pipeline::{
    load_analysed_branch, AnalysedBranch, AnalysisResult, BranchDescriptor, BranchResolver,
    BranchUuid, ConfigurationError, DecorationReport, HostCapabilities, HostVersion,
    KnownBranches, LoadError, ProviderConfig, ReportMetadata, ResolutionError,
};
use tracing::info;

/// Parses a `key=value` scan parameter.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Resolves the branch descriptor for one analysis run.
///
/// A repeated parameter keeps its last value.
pub fn resolve_descriptor(
    params: &[(String, String)],
    registry: &KnownBranches,
    host_version: HostVersion,
    long_lived_pattern: Option<&str>,
) -> Result<BranchDescriptor, ResolutionError> {
    let scan_params: HashMap<String, String> = params.iter().cloned().collect();

    let mut resolver = BranchResolver::new(HostCapabilities::for_version(host_version));
    if let Some(pattern) = long_lived_pattern {
        resolver = resolver.with_long_lived_pattern(pattern);
    }

    let descriptor = resolver.resolve(&scan_params, registry)?;
    info!(
        branch = %descriptor.name(),
        branch_type = %descriptor.branch_type(),
        "Resolved branch"
    );
    Ok(descriptor)
}

/// Loads the analysed branch recorded for `descriptor`, as the processing
/// side sees it once the report has been received.
pub fn load_branch(
    descriptor: &BranchDescriptor,
    registry: &KnownBranches,
    project_uuid: &BranchUuid,
) -> Result<AnalysedBranch, LoadError> {
    let metadata = ReportMetadata::from(descriptor);
    let branch = load_analysed_branch(&metadata, project_uuid, registry)?;
    info!(
        branch = %branch.name,
        branch_type = %branch.branch_type,
        is_main = branch.is_main,
        "Loaded analysed branch"
    );
    Ok(branch)
}

/// Runs one decoration pass against Bitbucket Cloud.
///
/// A configured `base_url` must point at the Bitbucket Cloud 2.0 API.
pub async fn decorate(
    config: &ProviderConfig,
    analysis: &AnalysisResult,
    descriptor: &BranchDescriptor,
) -> Result<DecorationReport> {
    let decorator = BitbucketCloudDecorator::new();
    if let Some(base_url) = &config.base_url {
        let root = format!("{}/", base_url.trim_end_matches('/'));
        if !decorator.is_supported(&root) {
            return Err(ConfigurationError::InvalidSetting {
                setting: keys::BASE_URL.to_string(),
                reason: format!("'{base_url}' is not supported by {}", decorator.name()),
            }
            .into());
        }
    }

    let report = decorator.decorate(config, analysis, descriptor).await?;
    Ok(report)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
