//! Entry point for decorating Bitbucket Cloud pull requests.

use pipeline::config::keys;
use pipeline::{
    AnalysisResult, BranchDescriptor, ConfigurationError, DecorationOrchestrator,
    DecorationReport, DecorationRunId, ProviderConfig, ProviderError, Timestamp,
};
use tracing::{info, instrument};

use crate::client::{BitbucketCloudClient, DEFAULT_BASE_URL};

/// Decorates pull requests hosted on Bitbucket Cloud.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitbucketCloudDecorator;

impl BitbucketCloudDecorator {
    /// Identifier of this decorator.
    pub const NAME: &'static str = "BitbucketCloud";

    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Returns `true` if `url` points at the Bitbucket Cloud 2.0 API.
    pub fn is_supported(&self, url: &str) -> bool {
        url.trim()
            .strip_prefix(DEFAULT_BASE_URL)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Runs one decoration pass for `descriptor` with `analysis`.
    ///
    /// Provider failures are captured in the returned report. A descriptor
    /// that is not a pull request produces a skipped report and no request
    /// is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSetting`] when no client can be
    /// built from `config`. Nothing has been sent to the provider in that case.
    #[instrument(
        skip_all,
        fields(
            decorator = BitbucketCloudDecorator::NAME,
            workspace = %config.workspace,
            repository = %config.repository,
        )
    )]
    pub async fn decorate(
        &self,
        config: &ProviderConfig,
        analysis: &AnalysisResult,
        descriptor: &BranchDescriptor,
    ) -> Result<DecorationReport, ConfigurationError> {
        let Ok(key) = descriptor.pull_request_key() else {
            info!(branch = %descriptor.name(), "Not a pull request, nothing to decorate");
            return Ok(DecorationReport::skipped(
                DecorationRunId::new_random(),
                Timestamp::now(),
                descriptor,
            ));
        };

        let client = BitbucketCloudClient::new(config, key).map_err(|error| {
            let reason = match error {
                ProviderError::Configuration { message } => message,
                other => other.to_string(),
            };
            ConfigurationError::InvalidSetting {
                setting: keys::BASE_URL.to_string(),
                reason,
            }
        })?;

        let orchestrator = DecorationOrchestrator::new(config.toggles);
        Ok(orchestrator.decorate(&client, analysis, descriptor).await)
    }
}

#[cfg(test)]
#[path = "decorator_tests.rs"]
mod tests;
