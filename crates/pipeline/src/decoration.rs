//! The decoration pass: clearing stale comments and posting the summary and
//! per-issue comments for a pull-request analysis.
//!
//! A pass is best-effort. Every provider call is awaited in order, each
//! failure is recorded against the step that raised it, and the pass carries
//! on with the next step. Nothing is retried. The caller always gets a
//! [`DecorationReport`] back; decoration never fails the analysis.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn, Span};

use crate::comments::with_marker;
use crate::render::{render_issue, render_summary};
use crate::{
    AnalysisResult, BranchDescriptor, CommentId, CommentSynchronizer, DecorationRunId,
    DecorationToggles, ProviderClient, ProviderError, PullRequestKey, SourcePath, Timestamp,
};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// One unit of work in a decoration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DecorationStep {
    /// Deleting marker comments left by earlier passes.
    ClearStaleComments {
        /// Comments actually deleted.
        deleted: Vec<CommentId>,
        /// Comments that are still on the pull request because their
        /// deletion failed; the matching errors are in the step outcome.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        failed: Vec<CommentId>,
    },
    /// Posting the quality-gate summary.
    PostSummary,
    /// Posting the comment for one open issue.
    PostIssue {
        /// Position of the issue in the analysis result.
        issue_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<SourcePath>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
}

/// What happened to one [`DecorationStep`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    #[serde(flatten)]
    pub step: DecorationStep,
    /// Provider errors raised by the step; empty when it succeeded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ProviderError>,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Overall verdict of a decoration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecorationStatus {
    /// Every step succeeded.
    Completed,
    /// At least one step recorded an error.
    CompletedWithFailures,
    /// The pass did not run.
    Skipped { reason: String },
}

/// Aggregate outcome of one decoration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationReport {
    pub run_id: DecorationRunId,
    pub pull_request: Option<PullRequestKey>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    #[serde(flatten)]
    pub status: DecorationStatus,
    pub steps: Vec<StepOutcome>,
}

impl DecorationReport {
    /// Steps that recorded at least one error.
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|step| !step.succeeded())
    }

    /// Report for a descriptor that is not a pull request.
    pub fn skipped(
        run_id: DecorationRunId,
        started_at: Timestamp,
        descriptor: &BranchDescriptor,
    ) -> Self {
        Self {
            run_id,
            pull_request: None,
            started_at,
            finished_at: Timestamp::now(),
            status: DecorationStatus::Skipped {
                reason: format!(
                    "branch '{}' is of type {}, not a pull request",
                    descriptor.name(),
                    descriptor.branch_type()
                ),
            },
            steps: Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, DecorationStatus::Skipped { .. })
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives a decoration pass against a bound [`ProviderClient`].
#[derive(Debug, Clone, Default)]
pub struct DecorationOrchestrator {
    toggles: DecorationToggles,
    synchronizer: CommentSynchronizer,
}

impl DecorationOrchestrator {
    pub fn new(toggles: DecorationToggles) -> Self {
        Self {
            toggles,
            synchronizer: CommentSynchronizer::new(),
        }
    }

    /// Decorates the pull request described by `descriptor`.
    ///
    /// Steps run in a fixed order: clear stale comments, post the summary,
    /// then post one comment per open issue. A descriptor that is not a pull
    /// request yields a skipped report without touching the provider.
    #[instrument(
        name = "decoration",
        skip_all,
        fields(run_id = tracing::field::Empty, pull_request = tracing::field::Empty)
    )]
    pub async fn decorate<C>(
        &self,
        client: &C,
        analysis: &AnalysisResult,
        descriptor: &BranchDescriptor,
    ) -> DecorationReport
    where
        C: ProviderClient + ?Sized,
    {
        let run_id = DecorationRunId::new_random();
        let started_at = Timestamp::now();
        let span = Span::current();
        span.record("run_id", tracing::field::display(run_id));

        let Ok(key) = descriptor.pull_request_key() else {
            info!(
                branch = %descriptor.name(),
                branch_type = %descriptor.branch_type(),
                "Not a pull request, skipping decoration"
            );
            return DecorationReport::skipped(run_id, started_at, descriptor);
        };
        span.record("pull_request", tracing::field::display(key));

        let mut steps = Vec::new();

        if self.toggles.delete_stale_comments {
            steps.push(self.clear_stale_comments(client).await);
        }

        if self.toggles.post_summary {
            let text = with_marker(&render_summary(analysis));
            let errors = create(client, &text, None, None).await.into_iter().collect();
            steps.push(StepOutcome {
                step: DecorationStep::PostSummary,
                errors,
            });
        }

        if self.toggles.post_file_comments {
            for (issue_index, issue) in analysis.issues().iter().enumerate() {
                if !issue.status.is_open() {
                    continue;
                }
                let path = issue.source_path();
                // A line without a file cannot be anchored.
                let line = path.as_ref().and(issue.line);
                let text = with_marker(&render_issue(issue));
                let errors = create(client, &text, path.as_ref(), line)
                    .await
                    .into_iter()
                    .collect();
                steps.push(StepOutcome {
                    step: DecorationStep::PostIssue {
                        issue_index,
                        path,
                        line,
                    },
                    errors,
                });
            }
        }

        let failed = steps.iter().filter(|step| !step.succeeded()).count();
        let status = if failed == 0 {
            DecorationStatus::Completed
        } else {
            DecorationStatus::CompletedWithFailures
        };
        info!(steps = steps.len(), failed, "Decoration pass finished");

        DecorationReport {
            run_id,
            pull_request: Some(key.clone()),
            started_at,
            finished_at: Timestamp::now(),
            status,
            steps,
        }
    }

    async fn clear_stale_comments<C>(&self, client: &C) -> StepOutcome
    where
        C: ProviderClient + ?Sized,
    {
        match self.synchronizer.clear(client).await {
            Ok(outcome) => {
                let (failed, errors) = outcome
                    .failed
                    .into_iter()
                    .map(|failure| (failure.id, failure.error))
                    .unzip();
                StepOutcome {
                    step: DecorationStep::ClearStaleComments {
                        deleted: outcome.deleted,
                        failed,
                    },
                    errors,
                }
            }
            Err(error) => {
                warn!(%error, "Could not list stale comments");
                StepOutcome {
                    step: DecorationStep::ClearStaleComments {
                        deleted: Vec::new(),
                        failed: Vec::new(),
                    },
                    errors: vec![error],
                }
            }
        }
    }
}

async fn create<C>(
    client: &C,
    text: &str,
    path: Option<&SourcePath>,
    line: Option<u32>,
) -> Option<ProviderError>
where
    C: ProviderClient + ?Sized,
{
    match client.create_comment(text, path, line).await {
        Ok(()) => {
            debug!(path = path.map(SourcePath::as_str), line, "Posted comment");
            None
        }
        Err(error) => {
            warn!(path = path.map(SourcePath::as_str), line, %error, "Failed to post comment");
            Some(error)
        }
    }
}

#[cfg(test)]
#[path = "decoration_tests.rs"]
mod tests;
