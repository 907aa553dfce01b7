//! Shared value types for the analysis domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values and participate in domain computations: the immutable
//! [`AnalysisResult`] handed over by a completed analysis run, the issues and
//! quality-gate verdict it contains, and the [`HostVersion`] used to negotiate
//! branch capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{RuleKey, SourcePath};

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// Severity of an [`Issue`], from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
}

impl Severity {
    /// All severities in display order.
    pub const ALL: [Severity; 5] = [
        Severity::Blocker,
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Info,
    ];

    /// Returns the upper-case wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocker => "BLOCKER",
            Self::Critical => "CRITICAL",
            Self::Major => "MAJOR",
            Self::Minor => "MINOR",
            Self::Info => "INFO",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// Workflow status of an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Open,
    Confirmed,
    Reopened,
    Resolved,
    Closed,
}

impl IssueStatus {
    /// Returns `true` unless the issue has been closed or resolved.
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Resolved | Self::Closed)
    }
}

// ---------------------------------------------------------------------------

/// A single finding produced by an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Human-readable description of the finding.
    pub message: String,

    /// Severity of this finding.
    pub severity: Severity,

    /// Workflow status; closed and resolved issues are never posted.
    pub status: IssueStatus,

    /// Rule that raised the issue, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleKey>,

    /// Path of the file the issue relates to, relative to the repository root.
    ///
    /// `None` for project-level issues with no file context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// 1-based line the issue relates to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Issue {
    /// Resolves the provider-facing source path for this issue.
    ///
    /// Backslashes are normalised to `/` and leading `./` or `/` segments are
    /// removed. Returns `None` when the issue has no usable file context.
    pub fn source_path(&self) -> Option<SourcePath> {
        let raw = self.file_path.as_deref()?.trim();
        let normalised = raw.replace('\\', "/");
        let mut path = normalised.as_str();
        loop {
            if let Some(rest) = path.strip_prefix("./") {
                path = rest;
            } else if let Some(rest) = path.strip_prefix('/') {
                path = rest;
            } else {
                break;
            }
        }
        SourcePath::new(path)
    }
}

// ---------------------------------------------------------------------------
// Quality gate
// ---------------------------------------------------------------------------

/// Verdict of the quality gate evaluated at the end of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityGateStatus {
    Passed,
    Failed,
}

/// A single quality-gate condition and how the analysis measured against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityGateCondition {
    /// Metric the condition applies to (e.g. `"new_coverage"`).
    pub metric: String,
    /// Value measured by the analysis.
    pub actual: String,
    /// Threshold configured on the gate.
    pub threshold: String,
    /// Whether the measured value satisfied the threshold.
    pub passed: bool,
}

/// Quality-gate verdict payload carried by an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityGateSummary {
    pub status: QualityGateStatus,
    #[serde(default)]
    pub conditions: Vec<QualityGateCondition>,
    /// Link to the full analysis report on the host, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

impl QualityGateSummary {
    /// Returns the conditions that did not pass.
    pub fn failed_conditions(&self) -> impl Iterator<Item = &QualityGateCondition> {
        self.conditions.iter().filter(|c| !c.passed)
    }
}

// ---------------------------------------------------------------------------
// Analysis result
// ---------------------------------------------------------------------------

/// The output of a completed analysis run.
///
/// Owned by the analysis run and immutable once produced: the fields are only
/// readable, and decoration borrows the result for the duration of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    issues: Vec<Issue>,
    summary: QualityGateSummary,
}

impl AnalysisResult {
    /// Creates an [`AnalysisResult`] from its issues (in analysis order) and
    /// quality-gate summary.
    pub fn new(issues: Vec<Issue>, summary: QualityGateSummary) -> Self {
        Self { issues, summary }
    }

    /// All issues in the order the analysis produced them.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues that are neither closed nor resolved, in analysis order.
    pub fn open_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.status.is_open())
    }

    /// The quality-gate verdict.
    pub fn summary(&self) -> &QualityGateSummary {
        &self.summary
    }

    /// Number of open issues with the given severity.
    pub fn open_count(&self, severity: Severity) -> usize {
        self.open_issues()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Version of the analysis host the resolver runs inside.
///
/// Only `major.minor` matters for capability negotiation; see
/// [`crate::HostCapabilities::for_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl HostVersion {
    /// Creates a new [`HostVersion`].
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns `true` if this version is at least `major.minor`.
    pub fn is_at_least(self, major: u32, minor: u32) -> bool {
        self >= Self::new(major, minor)
    }
}

impl std::fmt::Display for HostVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for HostVersion {
    type Err = String;

    /// Parses `"MAJOR.MINOR"`; any trailing `.PATCH` component is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| format!("invalid host version '{s}'"))?;
        let minor = match parts.next() {
            Some(p) => p
                .parse()
                .map_err(|_| format!("invalid host version '{s}'"))?,
            None => 0,
        };
        Ok(Self::new(major, minor))
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
