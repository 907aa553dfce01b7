//! Markdown bodies for decoration comments.
//!
//! Rendering is pure text formatting; the decoration marker is added by the
//! orchestrator when the comment is posted.

use std::fmt::Write as _;

use crate::{AnalysisResult, Issue, QualityGateStatus, Severity};

/// Renders the summary comment: gate verdict, failed conditions and open
/// issue counts by severity.
pub fn render_summary(analysis: &AnalysisResult) -> String {
    let summary = analysis.summary();
    let mut out = String::from("## Analysis Details\n\n");

    let verdict = match summary.status {
        QualityGateStatus::Passed => "**Quality Gate passed**",
        QualityGateStatus::Failed => "**Quality Gate failed**",
    };
    let _ = writeln!(out, "{verdict}\n");

    let failed: Vec<_> = summary.failed_conditions().collect();
    if !failed.is_empty() {
        out.push_str("### Failed conditions\n\n");
        for condition in failed {
            let _ = writeln!(
                out,
                "- `{}`: {} (threshold {})",
                condition.metric, condition.actual, condition.threshold
            );
        }
        out.push('\n');
    }

    let total = analysis.open_issues().count();
    let _ = writeln!(out, "### {total} open issue{}\n", plural(total));
    if total > 0 {
        out.push_str("| Severity | Count |\n|---|---:|\n");
        for severity in Severity::ALL {
            let count = analysis.open_count(severity);
            if count > 0 {
                let _ = writeln!(out, "| {severity} | {count} |");
            }
        }
        out.push('\n');
    }

    if let Some(url) = &summary.dashboard_url {
        let _ = writeln!(out, "[View the full report]({url})");
    }

    out.trim_end().to_string()
}

/// Renders the comment body for one issue.
pub fn render_issue(issue: &Issue) -> String {
    let mut out = format!("**{}**: {}", issue.severity, issue.message.trim());
    if let Some(rule) = &issue.rule {
        let _ = write!(out, "\n\nRule: `{rule}`");
    }
    out
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
