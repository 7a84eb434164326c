//! Bounded issue reporting
//!
//! Issues arrive in discovery order and are all retained for counting
//! and annotation; the user-facing detail listing is capped at the
//! first 100. No deduplication - two comparisons near the same physical
//! location each produce a distinct issue.

use super::types::{AnalysisSummary, Completion, Issue, IssueRow};

/// Cap on the detail listing and on annotation markers
pub const MAX_REPORTED_ISSUES: usize = 100;

/// Format the first 100 issues as report rows.
pub fn issue_rows(issues: &[Issue]) -> Vec<IssueRow> {
    issues
        .iter()
        .take(MAX_REPORTED_ISSUES)
        .map(|issue| IssueRow {
            distance: format!("{:.3}", issue.distance),
            segment1: issue.segment_a.descriptor(),
            segment2: issue.segment_b.descriptor(),
            location: format!("({:.1}, {:.1})", issue.location.x, issue.location.y),
        })
        .collect()
}

/// Human-readable completion status line.
pub fn completion_message(completion: Completion, max_comparisons: u64) -> String {
    match completion {
        Completion::Exhaustive => "Complete!".to_string(),
        Completion::Truncated => format!("Complete (limited to {} comparisons)", max_comparisons),
        Completion::Cancelled => "Cancelled".to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn build_summary(
    segment_count: usize,
    comparisons: u64,
    skipped: u64,
    issue_count: usize,
    completion: Completion,
    decode_error_count: usize,
    elapsed_ms: f64,
) -> AnalysisSummary {
    AnalysisSummary {
        segment_count,
        comparisons,
        skipped,
        issue_count,
        completion,
        decode_error_count,
        elapsed_ms,
    }
}
