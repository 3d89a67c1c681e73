//! Phase aggregation and report rendering
//!
//! Rolls per-feature statuses into per-phase completion and renders the
//! markdown progress report.

mod format;

pub use format::*;

use crate::types::{FeatureStatus, PhaseStats};

/// Completion per phase bucket, in bucket order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseSummary {
    /// Only buckets with at least one feature
    pub rows: Vec<(String, PhaseStats)>,
    pub total: PhaseStats,
}

/// Aggregate statuses into the configured phase buckets.
///
/// A feature whose phase is not a known bucket is left out of every count;
/// it still shows up in the detail table. Only Complete and Modified count
/// as done.
pub fn summarize(statuses: &[FeatureStatus], phases: &[String]) -> PhaseSummary {
    let mut buckets: Vec<(String, PhaseStats)> = phases
        .iter()
        .map(|p| (p.clone(), PhaseStats::default()))
        .collect();

    for item in statuses {
        if let Some((_, stats)) = buckets.iter_mut().find(|(p, _)| *p == item.phase) {
            stats.total += 1;
            if item.result.status.counts_as_done() {
                stats.complete += 1;
            }
        }
    }

    let rows: Vec<(String, PhaseStats)> =
        buckets.into_iter().filter(|(_, s)| s.total > 0).collect();
    let total = rows.iter().fold(PhaseStats::default(), |acc, (_, s)| PhaseStats {
        total: acc.total + s.total,
        complete: acc.complete + s.complete,
    });

    PhaseSummary { rows, total }
}

const RECOMMENDATIONS: &str = "\
1.  **Address `❌ Not Started` items first**, prioritizing foundational features like the mobile app setup and core authentication flows.
2.  **Complete `🔄 Partially Complete` items**, such as finishing UI components and ensuring all database tables are fully migrated.
3.  **Review `🔀 Modified` items** to ensure the implemented changes align with the overall project goals.
4.  **Conduct a full end-to-end testing cycle** across both web and mobile platforms to validate all features.
5.  **Prepare for deployment** by setting up production environments and CI/CD pipelines.
";

/// Render the full progress report
pub fn render_report(project_name: &str, statuses: &[FeatureStatus], phases: &[String]) -> String {
    let summary = summarize(statuses, phases);
    let mut output = String::new();

    output.push_str(&format!("# {}: Comprehensive Progress Report\n\n---\n", project_name));

    // Executive summary
    output.push_str("## 1. Executive Summary\n\n");
    output.push_str(&format!(
        "This report provides a detailed analysis of the {}, comparing the original specifications against the current implementation. The following table summarizes the completion status by phase:\n\n",
        project_name
    ));
    output.push_str("| Phase   | Total Specs | Complete | Completion % |\n");
    output.push_str("|---------|-------------|----------|--------------|\n");
    for (phase, stats) in &summary.rows {
        output.push_str(&summary_row(phase, stats));
    }
    output.push_str(&total_row(&summary.total));
    output.push('\n');

    // Detail table
    output.push_str("## 2. Detailed Implementation Status\n\n");
    output.push_str("| Phase   | Specification | Status | Gap / Implementation Details |\n");
    output.push_str("|---------|---------------|--------|------------------------------|\n");
    let mut details: Vec<&FeatureStatus> = statuses.iter().collect();
    details.sort_by(|a, b| (&a.phase, &a.title).cmp(&(&b.phase, &b.title)));
    for item in details {
        output.push_str(&detail_row(item));
    }

    // Remaining work
    output.push_str("\n## 3. Remaining Work Breakdown\n\n");
    let mut remaining: Vec<&FeatureStatus> = statuses
        .iter()
        .filter(|s| s.result.status.is_remaining())
        .collect();
    if remaining.is_empty() {
        output.push_str("✅ **All planned work has been completed or modified!**\n");
    } else {
        remaining.sort_by(|a, b| a.phase.cmp(&b.phase));
        for item in remaining {
            output.push_str(&remaining_item(item));
        }
    }

    // Recommendations
    output.push_str("\n## 4. Next Steps & Recommendations\n\n");
    output.push_str(
        "Based on the analysis, the following steps are recommended to complete the project:\n\n",
    );
    output.push_str(RECOMMENDATIONS);

    output
}
