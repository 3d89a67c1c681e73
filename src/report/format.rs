//! Markdown formatting helpers for the progress report

use crate::types::{FeatureStatus, PhaseStats};

/// Flatten a value into a single table cell line
pub fn one_line(text: &str) -> String {
    text.replace('\n', " ")
}

/// A summary table row
pub fn summary_row(phase: &str, stats: &PhaseStats) -> String {
    format!(
        "| {} | {} | {} | {:.1}% |\n",
        phase,
        stats.total,
        stats.complete,
        stats.percentage()
    )
}

/// The bold grand-total row
pub fn total_row(stats: &PhaseStats) -> String {
    format!(
        "| **Total** | **{}** | **{}** | **{:.1}%** |\n",
        stats.total,
        stats.complete,
        stats.percentage()
    )
}

/// Gap text followed by its evidence
pub fn gap_details(item: &FeatureStatus) -> String {
    one_line(&format!("{} {}", item.result.gap, item.result.evidence))
}

/// A detail table row
pub fn detail_row(item: &FeatureStatus) -> String {
    format!(
        "| {} | {} | {} | {} |\n",
        item.phase,
        one_line(&item.title),
        item.result.status.label(),
        gap_details(item)
    )
}

/// A remaining-work bullet
pub fn remaining_item(item: &FeatureStatus) -> String {
    format!(
        "- **[{}]** {} - *Status: {}*\n",
        item.phase,
        one_line(&item.title),
        item.result.status.label()
    )
}
