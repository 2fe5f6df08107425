// crates/verity-cli/src/output.rs
//
// Output formatting utilities for the verity CLI.
// Supports table and JSON output modes.

use clap::ValueEnum;
use serde::Serialize;
use tabled::{Table, Tabled};
use verity_core::ConsensusResult;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Unix seconds as RFC 3339, falling back to the raw number.
pub fn format_timestamp(secs: f64) -> String {
    if !secs.is_finite() {
        return format!("{}", secs);
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    chrono::DateTime::from_timestamp(whole as i64, nanos)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| format!("{:.3}", secs))
}

/// One `field | value` row of a single result.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One row per user in the contribution table.
#[derive(Tabled)]
pub struct ContributionRow {
    #[tabled(rename = "User")]
    pub user: String,
    #[tabled(rename = "Contribution")]
    pub contribution: String,
}

/// One row per request in a batch summary.
#[derive(Tabled)]
pub struct BatchRow {
    #[tabled(rename = "#")]
    pub line: usize,
    #[tabled(rename = "Content")]
    pub content_id: String,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Consensus")]
    pub consensus: String,
    #[tabled(rename = "Reliability")]
    pub reliability: String,
    #[tabled(rename = "Sources")]
    pub sources: String,
    #[tabled(rename = "Error")]
    pub error: String,
}

fn row(field: &str, value: String) -> FieldRow {
    FieldRow {
        field: field.to_string(),
        value,
    }
}

/// Field/value rows for one result.
pub fn result_rows(result: &ConsensusResult) -> Vec<FieldRow> {
    vec![
        row("content_id", result.content_id.clone()),
        row("state", result.consensus_state.to_string()),
        row("consensus_score", format!("{:.4}", result.consensus_score)),
        row("reliability_score", format!("{:.4}", result.reliability_score)),
        row("temporal_weight", format!("{:.4}", result.temporal_weight)),
        row("validation_count", result.validation_count.to_string()),
        row("evaluated_at", format_timestamp(result.timestamp)),
    ]
}

pub fn contribution_rows(result: &ConsensusResult) -> Vec<ContributionRow> {
    result
        .user_contributions
        .iter()
        .map(|(user, contribution)| ContributionRow {
            user: user.clone(),
            contribution: format!("{:.4}", contribution),
        })
        .collect()
}
