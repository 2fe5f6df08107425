// crates/verity-cli/src/commands/batch.rs
//
// `verity batch`: evaluate a JSON Lines file of requests.
//
// Lines for the same content id are evaluated in file order, each seeing
// the previous line's score; different content ids run concurrently.
// A bad line is reported in place and does not stop the batch.

use clap::Args;
use serde::Serialize;
use verity_core::{ConsensusRequest, ConsensusResult, VerityError};

use super::{read_input, Context};
use crate::output::{format_json, format_table, BatchRow, OutputFormat};

#[derive(Debug, Args)]
pub struct BatchCmd {
    /// Path to a JSON Lines file of requests, or `-` for stdin.
    #[arg(long, short, default_value = "-")]
    pub input: String,
}

#[derive(Serialize)]
struct BatchEntry<'a> {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a ConsensusResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the batch command.
pub async fn run(cmd: &BatchCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_input(&cmd.input)?;

    // (line number, parsed request or parse error), blank lines skipped.
    let mut parsed: Vec<(usize, Result<ConsensusRequest, VerityError>)> = Vec::new();
    for (i, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        parsed.push((i + 1, verity_consensus::parse_request(line)));
    }

    let (valid_lines, requests): (Vec<usize>, Vec<ConsensusRequest>) = parsed
        .iter()
        .filter_map(|(line, req)| req.as_ref().ok().map(|r| (*line, r.clone())))
        .unzip();

    let service = ctx.service()?;
    let outcomes = service.handle_batch(requests).await;
    let mut outcomes = valid_lines.into_iter().zip(outcomes);

    let mut results = Vec::with_capacity(parsed.len());
    for (line, request) in parsed {
        match request {
            Err(e) => results.push((line, Err(e))),
            Ok(_) => {
                if let Some((_, outcome)) = outcomes.next() {
                    results.push((line, outcome));
                }
            }
        }
    }

    let metrics = service.metrics();
    tracing::info!(
        "Batch complete: {} requests, {} evaluation errors, last evaluation {}ms",
        results.len(),
        metrics.errors,
        metrics.last_execution_ms
    );

    match ctx.format {
        OutputFormat::Json => {
            let entries: Vec<BatchEntry<'_>> = results
                .iter()
                .map(|(line, outcome)| match outcome {
                    Ok(result) => BatchEntry {
                        line: *line,
                        result: Some(&**result),
                        error: None,
                    },
                    Err(e) => BatchEntry {
                        line: *line,
                        result: None,
                        error: Some(e.to_string()),
                    },
                })
                .collect();
            println!("{}", format_json(&entries));
        }
        OutputFormat::Table => {
            let rows: Vec<BatchRow> = results
                .iter()
                .map(|(line, outcome)| match outcome {
                    Ok(result) => BatchRow {
                        line: *line,
                        content_id: result.content_id.clone(),
                        state: result.consensus_state.to_string(),
                        consensus: format!("{:.4}", result.consensus_score),
                        reliability: format!("{:.4}", result.reliability_score),
                        sources: result.validation_count.to_string(),
                        error: String::new(),
                    },
                    Err(e) => BatchRow {
                        line: *line,
                        content_id: "-".into(),
                        state: "-".into(),
                        consensus: "-".into(),
                        reliability: "-".into(),
                        sources: "-".into(),
                        error: e.to_string(),
                    },
                })
                .collect();
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}
