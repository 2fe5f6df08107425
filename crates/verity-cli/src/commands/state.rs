// crates/verity-cli/src/commands/state.rs
//
// `verity state`: classify a score with the configured state machine.

use clap::Args;
use serde::Serialize;
use verity_consensus::ConsensusStateMachine;
use verity_core::ConsensusState;

use super::Context;
use crate::output::{format_json, format_table, FieldRow, OutputFormat};

#[derive(Debug, Args)]
pub struct StateCmd {
    /// Current consensus score in [0, 1].
    #[arg(long)]
    pub score: f64,

    /// Score from the previous evaluation, if any.
    #[arg(long)]
    pub previous: Option<f64>,
}

#[derive(Serialize)]
struct StateReport {
    score: f64,
    previous: Option<f64>,
    state: ConsensusState,
}

/// Run the state command.
pub async fn run(cmd: &StateCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    for (name, value) in [("score", Some(cmd.score)), ("previous", cmd.previous)] {
        if let Some(v) = value {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(format!("--{} must be within [0, 1], got {}", name, v).into());
            }
        }
    }

    ctx.config.validate()?;
    let machine = ConsensusStateMachine::new(ctx.config.engine.thresholds.clone());
    let report = StateReport {
        score: cmd.score,
        previous: cmd.previous,
        state: machine.determine(cmd.score, cmd.previous),
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            let rows = vec![
                FieldRow {
                    field: "score".into(),
                    value: format!("{:.4}", report.score),
                },
                FieldRow {
                    field: "previous".into(),
                    value: report
                        .previous
                        .map(|p| format!("{:.4}", p))
                        .unwrap_or_else(|| "-".into()),
                },
                FieldRow {
                    field: "state".into(),
                    value: report.state.to_string(),
                },
            ];
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;

    fn context(config: CliConfig) -> Context {
        Context {
            config,
            format: OutputFormat::Json,
            now: None,
        }
    }

    #[tokio::test]
    async fn test_unordered_thresholds_are_rejected() {
        let mut config = CliConfig::default();
        config.engine.thresholds.low = 0.9;
        let cmd = StateCmd {
            score: 0.5,
            previous: None,
        };
        let err = run(&cmd, &context(config)).await.unwrap_err();
        assert!(err.to_string().contains("thresholds"));
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_rejected() {
        let cmd = StateCmd {
            score: 1.5,
            previous: None,
        };
        assert!(run(&cmd, &context(CliConfig::default())).await.is_err());
    }

    #[tokio::test]
    async fn test_valid_score_succeeds() {
        let cmd = StateCmd {
            score: 0.55,
            previous: Some(0.85),
        };
        assert!(run(&cmd, &context(CliConfig::default())).await.is_ok());
    }
}
