// crates/verity-cli/src/commands/evaluate.rs
//
// `verity evaluate`: evaluate one consensus request read from JSON.

use clap::Args;

use super::{read_input, Context};
use crate::output::{contribution_rows, format_json, format_table, result_rows, OutputFormat};

#[derive(Debug, Args)]
pub struct EvaluateCmd {
    /// Path to a JSON request, or `-` for stdin.
    #[arg(long, short, default_value = "-")]
    pub input: String,

    /// Override the request's previous consensus score.
    #[arg(long)]
    pub previous: Option<f64>,
}

/// Run the evaluate command.
pub async fn run(cmd: &EvaluateCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_input(&cmd.input)?;
    let mut request = verity_consensus::parse_request(&raw)?;
    if let Some(previous) = cmd.previous {
        request.previous_consensus_score = Some(previous);
    }

    let service = ctx.service()?;
    let result = service.handle(request).await?;
    tracing::debug!("Evaluation metrics: {:?}", service.metrics());

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&*result)),
        OutputFormat::Table => {
            println!("{}", format_table(&result_rows(&result)));
            if !result.user_contributions.is_empty() {
                println!();
                println!("{}", format_table(&contribution_rows(&result)));
            }
        }
    }

    Ok(())
}
