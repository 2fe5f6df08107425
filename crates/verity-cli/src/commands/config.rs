// crates/verity-cli/src/commands/config.rs
//
// `verity config`: print the effective configuration.

use super::Context;
use crate::output::{format_json, OutputFormat};

/// Run the config command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    ctx.config.validate()?;
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&ctx.config)),
        OutputFormat::Table => print!("{}", ctx.config.to_toml()?),
    }
    Ok(())
}
