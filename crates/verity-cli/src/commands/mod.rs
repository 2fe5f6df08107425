// crates/verity-cli/src/commands/mod.rs
//
// Subcommand implementations and the pieces they share.

pub mod batch;
pub mod config;
pub mod evaluate;
pub mod state;

use std::io::Read;
use std::sync::Arc;

use verity_consensus::{ConsensusCache, ConsensusEngine, ConsensusService};
use verity_core::{FixedClock, VerityError};

use crate::config::CliConfig;

/// Options every command can see.
pub struct Context {
    pub config: CliConfig,
    pub format: crate::output::OutputFormat,
    /// Pinned evaluation time in Unix seconds; the system clock when unset.
    pub now: Option<f64>,
}

impl Context {
    /// Build the engine and service described by the loaded configuration.
    pub fn service(&self) -> Result<ConsensusService, VerityError> {
        self.config.validate()?;
        let mut engine = ConsensusEngine::new(self.config.engine.clone())?;
        if let Some(now) = self.now {
            engine = engine.with_clock(Arc::new(FixedClock(now)));
        }
        let mut service = ConsensusService::new(
            Arc::new(engine),
            ConsensusCache::new(self.config.cache_ttl_secs),
        );
        if let Some(timeout_ms) = self.config.evaluation_timeout_ms {
            service = service.with_timeout_ms(timeout_ms);
        }
        Ok(service)
    }
}

/// Read a whole input file, or stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
