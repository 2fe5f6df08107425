// crates/verity-core/src/traits.rs

use async_trait::async_trait;
use chrono::Utc;

use crate::error::VerityError;
use crate::source::{Source, TextSignals};

/// Turns raw source text into key terms and factual statements.
///
/// Implemented by verity-consensus (heuristic default) or by an external
/// NLP collaborator.
pub trait TextSignalExtractor: Send + Sync {
    fn extract(&self, text: &str) -> TextSignals;
}

/// Source of "now" for decay computations, in seconds since the Unix epoch.
///
/// Injectable so that evaluations are reproducible in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

/// Wall-clock time via chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// A clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// Quality and evidence scores recorded for a source outside the request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceMetadata {
    pub quality_score: Option<f64>,
    pub evidence_strength: Option<f64>,
}

/// Lookup of per-source analysis scores not already attached to a request.
///
/// Implemented by the caller's persistence layer; verity-consensus ships an
/// in-memory version for tests and the CLI.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch recorded metadata for `source`, keyed by its `source_id`.
    /// Returns `Ok(None)` when nothing is recorded.
    async fn lookup(&self, source: &Source) -> Result<Option<SourceMetadata>, VerityError>;
}
