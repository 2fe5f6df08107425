// crates/verity-core/src/consensus.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::Source;

/// Named consensus verdicts for a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusState {
    /// Below the low threshold.
    Insufficient,
    /// At or above the low threshold.
    Emerging,
    /// At or above the medium threshold.
    Provisional,
    /// At or above the high threshold.
    Established,
    /// Previously established, now between low and medium.
    Contested,
    /// Previously established, now below low.
    Revoked,
}

impl ConsensusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusState::Insufficient => "insufficient",
            ConsensusState::Emerging => "emerging",
            ConsensusState::Provisional => "provisional",
            ConsensusState::Established => "established",
            ConsensusState::Contested => "contested",
            ConsensusState::Revoked => "revoked",
        }
    }

    /// Contested and Revoked only arise from a prior Established verdict.
    pub fn is_downgrade(&self) -> bool {
        matches!(self, ConsensusState::Contested | ConsensusState::Revoked)
    }
}

impl fmt::Display for ConsensusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical consensus request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRequest {
    pub content_id: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Score recorded by the caller for the previous invocation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_consensus_score: Option<f64>,
}

impl ConsensusRequest {
    pub fn new(content_id: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            content_id: content_id.into(),
            sources,
            previous_consensus_score: None,
        }
    }

    pub fn with_previous_score(mut self, score: f64) -> Self {
        self.previous_consensus_score = Some(score);
        self
    }
}

/// Output of one engine invocation. Built fresh every time and handed
/// to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub content_id: String,
    /// Sources echoed back as supplied.
    pub sources: Vec<Source>,
    /// Agreement across sources, in [0,1].
    pub consensus_score: f64,
    /// Mean trustworthiness of the sources, in [0,1].
    pub reliability_score: f64,
    /// Number of sources supplied.
    pub validation_count: usize,
    pub consensus_state: ConsensusState,
    /// Decay weight of the oldest source, in (0,1].
    pub temporal_weight: f64,
    /// Credit per voting user, non-negative.
    pub user_contributions: BTreeMap<String, f64>,
    /// Creation time, seconds since the Unix epoch.
    pub timestamp: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_string(&ConsensusState::Revoked).unwrap();
        assert_eq!(json, "\"revoked\"");
    }

    #[test]
    fn test_downgrade_states() {
        assert!(ConsensusState::Contested.is_downgrade());
        assert!(ConsensusState::Revoked.is_downgrade());
        assert!(!ConsensusState::Insufficient.is_downgrade());
    }

    #[test]
    fn test_request_defaults() {
        let req: ConsensusRequest = serde_json::from_str(r#"{"content_id": "c1"}"#).unwrap();
        assert!(req.sources.is_empty());
        assert!(req.previous_consensus_score.is_none());
    }
}
