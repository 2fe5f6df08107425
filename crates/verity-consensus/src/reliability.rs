// crates/verity-consensus/src/reliability.rs
//
// Source reliability scoring.
//
// A source's trust is its type's base weight blended with the observed
// content quality and evidence strength reported by the text-signal
// collaborator.

use verity_core::{EngineConfig, ReliabilityBlend, Source, SourceType, SourceWeights};

/// Pure lookup-and-blend model. Holds only the policy tables.
#[derive(Debug, Clone)]
pub struct SourceReliabilityModel {
    weights: SourceWeights,
    blend: ReliabilityBlend,
    default_quality: f64,
    default_evidence: f64,
}

impl SourceReliabilityModel {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            weights: config.source_weights.clone(),
            blend: config.reliability_blend.clone(),
            default_quality: config.default_quality,
            default_evidence: config.default_evidence,
        }
    }

    /// Fixed base trust for a source type.
    pub fn base_weight(&self, source_type: SourceType) -> f64 {
        self.weights.get(source_type)
    }

    /// Blended reliability of one source, in [0,1].
    ///
    /// Missing quality/evidence fall back to the configured defaults.
    /// A source without a declared type is scored as `Unknown`; the
    /// aggregator rejects such sources before this is reached.
    pub fn reliability(&self, source: &Source) -> f64 {
        let base = self.base_weight(source.source_type.unwrap_or(SourceType::Unknown));
        let quality = source.quality_score.unwrap_or(self.default_quality);
        let evidence = source.evidence_strength.unwrap_or(self.default_evidence);

        let score = self.blend.base * base + self.blend.quality * quality + self.blend.evidence * evidence;
        score.clamp(0.0, 1.0)
    }
}

impl Default for SourceReliabilityModel {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
