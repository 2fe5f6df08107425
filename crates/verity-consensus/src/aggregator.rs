// crates/verity-consensus/src/aggregator.rs
//
// Consensus aggregation for one content item.
//
// Combines term/fact agreement, per-source reliability, and temporal decay
// of the oldest evidence into a consensus score and a reliability score.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use verity_core::{EngineConfig, Source, SourceType, TextSignalExtractor, TextSignals, VerityError};

use crate::decay::TemporalDecayModel;
use crate::reliability::SourceReliabilityModel;
use crate::similarity::SimilarityScorer;

/// Scores produced by one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateScores {
    /// Agreement dampened by the mean source-type weight, clamped to [0,1].
    pub consensus_score: f64,
    /// Mean per-source reliability, clamped to [0,1].
    pub reliability_score: f64,
    /// Decay weight of the oldest source timestamp.
    pub temporal_weight: f64,
    pub term_agreement: f64,
    pub fact_agreement: f64,
}

impl AggregateScores {
    /// Fixed result for an empty source list.
    pub const EMPTY: AggregateScores = AggregateScores {
        consensus_score: 0.0,
        reliability_score: 0.0,
        temporal_weight: 1.0,
        term_agreement: 0.0,
        fact_agreement: 0.0,
    };
}

#[derive(Debug, Clone)]
pub struct ConsensusAggregator {
    similarity: SimilarityScorer,
    reliability: SourceReliabilityModel,
    decay: TemporalDecayModel,
    term_weight: f64,
    fact_weight: f64,
    context_weight_multiplier: f64,
}

impl ConsensusAggregator {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            similarity: SimilarityScorer::new(config.similarity_threshold),
            reliability: SourceReliabilityModel::from_config(config),
            decay: TemporalDecayModel::new(config.half_life_days),
            term_weight: config.term_weight,
            fact_weight: config.fact_weight,
            context_weight_multiplier: config.context_weight_multiplier,
        }
    }

    pub fn reliability_model(&self) -> &SourceReliabilityModel {
        &self.reliability
    }

    /// Aggregate all sources of one content item.
    ///
    /// # Errors
    /// `VerityError::InvalidSource` for the first structurally malformed
    /// source. Nothing is dropped silently.
    pub fn compute<E: TextSignalExtractor + ?Sized>(
        &self,
        sources: &[Source],
        extractor: &E,
        now: f64,
    ) -> Result<AggregateScores, VerityError> {
        // Step 1: Empty input is a valid degenerate case with fixed values.
        if sources.is_empty() {
            return Ok(AggregateScores::EMPTY);
        }

        for (index, source) in sources.iter().enumerate() {
            source.validate(index)?;
        }

        // Step 2: Per-source signals and reliability.
        let signals: Vec<TextSignals> = sources
            .iter()
            .map(|source| match &source.features {
                Some(features) => features.clone(),
                None => extractor.extract(source.text.as_deref().unwrap_or_default()),
            })
            .collect();
        let reliabilities: Vec<f64> = sources.iter().map(|s| self.reliability.reliability(s)).collect();

        // Step 3: Agreement across sources.
        let term_sets: Vec<BTreeSet<String>> = signals.iter().map(|s| s.key_terms.clone()).collect();
        let fact_sets: Vec<BTreeSet<String>> = signals.into_iter().map(|s| s.facts).collect();
        let term_agreement = self.similarity.term_agreement(&term_sets);
        let fact_agreement = self.similarity.fact_agreement(&fact_sets);

        // Step 4: Dampen raw agreement by the mean base trust weight of the
        // source types; never boosts above 1.
        let dampening: Vec<f64> = sources
            .iter()
            .map(|source| {
                let base = self
                    .reliability
                    .base_weight(source.source_type.unwrap_or(SourceType::Unknown));
                if source.is_context {
                    base * self.context_weight_multiplier
                } else {
                    base
                }
            })
            .collect();
        let raw_score = self.term_weight * term_agreement + self.fact_weight * fact_agreement;
        let consensus_score = (raw_score * mean(&dampening)).clamp(0.0, 1.0);

        // Step 5: Reliability, independent of agreement.
        let reliability_score = mean(&reliabilities).clamp(0.0, 1.0);

        // Step 6: Staleness of the oldest evidence.
        let oldest = sources
            .iter()
            .map(|s| s.timestamp.unwrap_or(now))
            .fold(f64::INFINITY, f64::min);
        let temporal_weight = self.decay.decay(oldest, now);

        tracing::debug!(
            "Aggregated {} sources: term={:.4} fact={:.4} raw={:.4} consensus={:.4} reliability={:.4} temporal={:.4}",
            sources.len(),
            term_agreement,
            fact_agreement,
            raw_score,
            consensus_score,
            reliability_score,
            temporal_weight
        );

        Ok(AggregateScores {
            consensus_score,
            reliability_score,
            temporal_weight,
            term_agreement,
            fact_agreement,
        })
    }
}

impl Default for ConsensusAggregator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::HeuristicExtractor;

    const NOW: f64 = 1_700_000_000.0;

    fn compute(sources: &[Source]) -> Result<AggregateScores, VerityError> {
        ConsensusAggregator::default().compute(sources, &HeuristicExtractor::default(), NOW)
    }

    #[test]
    fn test_empty_sources() {
        let scores = compute(&[]).unwrap();
        assert_eq!(scores, AggregateScores::EMPTY);
    }

    #[test]
    fn test_identical_official_docs() {
        let text = "Rust is memory safe. The borrow checker can enforce ownership rules.";
        let sources = vec![
            Source::new(SourceType::OfficialDocs, text).with_analysis(1.0, 1.0),
            Source::new(SourceType::OfficialDocs, text).with_analysis(1.0, 1.0),
        ];
        let scores = compute(&sources).unwrap();
        assert!((scores.term_agreement - 1.0).abs() < 1e-10);
        assert!((scores.fact_agreement - 1.0).abs() < 1e-10);
        assert!((scores.consensus_score - 1.0).abs() < 1e-10);
        assert!((scores.reliability_score - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_reliability_dampens_consensus() {
        let text = "Rust is memory safe. The borrow checker can enforce ownership rules.";
        let sources = vec![
            Source::new(SourceType::SocialMedia, text),
            Source::new(SourceType::SocialMedia, text),
        ];
        let scores = compute(&sources).unwrap();
        // Full agreement dampened by the social_media base weight.
        assert!((scores.consensus_score - 0.4).abs() < 1e-10);
        // reliability = 0.4 * 0.4 + 0.3 * 0.5 + 0.3 * 0.5
        assert!((scores.reliability_score - 0.46).abs() < 1e-10);
    }

    #[test]
    fn test_oldest_timestamp_drives_temporal_weight() {
        let week = 7.0 * 86_400.0;
        let sources = vec![
            Source::new(SourceType::ForumPost, "alpha").with_timestamp(NOW),
            Source::new(SourceType::ForumPost, "alpha").with_timestamp(NOW - week),
        ];
        let scores = compute(&sources).unwrap();
        assert!((scores.temporal_weight - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_missing_timestamps_count_as_now() {
        let sources = vec![Source::new(SourceType::ForumPost, "alpha")];
        assert!((compute(&sources).unwrap().temporal_weight - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_source_reports_index() {
        let sources = vec![
            Source::new(SourceType::ForumPost, "fine"),
            Source {
                text: Some("no type".into()),
                ..Default::default()
            },
        ];
        match compute(&sources) {
            Err(VerityError::InvalidSource { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidSource, got {:?}", other),
        }
    }

    #[test]
    fn test_pre_extracted_features_bypass_extractor() {
        let features = TextSignals {
            key_terms: ["consensus".to_string()].into_iter().collect(),
            facts: ["Consensus is reached".to_string()].into_iter().collect(),
        };
        let make = || Source {
            source_type: Some(SourceType::OfficialDocs),
            features: Some(features.clone()),
            quality_score: Some(1.0),
            evidence_strength: Some(1.0),
            ..Default::default()
        };
        let scores = compute(&[make(), make()]).unwrap();
        assert!((scores.consensus_score - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_context_multiplier_raises_dampening() {
        let text = "Rust is memory safe. The borrow checker can enforce ownership rules.";
        let config = EngineConfig {
            context_weight_multiplier: 1.5,
            ..Default::default()
        };
        let aggregator = ConsensusAggregator::from_config(&config);
        let mut context = Source::new(SourceType::ForumPost, text);
        context.is_context = true;
        let sources = vec![context, Source::new(SourceType::ForumPost, text)];
        let scores = aggregator.compute(&sources, &HeuristicExtractor::default(), NOW).unwrap();
        // mean(0.6 * 1.5, 0.6) = 0.75
        assert!((scores.consensus_score - 0.75).abs() < 1e-10);
        // Reliability is not affected by the context policy.
        assert!((scores.reliability_score - 0.64).abs() < 1e-10);
    }

    #[test]
    fn test_context_multiplier_never_exceeds_one() {
        let text = "Rust is memory safe. The borrow checker can enforce ownership rules.";
        let config = EngineConfig {
            context_weight_multiplier: 1.5,
            ..Default::default()
        };
        let aggregator = ConsensusAggregator::from_config(&config);
        let mut context = Source::new(SourceType::OfficialDocs, text);
        context.is_context = true;
        let sources = vec![context, Source::new(SourceType::OfficialDocs, text)];
        let scores = aggregator.compute(&sources, &HeuristicExtractor::default(), NOW).unwrap();
        assert!((scores.consensus_score - 1.0).abs() < 1e-10);
    }
}
