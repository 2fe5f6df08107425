// crates/verity-consensus/src/engine.rs
//
// ConsensusEngine: one synchronous, stateless evaluation per request.
//
// request -> aggregate (similarity, reliability, decay)
//         -> state machine (with caller-supplied previous score)
//         -> user contributions
//         -> ConsensusResult

use std::sync::Arc;

use verity_core::{
    Clock, ConsensusRequest, ConsensusResult, ConsensusState, EngineConfig, SystemClock,
    TextSignalExtractor, VerityError,
};

use crate::aggregator::{AggregateScores, ConsensusAggregator};
use crate::contributions::UserContributionTracker;
use crate::decay::TemporalDecayModel;
use crate::state::ConsensusStateMachine;
use crate::text::HeuristicExtractor;

/// Holds only immutable policy; safe to share across threads and to run
/// concurrently for different content ids.
pub struct ConsensusEngine {
    config: EngineConfig,
    aggregator: ConsensusAggregator,
    state_machine: ConsensusStateMachine,
    contributions: UserContributionTracker,
    extractor: Arc<dyn TextSignalExtractor>,
    clock: Arc<dyn Clock>,
}

impl ConsensusEngine {
    /// Build an engine with the heuristic extractor and the system clock.
    pub fn new(config: EngineConfig) -> Result<Self, VerityError> {
        let extractor = Arc::new(HeuristicExtractor::from_config(&config));
        Self::with_parts(config, extractor, Arc::new(SystemClock))
    }

    /// Build an engine with an explicit extractor and clock.
    pub fn with_parts(
        config: EngineConfig,
        extractor: Arc<dyn TextSignalExtractor>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, VerityError> {
        config.validate()?;
        let decay = TemporalDecayModel::new(config.half_life_days);
        Ok(Self {
            aggregator: ConsensusAggregator::from_config(&config),
            state_machine: ConsensusStateMachine::new(config.thresholds.clone()),
            contributions: UserContributionTracker::new(decay, config.vote_aggregation),
            extractor,
            clock,
            config,
        })
    }

    /// Replace the clock, keeping everything else.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state_machine(&self) -> &ConsensusStateMachine {
        &self.state_machine
    }

    /// Current time according to the engine's clock.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Run one full evaluation.
    ///
    /// # Errors
    /// `InvalidInput` for an empty content id or an out-of-range previous
    /// score; `InvalidSource` for the first malformed source.
    pub fn evaluate(&self, request: &ConsensusRequest) -> Result<ConsensusResult, VerityError> {
        self.evaluate_with_breakdown(request).map(|(result, _)| result)
    }

    /// Like `evaluate`, also returning the intermediate agreement scores.
    pub fn evaluate_with_breakdown(
        &self,
        request: &ConsensusRequest,
    ) -> Result<(ConsensusResult, AggregateScores), VerityError> {
        validate_request(request)?;
        let now = self.clock.now();

        let scores = self
            .aggregator
            .compute(&request.sources, self.extractor.as_ref(), now)?;
        let consensus_state = self
            .state_machine
            .determine(scores.consensus_score, request.previous_consensus_score);
        let user_contributions =
            self.contributions
                .allocate(&request.sources, scores.consensus_score, now);

        log_outcome(&request.content_id, &scores, consensus_state, request);

        let result = ConsensusResult {
            content_id: request.content_id.clone(),
            sources: request.sources.clone(),
            consensus_score: scores.consensus_score,
            reliability_score: scores.reliability_score,
            validation_count: request.sources.len(),
            consensus_state,
            temporal_weight: scores.temporal_weight,
            user_contributions,
            timestamp: now,
        };
        Ok((result, scores))
    }
}

fn validate_request(request: &ConsensusRequest) -> Result<(), VerityError> {
    if request.content_id.trim().is_empty() {
        return Err(VerityError::InvalidInput("missing or empty content_id".into()));
    }
    if let Some(previous) = request.previous_consensus_score {
        if !previous.is_finite() || !(0.0..=1.0).contains(&previous) {
            return Err(VerityError::InvalidInput(format!(
                "previous_consensus_score must be within [0, 1], got {}",
                previous
            )));
        }
    }
    Ok(())
}

fn log_outcome(
    content_id: &str,
    scores: &AggregateScores,
    state: ConsensusState,
    request: &ConsensusRequest,
) {
    if state.is_downgrade() {
        tracing::info!(
            "Consensus for {} downgraded to {} (previous={:?}, now={:.4})",
            content_id,
            state,
            request.previous_consensus_score,
            scores.consensus_score
        );
    } else {
        tracing::info!(
            "Consensus for {}: score={:.4} reliability={:.4} state={} sources={}",
            content_id,
            scores.consensus_score,
            scores.reliability_score,
            state,
            request.sources.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verity_core::{FixedClock, Source, SourceType};

    const NOW: f64 = 1_700_000_000.0;

    fn engine() -> ConsensusEngine {
        ConsensusEngine::new(EngineConfig::default())
            .unwrap()
            .with_clock(Arc::new(FixedClock(NOW)))
    }

    #[test]
    fn test_empty_sources_result() {
        let result = engine().evaluate(&ConsensusRequest::new("c1", vec![])).unwrap();
        assert_eq!(result.consensus_score, 0.0);
        assert_eq!(result.reliability_score, 0.0);
        assert_eq!(result.validation_count, 0);
        assert_eq!(result.temporal_weight, 1.0);
        assert_eq!(result.consensus_state, ConsensusState::Insufficient);
        assert!(result.user_contributions.is_empty());
        assert_eq!(result.timestamp, NOW);
    }

    #[test]
    fn test_empty_content_id_rejected() {
        let err = engine().evaluate(&ConsensusRequest::new("  ", vec![])).unwrap_err();
        assert!(matches!(err, VerityError::InvalidInput(_)));
    }

    #[test]
    fn test_out_of_range_previous_score_rejected() {
        let req = ConsensusRequest::new("c1", vec![]).with_previous_score(1.2);
        assert!(matches!(engine().evaluate(&req), Err(VerityError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = EngineConfig {
            similarity_threshold: 2.0,
            ..Default::default()
        };
        assert!(matches!(ConsensusEngine::new(config), Err(VerityError::Config(_))));
    }

    #[test]
    fn test_sources_are_echoed() {
        let sources = vec![Source::new(SourceType::ForumPost, "Water is wet.").with_timestamp(NOW)];
        let result = engine().evaluate(&ConsensusRequest::new("c1", sources.clone())).unwrap();
        assert_eq!(result.sources, sources);
        assert_eq!(result.validation_count, 1);
    }
}
