// crates/verity-consensus/tests/engine_scenarios.rs
//
// End-to-end evaluation scenarios through the public engine API:
// agreement, disagreement, hysteresis on a previously established score,
// vote credit, determinism, and input validation.

use std::sync::Arc;

use verity_consensus::{ConsensusEngine, ConsensusStateMachine, UserContributionTracker};
use verity_core::{
    ConsensusRequest, ConsensusState, EngineConfig, FixedClock, Source, SourceType, VerityError,
};

const NOW: f64 = 1_700_000_000.0;
const DAY: f64 = 86_400.0;

const AGREED: &str = "Rust is memory safe. The borrow checker can enforce ownership rules.";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn engine() -> ConsensusEngine {
    ConsensusEngine::new(EngineConfig::default())
        .unwrap()
        .with_clock(Arc::new(FixedClock(NOW)))
}

fn source(source_type: SourceType, text: &str) -> Source {
    Source::new(source_type, text).with_timestamp(NOW)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_identical_official_docs_establish_consensus() {
    let request = ConsensusRequest::new(
        "rust-safety",
        vec![
            source(SourceType::OfficialDocs, AGREED),
            source(SourceType::OfficialDocs, AGREED),
        ],
    );
    let (result, scores) = engine().evaluate_with_breakdown(&request).unwrap();

    assert!(result.consensus_score >= 0.9, "got {}", result.consensus_score);
    assert_eq!(result.consensus_state, ConsensusState::Established);
    assert!((scores.term_agreement - 1.0).abs() < 1e-10);
    assert!((scores.fact_agreement - 1.0).abs() < 1e-10);
    // Default quality and evidence: 0.4 * 1.0 + 0.3 * 0.5 + 0.3 * 0.5
    assert!((result.reliability_score - 0.7).abs() < 1e-10);
    assert_eq!(result.validation_count, 2);
    assert!((result.temporal_weight - 1.0).abs() < 1e-10);
}

#[test]
fn test_disjoint_sources_are_insufficient() {
    let request = ConsensusRequest::new(
        "unrelated",
        vec![
            source(SourceType::ForumPost, "Volcanoes are geological vents."),
            source(SourceType::TechnicalBlog, "Penguins can swim quickly."),
            source(SourceType::CommunityWiki, "Saxophones were invented recently."),
        ],
    );
    let (result, scores) = engine().evaluate_with_breakdown(&request).unwrap();

    assert_eq!(scores.term_agreement, 0.0);
    assert_eq!(scores.fact_agreement, 0.0);
    assert_eq!(result.consensus_score, 0.0);
    assert_eq!(result.consensus_state, ConsensusState::Insufficient);
}

#[test]
fn test_drop_from_established_is_contested() {
    let machine = ConsensusStateMachine::default();
    assert_eq!(machine.determine(0.55, Some(0.85)), ConsensusState::Contested);
}

#[test]
fn test_engine_contests_weaker_evidence_after_established() {
    // Full agreement among social media posts is dampened to 0.4.
    let request = ConsensusRequest::new(
        "rumor",
        vec![
            source(SourceType::SocialMedia, AGREED),
            source(SourceType::SocialMedia, AGREED),
        ],
    )
    .with_previous_score(0.85);
    let result = engine().evaluate(&request).unwrap();

    assert!((result.consensus_score - 0.4).abs() < 1e-10);
    assert_eq!(result.consensus_state, ConsensusState::Contested);
}

#[test]
fn test_engine_revokes_collapsed_consensus() {
    let request = ConsensusRequest::new(
        "retracted",
        vec![
            source(SourceType::ForumPost, "Volcanoes are geological vents."),
            source(SourceType::ForumPost, "Penguins can swim quickly."),
        ],
    )
    .with_previous_score(0.9);
    let result = engine().evaluate(&request).unwrap();
    assert_eq!(result.consensus_state, ConsensusState::Revoked);
}

#[test]
fn test_no_hysteresis_without_established_history() {
    let request = ConsensusRequest::new(
        "rumor",
        vec![
            source(SourceType::SocialMedia, AGREED),
            source(SourceType::SocialMedia, AGREED),
        ],
    )
    .with_previous_score(0.7);
    let result = engine().evaluate(&request).unwrap();
    assert_eq!(result.consensus_state, ConsensusState::Emerging);
}

#[test]
fn test_exact_fresh_vote_gets_full_credit() {
    let tracker = UserContributionTracker::default();
    let sources = vec![source(SourceType::ForumPost, "Water is wet.").with_vote("u1", 0.9)];
    let credit = tracker.allocate(&sources, 0.9, NOW);
    assert!((credit["u1"] - 1.0).abs() < 1e-10);
}

#[test]
fn test_engine_credits_vote_matching_consensus() {
    // One official source: term agreement 1.0, no fact agreement,
    // so consensus = 0.4 * 1.0 dampened by weight 1.0.
    let request = ConsensusRequest::new(
        "water",
        vec![source(SourceType::OfficialDocs, "Water is wet.").with_vote("u1", 0.4)],
    );
    let result = engine().evaluate(&request).unwrap();

    assert!((result.consensus_score - 0.4).abs() < 1e-10);
    assert!((result.user_contributions["u1"] - 1.0).abs() < 1e-10);
}

#[test]
fn test_stale_evidence_lowers_temporal_weight() {
    let request = ConsensusRequest::new(
        "aging",
        vec![
            Source::new(SourceType::OfficialDocs, AGREED).with_timestamp(NOW - 7.0 * DAY),
            source(SourceType::OfficialDocs, AGREED),
        ],
    );
    let result = engine().evaluate(&request).unwrap();
    assert!((result.temporal_weight - 0.5).abs() < 1e-10);
}

#[test]
fn test_repeated_evaluation_is_bit_identical() {
    let request = ConsensusRequest::new(
        "stable",
        vec![
            source(SourceType::OfficialDocs, AGREED).with_vote("u1", 0.8),
            source(SourceType::ResearchPaper, "The borrow checker can enforce ownership rules.")
                .with_vote("u2", 0.3),
            source(SourceType::ForumPost, "Rust is memory safe, mostly."),
        ],
    )
    .with_previous_score(0.5);
    let engine = engine();
    let first = engine.evaluate(&request).unwrap();
    let second = engine.evaluate(&request).unwrap();

    assert_eq!(first.consensus_score.to_bits(), second.consensus_score.to_bits());
    assert_eq!(first.reliability_score.to_bits(), second.reliability_score.to_bits());
    assert_eq!(first.temporal_weight.to_bits(), second.temporal_weight.to_bits());
    assert_eq!(first.consensus_state, second.consensus_state);
    assert_eq!(first.user_contributions, second.user_contributions);
}

#[test]
fn test_pre_extracted_features_skip_text() {
    let json = r#"{
        "content_id": "features",
        "sources": [
            {"source_type": "official_docs", "features": {"key_terms": ["rust", "safety"], "facts": ["rust is safe"]}},
            {"source_type": "official_docs", "features": {"key_terms": ["rust", "safety"], "facts": ["rust is safe"]}}
        ]
    }"#;
    let request = verity_consensus::parse_request(json).unwrap();
    let result = engine().evaluate(&request).unwrap();
    assert!((result.consensus_score - 1.0).abs() < 1e-10);
}

#[test]
fn test_unknown_source_type_uses_fallback_weight() {
    let json = format!(
        r#"{{"content_id": "c", "sources": [
            {{"source_type": "podcast", "text": "{t}"}},
            {{"source_type": "podcast", "text": "{t}"}}
        ]}}"#,
        t = AGREED
    );
    let request = verity_consensus::parse_request(&json).unwrap();
    assert_eq!(request.sources[0].source_type, Some(SourceType::Unknown));
    let result = engine().evaluate(&request).unwrap();
    assert!((result.consensus_score - 0.5).abs() < 1e-10);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_empty_sources_are_insufficient() {
    let result = engine().evaluate(&ConsensusRequest::new("empty", vec![])).unwrap();
    assert_eq!(result.consensus_score, 0.0);
    assert_eq!(result.reliability_score, 0.0);
    assert_eq!(result.validation_count, 0);
    assert_eq!(result.consensus_state, ConsensusState::Insufficient);
}

#[test]
fn test_malformed_source_reports_its_index() {
    let mut bad = source(SourceType::ForumPost, AGREED);
    bad.vote_value = Some(1.5);
    let request = ConsensusRequest::new(
        "c",
        vec![source(SourceType::ForumPost, AGREED), source(SourceType::ForumPost, AGREED), bad],
    );
    match engine().evaluate(&request) {
        Err(VerityError::InvalidSource { index, .. }) => assert_eq!(index, 2),
        other => panic!("expected InvalidSource, got {:?}", other),
    }
}

#[test]
fn test_sources_not_a_sequence_is_invalid_input() {
    let err = verity_consensus::parse_request(r#"{"content_id": "c", "sources": "none"}"#).unwrap_err();
    assert!(matches!(err, VerityError::InvalidInput(_)));
}

#[test]
fn test_missing_content_id_is_invalid_input() {
    let err = engine().evaluate(&ConsensusRequest::new("", vec![])).unwrap_err();
    assert!(matches!(err, VerityError::InvalidInput(_)));
}
