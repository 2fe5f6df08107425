// crates/verity-consensus/src/lib.rs
//
// verity-consensus: similarity, reliability, decay, aggregation, state
// machine, and contribution scoring for the Verity consensus engine.
//
// The engine turns a set of independent sources about one content item
// into a consensus verdict, and tracks how that verdict moves as new
// evidence arrives. The cache and service modules are the request layer
// wrapped around it.

pub mod aggregator;
pub mod cache;
pub mod contributions;
pub mod decay;
pub mod engine;
pub mod reliability;
pub mod request;
pub mod service;
pub mod similarity;
pub mod state;
pub mod text;

pub use aggregator::{AggregateScores, ConsensusAggregator};
pub use cache::{request_fingerprint, CacheStats, ConsensusCache};
pub use contributions::UserContributionTracker;
pub use decay::TemporalDecayModel;
pub use engine::ConsensusEngine;
pub use reliability::SourceReliabilityModel;
pub use request::{parse_request, request_from_value};
pub use service::{ConsensusService, InMemoryMetadataStore, Outcome, ServiceMetrics};
pub use similarity::SimilarityScorer;
pub use state::{ConsensusStateMachine, ScoreHistory};
pub use text::HeuristicExtractor;
