// crates/verity-core/src/lib.rs
//
// verity-core: Core types, policy configuration, and collaborator traits
// for the Verity consensus engine.
//
// This is the leaf crate that the engine and the CLI depend on. It defines
// the request/result records, the error taxonomy, the immutable engine
// policy, and the trait seams for text extraction, time, and metadata.

pub mod config;
pub mod consensus;
pub mod error;
pub mod source;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use verity_core::Source;`

// Source types
pub use source::{Source, SourceType, TextSignals};

// Consensus types
pub use consensus::{ConsensusRequest, ConsensusResult, ConsensusState};

// Configuration
pub use config::{EngineConfig, ReliabilityBlend, SourceWeights, StateThresholds, VoteAggregation};

// Error type
pub use error::VerityError;

// Traits
pub use traits::{Clock, FixedClock, MetadataStore, SourceMetadata, SystemClock, TextSignalExtractor};
