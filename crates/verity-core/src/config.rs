// crates/verity-core/src/config.rs
//
// Immutable policy configuration for the consensus engine.
//
// An EngineConfig is handed to the engine at construction. Several engines
// with different policies can coexist; nothing here is process-global.

use serde::{Deserialize, Serialize};

use crate::error::VerityError;
use crate::source::SourceType;

/// Base trust weight per source type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    pub official_docs: f64,
    pub research_paper: f64,
    pub technical_blog: f64,
    pub community_wiki: f64,
    pub forum_post: f64,
    pub social_media: f64,
    pub unknown: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            official_docs: 1.0,
            research_paper: 0.9,
            technical_blog: 0.8,
            community_wiki: 0.7,
            forum_post: 0.6,
            social_media: 0.4,
            unknown: 0.5,
        }
    }
}

impl SourceWeights {
    pub fn get(&self, source_type: SourceType) -> f64 {
        match source_type {
            SourceType::OfficialDocs => self.official_docs,
            SourceType::ResearchPaper => self.research_paper,
            SourceType::TechnicalBlog => self.technical_blog,
            SourceType::CommunityWiki => self.community_wiki,
            SourceType::ForumPost => self.forum_post,
            SourceType::SocialMedia => self.social_media,
            SourceType::Unknown => self.unknown,
        }
    }
}

/// State-machine boundaries: INSUFFICIENT < low <= EMERGING < medium
/// <= PROVISIONAL < high <= ESTABLISHED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for StateThresholds {
    fn default() -> Self {
        Self {
            low: 0.4,
            medium: 0.6,
            high: 0.8,
        }
    }
}

/// Coefficients for `reliability = base*w + quality*q + evidence*e`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityBlend {
    pub base: f64,
    pub quality: f64,
    pub evidence: f64,
}

impl Default for ReliabilityBlend {
    fn default() -> Self {
        Self {
            base: 0.4,
            quality: 0.3,
            evidence: 0.3,
        }
    }
}

/// How several votes from one user inside a single invocation combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAggregation {
    /// Later votes overwrite earlier ones, in input order.
    #[default]
    LastWriteWins,
    /// Mean of the user's per-vote contributions.
    Average,
}

/// Full engine policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub source_weights: SourceWeights,
    pub thresholds: StateThresholds,
    /// Minimum similarity / source fraction counted as agreement.
    pub similarity_threshold: f64,
    /// Half-life for temporal decay, in days.
    pub half_life_days: f64,
    /// Weight of term agreement in the raw consensus score.
    pub term_weight: f64,
    /// Weight of fact agreement in the raw consensus score.
    pub fact_weight: f64,
    pub reliability_blend: ReliabilityBlend,
    /// Substituted when a source has no quality score.
    pub default_quality: f64,
    /// Substituted when a source has no evidence strength.
    pub default_evidence: f64,
    /// Number of key terms kept per source by the heuristic extractor.
    pub max_key_terms: usize,
    /// Shortest token (in characters) accepted as a key term.
    pub min_term_length: usize,
    /// Multiplier on the dampening weight of `is_context` sources. 1.0 disables it.
    pub context_weight_multiplier: f64,
    pub vote_aggregation: VoteAggregation,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_weights: SourceWeights::default(),
            thresholds: StateThresholds::default(),
            similarity_threshold: 0.7,
            half_life_days: 7.0,
            term_weight: 0.4,
            fact_weight: 0.6,
            reliability_blend: ReliabilityBlend::default(),
            default_quality: 0.5,
            default_evidence: 0.5,
            max_key_terms: 10,
            min_term_length: 3,
            context_weight_multiplier: 1.0,
            vote_aggregation: VoteAggregation::LastWriteWins,
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), VerityError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(VerityError::Config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

fn check_sums_to_one(name: &str, parts: &[f64]) -> Result<(), VerityError> {
    let sum: f64 = parts.iter().sum();
    if (sum - 1.0).abs() < 1e-9 {
        Ok(())
    } else {
        Err(VerityError::Config(format!(
            "{} weights must sum to 1.0, got {}",
            name, sum
        )))
    }
}

impl EngineConfig {
    /// Reject policies that would break the [0,1] score contract.
    pub fn validate(&self) -> Result<(), VerityError> {
        for ty in SourceType::ALL {
            check_unit(&format!("source_weights.{}", ty), self.source_weights.get(ty))?;
        }

        let t = &self.thresholds;
        check_unit("thresholds.low", t.low)?;
        check_unit("thresholds.medium", t.medium)?;
        check_unit("thresholds.high", t.high)?;
        if !(t.low < t.medium && t.medium < t.high) {
            return Err(VerityError::Config(format!(
                "thresholds must satisfy low < medium < high, got {} / {} / {}",
                t.low, t.medium, t.high
            )));
        }

        check_unit("similarity_threshold", self.similarity_threshold)?;
        if !(self.half_life_days.is_finite() && self.half_life_days > 0.0) {
            return Err(VerityError::Config(format!(
                "half_life_days must be positive, got {}",
                self.half_life_days
            )));
        }

        check_unit("term_weight", self.term_weight)?;
        check_unit("fact_weight", self.fact_weight)?;
        check_sums_to_one("agreement", &[self.term_weight, self.fact_weight])?;

        let b = &self.reliability_blend;
        check_unit("reliability_blend.base", b.base)?;
        check_unit("reliability_blend.quality", b.quality)?;
        check_unit("reliability_blend.evidence", b.evidence)?;
        check_sums_to_one("reliability_blend", &[b.base, b.quality, b.evidence])?;

        check_unit("default_quality", self.default_quality)?;
        check_unit("default_evidence", self.default_evidence)?;

        if self.max_key_terms == 0 {
            return Err(VerityError::Config("max_key_terms must be at least 1".into()));
        }
        if !(self.context_weight_multiplier.is_finite() && self.context_weight_multiplier >= 0.0) {
            return Err(VerityError::Config(format!(
                "context_weight_multiplier must be non-negative, got {}",
                self.context_weight_multiplier
            )));
        }

        Ok(())
    }

    /// Half-life expressed in seconds.
    pub fn half_life_secs(&self) -> f64 {
        self.half_life_days * 86_400.0
    }
}
