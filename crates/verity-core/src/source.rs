// crates/verity-core/src/source.rs

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VerityError;

/// Declared category of an evidentiary source, used to look up its base trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    OfficialDocs,
    ResearchPaper,
    TechnicalBlog,
    CommunityWiki,
    ForumPost,
    SocialMedia,
    /// Any label outside the known set.
    #[serde(other)]
    Unknown,
}

impl SourceType {
    pub const ALL: [SourceType; 7] = [
        SourceType::OfficialDocs,
        SourceType::ResearchPaper,
        SourceType::TechnicalBlog,
        SourceType::CommunityWiki,
        SourceType::ForumPost,
        SourceType::SocialMedia,
        SourceType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::OfficialDocs => "official_docs",
            SourceType::ResearchPaper => "research_paper",
            SourceType::TechnicalBlog => "technical_blog",
            SourceType::CommunityWiki => "community_wiki",
            SourceType::ForumPost => "forum_post",
            SourceType::SocialMedia => "social_media",
            SourceType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-extracted text features for one source.
///
/// Produced by a `TextSignalExtractor`, or attached by the caller when
/// extraction already happened upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSignals {
    #[serde(default)]
    pub key_terms: BTreeSet<String>,
    #[serde(default)]
    pub facts: BTreeSet<String>,
}

/// One evidentiary input about a content item. Never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Caller-side identifier, used as the metadata store lookup key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Declared category. Structurally required.
    #[serde(default)]
    pub source_type: Option<SourceType>,
    /// Raw body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Pre-extracted features; take precedence over `text` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<TextSignals>,
    /// Content quality in [0,1] from the text-signal collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    /// Evidence strength in [0,1] from the text-signal collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_strength: Option<f64>,
    /// Seconds since the Unix epoch. Missing means "observed now".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// The voter's personal truth estimate in [0,1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_value: Option<f64>,
    /// Author-supplied context post, subject to `context_weight_multiplier`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_context: bool,
}

impl Source {
    /// Convenience constructor for a typed text source.
    pub fn new(source_type: SourceType, text: impl Into<String>) -> Self {
        Self {
            source_type: Some(source_type),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_vote(mut self, user_id: impl Into<String>, vote_value: f64) -> Self {
        self.user_id = Some(user_id.into());
        self.vote_value = Some(vote_value);
        self
    }

    pub fn with_analysis(mut self, quality_score: f64, evidence_strength: f64) -> Self {
        self.quality_score = Some(quality_score);
        self.evidence_strength = Some(evidence_strength);
        self
    }

    /// Check the structural requirements of a source at position `index`.
    ///
    /// Optional fields may be absent, but when present they must be finite
    /// and (for scores) inside [0,1].
    pub fn validate(&self, index: usize) -> Result<(), VerityError> {
        if self.source_type.is_none() {
            return Err(VerityError::invalid_source(index, "missing source_type"));
        }
        if self.text.is_none() && self.features.is_none() {
            return Err(VerityError::invalid_source(
                index,
                "missing text (or pre-extracted features)",
            ));
        }

        let unit_fields = [
            ("quality_score", self.quality_score),
            ("evidence_strength", self.evidence_strength),
            ("vote_value", self.vote_value),
        ];
        for (name, value) in unit_fields {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                    return Err(VerityError::invalid_source(
                        index,
                        format!("{} must be within [0, 1], got {}", name, v),
                    ));
                }
            }
        }

        if let Some(ts) = self.timestamp {
            if !ts.is_finite() {
                return Err(VerityError::invalid_source(index, "timestamp is not finite"));
            }
        }

        Ok(())
    }

    /// Whether this source carries a complete user vote.
    pub fn vote(&self) -> Option<(&str, f64)> {
        match (&self.user_id, self.vote_value) {
            (Some(user), Some(value)) => Some((user.as_str(), value)),
            _ => None,
        }
    }
}
