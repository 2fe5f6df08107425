// crates/verity-consensus/src/text.rs
//
// Heuristic text-signal extraction.
//
// Real deployments plug an NLP collaborator in behind TextSignalExtractor.
// This default keeps the engine usable end to end: frequency-ranked key
// terms and indicator-word fact sentences.

use std::collections::{BTreeSet, HashMap};

use verity_core::{EngineConfig, TextSignalExtractor, TextSignals};

/// English stop words removed before term ranking and similarity.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Words whose presence marks a sentence as a factual statement.
pub const FACT_INDICATORS: &[&str] = &[
    "is", "are", "was", "were", "has", "have", "can", "will", "must", "should",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Split text into lowercase word tokens (runs of alphanumerics and `_`).
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Split text into trimmed, non-empty sentences on runs of `.`, `!`, `?`.
pub fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Frequency-ranked key terms plus indicator-word fact sentences.
#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    pub max_key_terms: usize,
    pub min_term_length: usize,
}

impl HeuristicExtractor {
    pub fn new(max_key_terms: usize, min_term_length: usize) -> Self {
        Self {
            max_key_terms,
            min_term_length,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_key_terms, config.min_term_length)
    }

    /// Top terms by frequency; ties keep first-occurrence order.
    pub fn key_terms(&self, text: &str) -> BTreeSet<String> {
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let candidates = tokenize(text)
            .into_iter()
            .filter(|w| !is_stop_word(w) && w.chars().count() >= self.min_term_length);
        for (position, word) in candidates.enumerate() {
            counts.entry(word).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(String, usize, usize)> = counts
            .into_iter()
            .map(|(word, (count, first))| (word, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(self.max_key_terms)
            .map(|(word, _, _)| word)
            .collect()
    }

    /// Sentences containing at least one fact indicator, as written.
    pub fn facts(&self, text: &str) -> BTreeSet<String> {
        sentences(text)
            .filter(|s| tokenize(s).iter().any(|w| FACT_INDICATORS.contains(&w.as_str())))
            .map(str::to_string)
            .collect()
    }
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl TextSignalExtractor for HeuristicExtractor {
    fn extract(&self, text: &str) -> TextSignals {
        TextSignals {
            key_terms: self.key_terms(text),
            facts: self.facts(text),
        }
    }
}
