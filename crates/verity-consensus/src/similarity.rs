// crates/verity-consensus/src/similarity.rs
//
// Set-overlap agreement between sources.
//
// All comparisons use Jaccard similarity (|A ∩ B| / |A ∪ B|) after
// case-folding and stop-word removal. Empty inputs score 0.0.

use std::collections::{BTreeSet, HashMap};

use crate::text::{is_stop_word, tokenize};

/// Case-fold a set of strings and drop stop words.
fn normalize<'a, I>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    items
        .into_iter()
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty() && !is_stop_word(s))
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Jaccard similarity of two term sets.
pub fn set_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    jaccard(&normalize(a), &normalize(b))
}

/// Jaccard similarity of the word sets of two factual statements.
pub fn statement_similarity(a: &str, b: &str) -> f64 {
    let words_a = normalize(&tokenize(a));
    let words_b = normalize(&tokenize(b));
    jaccard(&words_a, &words_b)
}

/// Scores agreement across the sources of one content item.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    /// Minimum similarity (or source fraction) that counts as agreement.
    pub threshold: f64,
}

impl SimilarityScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Mean source fraction over the terms that enough sources share.
    ///
    /// For each distinct term, the fraction of sources containing it is
    /// computed; only fractions at or above the threshold are averaged.
    pub fn term_agreement(&self, term_sets: &[BTreeSet<String>]) -> f64 {
        if term_sets.is_empty() {
            return 0.0;
        }
        let total = term_sets.len() as f64;

        let mut frequency: HashMap<String, usize> = HashMap::new();
        for terms in term_sets {
            for term in normalize(terms) {
                *frequency.entry(term).or_insert(0) += 1;
            }
        }

        // Sorted so the floating-point sum is order-stable across calls.
        let mut qualifying: Vec<f64> = frequency
            .values()
            .map(|&count| count as f64 / total)
            .filter(|&fraction| fraction >= self.threshold)
            .collect();
        if qualifying.is_empty() {
            return 0.0;
        }
        qualifying.sort_by(f64::total_cmp);

        qualifying.iter().sum::<f64>() / qualifying.len() as f64
    }

    /// Mean agreement fraction over facts that at least one other source echoes.
    ///
    /// A fact from source `i` is matched by source `j != i` when any of
    /// `j`'s facts reaches the similarity threshold. Its fraction is
    /// `matches / (N - 1)`. Facts nobody echoes are left out of the mean.
    pub fn fact_agreement(&self, fact_sets: &[BTreeSet<String>]) -> f64 {
        let n = fact_sets.len();
        if n < 2 {
            return 0.0;
        }

        let mut fractions = Vec::new();
        for (i, facts) in fact_sets.iter().enumerate() {
            for fact in facts {
                let agreements = fact_sets
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .filter(|(_, others)| {
                        others
                            .iter()
                            .any(|other| statement_similarity(fact, other) >= self.threshold)
                    })
                    .count();

                if agreements > 0 {
                    fractions.push(agreements as f64 / (n - 1) as f64);
                }
            }
        }

        if fractions.is_empty() {
            return 0.0;
        }
        fractions.iter().sum::<f64>() / fractions.len() as f64
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(0.7)
    }
}
