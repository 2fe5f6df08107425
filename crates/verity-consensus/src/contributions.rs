// crates/verity-consensus/src/contributions.rs
//
// Per-user credit for votes that agreed with the final consensus.
//
// contribution = decay(vote_age) * (1 - |consensus - vote|)

use std::collections::BTreeMap;

use verity_core::{Source, VoteAggregation};

use crate::decay::TemporalDecayModel;

#[derive(Debug, Clone)]
pub struct UserContributionTracker {
    decay: TemporalDecayModel,
    aggregation: VoteAggregation,
}

impl UserContributionTracker {
    pub fn new(decay: TemporalDecayModel, aggregation: VoteAggregation) -> Self {
        Self { decay, aggregation }
    }

    /// Credit for a single vote.
    pub fn contribution(&self, vote_timestamp: f64, vote_value: f64, consensus: f64, now: f64) -> f64 {
        let recency = self.decay.decay(vote_timestamp, now);
        let closeness = (1.0 - (consensus - vote_value).abs()).max(0.0);
        recency * closeness
    }

    /// Credit for every voting user across `sources`, in input order.
    ///
    /// Sources without both `user_id` and `vote_value` are skipped. A
    /// source without a timestamp counts as voted at `now`.
    pub fn allocate(&self, sources: &[Source], consensus: f64, now: f64) -> BTreeMap<String, f64> {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();

        for source in sources {
            let Some((user, value)) = source.vote() else {
                continue;
            };
            let credit = self.contribution(source.timestamp.unwrap_or(now), value, consensus, now);

            let entry = sums.entry(user.to_string()).or_insert((0.0, 0));
            match self.aggregation {
                VoteAggregation::LastWriteWins => *entry = (credit, 1),
                VoteAggregation::Average => {
                    entry.0 += credit;
                    entry.1 += 1;
                }
            }
        }

        sums.into_iter()
            .map(|(user, (total, count))| (user, total / count as f64))
            .collect()
    }
}

impl Default for UserContributionTracker {
    fn default() -> Self {
        Self::new(TemporalDecayModel::default(), VoteAggregation::LastWriteWins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::SECONDS_PER_DAY;
    use verity_core::SourceType;

    const NOW: f64 = 1_700_000_000.0;

    fn vote(user: &str, value: f64, ts: f64) -> Source {
        Source::new(SourceType::ForumPost, "vote").with_vote(user, value).with_timestamp(ts)
    }

    #[test]
    fn test_exact_fresh_vote_gets_full_credit() {
        let tracker = UserContributionTracker::default();
        let credits = tracker.allocate(&[vote("u1", 0.9, NOW)], 0.9, NOW);
        assert!((credits["u1"] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_stale_divergent_vote_gets_little() {
        let tracker = UserContributionTracker::default();
        let old = NOW - 70.0 * SECONDS_PER_DAY;
        let credits = tracker.allocate(&[vote("u1", 0.0, old)], 1.0, NOW);
        assert!(credits["u1"] < 1e-3);
    }

    #[test]
    fn test_half_life_and_distance_multiply() {
        let tracker = UserContributionTracker::default();
        let week_ago = NOW - 7.0 * SECONDS_PER_DAY;
        let credits = tracker.allocate(&[vote("u1", 0.5, week_ago)], 0.7, NOW);
        // 0.5 * (1 - 0.2)
        assert!((credits["u1"] - 0.4).abs() < 1e-10);
    }

    #[test]
    fn test_last_write_wins() {
        let tracker = UserContributionTracker::default();
        let sources = vec![vote("u1", 0.9, NOW), vote("u1", 0.4, NOW)];
        let credits = tracker.allocate(&sources, 0.9, NOW);
        assert_eq!(credits.len(), 1);
        assert!((credits["u1"] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_average_aggregation() {
        let tracker = UserContributionTracker::new(TemporalDecayModel::default(), VoteAggregation::Average);
        let sources = vec![vote("u1", 0.9, NOW), vote("u1", 0.4, NOW)];
        let credits = tracker.allocate(&sources, 0.9, NOW);
        assert!((credits["u1"] - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_sources_without_votes_are_skipped() {
        let tracker = UserContributionTracker::default();
        let sources = vec![Source::new(SourceType::OfficialDocs, "no vote")];
        assert!(tracker.allocate(&sources, 0.5, NOW).is_empty());
    }
}
