// crates/verity-consensus/src/state.rs
//
// Consensus state machine.
//
// Transitions given the current score and the caller-recorded previous one:
//   no history / non-established history -> pure thresholding
//   established history (prev >= high)   -> Established | Contested | Revoked
//
// Hysteresis applies only on the way down from Established, so losing
// "fact" status is reported distinctly from ordinary fluctuation. No state
// is absorbing: Revoked content that regains agreement is re-thresholded.

use verity_core::{ConsensusState, StateThresholds};

/// What the caller knows about the previous verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreHistory {
    /// First evaluation for this content.
    None,
    /// Previous score was at or above the high threshold.
    Established(f64),
    /// Previous score exists but was below the high threshold.
    Other(f64),
}

impl ScoreHistory {
    /// Classify a previous score against the thresholds.
    pub fn classify(previous: Option<f64>, thresholds: &StateThresholds) -> Self {
        match previous {
            None => ScoreHistory::None,
            Some(p) if p >= thresholds.high => ScoreHistory::Established(p),
            Some(p) => ScoreHistory::Other(p),
        }
    }
}

/// Pure function of (current score, history) to the next state.
#[derive(Debug, Clone)]
pub struct ConsensusStateMachine {
    thresholds: StateThresholds,
}

impl ConsensusStateMachine {
    pub fn new(thresholds: StateThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &StateThresholds {
        &self.thresholds
    }

    /// Plain thresholding, ignoring any history.
    pub fn threshold(&self, score: f64) -> ConsensusState {
        let t = &self.thresholds;
        if score >= t.high {
            ConsensusState::Established
        } else if score >= t.medium {
            ConsensusState::Provisional
        } else if score >= t.low {
            ConsensusState::Emerging
        } else {
            ConsensusState::Insufficient
        }
    }

    pub fn transition(&self, current: f64, history: ScoreHistory) -> ConsensusState {
        match history {
            ScoreHistory::None | ScoreHistory::Other(_) => self.threshold(current),
            ScoreHistory::Established(_) => {
                if current < self.thresholds.low {
                    ConsensusState::Revoked
                } else if current < self.thresholds.medium {
                    ConsensusState::Contested
                } else {
                    ConsensusState::Established
                }
            }
        }
    }

    /// Determine the state from the raw optional previous score.
    pub fn determine(&self, current: f64, previous: Option<f64>) -> ConsensusState {
        let history = ScoreHistory::classify(previous, &self.thresholds);
        let state = self.transition(current, history);
        tracing::debug!(
            "State transition: previous={:?} current={:.4} -> {}",
            previous,
            current,
            state
        );
        state
    }
}

impl Default for ConsensusStateMachine {
    fn default() -> Self {
        Self::new(StateThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> ConsensusStateMachine {
        ConsensusStateMachine::default()
    }

    #[test]
    fn test_thresholding_without_history() {
        let m = machine();
        assert_eq!(m.determine(0.85, None), ConsensusState::Established);
        assert_eq!(m.determine(0.8, None), ConsensusState::Established);
        assert_eq!(m.determine(0.65, None), ConsensusState::Provisional);
        assert_eq!(m.determine(0.45, None), ConsensusState::Emerging);
        assert_eq!(m.determine(0.39, None), ConsensusState::Insufficient);
        assert_eq!(m.determine(0.0, None), ConsensusState::Insufficient);
    }

    #[test]
    fn test_established_drops_to_contested() {
        assert_eq!(machine().determine(0.55, Some(0.85)), ConsensusState::Contested);
    }

    #[test]
    fn test_established_drops_to_revoked() {
        assert_eq!(machine().determine(0.1, Some(0.85)), ConsensusState::Revoked);
        assert_eq!(machine().determine(0.0, Some(0.8)), ConsensusState::Revoked);
    }

    #[test]
    fn test_established_stays_established_above_medium() {
        // 0.65 would be Provisional without history.
        assert_eq!(machine().determine(0.65, Some(0.9)), ConsensusState::Established);
    }

    #[test]
    fn test_provisional_drop_is_plain_insufficient() {
        assert_eq!(machine().determine(0.2, Some(0.7)), ConsensusState::Insufficient);
        assert_eq!(machine().determine(0.5, Some(0.7)), ConsensusState::Emerging);
    }

    #[test]
    fn test_revoked_content_can_recover() {
        let m = machine();
        let first = m.determine(0.1, Some(0.9));
        assert_eq!(first, ConsensusState::Revoked);
        assert_eq!(m.determine(0.7, Some(0.1)), ConsensusState::Provisional);
    }

    #[test]
    fn test_history_classification() {
        let t = StateThresholds::default();
        assert_eq!(ScoreHistory::classify(None, &t), ScoreHistory::None);
        assert_eq!(ScoreHistory::classify(Some(0.8), &t), ScoreHistory::Established(0.8));
        assert_eq!(ScoreHistory::classify(Some(0.79), &t), ScoreHistory::Other(0.79));
    }
}
