// crates/verity-consensus/src/decay.rs
//
// Time-decay weights for evidence and votes.
//
// Older inputs carry less weight: value halves every `half_life_days`.

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Exponential half-life decay over wall-clock age.
#[derive(Debug, Clone, Copy)]
pub struct TemporalDecayModel {
    /// Days for a weight to halve.
    pub half_life_days: f64,
}

impl TemporalDecayModel {
    pub fn new(half_life_days: f64) -> Self {
        Self { half_life_days }
    }

    /// Decay weight for an event at `timestamp`, observed at `now`.
    ///
    /// # Returns
    /// `2^(-age / half_life)`, in (0,1]. Ages below zero (timestamps in the
    /// future) are clamped to zero and yield 1.0.
    pub fn decay(&self, timestamp: f64, now: f64) -> f64 {
        let age = (now - timestamp).max(0.0);
        decay_for_age(age, self.half_life_days)
    }
}

impl Default for TemporalDecayModel {
    fn default() -> Self {
        Self::new(7.0)
    }
}

/// `2^(-age_seconds / (half_life_days * 86400))`.
pub fn decay_for_age(age_seconds: f64, half_life_days: f64) -> f64 {
    let half_life = half_life_days * SECONDS_PER_DAY;
    (2.0_f64).powf(-age_seconds / half_life)
}
