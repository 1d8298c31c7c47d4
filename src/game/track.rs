//! Health and Round Tracks
//!
//! Leaf counters. Health is mutated only by the combat resolver (and reset
//! by the round controller); rounds are mutated only by the round controller.

use serde::{Serialize, Deserialize};

/// Remaining hits a fighter can take this round, bounded to [0, max].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthTrack {
    remaining: u32,
    max: u32,
}

impl HealthTrack {
    /// Create a full track.
    pub fn new(max: u32) -> Self {
        Self { remaining: max, max }
    }

    /// Remaining hits.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Maximum hits.
    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// True once the track is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Remove exactly one hit, floored at 0. Returns the new remaining count.
    pub fn remove_hit(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    /// Refill to max. Returns true if the value changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.remaining != self.max;
        self.remaining = self.max;
        changed
    }
}

/// Rounds won by one side during the current match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTrack {
    won: u32,
}

impl RoundTrack {
    /// Rounds won so far.
    #[inline]
    pub fn rounds_won(&self) -> u32 {
        self.won
    }

    /// Record a round win. Returns the new total.
    pub fn add_round(&mut self) -> u32 {
        self.won = self.won.saturating_add(1);
        self.won
    }

    /// Clear for a new match.
    pub fn reset(&mut self) {
        self.won = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_floors_at_zero() {
        let mut health = HealthTrack::new(2);
        assert_eq!(health.remove_hit(), 1);
        assert_eq!(health.remove_hit(), 0);
        assert!(health.is_empty());
        assert_eq!(health.remove_hit(), 0);
        assert_eq!(health.remaining(), 0);
    }

    #[test]
    fn test_health_reset_reports_change() {
        let mut health = HealthTrack::new(3);
        assert!(!health.reset());
        health.remove_hit();
        assert!(health.reset());
        assert_eq!(health.remaining(), 3);
    }

    #[test]
    fn test_round_track() {
        let mut rounds = RoundTrack::default();
        assert_eq!(rounds.add_round(), 1);
        assert_eq!(rounds.add_round(), 2);
        rounds.reset();
        assert_eq!(rounds.rounds_won(), 0);
    }
}
