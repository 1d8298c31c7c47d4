//! CPU Policy
//!
//! Reactive controller for a non-human fighter. Every tick it walks straight
//! at the tracked opponent and swings whenever the opponent is close enough
//! and the cooldown has run out.
//!
//! Known behavior: the cooldown restarts whenever the policy *requests* an
//! attack, even if the fighter could not start one (for example because it
//! is stunned). A rejected request still costs a full cooldown.

use tracing::debug;

use crate::core::fixed::{Fixed, fixed_mul_wide};
use crate::core::vec2::FixedVec2;
use crate::game::config::CpuConfig;
use crate::game::fighter::FighterId;
use crate::game::input::FighterCommand;

/// Decision state for one CPU-driven fighter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuPolicy {
    /// Fighter being chased
    pub target: FighterId,
    /// Attack only when closer than this
    pub engagement_threshold: Fixed,
    /// Minimum ticks between attack requests
    pub attack_cooldown_ticks: u32,
    /// Tick of the last attack request
    pub last_attack_tick: u32,
}

impl CpuPolicy {
    /// Create a policy chasing `target`. The cooldown starts running at
    /// `created_tick`, so the first swing comes one full cooldown later.
    pub fn new(target: FighterId, config: &CpuConfig, created_tick: u32) -> Self {
        Self {
            target,
            engagement_threshold: config.engagement_threshold,
            attack_cooldown_ticks: config.attack_cooldown_ticks,
            last_attack_tick: created_tick,
        }
    }

    /// Ticks since the last attack request.
    #[inline]
    pub fn ticks_since_attack(&self, now: u32) -> u32 {
        now.saturating_sub(self.last_attack_tick)
    }

    /// True if the cooldown has elapsed at `now`.
    #[inline]
    pub fn cooldown_ready(&self, now: u32) -> bool {
        self.ticks_since_attack(now) >= self.attack_cooldown_ticks
    }

    /// Decide this tick's command from the two positions.
    ///
    /// The axis is the raw offset to the opponent; the fighter normalizes it.
    pub fn decide(&mut self, own: FixedVec2, opponent: FixedVec2, now: u32) -> FighterCommand {
        let to_opponent = opponent - own;

        let threshold_sq = fixed_mul_wide(self.engagement_threshold, self.engagement_threshold);
        let engaged = own.distance_squared(opponent) < threshold_sq;

        let attack = engaged && self.cooldown_ready(now);
        if attack {
            debug!(target_id = self.target.0, tick = now, "cpu requests attack");
            self.last_attack_tick = now;
        }

        FighterCommand {
            axis: to_opponent,
            attack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    fn policy() -> CpuPolicy {
        CpuPolicy::new(FighterId(1), &CpuConfig::default(), 0)
    }

    #[test]
    fn test_moves_toward_opponent_unnormalized() {
        let mut cpu = policy();
        let cmd = cpu.decide(FixedVec2::from_ints(4, 0), FixedVec2::from_ints(-2, 1), 10);
        assert_eq!(cmd.axis, FixedVec2::from_ints(-6, 1));
        assert!(!cmd.attack);
    }

    #[test]
    fn test_no_attack_outside_threshold() {
        let mut cpu = policy();
        let cmd = cpu.decide(FixedVec2::ZERO, FixedVec2::from_ints(2, 0), 500);
        // Exactly at the threshold is not "closer than"
        assert!(!cmd.attack);
        assert_eq!(cpu.last_attack_tick, 0);
    }

    #[test]
    fn test_distant_opponent_is_chased_not_engaged() {
        let mut cpu = policy();
        let own = FixedVec2::from_ints(95, 0);
        let opponent = FixedVec2::from_ints(-95, 0);

        let cmd = cpu.decide(own, opponent, 500);
        assert!(!cmd.attack);
        assert_eq!(cmd.axis.normalize(), FixedVec2::LEFT);
    }

    #[test]
    fn test_fires_once_then_waits_full_cooldown() {
        let mut cpu = policy();
        let own = FixedVec2::ZERO;
        let opponent = FixedVec2::new(to_fixed(1.5), 0);

        // Cooldown not yet elapsed since creation
        assert!(!cpu.decide(own, opponent, 119).attack);

        // 2 seconds after creation
        assert!(cpu.decide(own, opponent, 120).attack);

        // Engagement persists but the cooldown suppresses further swings
        for now in 121..240 {
            assert!(!cpu.decide(own, opponent, now).attack, "fired early at {}", now);
        }

        assert!(cpu.decide(own, opponent, 240).attack);
    }

    #[test]
    fn test_cooldown_consumed_even_if_request_is_wasted() {
        let mut cpu = policy();
        let near = FixedVec2::new(to_fixed(0.5), 0);
        assert!(cpu.decide(FixedVec2::ZERO, near, 300).attack);
        assert_eq!(cpu.last_attack_tick, 300);
        assert!(!cpu.cooldown_ready(301));
    }
}
