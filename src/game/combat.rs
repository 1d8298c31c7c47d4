//! Combat Resolver
//!
//! Melee hit resolution, run once per attack activation. The sweep is a
//! capsule: a circle of `attack_radius` dragged from the attacker's center
//! along its facing for `attack_range` units. A target is hit when its body
//! circle touches the capsule.

use std::collections::BTreeMap;
use tracing::debug;

use crate::core::fixed::{Fixed, fixed_mul_wide};
use crate::core::vec2::FixedVec2;
use crate::game::events::GameEvent;
use crate::game::fighter::{Fighter, FighterId, Side};

/// Forward sweep volume of one attack activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sweep {
    /// Attacking fighter
    pub attacker: FighterId,
    /// Attacker's collision group (excluded from hits)
    pub side: Side,
    /// Sweep start (attacker's center)
    pub origin: FixedVec2,
    /// Sweep end
    pub end: FixedVec2,
    /// Sweep radius
    pub radius: Fixed,
}

impl Sweep {
    /// Build the sweep for a fighter's current pose.
    pub fn from_attacker(attacker: &Fighter) -> Self {
        let reach = attacker.facing.direction().scale(attacker.attack_range);
        Self {
            attacker: attacker.id,
            side: attacker.side,
            origin: attacker.position,
            end: attacker.position + reach,
            radius: attacker.attack_radius,
        }
    }

    /// True if the sweep touches `target`'s body and `target` is on the
    /// opposing side.
    pub fn hits(&self, target: &Fighter) -> bool {
        if target.id == self.attacker || target.side == self.side {
            return false;
        }

        let reach = self.radius + target.body_radius;
        let reach_sq = fixed_mul_wide(reach, reach);
        target.position.distance_squared_to_segment(self.origin, self.end) <= reach_sq
    }
}

/// Outcome of one hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitReport {
    /// Fighter that was hit
    pub target_id: FighterId,
    /// Health left after the hit
    pub remaining_health: u32,
    /// The hit emptied the target's health
    pub knocked_out: bool,
}

/// Resolve one attack activation by `attacker_id`.
///
/// Every opposing fighter inside the sweep loses exactly one hit (floored at
/// zero) and is then stunned, or killed if its health is now empty. Targets
/// are processed in id order with no early exit.
pub fn resolve_attack(
    fighters: &mut BTreeMap<FighterId, Fighter>,
    attacker_id: FighterId,
    tick: u32,
    events: &mut Vec<GameEvent>,
) -> Vec<HitReport> {
    let Some(sweep) = fighters.get(&attacker_id).map(Sweep::from_attacker) else {
        return Vec::new();
    };

    let mut reports = Vec::new();

    for target in fighters.values_mut() {
        if !sweep.hits(target) {
            continue;
        }

        let remaining = target.health.remove_hit();
        events.push(GameEvent::hit_landed(tick, attacker_id, target.id, remaining));
        events.push(GameEvent::health_display(tick, target.id, remaining, target.health.max()));

        let knocked_out = remaining == 0;
        if knocked_out {
            if target.on_death(tick, events) {
                events.push(GameEvent::knocked_out(tick, target.id, attacker_id));
            }
        } else {
            target.on_hit(tick, events);
        }

        debug!(
            attacker = attacker_id.0,
            target = target.id.0,
            remaining,
            knocked_out,
            tick,
            "hit landed"
        );

        reports.push(HitReport {
            target_id: target.id,
            remaining_health: remaining,
            knocked_out,
        });
    }

    reports
}
