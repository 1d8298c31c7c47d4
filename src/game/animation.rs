//! Headless Animation Playback
//!
//! Stand-in for the animation collaborator when nothing is rendering: it
//! watches the outbound events and answers with "attack complete" and "hit
//! complete" after fixed clip lengths.

use std::collections::BTreeMap;

use crate::game::config::AnimationTimings;
use crate::game::events::{AnimFlag, AudioCue, GameEvent, GameEventData};
use crate::game::fighter::FighterId;
use crate::game::input::AnimationEvent;

/// Clip timer per fighter.
#[derive(Clone, Debug, Default)]
pub struct HeadlessAnimator {
    timings: AnimationTimings,
    due: BTreeMap<(FighterId, AnimationEvent), u32>,
}

impl HeadlessAnimator {
    /// Create an animator with the given clip lengths.
    pub fn new(timings: AnimationTimings) -> Self {
        Self {
            timings,
            due: BTreeMap::new(),
        }
    }

    /// Start or cancel clips according to emitted events.
    ///
    /// An attack clip starts when the Attacking flag rises. A hit clip
    /// (re)starts on every hit cue, so a second hit extends the stun. A flag
    /// falling for any other reason cancels its clip.
    pub fn observe(&mut self, events: &[GameEvent]) {
        for event in events {
            match event.data {
                GameEventData::AnimationFlagChanged { fighter_id, flag: AnimFlag::Attacking, value } => {
                    let key = (fighter_id, AnimationEvent::AttackComplete);
                    if value {
                        self.due.insert(key, event.tick + self.timings.attack_ticks);
                    } else {
                        self.due.remove(&key);
                    }
                }
                GameEventData::AnimationFlagChanged { fighter_id, flag: AnimFlag::Stunned, value: false } => {
                    self.due.remove(&(fighter_id, AnimationEvent::HitComplete));
                }
                GameEventData::Audio { fighter_id: Some(fighter_id), cue: AudioCue::HitReceived } => {
                    self.due.insert(
                        (fighter_id, AnimationEvent::HitComplete),
                        event.tick + self.timings.hit_ticks,
                    );
                }
                _ => {}
            }
        }
    }

    /// Remove and return every clip that has finished by `now`.
    pub fn take_due(&mut self, now: u32) -> Vec<(FighterId, AnimationEvent)> {
        let finished: Vec<_> = self
            .due
            .iter()
            .filter(|(_, due)| **due <= now)
            .map(|(key, _)| *key)
            .collect();

        for key in &finished {
            self.due.remove(key);
        }
        finished
    }

    /// Number of clips still playing.
    pub fn playing(&self) -> usize {
        self.due.len()
    }

    /// Drop every clip.
    pub fn clear(&mut self) {
        self.due.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> HeadlessAnimator {
        HeadlessAnimator::new(AnimationTimings { attack_ticks: 10, hit_ticks: 5 })
    }

    #[test]
    fn test_attack_clip_completes_after_duration() {
        let mut anim = animator();
        let id = FighterId(1);
        anim.observe(&[GameEvent::anim_flag(100, id, AnimFlag::Attacking, true)]);

        assert!(anim.take_due(109).is_empty());
        assert_eq!(anim.take_due(110), vec![(id, AnimationEvent::AttackComplete)]);
        assert!(anim.take_due(200).is_empty());
    }

    #[test]
    fn test_interrupted_attack_is_cancelled() {
        let mut anim = animator();
        let id = FighterId(2);
        anim.observe(&[
            GameEvent::anim_flag(1, id, AnimFlag::Attacking, true),
            GameEvent::anim_flag(3, id, AnimFlag::Attacking, false),
            GameEvent::anim_flag(3, id, AnimFlag::Stunned, true),
            GameEvent::audio(3, Some(id), AudioCue::HitReceived),
        ]);

        assert_eq!(anim.playing(), 1);
        assert_eq!(anim.take_due(8), vec![(id, AnimationEvent::HitComplete)]);
    }

    #[test]
    fn test_second_hit_extends_stun() {
        let mut anim = animator();
        let id = FighterId(1);
        anim.observe(&[GameEvent::audio(1, Some(id), AudioCue::HitReceived)]);
        anim.observe(&[GameEvent::audio(4, Some(id), AudioCue::HitReceived)]);

        assert!(anim.take_due(6).is_empty());
        assert_eq!(anim.take_due(9).len(), 1);
    }

    #[test]
    fn test_death_cancels_stun_clip() {
        let mut anim = animator();
        let id = FighterId(1);
        anim.observe(&[GameEvent::audio(1, Some(id), AudioCue::HitReceived)]);
        anim.observe(&[GameEvent::anim_flag(2, id, AnimFlag::Stunned, false)]);
        assert_eq!(anim.playing(), 0);
    }
}
