//! Presentation State
//!
//! What the audio and UI collaborators are currently showing or playing.
//! Every setter compares against the tracked value and emits an event only
//! on change, so repeating a request is free and silent.

use std::collections::BTreeMap;

use crate::core::hash::StateHasher;
use crate::game::events::{AudioCue, GameEvent, GameEventData, EventPriority, UiElement};

/// Audio and UI state driven by the simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// In-round background music is playing
    pub background_music: bool,
    /// End-of-match music is playing
    pub match_end_music: bool,
    /// Last countdown value shown (whole seconds)
    pub countdown_seconds: Option<u32>,
    /// Last round timer value shown (whole seconds)
    pub round_timer_seconds: Option<u32>,
    /// Current win announcement
    pub win_text: Option<String>,
    visibility: BTreeMap<UiElement, bool>,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation {
    /// State at match start: music on, play panels up, menus hidden.
    pub fn new() -> Self {
        let visibility = [
            (UiElement::HealthBars, true),
            (UiElement::RoundTimerPanel, true),
            (UiElement::CountdownPanel, true),
            (UiElement::PausePanel, false),
            (UiElement::EndOfMatchPanel, false),
            (UiElement::InstructionText, true),
        ]
        .into_iter()
        .collect();

        Self {
            background_music: true,
            match_end_music: false,
            countdown_seconds: None,
            round_timer_seconds: None,
            win_text: None,
            visibility,
        }
    }

    /// Return to the match-start state, emitting visibility changes. Music is
    /// restored silently: it starts with the scene, not on a cue.
    pub fn restore_defaults(&mut self, tick: u32, events: &mut Vec<GameEvent>) {
        let defaults = Self::new();
        for (element, visible) in &defaults.visibility {
            self.set_visible(*element, *visible, tick, events);
        }
        self.background_music = defaults.background_music;
        self.match_end_music = defaults.match_end_music;
        self.countdown_seconds = None;
        self.round_timer_seconds = None;
        self.win_text = None;
    }

    /// Whether a panel is showing.
    pub fn is_visible(&self, element: UiElement) -> bool {
        self.visibility.get(&element).copied().unwrap_or(false)
    }

    /// Show or hide a panel. Returns true if it changed.
    pub fn set_visible(
        &mut self,
        element: UiElement,
        visible: bool,
        tick: u32,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.is_visible(element) == visible {
            return false;
        }
        self.visibility.insert(element, visible);
        events.push(GameEvent::ui_visibility(tick, element, visible));
        true
    }

    /// Stop the background music if it is playing.
    pub fn stop_background_music(&mut self, tick: u32, events: &mut Vec<GameEvent>) -> bool {
        if !self.background_music {
            return false;
        }
        self.background_music = false;
        events.push(GameEvent::audio(tick, None, AudioCue::RoundMusicStop));
        true
    }

    /// Start the end-of-match music unless it is already playing.
    pub fn start_match_end_music(&mut self, tick: u32, events: &mut Vec<GameEvent>) -> bool {
        if self.match_end_music {
            return false;
        }
        self.match_end_music = true;
        events.push(GameEvent::audio(tick, None, AudioCue::MatchEndMusicStart));
        true
    }

    /// Open the pause menu with its cue. No-op if already open.
    pub fn open_pause_menu(&mut self, tick: u32, events: &mut Vec<GameEvent>) -> bool {
        if !self.set_visible(UiElement::PausePanel, true, tick, events) {
            return false;
        }
        events.push(GameEvent::audio(tick, None, AudioCue::PauseMenuOpen));
        true
    }

    /// Show a countdown value if it differs from the one on screen.
    pub fn show_countdown(&mut self, seconds: u32, tick: u32, events: &mut Vec<GameEvent>) {
        if self.countdown_seconds != Some(seconds) {
            self.countdown_seconds = Some(seconds);
            events.push(GameEvent::new(
                tick,
                EventPriority::Presentation,
                GameEventData::CountdownDisplay { seconds_remaining: seconds },
            ));
        }
    }

    /// Show a round timer value if it differs from the one on screen.
    pub fn show_round_timer(&mut self, seconds: u32, tick: u32, events: &mut Vec<GameEvent>) {
        if self.round_timer_seconds != Some(seconds) {
            self.round_timer_seconds = Some(seconds);
            events.push(GameEvent::new(
                tick,
                EventPriority::Presentation,
                GameEventData::RoundTimerDisplay { elapsed_seconds: seconds },
            ));
        }
    }

    /// Zero the round timer and clear the countdown for the next round.
    pub fn reset_timers(&mut self, tick: u32, events: &mut Vec<GameEvent>) {
        self.show_round_timer(0, tick, events);
        self.countdown_seconds = None;
    }

    /// Set the win announcement text.
    pub fn announce(&mut self, text: String, tick: u32, events: &mut Vec<GameEvent>) {
        if self.win_text.as_deref() == Some(text.as_str()) {
            return;
        }
        events.push(GameEvent::new(
            tick,
            EventPriority::Presentation,
            GameEventData::WinAnnouncement { text: text.clone() },
        ));
        self.win_text = Some(text);
    }

    pub(crate) fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_bool(self.background_music);
        hasher.update_bool(self.match_end_music);
        for visible in self.visibility.values() {
            hasher.update_bool(*visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_visibility() {
        let p = Presentation::new();
        assert!(p.background_music);
        assert!(p.is_visible(UiElement::HealthBars));
        assert!(p.is_visible(UiElement::InstructionText));
        assert!(!p.is_visible(UiElement::PausePanel));
        assert!(!p.is_visible(UiElement::EndOfMatchPanel));
    }

    #[test]
    fn test_music_changes_are_idempotent() {
        let mut p = Presentation::new();
        let mut events = Vec::new();

        assert!(p.stop_background_music(1, &mut events));
        assert!(p.start_match_end_music(1, &mut events));
        assert!(!p.stop_background_music(2, &mut events));
        assert!(!p.start_match_end_music(2, &mut events));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_pause_menu_opens_once() {
        let mut p = Presentation::new();
        let mut events = Vec::new();

        assert!(p.open_pause_menu(5, &mut events));
        assert!(!p.open_pause_menu(6, &mut events));
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1].data,
            GameEventData::Audio { cue: AudioCue::PauseMenuOpen, .. }
        ));
    }

    #[test]
    fn test_display_values_emit_on_change_only() {
        let mut p = Presentation::new();
        let mut events = Vec::new();

        p.show_countdown(3, 0, &mut events);
        p.show_countdown(3, 1, &mut events);
        p.show_countdown(2, 60, &mut events);
        p.show_round_timer(0, 61, &mut events);
        p.show_round_timer(0, 62, &mut events);
        assert_eq!(events.len(), 3);

        // Countdown is cleared so the next round shows it again
        p.reset_timers(100, &mut events);
        p.show_countdown(3, 101, &mut events);
        assert_eq!(events.len(), 4);
    }
}
