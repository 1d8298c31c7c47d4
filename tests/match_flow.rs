//! End-to-end match flow through the public tick API.

use duel_arena::core::fixed::to_fixed;
use duel_arena::core::vec2::FixedVec2;
use duel_arena::game::events::{AudioCue, GameEventData, UiElement};
use duel_arena::game::{
    tick, AnimationTimings, Facing, FighterState, HeadlessAnimator, InputFrame, MatchConfig,
    MatchState, RoundOutcome, RoundPhase, Side, TickInputs, TickResult, PLAYER_ONE, PLAYER_TWO,
};

/// Match plus headless animation playback.
struct Harness {
    state: MatchState,
    animator: HeadlessAnimator,
}

impl Harness {
    fn new(config: MatchConfig) -> Self {
        let animator = HeadlessAnimator::new(config.animation.clone());
        Self {
            state: MatchState::new(config),
            animator,
        }
    }

    /// Zero countdown, so the first step starts the round.
    fn quick() -> Self {
        Self::new(MatchConfig {
            countdown_ticks: 0,
            ..MatchConfig::default()
        })
    }

    fn step_with(&mut self, frame: Option<InputFrame>) -> TickResult {
        let mut inputs = match frame {
            Some(frame) => TickInputs::with_frame(PLAYER_ONE, frame),
            None => TickInputs::default(),
        };
        inputs.animation = self.animator.take_due(self.state.tick + 1);
        let result = tick(&mut self.state, &inputs);
        self.animator.observe(&result.events);
        result
    }

    fn step(&mut self) -> TickResult {
        self.step_with(None)
    }

    fn start_round(&mut self) {
        while self.state.phase() != RoundPhase::InRound {
            self.step();
        }
    }

    /// Put the human one unit left of the CPU, facing it, and leave the CPU
    /// with a single hit.
    fn set_up_finishing_blow(&mut self) {
        let cpu_pos = FixedVec2::from_ints(2, 0);
        if let Some(cpu) = self.state.get_fighter_mut(PLAYER_TWO) {
            cpu.position = cpu_pos;
            while cpu.health.remaining() > 1 {
                cpu.health.remove_hit();
            }
        }
        if let Some(human) = self.state.get_fighter_mut(PLAYER_ONE) {
            human.position = cpu_pos - FixedVec2::from_ints(1, 0);
            human.facing = Facing::Right;
        }
    }
}

#[test]
fn finishing_blow_ends_round_after_delay() {
    let mut h = Harness::quick();
    h.start_round();
    h.set_up_finishing_blow();

    let result = h.step_with(Some(InputFrame::attack()));
    let cpu = &h.state.fighters[&PLAYER_TWO];
    assert_eq!(cpu.health.remaining(), 0);
    assert_eq!(cpu.state, FighterState::Dead);
    assert!(result.events.iter().any(|e| matches!(
        e.data,
        GameEventData::FighterKnockedOut { fighter_id: PLAYER_TWO, attacker_id: PLAYER_ONE }
    )));

    // Scored on detection, transition pending
    assert_eq!(h.state.round.rounds_won(Side::One), 1);
    assert!(matches!(
        h.state.phase(),
        RoundPhase::RoundEndPending { outcome: RoundOutcome::Won(Side::One), .. }
    ));

    let delay = h.state.config.ko_transition_delay_ticks;
    for _ in 1..delay {
        h.step();
        assert!(h.state.round.is_transition_pending());
    }
    h.step();
    assert_eq!(h.state.phase(), RoundPhase::RoundEnd);
    assert_eq!(h.state.round.rounds_won(Side::One), 1);
    assert_eq!(h.state.round.rounds_won(Side::Two), 0);

    h.step();
    assert_eq!(h.state.phase(), RoundPhase::RoundStart);

    // Next round: both fighters restored
    h.step();
    for fighter in h.state.fighters.values() {
        assert_eq!(fighter.state, FighterState::Idle);
        assert_eq!(fighter.position, fighter.origin_position);
        assert_eq!(fighter.health.remaining(), fighter.health.max());
    }
}

#[test]
fn third_round_win_ends_match() {
    let mut h = Harness::quick();
    for _ in 0..2 {
        h.state.round.rounds.entry(Side::One).or_default().add_round();
    }
    h.start_round();
    h.set_up_finishing_blow();

    let result = h.step_with(Some(InputFrame::attack()));
    assert_eq!(h.state.round.rounds_won(Side::One), 3);
    assert!(result.events.iter().any(|e| matches!(
        &e.data,
        GameEventData::WinAnnouncement { text } if text == "Player 1 WINS"
    )));

    let mut ended = None;
    for _ in 0..h.state.config.ko_transition_delay_ticks {
        let result = h.step();
        if result.match_over {
            ended = result.winner;
            break;
        }
    }
    assert_eq!(ended, Some(Side::One));
    assert!(h.state.is_match_over());

    // End-of-match presentation, exactly once
    let result = h.step();
    let cues: Vec<AudioCue> = result
        .events
        .iter()
        .filter_map(|e| match e.data {
            GameEventData::Audio { cue, .. } => Some(cue),
            _ => None,
        })
        .collect();
    assert_eq!(cues, vec![AudioCue::RoundMusicStop, AudioCue::MatchEndMusicStart]);
    assert!(h.state.presentation.is_visible(UiElement::EndOfMatchPanel));
    assert!(!h.state.presentation.is_visible(UiElement::RoundTimerPanel));
    assert!(!h.state.presentation.is_visible(UiElement::InstructionText));
    assert!(h.state.fighters.values().all(|f| !f.enabled && f.velocity.is_zero()));

    for _ in 0..30 {
        let result = h.step_with(Some(InputFrame::with_movement(127, 0)));
        assert!(result.events.is_empty(), "match over must be quiet: {:?}", result.events);
    }
    assert_eq!(h.state.round.rounds_won(Side::One), 3);
}

#[test]
fn cpu_swings_once_per_cooldown_while_engaged() {
    let mut h = Harness::quick();
    h.start_round();

    if let Some(cpu) = h.state.get_fighter_mut(PLAYER_TWO) {
        cpu.position = FixedVec2::new(to_fixed(-2.5), 0);
    }

    let mut swings = Vec::new();
    while h.state.tick < 400 {
        let result = h.step();
        for event in &result.events {
            if let GameEventData::Audio { fighter_id: Some(PLAYER_TWO), cue: AudioCue::AttackActivated } = event.data {
                swings.push(event.tick);
            }
        }
    }

    let cooldown = h.state.config.cpu_policy.attack_cooldown_ticks;
    assert_eq!(swings, vec![cooldown, cooldown * 2, cooldown * 3]);
    assert_eq!(h.state.fighters[&PLAYER_ONE].health.remaining(), 2);
}

#[test]
fn cpu_walks_across_a_wide_stage_without_swinging() {
    let config = MatchConfig::from_json_str(
        r#"{ "countdown_ticks": 0, "stage_half_width": 100.0, "spawn_offset": 95.0 }"#,
    )
    .unwrap();
    let mut h = Harness::new(config);
    h.start_round();

    let mut swings = Vec::new();
    for _ in 0..200 {
        let result = h.step();
        for event in &result.events {
            if let GameEventData::Audio { fighter_id: Some(PLAYER_TWO), cue: AudioCue::AttackActivated } = event.data {
                swings.push(event.tick);
            }
        }
    }

    // 190 units apart is never "engaged"
    assert!(swings.is_empty(), "cpu swung at {:?}", swings);

    let cpu = &h.state.fighters[&PLAYER_TWO];
    assert_eq!(cpu.state, FighterState::Moving);
    assert_eq!(cpu.facing, Facing::Left);
    assert_eq!(cpu.velocity, FixedVec2::new(-cpu.speed, 0));
    assert!(cpu.position.x < to_fixed(80.0), "cpu stayed at {:?}", cpu.position);
    assert_eq!(h.state.fighters[&PLAYER_ONE].position, FixedVec2::new(to_fixed(-95.0), 0));
}

#[test]
fn stunned_human_stays_put_until_hit_clip_ends() {
    let mut h = Harness::new(MatchConfig {
        countdown_ticks: 0,
        animation: AnimationTimings { attack_ticks: 10, hit_ticks: 30 },
        ..MatchConfig::default()
    });
    h.start_round();

    let now = h.state.tick;
    if let Some(human) = h.state.get_fighter_mut(PLAYER_ONE) {
        let mut events = Vec::new();
        human.on_hit(now, &mut events);
        h.animator.observe(&events);
    }
    let pinned = h.state.fighters[&PLAYER_ONE].position;

    h.step_with(Some(InputFrame::with_movement(-127, 0)));
    for _ in 0..28 {
        h.step();
        let human = &h.state.fighters[&PLAYER_ONE];
        assert_eq!(human.state, FighterState::Stunned);
        assert!(human.velocity.is_zero());
        assert_eq!(human.position, pinned);
    }

    // Hit clip ends; the still-held stick takes effect again
    h.step();
    h.step();
    let human = &h.state.fighters[&PLAYER_ONE];
    assert_eq!(human.state, FighterState::Moving);
    assert!(human.position.x < pinned.x);
}

#[test]
fn pause_menu_freezes_match_and_is_hidden_at_match_over() {
    let mut h = Harness::quick();
    h.start_round();

    let mut pause = InputFrame::new();
    pause.set_pause(true);
    let result = h.step_with(Some(pause));
    assert!(result.events.iter().any(|e| matches!(
        e.data,
        GameEventData::Audio { cue: AudioCue::PauseMenuOpen, .. }
    )));

    let tick_before = h.state.tick;
    for _ in 0..20 {
        h.step();
    }
    assert_eq!(h.state.tick, tick_before);

    let resume = TickInputs { resume: true, ..TickInputs::default() };
    tick(&mut h.state, &resume);
    assert_eq!(h.state.tick, tick_before + 1);

    // Pausing is not possible once the match is over
    for _ in 0..3 {
        h.state.round.rounds.entry(Side::Two).or_default().add_round();
    }
    h.state.round.phase = RoundPhase::MatchOver { winner: Side::Two };
    h.step_with(Some(pause));
    assert!(!h.state.paused);
    assert!(!h.state.presentation.is_visible(UiElement::PausePanel));
}

#[test]
fn restart_after_match_over_starts_fresh() {
    let mut h = Harness::quick();
    for _ in 0..2 {
        h.state.round.rounds.entry(Side::One).or_default().add_round();
    }
    h.start_round();
    h.set_up_finishing_blow();
    h.step_with(Some(InputFrame::attack()));
    while !h.state.is_match_over() {
        h.step();
    }
    h.step();

    h.state.restart_match();
    h.animator.clear();
    assert_eq!(h.state.phase(), RoundPhase::RoundStart);
    assert_eq!(h.state.round.rounds_won(Side::One), 0);
    assert!(h.state.presentation.background_music);
    assert!(h.state.presentation.is_visible(UiElement::HealthBars));
    assert!(!h.state.presentation.is_visible(UiElement::EndOfMatchPanel));

    h.start_round();
    assert!(h.state.fighters.values().all(|f| f.enabled && f.is_alive()));
}
