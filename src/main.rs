//! Duel Arena Simulator
//!
//! Runs a scripted human against the CPU opponent to the end of a match,
//! then replays the recording and checks the final state hash.
//!
//! Usage: `duel-arena-sim [config.json]`

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use duel_arena::{
    TICK_RATE, VERSION,
    core::fixed::{fixed_mul_wide, to_float, ticks_to_seconds, FIXED_ONE},
    game::{
        events::GameEventData,
        tick, verify_replay, FighterState, HeadlessAnimator, InputFrame, MatchConfig,
        MatchRecording, MatchState, TickInputs, PLAYER_ONE, PLAYER_TWO,
    },
};

/// Give up after ten minutes of simulated time.
const MAX_STEPS: u32 = TICK_RATE * 600;

/// Demo pause: opened at this step, closed one second later.
const PAUSE_AT_STEP: u32 = TICK_RATE * 8;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Duel Arena Sim v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => MatchConfig::default(),
    };

    demo_match(config)
}

fn load_config(path: &Path) -> Result<MatchConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading match config {}", path.display()))?;
    let config = MatchConfig::from_json_str(&json)
        .with_context(|| format!("loading match config {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Scripted human: close in, then swing on a fixed rhythm.
fn human_frame(state: &MatchState, step: u32) -> InputFrame {
    let (Some(human), Some(cpu)) = (state.get_fighter(PLAYER_ONE), state.get_fighter(PLAYER_TWO)) else {
        return InputFrame::new();
    };

    let offset = cpu.position - human.position;
    let mut frame = if offset.length_squared() > fixed_mul_wide(3 * FIXED_ONE, 3 * FIXED_ONE) {
        let dir = offset.normalize();
        InputFrame::with_movement(stick(dir.x), stick(dir.y))
    } else {
        // In reach: stand still, facing is kept from the approach
        InputFrame::new()
    };

    if step % 20 == 0 && human.state != FighterState::Dead {
        frame.set_attack(true);
    }
    if step == PAUSE_AT_STEP {
        frame.set_pause(true);
    }
    frame
}

/// Map a fixed-point axis component in [-1, 1] onto the stick range.
fn stick(value: i32) -> i8 {
    let scaled = (value as i64 * 127) / FIXED_ONE as i64;
    scaled.clamp(-127, 127) as i8
}

/// Demo function to exercise the simulation.
fn demo_match(config: MatchConfig) -> Result<()> {
    info!("=== Starting Demo Match ===");

    let mut state = MatchState::new(config.clone());
    let mut animator = HeadlessAnimator::new(config.animation.clone());
    let mut recording = MatchRecording::new(config);

    let mut total_events = 0usize;
    let mut step = 0u32;

    while !state.is_match_over() && step < MAX_STEPS {
        let mut inputs = TickInputs::with_frame(PLAYER_ONE, human_frame(&state, step));
        inputs.animation = animator.take_due(state.tick + 1);
        inputs.resume = state.paused && step >= PAUSE_AT_STEP + TICK_RATE;

        recording.record_step(&inputs);
        let result = tick(&mut state, &inputs);
        animator.observe(&result.events);
        total_events += result.events.len();
        step += 1;

        // Log important events
        for event in &result.events {
            match &event.data {
                GameEventData::FighterKnockedOut { fighter_id, attacker_id } => {
                    info!("Tick {}: fighter {} knocked out by {}", event.tick, fighter_id.0, attacker_id.0);
                }
                GameEventData::RoundIndicator { side, rounds_won } => {
                    info!("{} has {} round(s)", side.label(), rounds_won);
                }
                GameEventData::WinAnnouncement { text } => {
                    info!("{}", text);
                }
                GameEventData::MatchEnded { winner, duration_ticks } => {
                    info!(
                        "Match ended! Winner: {} after {:.1}s",
                        winner.label(),
                        *duration_ticks as f32 / TICK_RATE as f32
                    );
                }
                _ => {}
            }
        }

        if step % (TICK_RATE * 10) == 0 {
            let health = |id| state.get_fighter(id).map(|f| f.health.remaining()).unwrap_or(0);
            let (x, _) = state
                .get_fighter(PLAYER_ONE)
                .map(|f| f.position.to_floats())
                .unwrap_or_default();
            info!(
                "Step {}: phase {}, health {}/{}, P1 x={:.2}",
                step,
                state.phase().name(),
                health(PLAYER_ONE),
                health(PLAYER_TWO),
                x
            );
        }
    }

    if !state.is_match_over() {
        warn!("Match still running after {} steps", MAX_STEPS);
    }

    // One more step so the end-of-match presentation is applied
    let settle = TickInputs::default();
    recording.record_step(&settle);
    total_events += tick(&mut state, &settle).events.len();
    recording.finish(&state);

    info!("=== Match Results ===");
    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!(
        "Simulated {} ticks in {} steps ({:.1}s)",
        state.tick,
        recording.total_steps,
        to_float(ticks_to_seconds(state.tick))
    );
    info!("Total events: {}", total_events);

    // Verify determinism by replaying the encoded recording
    info!("=== Verifying Determinism ===");
    let bytes = recording.to_bytes()?;
    info!(
        "Recording: {} bytes, {} input deltas, digest {}",
        bytes.len(),
        recording.delta_count(),
        hex::encode(recording.digest()?)
    );

    let decoded = MatchRecording::from_bytes(&bytes)?;
    let replayed = verify_replay(&decoded)?;
    if replayed.compute_hash() != hash {
        bail!("replay produced a different state");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");

    Ok(())
}
