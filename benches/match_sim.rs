use criterion::{black_box, criterion_group, criterion_main, Criterion};

use duel_arena::game::{
    tick, HeadlessAnimator, InputFrame, MatchConfig, MatchRecording, MatchState, TickInputs,
    PLAYER_ONE,
};

const STEPS: u32 = 3600;

/// One minute of a match with the human walking in and swinging.
fn run_minute(config: &MatchConfig) -> MatchRecording {
    let mut state = MatchState::new(config.clone());
    let mut animator = HeadlessAnimator::new(config.animation.clone());
    let mut recording = MatchRecording::new(config.clone());

    for step in 0..STEPS {
        let mut frame = InputFrame::with_movement(if step % 240 < 120 { 127 } else { -127 }, 0);
        frame.set_attack(step % 30 == 0);

        let mut inputs = TickInputs::with_frame(PLAYER_ONE, frame);
        inputs.animation = animator.take_due(state.tick + 1);
        recording.record_step(&inputs);

        let result = tick(&mut state, &inputs);
        animator.observe(&result.events);
        if state.is_match_over() {
            break;
        }
    }

    recording.finish(&state);
    recording
}

fn bench_match(c: &mut Criterion) {
    let config = MatchConfig::default();

    c.bench_function("simulate_one_minute", |b| {
        b.iter(|| run_minute(black_box(&config)))
    });

    let recording = run_minute(&config);
    c.bench_function("verify_replay_one_minute", |b| {
        b.iter(|| duel_arena::game::verify_replay(black_box(&recording)))
    });

    c.bench_function("state_hash", |b| {
        let state = MatchState::new(config.clone());
        b.iter(|| black_box(&state).compute_hash())
    });
}

criterion_group!(benches, bench_match);
criterion_main!(benches);
