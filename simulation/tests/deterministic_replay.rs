use std::time::Duration;

use signal_intercept_core::{GameTuning, RoundSnapshot, SessionPhase, TickCadence};
use signal_intercept_simulation::{NullAudioDevice, Simulation};
use signal_intercept_system_transmission::Uplink;

#[derive(Clone, Copy, Debug)]
enum Step {
    Power,
    Wait(u64),
    Frequency(f32),
    Amplitude(f32),
    Track,
    Restart,
}

fn scripted_session() -> Vec<Step> {
    let mut steps = vec![Step::Power, Step::Wait(1_500)];
    for round in 0..4 {
        steps.push(Step::Frequency(4.0 + round as f32 * 3.0));
        steps.push(Step::Amplitude(90.0 - round as f32 * 10.0));
        steps.extend(std::iter::repeat(Step::Wait(16)).take(120));
        steps.extend(std::iter::repeat(Step::Track).take(80));
        steps.push(Step::Wait(4_000));
    }
    steps.push(Step::Wait(60_000));
    steps.push(Step::Restart);
    steps.extend(std::iter::repeat(Step::Wait(33)).take(30));
    steps.push(Step::Power);
    steps.push(Step::Wait(16));
    steps
}

fn replay(tuning: &GameTuning, seed: u64, steps: &[Step]) -> Vec<RoundSnapshot> {
    let mut simulation = Simulation::new(
        tuning,
        seed,
        Uplink::offline(seed),
        Box::new(NullAudioDevice),
    );
    let mut snapshots = Vec::with_capacity(steps.len());
    for step in steps {
        match *step {
            Step::Power => {
                let _ = simulation.toggle_power();
            }
            Step::Wait(millis) => {
                let _ = simulation.tick(Duration::from_millis(millis));
            }
            Step::Frequency(value) => simulation.set_player_frequency(value),
            Step::Amplitude(value) => simulation.set_player_amplitude(value),
            Step::Track => {
                let target = simulation.snapshot().target;
                simulation.set_player_frequency(target.frequency());
                simulation.set_player_amplitude(target.amplitude());
                let _ = simulation.tick(Duration::from_millis(16));
            }
            Step::Restart => {
                let _ = simulation.restart();
            }
        }
        snapshots.push(simulation.snapshot());
    }
    snapshots
}

#[test]
fn deterministic_replay_produces_identical_sessions() {
    let steps = scripted_session();
    let tuning = GameTuning::default();

    let first = replay(&tuning, 0x5eed_cafe, &steps);
    let second = replay(&tuning, 0x5eed_cafe, &steps);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.last().map(|round| round.phase), Some(SessionPhase::Off));
    assert!(first.iter().any(|round| round.level > 1));
    assert!(first.iter().any(|round| round.game_over));
}

#[test]
fn frame_rate_independent_cadence_replays_identically() {
    let steps = scripted_session();
    let tuning = GameTuning {
        cadence: TickCadence::FrameRateIndependent { reference_hz: 60.0 },
        ..GameTuning::default()
    };

    let first = replay(&tuning, 21, &steps);
    let second = replay(&tuning, 21, &steps);

    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn different_seeds_randomize_different_targets() {
    let steps = [Step::Power, Step::Wait(1_500)];
    let tuning = GameTuning::default();

    let first = replay(&tuning, 1, &steps);
    let second = replay(&tuning, 2, &steps);

    assert_ne!(
        first.last().map(|round| round.target),
        second.last().map(|round| round.target)
    );
}
