use std::time::Duration;

use signal_intercept_core::{GameTuning, TickCadence, WaveParams};
use signal_intercept_system_wave_match::{QualitySmoother, WaveMatcher};

const FRAME: Duration = Duration::from_millis(16);

fn ticks_until_lock(
    matcher: &WaveMatcher,
    smoother: &QualitySmoother,
    player: WaveParams,
) -> Option<u32> {
    let target = WaveParams::new(10.0, 50.0, 0.0);
    let threshold = GameTuning::default().signal.decode_threshold;
    let mut smoothed = 0.0;
    for tick in 1..=600 {
        smoothed = smoother.smooth(smoothed, matcher.quality(target, player), FRAME);
        if smoothed > threshold {
            return Some(tick);
        }
    }
    None
}

#[test]
fn exact_match_locks_after_thirty_one_frames() {
    let tuning = GameTuning::default();
    let matcher = WaveMatcher::new(&tuning.matching);
    let smoother = QualitySmoother::new(&tuning.smoothing, tuning.cadence);

    let ticks = ticks_until_lock(&matcher, &smoother, WaveParams::new(10.0, 50.0, 1.3));

    assert_eq!(ticks, Some(31));
}

#[test]
fn near_miss_never_locks() {
    let tuning = GameTuning::default();
    let matcher = WaveMatcher::new(&tuning.matching);
    let smoother = QualitySmoother::new(&tuning.smoothing, tuning.cadence);

    // 0.9 frequency score times a perfect amplitude score.
    let ticks = ticks_until_lock(&matcher, &smoother, WaveParams::new(10.3, 50.0, 0.0));

    assert_eq!(ticks, None);
}

#[test]
fn frame_rate_independent_lock_time_tracks_wall_clock() {
    let tuning = GameTuning::default();
    let matcher = WaveMatcher::new(&tuning.matching);
    let cadence = TickCadence::FrameRateIndependent { reference_hz: 62.5 };
    let smoother = QualitySmoother::new(&tuning.smoothing, cadence);
    let target = WaveParams::new(10.0, 50.0, 0.0);

    let mut at_full_rate = 0.0;
    for _ in 0..20 {
        at_full_rate = smoother.smooth(at_full_rate, matcher.quality(target, target), FRAME);
    }
    let mut at_half_rate = 0.0;
    for _ in 0..10 {
        at_half_rate = smoother.smooth(at_half_rate, matcher.quality(target, target), FRAME * 2);
    }

    assert!((at_full_rate - at_half_rate).abs() < 1e-4);
}
