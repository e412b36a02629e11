use signal_intercept_core::{MatchTuning, WaveParams};

/// Scores the player wave against the target wave.
///
/// Frequency and amplitude are scored independently, each falling linearly
/// from 1 at an exact match to 0 at its tolerance, and the two scores are
/// multiplied. Phase is ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveMatcher {
    frequency_tolerance: f32,
    amplitude_tolerance: f32,
}

impl WaveMatcher {
    /// Creates a matcher using the provided tolerances.
    #[must_use]
    pub fn new(tuning: &MatchTuning) -> Self {
        Self {
            frequency_tolerance: tuning.frequency_tolerance,
            amplitude_tolerance: tuning.amplitude_tolerance,
        }
    }

    /// Computes the match quality in `0.0..=1.0`.
    #[must_use]
    pub fn quality(&self, target: WaveParams, player: WaveParams) -> f32 {
        let frequency = linear_score(
            (target.frequency() - player.frequency()).abs(),
            self.frequency_tolerance,
        );
        let amplitude = linear_score(
            (target.amplitude() - player.amplitude()).abs(),
            self.amplitude_tolerance,
        );
        frequency * amplitude
    }
}

impl Default for WaveMatcher {
    fn default() -> Self {
        Self::new(&MatchTuning::default())
    }
}

/// Computes the match quality using the stock tolerances.
#[must_use]
pub fn match_quality(target: WaveParams, player: WaveParams) -> f32 {
    WaveMatcher::default().quality(target, player)
}

fn linear_score(difference: f32, tolerance: f32) -> f32 {
    if tolerance <= 0.0 {
        return if difference == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - difference / tolerance).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(frequency: f32, amplitude: f32) -> WaveParams {
        WaveParams::new(frequency, amplitude, 0.0)
    }

    #[test]
    fn exact_match_scores_one() {
        let target = WaveParams::new(12.3, 47.5, 1.1);
        let player = WaveParams::new(12.3, 47.5, 0.0);
        assert_eq!(match_quality(target, player), 1.0);
    }

    #[test]
    fn any_difference_scores_below_one() {
        let target = wave(10.0, 50.0);
        assert!(match_quality(target, wave(10.1, 50.0)) < 1.0);
        assert!(match_quality(target, wave(10.0, 49.5)) < 1.0);
    }

    #[test]
    fn scores_reach_zero_at_tolerance() {
        let target = wave(10.0, 50.0);
        assert_eq!(match_quality(target, wave(13.0, 50.0)), 0.0);
        assert_eq!(match_quality(target, wave(10.0, 80.0)), 0.0);
        assert_eq!(match_quality(target, wave(1.0, 10.0)), 0.0);
    }

    #[test]
    fn quality_is_product_of_linear_scores() {
        let quality = match_quality(wave(10.0, 50.0), wave(11.5, 35.0));
        assert!((quality - 0.25).abs() < 1e-6);
    }

    #[test]
    fn quality_is_non_increasing_in_either_difference() {
        let target = wave(10.0, 50.0);
        let mut previous = f32::INFINITY;
        for step in 0..=40 {
            let offset = step as f32 * 0.1;
            let quality = match_quality(target, wave(10.0 + offset, 50.0 + offset * 10.0));
            assert!((0.0..=1.0).contains(&quality));
            assert!(quality <= previous, "quality rose at offset {offset}");
            previous = quality;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn quality_stays_in_unit_interval_across_dial_ranges() {
        let target = wave(7.25, 63.0);
        for frequency in 1..=20 {
            for amplitude in (10..=100).step_by(5) {
                let quality = match_quality(target, wave(frequency as f32, amplitude as f32));
                assert!((0.0..=1.0).contains(&quality));
            }
        }
    }

    #[test]
    fn zero_tolerance_requires_exact_match() {
        let matcher = WaveMatcher::new(&MatchTuning {
            frequency_tolerance: 0.0,
            amplitude_tolerance: 30.0,
        });
        assert_eq!(matcher.quality(wave(5.0, 40.0), wave(5.0, 40.0)), 1.0);
        assert_eq!(matcher.quality(wave(5.0, 40.0), wave(5.01, 40.0)), 0.0);
    }
}
