#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progressive decryption of the intercepted message for display.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Glyphs substituted for characters that are not yet readable.
pub const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>/?";

/// Scrambles a message according to the current signal quality.
#[derive(Debug)]
pub struct Decoder {
    rng: ChaCha8Rng,
}

impl Decoder {
    /// Creates a decoder whose scrambling is driven by the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Renders the message as currently readable.
    ///
    /// Once decoded the plain message is returned. Otherwise every non-space
    /// character survives with probability `quality³` and is replaced by a
    /// random glyph otherwise. Spaces always survive.
    pub fn render(&mut self, message: &str, quality: f32, decoded: bool) -> String {
        if decoded {
            return message.to_owned();
        }

        let reveal = reveal_probability(quality);
        message
            .chars()
            .map(|character| {
                if character == ' ' || self.rng.gen::<f32>() < reveal {
                    character
                } else {
                    char::from(GLYPHS[self.rng.gen_range(0..GLYPHS.len())])
                }
            })
            .collect()
    }
}

/// Probability that a single character renders correctly.
#[must_use]
pub fn reveal_probability(quality: f32) -> f32 {
    let quality = if quality.is_nan() {
        0.0
    } else {
        quality.clamp(0.0, 1.0)
    };
    quality.powi(3)
}

/// Readout shown beneath the decoded text.
#[must_use]
pub fn matrix_readout(quality: f32, decoded: bool) -> String {
    if decoded {
        "DECRYPTION_MATRIX: COMPLETE".to_owned()
    } else {
        format!("DECRYPTION_MATRIX: {:.1}%", quality * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &str = "WAIT FOR THE SIGNAL AT THE DOCKS.";

    #[test]
    fn decoded_messages_render_verbatim() {
        let mut decoder = Decoder::new(1);
        assert_eq!(decoder.render(MESSAGE, 0.0, true), MESSAGE);
    }

    #[test]
    fn perfect_quality_reveals_everything() {
        let mut decoder = Decoder::new(1);
        assert_eq!(decoder.render(MESSAGE, 1.0, false), MESSAGE);
    }

    #[test]
    fn scrambled_text_keeps_length_and_spaces() {
        let mut decoder = Decoder::new(4);
        let rendered = decoder.render(MESSAGE, 0.0, false);

        assert_eq!(rendered.chars().count(), MESSAGE.chars().count());
        for (shown, original) in rendered.chars().zip(MESSAGE.chars()) {
            if original == ' ' {
                assert_eq!(shown, ' ');
            } else {
                assert!(GLYPHS.contains(&(shown as u8)));
            }
        }
    }

    #[test]
    fn reveal_probability_is_cubic() {
        assert_eq!(reveal_probability(0.5), 0.125);
        assert_eq!(reveal_probability(f32::NAN), 0.0);
        assert_eq!(reveal_probability(2.0), 1.0);
    }

    #[test]
    fn readout_formats_percentage() {
        assert_eq!(matrix_readout(0.6234, false), "DECRYPTION_MATRIX: 62.3%");
        assert_eq!(matrix_readout(0.99, true), "DECRYPTION_MATRIX: COMPLETE");
    }

    #[test]
    fn same_seed_scrambles_identically() {
        let mut first = Decoder::new(77);
        let mut second = Decoder::new(77);
        assert_eq!(
            first.render(MESSAGE, 0.4, false),
            second.render(MESSAGE, 0.4, false)
        );
    }
}
