#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure signal comparison: instantaneous wave matching and quality smoothing.
//!
//! [`WaveMatcher`] scores how closely the player's dials reproduce the hidden
//! target, and [`QualitySmoother`] low-pass filters that score into the stable
//! reading shown on the signal meter.

mod matcher;
mod smoother;

pub use matcher::{match_quality, WaveMatcher};
pub use smoother::{smooth, QualitySmoother};
