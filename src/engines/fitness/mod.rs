pub mod rhythm;

pub use rhythm::{RhythmFitness, RhythmParameters};

use crate::error::Result;
use crate::music::Track;

/// Scores a track; higher is better.
///
/// Implementations are recomputed from scratch on every call.
pub trait FitnessFunction {
    fn name(&self) -> &'static str;
    fn evaluate(&self, track: &Track) -> Result<f64>;
}
