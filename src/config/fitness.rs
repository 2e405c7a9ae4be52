use super::traits::ConfigSection;
use crate::error::TunegenError;
use serde::{Deserialize, Serialize};

/// Weights of the rhythm fitness terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub strong_beats: f64,
    pub echo: f64,
    pub off_beat_penalty: f64,
    pub long_note_penalty: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            strong_beats: 8.0,
            echo: 4.0,
            off_beat_penalty: 0.3,
            long_note_penalty: 0.3,
        }
    }
}

impl ConfigSection for FitnessConfig {
    fn section_name() -> &'static str {
        "fitness"
    }

    fn validate(&self) -> Result<(), TunegenError> {
        let weights = [
            self.strong_beats,
            self.echo,
            self.off_beat_penalty,
            self.long_note_penalty,
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(TunegenError::Configuration(
                "Fitness weights must be finite".to_string()
            ));
        }
        Ok(())
    }
}
