use super::traits::ConfigSection;
use crate::error::TunegenError;
use crate::music::Key;
use serde::{Deserialize, Serialize};

/// Rhythmic units and key shared by every track of a run.
///
/// Durations are expressed in ticks. Bars are 4/4, so `bar_length` is a
/// whole note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicSettings {
    pub ticks_per_quarter: u32,
    pub bar_number: usize,
    pub velocity: u8,
    pub key: Key,
    pub instrument: u8,
    /// Notes at or below this length are never split.
    pub note_unit: u32,
    /// Candidate note lengths used by generation and the split mutation.
    pub note_lengths: Vec<u32>,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self::with_resolution(480)
    }
}

impl MusicSettings {
    /// Default settings at the given resolution, with half/quarter/eighth
    /// candidates and an eighth-note split floor.
    pub fn with_resolution(ticks_per_quarter: u32) -> Self {
        let eighth = ticks_per_quarter / 2;
        Self {
            ticks_per_quarter,
            bar_number: 8,
            velocity: 80,
            key: Key::default(),
            instrument: 0,
            note_unit: eighth,
            note_lengths: vec![ticks_per_quarter * 2, ticks_per_quarter, eighth],
        }
    }

    pub fn whole(&self) -> u32 {
        self.ticks_per_quarter * 4
    }

    pub fn half(&self) -> u32 {
        self.ticks_per_quarter * 2
    }

    pub fn quarter(&self) -> u32 {
        self.ticks_per_quarter
    }

    pub fn eighth(&self) -> u32 {
        self.ticks_per_quarter / 2
    }

    pub fn bar_length(&self) -> u32 {
        self.whole()
    }
}

impl ConfigSection for MusicSettings {
    fn section_name() -> &'static str {
        "music"
    }

    fn validate(&self) -> Result<(), TunegenError> {
        if self.ticks_per_quarter == 0 || self.ticks_per_quarter % 2 != 0 {
            return Err(TunegenError::Configuration(
                "Ticks per quarter must be a positive even number".to_string()
            ));
        }
        if self.bar_number == 0 {
            return Err(TunegenError::Configuration(
                "Bar number must be at least 1".to_string()
            ));
        }
        if self.velocity > 127 || self.instrument > 127 {
            return Err(TunegenError::Configuration(
                "Velocity and instrument must be within 0..=127".to_string()
            ));
        }
        if self.note_unit == 0 {
            return Err(TunegenError::Configuration(
                "Note unit must be positive".to_string()
            ));
        }
        if self.note_lengths.is_empty() {
            return Err(TunegenError::Configuration(
                "At least one candidate note length is required".to_string()
            ));
        }
        if self
            .note_lengths
            .iter()
            .any(|&len| len == 0 || len > self.bar_length())
        {
            return Err(TunegenError::Configuration(format!(
                "Candidate note lengths must be within 1..={}",
                self.bar_length()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_units() {
        let settings = MusicSettings::with_resolution(480);
        assert_eq!(settings.whole(), 1920);
        assert_eq!(settings.half(), 960);
        assert_eq!(settings.quarter(), 480);
        assert_eq!(settings.eighth(), 240);
        assert_eq!(settings.bar_length(), settings.whole());
        assert_eq!(settings.note_unit, 240);
    }

    #[test]
    fn test_key_deserializes_from_toml() {
        let settings: MusicSettings = toml::from_str("key = \"Ebm\"\nbar_number = 4\n").unwrap();
        assert_eq!(settings.key, "Ebm".parse::<Key>().unwrap());
        assert_eq!(settings.key.to_string(), "Ebm");
        assert_eq!(settings.bar_number, 4);
        assert_eq!(settings.ticks_per_quarter, 480);

        let invalid: Result<MusicSettings, _> = toml::from_str("key = \"H\"\n");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_rejects_odd_resolution() {
        let settings = MusicSettings {
            ticks_per_quarter: 481,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_note_longer_than_bar() {
        let mut settings = MusicSettings::default();
        settings.note_lengths.push(settings.bar_length() * 2);
        assert!(settings.validate().is_err());
    }
}
