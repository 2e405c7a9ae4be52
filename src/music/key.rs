use crate::error::TunegenError;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest pitch produced by random generation (C4).
pub const NOTE_MIN: u8 = 60;
/// Highest pitch produced by random generation (C6).
pub const NOTE_MAX: u8 = 84;

const MAJOR_OFFSETS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_OFFSETS: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    fn offsets(&self) -> &'static [u8; 7] {
        match self {
            Mode::Major => &MAJOR_OFFSETS,
            Mode::Minor => &MINOR_OFFSETS,
        }
    }
}

/// A key signature: tonic pitch class plus mode. Written as "C", "Eb",
/// "F#m" and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Key {
    name: &'static str,
    tonic: u8,
    mode: Mode,
}

impl Default for Key {
    fn default() -> Self {
        Self {
            name: "C",
            tonic: 0,
            mode: Mode::Major,
        }
    }
}

// Spellings accepted for the tonic, with their pitch class.
const TONIC_NAMES: [(&str, u8); 21] = [
    ("C", 0), ("C#", 1), ("Cb", 11),
    ("D", 2), ("D#", 3), ("Db", 1),
    ("E", 4), ("E#", 5), ("Eb", 3),
    ("F", 5), ("F#", 6), ("Fb", 4),
    ("G", 7), ("G#", 8), ("Gb", 6),
    ("A", 9), ("A#", 10), ("Ab", 8),
    ("B", 11), ("B#", 0), ("Bb", 10),
];

impl Key {
    pub fn tonic(&self) -> u8 {
        self.tonic
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn contains(&self, pitch: u8) -> bool {
        self.degree_of(pitch).is_some()
    }

    /// 1-based scale degree of `pitch`, or `None` when it is outside the key.
    pub fn degree_of(&self, pitch: u8) -> Option<usize> {
        let offset = (pitch % 12 + 12 - self.tonic) % 12;
        self.mode
            .offsets()
            .iter()
            .position(|&o| o == offset)
            .map(|p| p + 1)
    }

    /// Random in-key pitch within `[min, max]`, clamped to C4..=C6.
    pub fn random_pitch<R: Rng>(&self, rng: &mut R, min: u8, max: u8) -> u8 {
        let candidates = self.pitches_between(min, max);
        if candidates.is_empty() {
            return NOTE_MIN + self.tonic;
        }
        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Random tonic pitch within C4..=C6.
    pub fn random_tonic<R: Rng>(&self, rng: &mut R) -> u8 {
        let tonics: Vec<u8> = self
            .pitches_between(NOTE_MIN, NOTE_MAX)
            .into_iter()
            .filter(|&p| self.degree_of(p) == Some(1))
            .collect();
        tonics[rng.gen_range(0..tonics.len())]
    }

    fn pitches_between(&self, min: u8, max: u8) -> Vec<u8> {
        (min.max(NOTE_MIN)..=max.min(NOTE_MAX))
            .filter(|&p| self.contains(p))
            .collect()
    }
}

impl FromStr for Key {
    type Err = TunegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tonic_name, mode) = match s.strip_suffix('m') {
            Some(rest) => (rest, Mode::Minor),
            None => (s, Mode::Major),
        };
        let (name, tonic) = TONIC_NAMES
            .iter()
            .find(|(name, _)| *name == tonic_name)
            .copied()
            .ok_or_else(|| TunegenError::Configuration(format!("Unknown key: {:?}", s)))?;
        Ok(Self { name, tonic, mode })
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{}", self.name),
            Mode::Minor => write!(f, "{}m", self.name),
        }
    }
}
