use serde::{Deserialize, Serialize};
use std::fmt;

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A single note. Times and lengths are in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub length: u32,
    pub start_time: u32,
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: u8, length: u32, start_time: u32, velocity: u8) -> Self {
        Self {
            pitch,
            length,
            start_time,
            velocity,
        }
    }

    pub fn end_time(&self) -> u32 {
        self.start_time + self.length
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: length={} start={} velocity={}",
            pitch_to_name(self.pitch),
            self.length,
            self.start_time,
            self.velocity
        )
    }
}

/// MIDI pitch to scientific name, e.g. 60 -> "C4".
pub fn pitch_to_name(pitch: u8) -> String {
    let octave = i32::from(pitch) / 12 - 1;
    format!("{}{}", PITCH_CLASS_NAMES[usize::from(pitch % 12)], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_time() {
        let note = Note::new(60, 480, 960, 80);
        assert_eq!(note.end_time(), 1440);
    }

    #[test]
    fn test_pitch_names() {
        assert_eq!(pitch_to_name(60), "C4");
        assert_eq!(pitch_to_name(61), "C#4");
        assert_eq!(pitch_to_name(0), "C-1");
        assert_eq!(pitch_to_name(84), "C6");
    }
}
