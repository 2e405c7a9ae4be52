use super::note::Note;
use super::key::{NOTE_MAX, NOTE_MIN};
use crate::config::MusicSettings;
use crate::error::{Result, TunegenError};
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The notes sounding within one measure.
pub type Bar = Vec<Note>;

/// A single monophonic voice.
///
/// `notes` is the only source of truth; bars are derived with
/// [`Track::split_into_bars`] and written back with [`Track::join_bars`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub instrument: u8,
    pub notes: Vec<Note>,
    #[serde(skip)]
    settings: Arc<MusicSettings>,
}

impl Track {
    pub fn new(settings: Arc<MusicSettings>) -> Self {
        Self {
            instrument: settings.instrument,
            notes: Vec::new(),
            settings,
        }
    }

    pub fn with_notes(settings: Arc<MusicSettings>, notes: Vec<Note>) -> Self {
        let mut track = Self::new(settings);
        track.notes = notes;
        track
    }

    pub fn settings(&self) -> &MusicSettings {
        &self.settings
    }

    /// End time of the last sounding note.
    pub fn full_length(&self) -> u32 {
        self.notes.iter().map(Note::end_time).max().unwrap_or(0)
    }

    pub fn bar_number(&self) -> usize {
        self.full_length().div_ceil(self.settings.bar_length()) as usize
    }

    /// Key, instrument, length and bar count on separate lines.
    pub fn brief_info(&self) -> String {
        format!(
            "Key: {}\nInstrument: {}\nLength: {}\nBar: {}\n",
            self.settings.key,
            self.instrument,
            self.full_length(),
            self.bar_number()
        )
    }

    /// Shift every pitch by `interval` semitones. Fails without touching the
    /// track if any pitch would leave the MIDI range.
    pub fn transpose(&mut self, interval: i32) -> Result<()> {
        self.map_pitches(|pitch| i32::from(pitch) + interval, "transpose")
    }

    /// Mirror every pitch around `center`. Fails without touching the track
    /// if any pitch would leave the MIDI range.
    pub fn inverse(&mut self, center: u8) -> Result<()> {
        self.map_pitches(|pitch| 2 * i32::from(center) - i32::from(pitch), "inverse")
    }

    /// Play the track backwards: each note keeps its length and starts where
    /// its mirror image ends; storage order is reversed.
    pub fn retrograde(&mut self) {
        let full_length = self.full_length();
        for note in &mut self.notes {
            note.start_time = full_length - note.end_time();
        }
        self.notes.reverse();
    }

    fn map_pitches<M: Fn(u8) -> i32>(&mut self, map: M, op: &str) -> Result<()> {
        let pitches = self
            .notes
            .iter()
            .map(|note| {
                let pitch = map(note.pitch);
                u8::try_from(pitch)
                    .ok()
                    .filter(|p| *p <= 127)
                    .ok_or_else(|| {
                        TunegenError::Structure(format!(
                            "{} moves pitch {} out of range to {}",
                            op, note.pitch, pitch
                        ))
                    })
            })
            .collect::<Result<Vec<u8>>>()?;
        for (note, pitch) in self.notes.iter_mut().zip(pitches) {
            note.pitch = pitch;
        }
        Ok(())
    }

    /// Partition the notes by measure. A note crossing a bar line is cut at
    /// every line it crosses; each fragment keeps pitch and velocity.
    pub fn split_into_bars(&self) -> Vec<Bar> {
        let bar_length = self.settings.bar_length();
        let mut bars: Vec<Bar> = vec![Vec::new(); self.bar_number()];

        for note in &self.notes {
            let mut fragment = *note;
            loop {
                let idx = (fragment.start_time / bar_length) as usize;
                let bar_end = (idx as u32 + 1) * bar_length;
                if fragment.end_time() <= bar_end {
                    bars[idx].push(fragment);
                    break;
                }
                let mut head = fragment;
                head.length = bar_end - fragment.start_time;
                bars[idx].push(head);

                fragment.length = fragment.end_time() - bar_end;
                fragment.start_time = bar_end;
            }
        }
        bars
    }

    /// Replace the notes with the concatenation of `bars`, in bar order.
    /// Fragments produced by splitting are not merged back.
    pub fn join_bars(&mut self, bars: Vec<Bar>) {
        self.notes = bars.into_iter().flatten().collect();
    }

    /// Generate a random track of `settings.bar_number` full bars.
    ///
    /// Every bar but the last is filled with random candidate lengths; the
    /// last bar closes on a half note. Pitches are random within the key and
    /// the final note is the tonic.
    pub fn random<R: Rng>(settings: Arc<MusicSettings>, rng: &mut R) -> Result<Self> {
        let bar_length = settings.bar_length();
        let half = settings.half();
        let velocity = settings.velocity;
        let mut track = Self::new(Arc::clone(&settings));

        for bar in 0..settings.bar_number {
            let bar_start = bar as u32 * bar_length;
            let is_last = bar + 1 == settings.bar_number;
            let reserved = if is_last { half } else { 0 };

            let mut remaining = bar_length - reserved;
            while remaining > 0 {
                let fitting: Vec<u32> = settings
                    .note_lengths
                    .iter()
                    .copied()
                    .filter(|&len| len <= remaining)
                    .collect();
                if fitting.is_empty() {
                    return Err(TunegenError::Generation(format!(
                        "No candidate note length fits the remaining {} ticks of bar {}",
                        remaining, bar
                    )));
                }
                let length = fitting[rng.gen_range(0..fitting.len())];
                let start_time = bar_start + bar_length - reserved - remaining;
                track.notes.push(Note::new(0, length, start_time, velocity));
                remaining -= length;
            }

            if is_last {
                track
                    .notes
                    .push(Note::new(0, half, bar_start + bar_length - half, velocity));
            }
        }

        track.randomize_pitches(rng);
        Ok(track)
    }

    /// Assign random in-key pitches, ending on the tonic.
    pub fn randomize_pitches<R: Rng>(&mut self, rng: &mut R) {
        let key = self.settings.key;
        for note in &mut self.notes {
            note.pitch = key.random_pitch(rng, NOTE_MIN, NOTE_MAX);
        }
        if let Some(last) = self.notes.last_mut() {
            last.pitch = key.random_tonic(rng);
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, bar) in self.split_into_bars().iter().enumerate() {
            writeln!(f, "-------------------  Bar {}", idx + 1)?;
            for note in bar {
                writeln!(f, "{}", note)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings() -> Arc<MusicSettings> {
        Arc::new(MusicSettings::with_resolution(4))
    }

    #[test]
    fn test_empty_track_has_no_bars() {
        let track = Track::new(settings());
        assert_eq!(track.full_length(), 0);
        assert_eq!(track.bar_number(), 0);
        assert!(track.split_into_bars().is_empty());
    }

    #[test]
    fn test_partial_trailing_bar_counts() {
        // bar_length = 16 ticks
        let track = Track::with_notes(settings(), vec![Note::new(60, 20, 0, 80)]);
        assert_eq!(track.bar_number(), 2);
    }

    #[test]
    fn test_note_spanning_several_bars_is_cut_at_each_line() {
        let track = Track::with_notes(
            settings(),
            vec![Note::new(60, 4, 0, 80), Note::new(62, 40, 4, 90)],
        );
        let bars = track.split_into_bars();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0], vec![Note::new(60, 4, 0, 80), Note::new(62, 12, 4, 90)]);
        assert_eq!(bars[1], vec![Note::new(62, 16, 16, 90)]);
        assert_eq!(bars[2], vec![Note::new(62, 12, 32, 90)]);
    }

    #[test]
    fn test_brief_info() {
        let track = Track::with_notes(settings(), vec![Note::new(60, 20, 0, 80)]);
        assert_eq!(track.brief_info(), "Key: C\nInstrument: 0\nLength: 20\nBar: 2\n");
    }

    #[test]
    fn test_transpose_shifts_every_pitch() {
        let mut track = Track::with_notes(
            settings(),
            vec![Note::new(60, 4, 0, 80), Note::new(67, 4, 4, 80)],
        );
        track.transpose(-12).unwrap();
        assert_eq!(track.notes[0].pitch, 48);
        assert_eq!(track.notes[1].pitch, 55);
        track.transpose(5).unwrap();
        assert_eq!(track.notes[1].pitch, 60);
    }

    #[test]
    fn test_transpose_out_of_range_leaves_track_untouched() {
        let mut track = Track::with_notes(
            settings(),
            vec![Note::new(60, 4, 0, 80), Note::new(125, 4, 4, 80)],
        );
        let before = track.clone();
        assert!(matches!(track.transpose(3), Err(TunegenError::Structure(_))));
        assert_eq!(track, before);
        assert!(matches!(track.transpose(-61), Err(TunegenError::Structure(_))));
        assert_eq!(track, before);
    }

    #[test]
    fn test_inverse_mirrors_around_center() {
        let mut track = Track::with_notes(
            settings(),
            vec![Note::new(60, 4, 0, 80), Note::new(64, 4, 4, 80), Note::new(55, 4, 8, 80)],
        );
        track.inverse(62).unwrap();
        let pitches: Vec<u8> = track.notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![64, 60, 69]);

        let before = track.clone();
        assert!(matches!(track.inverse(120), Err(TunegenError::Structure(_))));
        assert_eq!(track, before);
    }

    #[test]
    fn test_retrograde_reverses_time_and_order() {
        let mut track = Track::with_notes(
            settings(),
            vec![Note::new(60, 4, 0, 80), Note::new(62, 8, 4, 80), Note::new(64, 4, 12, 80)],
        );
        track.retrograde();
        assert_eq!(
            track.notes,
            vec![Note::new(64, 4, 0, 80), Note::new(62, 8, 4, 80), Note::new(60, 4, 12, 80)]
        );
        assert_eq!(track.full_length(), 16);
    }

    #[test]
    fn test_random_track_fills_every_bar() {
        let settings = settings();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let track = Track::random(Arc::clone(&settings), &mut rng).unwrap();
            assert_eq!(track.bar_number(), settings.bar_number);
            assert_eq!(
                track.full_length(),
                settings.bar_number as u32 * settings.bar_length()
            );

            let mut cursor = 0;
            for note in &track.notes {
                assert_eq!(note.start_time, cursor);
                cursor = note.end_time();
            }

            let last = track.notes.last().unwrap();
            assert_eq!(last.length, settings.half());
            assert_eq!(settings.key.degree_of(last.pitch), Some(1));
        }
    }

    #[test]
    fn test_random_track_reports_unfillable_bar() {
        let settings = Arc::new(MusicSettings {
            note_lengths: vec![12],
            ..MusicSettings::with_resolution(4)
        });
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            Track::random(settings, &mut rng),
            Err(TunegenError::Generation(_))
        ));
    }
}
