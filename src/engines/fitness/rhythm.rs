use super::FitnessFunction;
use crate::config::{FitnessConfig, MusicSettings};
use crate::error::{Result, TunegenError};
use crate::music::{Bar, Track};

/// Rhythmic descriptors of a track, computed over its bar partition.
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmParameters {
    pub bar_number: usize,
    /// Onsets falling on a half-note boundary.
    pub strong_beats: usize,
    /// Per-bar share of onsets that sit neither on a strong beat nor on a
    /// multiple of their own length, summed over bars.
    pub strong_notes_on_weak_beats: f64,
    /// Similarity of bars 0/2 and 1/3 in every four-bar window, averaged
    /// over the bar count.
    pub echo: f64,
    pub long_notes: f64,
    /// Adjacent pairs whose lengths differ by exactly half - eighth.
    pub neighboring_notes: usize,
}

impl RhythmParameters {
    pub fn extract(track: &Track) -> Result<Self> {
        let settings = track.settings();
        let bars = track.split_into_bars();
        if bars.is_empty() {
            return Err(TunegenError::Structure(
                "cannot extract rhythm parameters from a track with no bars".to_string(),
            ));
        }

        let (strong_beats, strong_notes_on_weak_beats) = beats(&bars, settings);
        Ok(Self {
            bar_number: bars.len(),
            strong_beats,
            strong_notes_on_weak_beats,
            echo: echo(&bars, settings),
            long_notes: long_notes(&bars, settings),
            neighboring_notes: neighboring_notes(track, settings),
        })
    }
}

fn beats(bars: &[Bar], settings: &MusicSettings) -> (usize, f64) {
    let half = settings.half();
    let mut strong_beats = 0;
    let mut off_beat = 0.0;

    for bar in bars {
        // Empty bars carry no onsets to normalise.
        if bar.is_empty() {
            continue;
        }
        let mut bad_beats = 0;
        for note in bar {
            if note.start_time % half == 0 {
                strong_beats += 1;
            } else if note.start_time % note.length != 0 {
                bad_beats += 1;
            }
        }
        off_beat += bad_beats as f64 / bar.len() as f64;
    }
    (strong_beats, off_beat)
}

fn echo(bars: &[Bar], settings: &MusicSettings) -> f64 {
    let mut total = 0.0;
    for window in (0..bars.len()).step_by(4) {
        for offset in 0..2 {
            let (first, second) = (window + offset, window + offset + 2);
            if second < bars.len() {
                total += similarity(&bars[first], &bars[second], settings.bar_length());
            }
        }
    }
    total / bars.len() as f64
}

/// Squared count of onset pairs landing on the same position within the
/// bar, normalised by the product of the bar sizes.
fn similarity(bar1: &Bar, bar2: &Bar, bar_length: u32) -> f64 {
    if bar1.is_empty() || bar2.is_empty() {
        return 0.0;
    }
    let same = bar1
        .iter()
        .flat_map(|n1| bar2.iter().map(move |n2| (n1, n2)))
        .filter(|(n1, n2)| n1.start_time.abs_diff(n2.start_time) % bar_length == 0)
        .count();
    (same * same) as f64 / (bar1.len() * bar2.len()) as f64
}

fn long_notes(bars: &[Bar], settings: &MusicSettings) -> f64 {
    bars.iter()
        .flatten()
        .map(|note| {
            if note.length == settings.half() {
                0.5
            } else if note.length >= settings.quarter() {
                0.1
            } else {
                0.0
            }
        })
        .sum()
}

fn neighboring_notes(track: &Track, settings: &MusicSettings) -> usize {
    let contrast = settings.half() - settings.eighth();
    track
        .notes
        .windows(2)
        .filter(|pair| pair[0].length.abs_diff(pair[1].length) == contrast)
        .count()
}

/// Rhythm-only fitness: rewards strong-beat onsets beyond two per bar and
/// echoing bars, penalises off-beat onsets and long notes.
#[derive(Debug, Clone, Default)]
pub struct RhythmFitness {
    weights: FitnessConfig,
}

impl RhythmFitness {
    pub fn new(weights: FitnessConfig) -> Self {
        Self { weights }
    }

    pub fn score(&self, params: &RhythmParameters) -> f64 {
        let bars = params.bar_number as f64;
        let f1 = (params.strong_beats as f64 - 2.0 * bars) * self.weights.strong_beats / bars;
        let f2 = params.echo * self.weights.echo;
        let f3 = -params.strong_notes_on_weak_beats * self.weights.off_beat_penalty;
        let f4 = -params.long_notes * self.weights.long_note_penalty;
        log::trace!("rhythm terms: {:.4} {:.4} {:.4} {:.4}", f1, f2, f3, f4);
        f1 + f2 + f3 + f4
    }
}

impl FitnessFunction for RhythmFitness {
    fn name(&self) -> &'static str {
        "rhythm"
    }

    fn evaluate(&self, track: &Track) -> Result<f64> {
        let params = RhythmParameters::extract(track)?;
        Ok(self.score(&params))
    }
}
