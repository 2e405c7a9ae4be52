//! Rhythm mutation operators.
//!
//! Every operator keeps the track's full length and bar count and never
//! touches a pitch. An operator whose precondition on the drawn position
//! fails leaves the track unchanged and reports [`MutationOutcome::Aborted`].
//! A track too short for the operator's index range is a structure error.

use crate::error::{Result, TunegenError};
use crate::music::{Note, Track};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Exchange the lengths of two neighbouring notes in the same bar.
    Swap,
    /// Cut a candidate length off the end of a note into a new note.
    Split,
    /// Absorb the following note, unless it opens a bar.
    Merge,
    /// Overwrite a bar with a copy of the bar two positions later.
    CopyBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Aborted(&'static str),
}

impl MutationKind {
    /// Order matches [`crate::config::MutationWeights::as_array`].
    pub const ALL: [MutationKind; 4] = [
        MutationKind::Swap,
        MutationKind::Split,
        MutationKind::Merge,
        MutationKind::CopyBar,
    ];

    pub fn apply<R: Rng>(&self, track: &mut Track, rng: &mut R) -> Result<MutationOutcome> {
        match self {
            MutationKind::Swap => swap(track, rng),
            MutationKind::Split => split(track, rng),
            MutationKind::Merge => merge(track, rng),
            MutationKind::CopyBar => copy_bar(track, rng),
        }
    }
}

fn require_notes(track: &Track, min: usize, op: &str) -> Result<()> {
    if track.notes.len() < min {
        return Err(TunegenError::Structure(format!(
            "{} needs at least {} notes, track has {}",
            op,
            min,
            track.notes.len()
        )));
    }
    Ok(())
}

fn swap<R: Rng>(track: &mut Track, rng: &mut R) -> Result<MutationOutcome> {
    require_notes(track, 3, "swap")?;
    let bar_length = track.settings().bar_length();
    let idx = rng.gen_range(0..=track.notes.len() - 3);

    let (first, second) = (track.notes[idx], track.notes[idx + 1]);
    if first.start_time / bar_length != second.start_time / bar_length {
        return Ok(MutationOutcome::Aborted("notes lie in different bars"));
    }

    let end = second.end_time();
    track.notes[idx].length = second.length;
    let note = &mut track.notes[idx + 1];
    note.length = first.length;
    note.start_time = end - note.length;
    Ok(MutationOutcome::Applied)
}

fn split<R: Rng>(track: &mut Track, rng: &mut R) -> Result<MutationOutcome> {
    require_notes(track, 2, "split")?;
    let idx = rng.gen_range(0..=track.notes.len() - 2);
    let note = track.notes[idx];

    if note.length <= track.settings().note_unit {
        return Ok(MutationOutcome::Aborted("note is already at the minimal unit"));
    }
    // Uniform over the shorter candidates, same as redrawing until one fits.
    let candidates: Vec<u32> = track
        .settings()
        .note_lengths
        .iter()
        .copied()
        .filter(|&len| len < note.length)
        .collect();
    if candidates.is_empty() {
        return Ok(MutationOutcome::Aborted("no shorter candidate length"));
    }
    let tail = candidates[rng.gen_range(0..candidates.len())];

    let end = note.end_time();
    track.notes[idx].length -= tail;
    track
        .notes
        .insert(idx + 1, Note::new(note.pitch, tail, end - tail, note.velocity));
    Ok(MutationOutcome::Applied)
}

fn merge<R: Rng>(track: &mut Track, rng: &mut R) -> Result<MutationOutcome> {
    require_notes(track, 3, "merge")?;
    let bar_length = track.settings().bar_length();
    let idx = rng.gen_range(0..=track.notes.len() - 3);

    let next = track.notes[idx + 1];
    if next.start_time % bar_length == 0 {
        return Ok(MutationOutcome::Aborted("next note opens a bar"));
    }
    let note = &mut track.notes[idx];
    note.length = next.end_time() - note.start_time;
    track.notes.remove(idx + 1);
    Ok(MutationOutcome::Applied)
}

fn copy_bar<R: Rng>(track: &mut Track, rng: &mut R) -> Result<MutationOutcome> {
    let bar_number = track.bar_number();
    if bar_number < 3 {
        return Err(TunegenError::Structure(format!(
            "copy-bar needs at least 3 bars, track has {}",
            bar_number
        )));
    }
    let shift = track.settings().bar_length() * 2;
    let idx = rng.gen_range(2..bar_number);

    let mut bars = track.split_into_bars();
    bars[idx - 2] = bars[idx]
        .iter()
        .map(|note| Note {
            start_time: note.start_time - shift,
            ..*note
        })
        .collect();
    track.join_bars(bars);
    Ok(MutationOutcome::Applied)
}
