// Copyright (c) 2024 Mike Tsao

use super::tables::{TheoryTables, MAX_MIDI_PITCH};
use crate::error::{Result, SolfaError};
use serde::{Deserialize, Serialize};

/// A dominant-to-tonic progression that establishes the key before the test
/// notes play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCadence {
    /// The dominant triad, voiced below the tonic root.
    pub dominant: [u8; 3],
    /// The tonic major triad in root position.
    pub tonic: [u8; 3],
}
impl ReferenceCadence {
    /// Semitone offsets of the tonic triad from the key's root.
    pub const TONIC_INTERVALS: [i32; 3] = [0, 4, 7];
    /// Semitone offsets of the dominant triad from the key's root.
    pub const DOMINANT_INTERVALS: [i32; 3] = [-5, -1, 2];

    /// Both chords in playing order.
    pub fn chords(&self) -> [[u8; 3]; 2] {
        [self.dominant, self.tonic]
    }
}

/// Builds the reference cadence for `key`, rooted on the transposed `do`.
pub fn generate_reference_cadence(tables: &TheoryTables, key: &str) -> Result<ReferenceCadence> {
    let root = tables.syllables.do_pitch() as i32 + tables.keys.offset_of(key)? as i32;
    Ok(ReferenceCadence {
        dominant: triad(root, ReferenceCadence::DOMINANT_INTERVALS)?,
        tonic: triad(root, ReferenceCadence::TONIC_INTERVALS)?,
    })
}

fn triad(root: i32, intervals: [i32; 3]) -> Result<[u8; 3]> {
    let mut chord = [0u8; 3];
    for (note, interval) in chord.iter_mut().zip(intervals) {
        let pitch = root + interval;
        if !(0..=MAX_MIDI_PITCH).contains(&pitch) {
            return Err(SolfaError::PitchOutOfRange { pitch });
        }
        *note = pitch as u8;
    }
    Ok(chord)
}
