// Copyright (c) 2024 Mike Tsao

use crate::{
    error::{Result, SolfaError},
    theory::{TheoryTables, MAX_MIDI_PITCH, SEMITONES_PER_OCTAVE},
    util::RandomSource,
};
use serde::{Deserialize, Serialize};

/// When a note sits in the lowest octave band, the next note stays there this
/// often. Otherwise it jumps to one of the other bands.
pub const OCTAVE_STAY_PROBABILITY: f64 = 0.75;

/// The longest sequence [generate_test_sequence()] will produce.
pub const MAX_NOTE_COUNT: usize = 1024;

/// The notes of one exercise, in two forms. The ground truth holds the bare
/// syllable pitches and is what guesses are scored against. The display
/// sequence has each note's octave band and the key's transposition applied,
/// and is what the learner hears or sees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestSequence {
    ground_truth: Vec<u8>,
    display: Vec<u8>,
    octave_bands: Vec<usize>,
    key_offset: i8,
}
#[allow(missing_docs)]
impl TestSequence {
    pub fn ground_truth(&self) -> &[u8] {
        &self.ground_truth
    }

    pub fn display(&self) -> &[u8] {
        &self.display
    }

    /// The 1-based octave band of each note.
    pub fn octave_bands(&self) -> &[usize] {
        &self.octave_bands
    }

    pub fn key_offset(&self) -> i8 {
        self.key_offset
    }

    pub fn len(&self) -> usize {
        self.ground_truth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ground_truth.is_empty()
    }
}
impl core::fmt::Display for TestSequence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let joined = self
            .display
            .iter()
            .map(|pitch| pitch.to_string())
            .collect::<Vec<_>>()
            .join("_");
        f.write_str(&joined)
    }
}

/// Generates `count` notes drawn from `syllables`, never repeating a pitch
/// twice in a row, then spreads them over `octave_range` octave bands and
/// transposes them into `key`.
///
/// Duplicate syllables count once. All arguments are checked before anything
/// is drawn from `random`, so a bad configuration never consumes randomness.
pub fn generate_test_sequence<S: AsRef<str>, R: RandomSource>(
    tables: &TheoryTables,
    count: usize,
    syllables: &[S],
    octave_range: usize,
    key: &str,
    random: &mut R,
) -> Result<TestSequence> {
    if syllables.is_empty() {
        return Err(SolfaError::EmptySyllableSet);
    }
    let mut allowed: Vec<u8> = Vec::with_capacity(syllables.len());
    for pitch in tables.syllables.pitches_of(syllables)? {
        if !allowed.contains(&pitch) {
            allowed.push(pitch);
        }
    }
    if !(1..=MAX_NOTE_COUNT).contains(&count) {
        return Err(SolfaError::InvalidNoteCount(count));
    }
    if octave_range < 1 {
        return Err(SolfaError::InvalidOctaveRange(octave_range));
    }
    let key_offset = tables.keys.offset_of(key)?;
    if count > 1 && allowed.len() < 2 {
        return Err(SolfaError::RepeatUnsatisfiable {
            distinct: allowed.len(),
            count,
        });
    }
    check_pitch_range(&allowed, octave_range, key_offset)?;

    let ground_truth = draw_without_adjacent_repeats(&allowed, count, random);
    let octave_bands = draw_octave_bands(count, octave_range, random);
    let display = ground_truth
        .iter()
        .zip(octave_bands.iter())
        .map(|(pitch, band)| {
            (*pitch as i32 + (*band as i32 - 1) * SEMITONES_PER_OCTAVE + key_offset as i32) as u8
        })
        .collect();

    log::debug!("generated {ground_truth:?} in bands {octave_bands:?}, key offset {key_offset}");
    Ok(TestSequence {
        ground_truth,
        display,
        octave_bands,
        key_offset,
    })
}

// The lowest note in band 1 and the highest note in the top band must both be
// valid MIDI pitches after transposition.
fn check_pitch_range(allowed: &[u8], octave_range: usize, key_offset: i8) -> Result<()> {
    let lowest = *allowed.iter().min().unwrap_or(&0) as i64 + key_offset as i64;
    let highest = (*allowed.iter().max().unwrap_or(&0) as i64 + key_offset as i64).saturating_add(
        (i64::try_from(octave_range).unwrap_or(i64::MAX) - 1)
            .saturating_mul(SEMITONES_PER_OCTAVE as i64),
    );
    for pitch in [lowest, highest] {
        if !(0..=MAX_MIDI_PITCH as i64).contains(&pitch) {
            return Err(SolfaError::PitchOutOfRange {
                pitch: i32::try_from(pitch).unwrap_or(i32::MAX),
            });
        }
    }
    Ok(())
}

fn draw_without_adjacent_repeats<R: RandomSource>(
    allowed: &[u8],
    count: usize,
    random: &mut R,
) -> Vec<u8> {
    let mut sequence = Vec::with_capacity(count);
    let mut previous = allowed[random.rand_range(0..allowed.len() as u64) as usize];
    sequence.push(previous);
    while sequence.len() < count {
        let candidates: Vec<u8> = allowed
            .iter()
            .copied()
            .filter(|pitch| *pitch != previous)
            .collect();
        previous = candidates[random.rand_range(0..candidates.len() as u64) as usize];
        sequence.push(previous);
    }
    sequence
}

/// A random walk over the bands 1..=`octave_range` that favors the lowest band.
fn draw_octave_bands<R: RandomSource>(
    count: usize,
    octave_range: usize,
    random: &mut R,
) -> Vec<usize> {
    let mut bands = Vec::with_capacity(count);
    if octave_range == 1 {
        bands.resize(count, 1);
        return bands;
    }
    let mut previous = 1 + random.rand_range(0..octave_range as u64) as usize;
    bands.push(previous);
    while bands.len() < count {
        if previous != 1 || random.rand_float() >= OCTAVE_STAY_PROBABILITY {
            // Any band but the current one. Drawing from one fewer band and
            // skipping over the current one keeps the choice uniform.
            let mut next = 1 + random.rand_range(0..octave_range as u64 - 1) as usize;
            if next >= previous {
                next += 1;
            }
            previous = next;
        }
        bands.push(previous);
    }
    bands
}
