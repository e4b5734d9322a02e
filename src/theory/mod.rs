// Copyright (c) 2024 Mike Tsao

//! Music-theory data: which syllables map to which pitches, how keys
//! transpose, which pitches each mode uses, and what each difficulty level
//! asks for.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        generate_reference_cadence, Difficulty, DifficultyPresets, ReferenceCadence, TheoryTables,
    };
}

pub use cadence::{generate_reference_cadence, ReferenceCadence};
pub use presets::{Difficulty, DifficultyPreset, DifficultyPresets};
pub use tables::{
    KeyEntry, KeyTable, ModeEntry, ModeTable, SyllableEntry, SyllableTable, TheoryTables,
    MAX_MIDI_PITCH, SEMITONES_PER_OCTAVE,
};

mod cadence;
mod presets;
mod tables;
