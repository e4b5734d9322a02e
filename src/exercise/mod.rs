// Copyright (c) 2024 Mike Tsao

//! Generating, performing, and scoring a single ear-training exercise.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        generate_test_sequence, validate_user_input, Exercise, ExerciseSettings,
        ExerciseSettingsBuilder, Performance, Score, TestSequence,
    };
}

pub use generator::{
    generate_test_sequence, TestSequence, MAX_NOTE_COUNT, OCTAVE_STAY_PROBABILITY,
};
pub use performance::{Performance, ScheduledMidi};
pub use scoring::{score_guesses, validate_user_input, Score};
pub use settings::{ExerciseSettings, ExerciseSettingsBuilder, ExerciseSettingsBuilderError};

mod generator;
mod performance;
mod scoring;
mod settings;

use crate::{
    error::Result,
    theory::{generate_reference_cadence, ReferenceCadence, TheoryTables},
    util::RandomSource,
};
use serde::{Deserialize, Serialize};

/// Everything needed to present one exercise and check the answer: the
/// settings it came from, the test notes, and the cadence that establishes
/// the key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Exercise {
    settings: ExerciseSettings,
    test: TestSequence,
    cadence: ReferenceCadence,
}
impl Exercise {
    /// Generates a new exercise.
    pub fn generate<R: RandomSource>(
        tables: &TheoryTables,
        settings: ExerciseSettings,
        random: &mut R,
    ) -> Result<Self> {
        let test = generate_test_sequence(
            tables,
            settings.note_count,
            settings.syllables.as_slice(),
            settings.octave_range,
            &settings.key,
            random,
        )?;
        let cadence = generate_reference_cadence(tables, &settings.key)?;
        Ok(Self {
            settings,
            test,
            cadence,
        })
    }

    /// The settings this exercise was generated from.
    pub fn settings(&self) -> &ExerciseSettings {
        &self.settings
    }

    /// The notes the learner must identify.
    pub fn test(&self) -> &TestSequence {
        &self.test
    }

    /// The cadence played before the test notes.
    pub fn cadence(&self) -> &ReferenceCadence {
        &self.cadence
    }

    /// Scores syllable guesses against this exercise.
    pub fn score<S: AsRef<str>>(&self, tables: &TheoryTables, guesses: &[S]) -> Result<Score> {
        score_guesses(tables, &self.test, guesses)
    }
}
