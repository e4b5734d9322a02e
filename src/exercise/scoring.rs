// Copyright (c) 2024 Mike Tsao

use super::TestSequence;
use crate::{
    error::{Result, SolfaError},
    theory::TheoryTables,
};
use serde::{Deserialize, Serialize};

/// How a set of guesses compared to the ground truth.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Score {
    is_exact: bool,
    per_note: Vec<bool>,
}
impl Score {
    /// True if every guess matched.
    pub fn is_exact(&self) -> bool {
        self.is_exact
    }

    /// Whether each guess matched the note in the same position.
    pub fn per_note(&self) -> &[bool] {
        &self.per_note
    }

    /// 1 for an exact match, 0 otherwise.
    pub fn overall(&self) -> u8 {
        self.is_exact as u8
    }

    /// 1 for each matching position, 0 for each miss.
    pub fn per_note_bits(&self) -> Vec<u8> {
        self.per_note.iter().map(|hit| *hit as u8).collect()
    }

    /// How many guesses matched.
    pub fn correct_count(&self) -> usize {
        self.per_note.iter().filter(|hit| **hit).count()
    }

    /// The fraction of guesses that matched, 0.0..=1.0. An empty score counts
    /// as perfect.
    pub fn accuracy(&self) -> f64 {
        if self.per_note.is_empty() {
            1.0
        } else {
            self.correct_count() as f64 / self.per_note.len() as f64
        }
    }
}

/// Compares guessed pitches to the ground truth position by position. The two
/// sequences must be the same length.
pub fn validate_user_input(ground_truth: &[u8], guesses: &[u8]) -> Result<Score> {
    if ground_truth.len() != guesses.len() {
        return Err(SolfaError::LengthMismatch {
            expected: ground_truth.len(),
            actual: guesses.len(),
        });
    }
    let per_note: Vec<bool> = ground_truth
        .iter()
        .zip(guesses)
        .map(|(truth, guess)| truth == guess)
        .collect();
    Ok(Score {
        is_exact: per_note.iter().all(|hit| *hit),
        per_note,
    })
}

/// Converts syllable guesses to pitches and scores them against `test`.
pub fn score_guesses<S: AsRef<str>>(
    tables: &TheoryTables,
    test: &TestSequence,
    guesses: &[S],
) -> Result<Score> {
    let guesses = tables.syllables.pitches_of(guesses)?;
    validate_user_input(test.ground_truth(), &guesses)
}
