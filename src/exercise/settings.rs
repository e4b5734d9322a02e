// Copyright (c) 2024 Mike Tsao

use crate::{
    error::Result,
    theory::{Difficulty, DifficultyPresets, TheoryTables},
    util::RandomSource,
};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// The concrete parameters of one exercise.
#[derive(Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExerciseSettings {
    /// How many notes the learner must identify.
    #[builder(default = "4")]
    pub note_count: usize,

    /// The syllables the notes are drawn from.
    #[builder(setter(custom))]
    pub syllables: Vec<String>,

    /// How many octave bands the notes are spread over.
    #[builder(default = "1")]
    pub octave_range: usize,

    /// The key the notes are transposed into.
    #[builder(setter(into), default = "\"C\".to_string()")]
    pub key: String,
}
impl ExerciseSettingsBuilder {
    /// Sets the syllables the notes are drawn from.
    pub fn syllables<S: AsRef<str>>(&mut self, syllables: &[S]) -> &mut Self {
        self.syllables = Some(
            syllables
                .iter()
                .map(|syllable| syllable.as_ref().to_string())
                .collect(),
        );
        self
    }
}
impl ExerciseSettings {
    /// Resolves a difficulty level and a mode into concrete settings, drawing
    /// note count, octave range, and key from the preset's options. `key`
    /// overrides the preset's key choices when present.
    ///
    /// Mode names may be any mode in the table or one of its aliases, such as
    /// "Major" or "Minor".
    pub fn from_preset<R: RandomSource>(
        tables: &TheoryTables,
        presets: &DifficultyPresets,
        difficulty: Difficulty,
        mode: &str,
        key: Option<&str>,
        random: &mut R,
    ) -> Result<Self> {
        let preset = presets.preset(difficulty)?;
        let syllables = tables.modes.syllables(mode, &tables.syllables)?;

        // preset() has already checked that none of these lists is empty.
        let note_count = random.choose(&preset.note_counts).copied().unwrap_or(1);
        let octave_range = random.choose(&preset.octave_ranges).copied().unwrap_or(1);
        let key = match key {
            Some(key) => key.to_string(),
            None => random
                .choose(&preset.keys)
                .cloned()
                .unwrap_or_else(|| "C".to_string()),
        };
        // Fail now rather than at generation time.
        tables.keys.offset_of(&key)?;

        Ok(Self {
            note_count,
            syllables,
            octave_range,
            key,
        })
    }
}
