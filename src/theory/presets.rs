// Copyright (c) 2024 Mike Tsao

use crate::error::{Result, SolfaError};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// How hard an exercise should be.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    /// Two notes in one octave.
    #[default]
    Easy,
    /// Three notes in one octave.
    Medium,
    /// Five notes across two octaves.
    Hard,
    /// Sixteen notes across three octaves.
    Impossible,
}

/// The options a difficulty level allows. Each exercise draws one value from
/// each list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DifficultyPreset {
    /// Candidate sequence lengths.
    pub note_counts: Vec<usize>,
    /// Candidate numbers of octave bands.
    pub octave_ranges: Vec<usize>,
    /// Candidate key names.
    pub keys: Vec<String>,
}
impl DifficultyPreset {
    /// A preset with exactly one option for each field.
    pub fn new_with(note_count: usize, octave_range: usize, key: &str) -> Self {
        Self {
            note_counts: vec![note_count],
            octave_ranges: vec![octave_range],
            keys: vec![key.to_string()],
        }
    }

    fn check(&self, difficulty: Difficulty) -> Result<()> {
        let name = || difficulty.to_string();
        if self.note_counts.is_empty() {
            return Err(SolfaError::EmptyPreset(name(), "note counts"));
        }
        if self.octave_ranges.is_empty() {
            return Err(SolfaError::EmptyPreset(name(), "octave ranges"));
        }
        if self.keys.is_empty() {
            return Err(SolfaError::EmptyPreset(name(), "keys"));
        }
        Ok(())
    }
}

/// One [DifficultyPreset] per [Difficulty]. Levels missing from a settings
/// file keep their built-in presets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DifficultyPresets {
    easy: DifficultyPreset,
    medium: DifficultyPreset,
    hard: DifficultyPreset,
    impossible: DifficultyPreset,
}
impl Default for DifficultyPresets {
    fn default() -> Self {
        Self {
            easy: DifficultyPreset::new_with(2, 1, "C"),
            medium: DifficultyPreset::new_with(3, 1, "C"),
            hard: DifficultyPreset::new_with(5, 2, "C"),
            impossible: DifficultyPreset::new_with(16, 3, "C"),
        }
    }
}
impl DifficultyPresets {
    /// Returns the preset for `difficulty`, failing if any of its option lists
    /// is empty.
    pub fn preset(&self, difficulty: Difficulty) -> Result<&DifficultyPreset> {
        let preset = match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
            Difficulty::Impossible => &self.impossible,
        };
        preset.check(difficulty)?;
        Ok(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn difficulty_names() {
        assert_eq!(Difficulty::from_str("hard").unwrap(), Difficulty::Hard);
        assert_eq!(
            Difficulty::from_str("Impossible").unwrap(),
            Difficulty::Impossible
        );
        assert!(Difficulty::from_str("trivial").is_err());
        assert_eq!(Difficulty::Medium.to_string(), "medium");
        let name: &'static str = Difficulty::Easy.into();
        assert_eq!(name, "easy");
        assert_eq!(Difficulty::iter().count(), 4);
    }

    #[test]
    fn built_in_presets() {
        let presets = DifficultyPresets::default();
        let expected = [(2, 1), (3, 1), (5, 2), (16, 3)];
        for (difficulty, (notes, octaves)) in Difficulty::iter().zip(expected) {
            let preset = presets.preset(difficulty).unwrap();
            assert_eq!(preset.note_counts, vec![notes]);
            assert_eq!(preset.octave_ranges, vec![octaves]);
            assert_eq!(preset.keys, vec!["C".to_string()]);
        }
    }

    #[test]
    fn empty_options_are_rejected() {
        let mut presets = DifficultyPresets::default();
        presets.hard.keys.clear();
        assert_eq!(
            presets.preset(Difficulty::Hard),
            Err(SolfaError::EmptyPreset("hard".into(), "keys"))
        );
        assert!(presets.preset(Difficulty::Easy).is_ok());
    }

    #[test]
    fn partial_presets_keep_the_rest() {
        let presets: DifficultyPresets = serde_json::from_str(
            r#"{ "easy": { "note-counts": [2, 3], "octave-ranges": [1], "keys": ["G", "F"] } }"#,
        )
        .unwrap();
        let easy = presets.preset(Difficulty::Easy).unwrap();
        assert_eq!(easy.note_counts, vec![2, 3]);
        assert_eq!(easy.keys, vec!["G".to_string(), "F".to_string()]);
        assert_eq!(
            presets.preset(Difficulty::Impossible).unwrap(),
            &DifficultyPreset::new_with(16, 3, "C")
        );
    }
}
