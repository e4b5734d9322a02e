// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::{
    error::{Result, SolfaError},
    theory::{DifficultyPresets, TheoryTables},
};
use anyhow::Context;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How long each part of a performance lasts, in seconds, and how loud it is.
/// Deserialized values are checked with [PerformanceTiming::check()].
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", try_from = "RawPerformanceTiming")]
pub struct PerformanceTiming {
    /// How long each cadence chord sounds.
    #[derivative(Default(value = "2.0"))]
    pub chord_duration: f64,
    /// Silence between the cadence and the first test note.
    #[derivative(Default(value = "1.0"))]
    pub space_between: f64,
    /// How long each test note sounds.
    #[derivative(Default(value = "0.5"))]
    pub note_duration: f64,
    /// MIDI velocity of every note.
    #[derivative(Default(value = "64"))]
    pub velocity: u8,
}
impl PerformanceTiming {
    /// The loudest MIDI velocity.
    pub const MAX_VELOCITY: u8 = 127;

    /// Fails unless every duration is finite, chords and notes last more than
    /// zero seconds, the pause isn't negative, and the velocity is 1..=127.
    /// (Velocity 0 would turn every note-on into a note-off.)
    pub fn check(&self) -> Result<()> {
        for (name, value, allow_zero) in [
            ("chord-duration", self.chord_duration, false),
            ("space-between", self.space_between, true),
            ("note-duration", self.note_duration, false),
        ] {
            let too_small = if allow_zero { value < 0.0 } else { value <= 0.0 };
            if !value.is_finite() || too_small {
                return Err(SolfaError::InvalidTiming(format!(
                    "{name} can't be {value}"
                )));
            }
        }
        if !(1..=Self::MAX_VELOCITY).contains(&self.velocity) {
            return Err(SolfaError::InvalidTiming(format!(
                "velocity {} is outside 1..=127",
                self.velocity
            )));
        }
        Ok(())
    }
}

// Missing fields take the built-in defaults.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawPerformanceTiming {
    chord_duration: f64,
    space_between: f64,
    note_duration: f64,
    velocity: u8,
}
impl Default for RawPerformanceTiming {
    fn default() -> Self {
        let timing = PerformanceTiming::default();
        Self {
            chord_duration: timing.chord_duration,
            space_between: timing.space_between,
            note_duration: timing.note_duration,
            velocity: timing.velocity,
        }
    }
}
impl TryFrom<RawPerformanceTiming> for PerformanceTiming {
    type Error = SolfaError;

    fn try_from(value: RawPerformanceTiming) -> Result<Self> {
        let timing = Self {
            chord_duration: value.chord_duration,
            space_between: value.space_between,
            note_duration: value.note_duration,
            velocity: value.velocity,
        };
        timing.check()?;
        Ok(timing)
    }
}

/// Everything a front end can configure, loadable from a JSON file. Any section
/// that's missing from the file takes its built-in default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Syllable, key, and mode tables.
    #[serde(default)]
    pub tables: TheoryTables,
    /// Difficulty presets.
    #[serde(default)]
    pub presets: DifficultyPresets,
    /// Performance timing.
    #[serde(default)]
    pub performance: PerformanceTiming,
}
impl Settings {
    /// Reads settings from a JSON file. Tables and timing are validated as
    /// they load.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Writes settings to a JSON file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        Ok(())
    }
}
