// Copyright (c) 2024 Mike Tsao

//! The lookup tables that turn names into pitches. They're built once, either
//! from the built-in defaults or from a settings file, and are read-only from
//! then on.

use crate::error::{Result, SolfaError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The highest note number that MIDI can express.
pub const MAX_MIDI_PITCH: i32 = 127;

/// The number of semitones in an octave.
pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// One row of a [SyllableTable].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyllableEntry {
    /// The solfege name, such as "do" or "fi".
    pub name: String,
    /// Semitones above `do`, 0..=11.
    pub offset: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawSyllableTable {
    do_pitch: u8,
    syllables: Vec<SyllableEntry>,
}

/// Maps each of the twelve chromatic solfege syllables to a pitch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawSyllableTable")]
pub struct SyllableTable {
    do_pitch: u8,
    syllables: Vec<SyllableEntry>,
}
impl Default for SyllableTable {
    fn default() -> Self {
        let syllables = [
            "do", "ra", "re", "me", "mi", "fa", "fi", "sol", "le", "la", "te", "ti",
        ]
        .iter()
        .enumerate()
        .map(|(offset, name)| SyllableEntry {
            name: name.to_string(),
            offset: offset as u8,
        })
        .collect();
        Self {
            do_pitch: 60,
            syllables,
        }
    }
}
impl TryFrom<RawSyllableTable> for SyllableTable {
    type Error = SolfaError;

    fn try_from(value: RawSyllableTable) -> Result<Self> {
        Self::new_with(value.do_pitch, value.syllables)
    }
}
impl SyllableTable {
    /// Builds a table, checking that the names cover all twelve pitch classes
    /// exactly once.
    pub fn new_with(do_pitch: u8, syllables: Vec<SyllableEntry>) -> Result<Self> {
        if syllables.len() != SEMITONES_PER_OCTAVE as usize {
            return Err(SolfaError::InvalidTable(format!(
                "syllable table needs 12 entries, found {}",
                syllables.len()
            )));
        }
        let mut seen_offsets = [false; SEMITONES_PER_OCTAVE as usize];
        for (i, entry) in syllables.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(SolfaError::InvalidTable("empty syllable name".into()));
            }
            let Some(seen) = seen_offsets.get_mut(entry.offset as usize) else {
                return Err(SolfaError::InvalidTable(format!(
                    "syllable '{}' has offset {}, outside 0..=11",
                    entry.name, entry.offset
                )));
            };
            if *seen {
                return Err(SolfaError::InvalidTable(format!(
                    "offset {} is assigned to more than one syllable",
                    entry.offset
                )));
            }
            *seen = true;
            if syllables[..i]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&entry.name))
            {
                return Err(SolfaError::InvalidTable(format!(
                    "syllable '{}' appears twice",
                    entry.name
                )));
            }
        }
        if do_pitch as i32 + SEMITONES_PER_OCTAVE - 1 > MAX_MIDI_PITCH {
            return Err(SolfaError::InvalidTable(format!(
                "do pitch {do_pitch} leaves no room for a full octave"
            )));
        }
        Ok(Self {
            do_pitch,
            syllables,
        })
    }

    /// The pitch of `do`, which is the base of every other syllable.
    pub fn do_pitch(&self) -> u8 {
        self.do_pitch
    }

    /// Looks up a syllable's base pitch. Names match case-insensitively, so
    /// "Sol" and "sol" are the same syllable.
    pub fn pitch_of(&self, name: &str) -> Result<u8> {
        let name = name.trim();
        self.syllables
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(|entry| self.do_pitch + entry.offset)
            .ok_or_else(|| SolfaError::UnknownSyllable(name.to_string()))
    }

    /// Looks up every name in `names`, failing on the first unknown one.
    pub fn pitches_of<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<u8>> {
        names.iter().map(|name| self.pitch_of(name.as_ref())).collect()
    }

    /// Returns the syllable for a pitch, in any octave.
    pub fn syllable_of(&self, pitch: u8) -> &str {
        let offset = (pitch as i32 - self.do_pitch as i32).rem_euclid(SEMITONES_PER_OCTAVE) as u8;
        self.syllables
            .iter()
            .find(|entry| entry.offset == offset)
            .map(|entry| entry.name.as_str())
            // new_with() guarantees every offset has a name
            .unwrap_or_default()
    }

    /// The syllable names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.syllables.iter().map(|entry| entry.name.as_str())
    }
}

/// One row of a [KeyTable].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyEntry {
    /// The key's name, such as "F#" or "Bb".
    pub name: String,
    /// Semitones to transpose from C, -6..=6.
    pub offset: i8,
}

/// Maps key names, including enharmonic spellings, to transpositions from C.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<KeyEntry>", into = "Vec<KeyEntry>")]
pub struct KeyTable(Vec<KeyEntry>);
impl Default for KeyTable {
    fn default() -> Self {
        Self(
            [
                ("C", 0),
                ("C#", 1),
                ("Db", 1),
                ("D", 2),
                ("D#", 3),
                ("Eb", 3),
                ("E", 4),
                ("F", 5),
                ("F#", 6),
                ("Gb", -6),
                ("G", -5),
                ("G#", -4),
                ("Ab", -4),
                ("A", -3),
                ("A#", -2),
                ("Bb", -2),
                ("B", -1),
            ]
            .iter()
            .map(|(name, offset)| KeyEntry {
                name: name.to_string(),
                offset: *offset,
            })
            .collect(),
        )
    }
}
impl TryFrom<Vec<KeyEntry>> for KeyTable {
    type Error = SolfaError;

    fn try_from(value: Vec<KeyEntry>) -> Result<Self> {
        Self::new_with(value)
    }
}
impl From<KeyTable> for Vec<KeyEntry> {
    fn from(value: KeyTable) -> Self {
        value.0
    }
}
impl KeyTable {
    /// The largest transposition in either direction.
    pub const MAX_OFFSET: i8 = 6;

    /// Builds a table, checking that names are unique and offsets are within a
    /// tritone of C.
    pub fn new_with(entries: Vec<KeyEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(SolfaError::InvalidTable("key table is empty".into()));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entry.offset.abs() > Self::MAX_OFFSET {
                return Err(SolfaError::InvalidTable(format!(
                    "key '{}' has offset {}, outside -6..=6",
                    entry.name, entry.offset
                )));
            }
            if entries[..i].iter().any(|other| other.name == entry.name) {
                return Err(SolfaError::InvalidTable(format!(
                    "key '{}' appears twice",
                    entry.name
                )));
            }
        }
        Ok(Self(entries))
    }

    /// Returns the transposition for `name`. Key names are case-sensitive
    /// because "B" and "b" read differently to musicians.
    pub fn offset_of(&self, name: &str) -> Result<i8> {
        let name = name.trim();
        self.0
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.offset)
            .ok_or_else(|| SolfaError::UnknownKey(name.to_string()))
    }

    /// The key names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.name.as_str())
    }
}

/// One row of a [ModeTable].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModeEntry {
    /// The mode's name, such as "Dorian".
    pub name: String,
    /// Ascending pitches of the mode starting on C.
    pub pitches: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawModeTable {
    modes: Vec<ModeEntry>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

/// Reference pitches for each supported mode, all rooted on C.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawModeTable")]
pub struct ModeTable {
    modes: Vec<ModeEntry>,
    aliases: BTreeMap<String, String>,
}
impl Default for ModeTable {
    fn default() -> Self {
        let modes: [(&str, &[u8]); 15] = [
            ("Ionian", &[60, 62, 64, 65, 67, 69, 71]),
            ("Dorian", &[60, 62, 63, 65, 67, 69, 70]),
            ("Phrygian", &[60, 61, 63, 65, 67, 68, 70]),
            ("Lydian", &[60, 62, 64, 66, 67, 69, 71]),
            ("Mixolydian", &[60, 62, 64, 65, 67, 69, 70]),
            ("Aeolian", &[60, 62, 63, 65, 67, 68, 70]),
            ("Locrian", &[60, 61, 63, 65, 66, 68, 70]),
            ("Melodic Minor", &[60, 62, 63, 65, 67, 69, 71]),
            ("Dorian b2", &[60, 61, 63, 65, 67, 69, 71]),
            ("Lydian Augmented", &[60, 62, 64, 66, 68, 69, 71]),
            ("Lydian Dominant", &[60, 62, 64, 66, 67, 69, 70]),
            ("Mixolydian b6", &[60, 62, 64, 65, 67, 68, 70]),
            ("Locrian #2", &[60, 62, 63, 65, 66, 68, 70]),
            ("Altered Scale", &[60, 61, 63, 64, 66, 68, 70]),
            (
                "Chromatic",
                &[60, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 71],
            ),
        ];
        let aliases = [
            ("Major", "Ionian"),
            ("Minor", "Aeolian"),
            ("Altered", "Altered Scale"),
        ];
        Self {
            modes: modes
                .iter()
                .map(|(name, pitches)| ModeEntry {
                    name: name.to_string(),
                    pitches: pitches.to_vec(),
                })
                .collect(),
            aliases: aliases
                .iter()
                .map(|(alias, name)| (alias.to_string(), name.to_string()))
                .collect(),
        }
    }
}
impl TryFrom<RawModeTable> for ModeTable {
    type Error = SolfaError;

    fn try_from(value: RawModeTable) -> Result<Self> {
        Self::new_with(value.modes, value.aliases)
    }
}
impl ModeTable {
    /// Builds a table. Every mode must have 7 or 12 strictly ascending pitches
    /// spanning less than an octave, and every alias must name a real mode.
    pub fn new_with(modes: Vec<ModeEntry>, aliases: BTreeMap<String, String>) -> Result<Self> {
        for (i, mode) in modes.iter().enumerate() {
            if mode.pitches.len() != 7 && mode.pitches.len() != 12 {
                return Err(SolfaError::InvalidTable(format!(
                    "mode '{}' has {} pitches; expected 7 or 12",
                    mode.name,
                    mode.pitches.len()
                )));
            }
            if !mode.pitches.windows(2).all(|w| w[0] < w[1]) {
                return Err(SolfaError::InvalidTable(format!(
                    "mode '{}' pitches aren't strictly ascending",
                    mode.name
                )));
            }
            let span = *mode.pitches.last().unwrap_or(&0) as i32 - mode.pitches[0] as i32;
            if span >= SEMITONES_PER_OCTAVE {
                return Err(SolfaError::InvalidTable(format!(
                    "mode '{}' spans more than an octave",
                    mode.name
                )));
            }
            if modes[..i].iter().any(|other| other.name == mode.name) {
                return Err(SolfaError::InvalidTable(format!(
                    "mode '{}' appears twice",
                    mode.name
                )));
            }
        }
        for (alias, target) in aliases.iter() {
            if !modes.iter().any(|mode| &mode.name == target) {
                return Err(SolfaError::InvalidTable(format!(
                    "alias '{alias}' points to missing mode '{target}'"
                )));
            }
        }
        Ok(Self { modes, aliases })
    }

    /// Finds a mode by its name or one of its aliases. Matching ignores ASCII
    /// case.
    pub fn mode(&self, name: &str) -> Result<&ModeEntry> {
        let name = name.trim();
        let canonical = self
            .aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, target)| target.as_str())
            .unwrap_or(name);
        self.modes
            .iter()
            .find(|mode| mode.name.eq_ignore_ascii_case(canonical))
            .ok_or_else(|| SolfaError::UnknownMode(name.to_string()))
    }

    /// The reference pitches of a mode.
    pub fn pitches(&self, name: &str) -> Result<&[u8]> {
        self.mode(name).map(|mode| mode.pitches.as_slice())
    }

    /// The syllables that spell a mode, in ascending order.
    pub fn syllables(&self, name: &str, syllables: &SyllableTable) -> Result<Vec<String>> {
        Ok(self
            .pitches(name)?
            .iter()
            .map(|pitch| syllables.syllable_of(*pitch).to_string())
            .collect())
    }

    /// The canonical mode names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(|mode| mode.name.as_str())
    }
}

/// All the tables needed to generate and score exercises.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TheoryTables {
    /// Syllable-to-pitch mapping.
    #[serde(default)]
    pub syllables: SyllableTable,
    /// Key-to-transposition mapping.
    #[serde(default)]
    pub keys: KeyTable,
    /// Mode-to-pitches mapping.
    #[serde(default)]
    pub modes: ModeTable,
}
