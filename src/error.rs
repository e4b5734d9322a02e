// Copyright (c) 2024 Mike Tsao

//! The errors that the library reports.

use thiserror::Error;

/// Everything that can go wrong while building tables, generating an exercise,
/// scoring guesses, or running a session.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolfaError {
    /// A syllable name isn't in the syllable table.
    #[error("unknown syllable '{0}'")]
    UnknownSyllable(String),

    /// A key name isn't in the key table.
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    /// A mode name isn't in the mode table (or its aliases).
    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    /// The caller asked for a sequence built from no syllables at all.
    #[error("the syllable set is empty")]
    EmptySyllableSet,

    /// Exercises need at least one note, and no more than
    /// [MAX_NOTE_COUNT](crate::exercise::MAX_NOTE_COUNT).
    #[error("note count must be 1..={max} (got {0})", max = crate::exercise::MAX_NOTE_COUNT)]
    InvalidNoteCount(usize),

    /// Octave bands are 1-indexed, so there must be at least one.
    #[error("octave range must be at least 1 (got {0})")]
    InvalidOctaveRange(usize),

    /// The requested octave range and key would place notes outside the MIDI
    /// note range.
    #[error("pitch {pitch} would fall outside the MIDI note range 0..=127")]
    PitchOutOfRange {
        #[allow(missing_docs)]
        pitch: i32,
    },

    /// No two adjacent notes may repeat, which needs at least two distinct
    /// pitches once the sequence is longer than one note.
    #[error("{count} notes need at least two distinct pitches, but only {distinct} available")]
    RepeatUnsatisfiable {
        #[allow(missing_docs)]
        distinct: usize,
        #[allow(missing_docs)]
        count: usize,
    },

    /// Scoring compares sequences note by note and never truncates.
    #[error("expected {expected} notes but got {actual}")]
    LengthMismatch {
        #[allow(missing_docs)]
        expected: usize,
        #[allow(missing_docs)]
        actual: usize,
    },

    /// A table supplied from configuration broke one of its invariants.
    #[error("invalid table: {0}")]
    InvalidTable(String),

    /// Performance timing can't be played: a duration is negative or not a
    /// number, or a velocity is outside 1..=127.
    #[error("invalid performance timing: {0}")]
    InvalidTiming(String),

    /// A preset has an empty option list.
    #[error("preset '{0}' has no options for {1}")]
    EmptyPreset(String, &'static str),

    /// [crate::session::Session::start()] was called on a running session.
    #[error("the session is already running")]
    SessionAlreadyRunning,

    /// Something went wrong inside the session clock. The session has stopped.
    #[error("session clock failed: {0}")]
    ClockFailed(String),

    /// A session observer panicked while handling a notification.
    #[error("session observer failed: {0}")]
    ObserverFailed(String),

    /// A thread panicked while holding the session state.
    #[error("session state is poisoned")]
    SessionPoisoned,
}

/// Shorthand for results carrying a [SolfaError].
pub type Result<T> = core::result::Result<T, SolfaError>;
