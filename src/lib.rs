// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Solfa generates randomized solfege ear-training exercises and checks the
//! answers.
//!
//! An exercise starts from [ExerciseSettings](exercise::ExerciseSettings),
//! either built by hand or drawn from a [Difficulty](theory::Difficulty)
//! preset. [Exercise::generate()] picks the test notes and the
//! [ReferenceCadence](theory::ReferenceCadence) that establishes the key.
//! [Performance](exercise::Performance) turns the exercise into timed MIDI
//! events. While the learner listens and answers, a [Session] keeps the clock
//! and collects guesses, and [Exercise::score()] or [Session::score()] grades
//! them.
//!
//! All the musical data (syllables, keys, modes, and presets) lives in
//! [TheoryTables] and [Settings](util::Settings), which load from JSON.

/// A collection of imports that are useful to users of this crate. `use
/// solfa::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        error::SolfaError, exercise::prelude::*, session::prelude::*, theory::prelude::*,
        util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    error::{Result, SolfaError},
    exercise::Exercise,
    session::Session,
    theory::TheoryTables,
    version::app_version,
};

pub mod error;
pub mod exercise;
pub mod session;
pub mod theory;
pub mod util;

mod version;
