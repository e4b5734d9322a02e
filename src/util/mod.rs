// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::rng::{RandomSource, Rng};
}

pub use midi::MidiUtils;
pub use rng::{RandomSource, Rng, ScriptedRandom};
pub use settings::{PerformanceTiming, Settings};

mod midi;
mod rng;
mod settings;
