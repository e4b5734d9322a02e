// Copyright (c) 2024 Mike Tsao

//! `solfa-drill` generates one ear-training exercise, optionally writes it to
//! a MIDI file, and scores any guesses given on the command line.

use anyhow::Context;
use clap::Parser;
use solfa::prelude::*;
use solfa::util::Settings;
use std::path::PathBuf;

/// The program's command-line arguments.
#[derive(clap::Parser, Debug)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Print version and exit
    #[clap(short = 'v', long, value_parser)]
    version: bool,

    /// How hard the exercise is (easy, medium, hard, impossible)
    #[clap(short, long, default_value = "easy")]
    difficulty: Difficulty,

    /// Which mode the notes are drawn from (e.g., Major, Minor, Dorian, Chromatic)
    #[clap(short, long, default_value = "Major")]
    mode: String,

    /// Use this key instead of one from the difficulty preset
    #[clap(short, long)]
    key: Option<String>,

    /// Use this many notes instead of the preset's choice
    #[clap(short, long)]
    notes: Option<usize>,

    /// Spread notes over this many octaves instead of the preset's choice
    #[clap(short, long)]
    octaves: Option<usize>,

    /// Seed the random-number generator for a repeatable exercise
    #[clap(long)]
    seed: Option<u128>,

    /// Load tables, presets, and timing from this JSON file
    #[clap(long)]
    settings: Option<PathBuf>,

    /// Write the cadence and test notes to this Standard MIDI File
    #[clap(long)]
    midi_out: Option<PathBuf>,

    /// Score these syllables against the exercise
    #[clap(short, long, num_args = 1..)]
    guess: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.version {
        eprintln!("{}", solfa::app_version());
        return Ok(());
    }

    let settings = match args.settings.as_ref() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let seed = match args.seed {
        Some(seed) => seed,
        None => Rng::generate_seed()?,
    };
    log::info!("seed {seed}");
    let mut rng = Rng::new_with_seed(seed);

    let mut exercise_settings = ExerciseSettings::from_preset(
        &settings.tables,
        &settings.presets,
        args.difficulty,
        &args.mode,
        args.key.as_deref(),
        &mut rng,
    )
    .with_context(|| format!("preparing a {} exercise in {}", args.difficulty, args.mode))?;
    if let Some(notes) = args.notes {
        exercise_settings.note_count = notes;
    }
    if let Some(octaves) = args.octaves {
        exercise_settings.octave_range = octaves;
    }

    let exercise = Exercise::generate(&settings.tables, exercise_settings, &mut rng)?;
    let cadence = exercise.cadence();
    println!("key:      {}", exercise.settings().key);
    println!("cadence:  {:?} -> {:?}", cadence.dominant, cadence.tonic);
    println!("sequence: {}", exercise.test());

    if let Some(path) = args.midi_out.as_ref() {
        Performance::new_with(&exercise, &settings.performance)?.save(path)?;
        println!("wrote {}", path.display());
    }

    if !args.guess.is_empty() {
        let score = exercise.score(&settings.tables, args.guess.as_slice())?;
        println!(
            "score:    {} ({} of {} correct, per note {:?})",
            score.overall(),
            score.correct_count(),
            exercise.test().len(),
            score.per_note_bits()
        );
        if !score.is_exact() {
            let answer: Vec<&str> = exercise
                .test()
                .ground_truth()
                .iter()
                .map(|pitch| settings.tables.syllables.syllable_of(*pitch))
                .collect();
            println!("answer:   {}", answer.join(" "));
        }
    }

    Ok(())
}
