// Copyright (c) 2024 Mike Tsao

use super::Exercise;
use crate::{
    error::Result,
    util::{MidiUtils, PerformanceTiming},
};
use midly::{
    num::{u15, u24, u28, u4},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use std::path::Path;

/// A MIDI message and the time it should be sent, in seconds from the start
/// of the performance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledMidi {
    /// Seconds from the start.
    pub at: f64,
    #[allow(missing_docs)]
    pub message: MidiMessage,
}

/// The timed MIDI events that present an exercise: the cadence chords, a
/// pause, then the test notes one at a time.
///
/// Nothing here talks to a device. A player walks [Performance::events()] in
/// order, or [Performance::to_smf_bytes()] hands the whole thing to any MIDI
/// file player.
#[derive(Clone, Debug, PartialEq)]
pub struct Performance {
    events: Vec<ScheduledMidi>,
    duration: f64,
}
impl Performance {
    /// Resolution of exported files.
    pub const TICKS_PER_QUARTER: u16 = 480;
    /// 120 BPM.
    pub const MICROSECONDS_PER_QUARTER: u32 = 500_000;

    /// Schedules `exercise`. Fails if `timing` doesn't pass
    /// [PerformanceTiming::check()].
    pub fn new_with(exercise: &Exercise, timing: &PerformanceTiming) -> Result<Self> {
        timing.check()?;
        let mut events = Vec::default();
        let mut now = 0.0;
        let velocity = timing.velocity;

        for chord in exercise.cadence().chords() {
            for note in chord {
                events.push(ScheduledMidi {
                    at: now,
                    message: MidiUtils::new_note_on(note, velocity),
                });
            }
            now += timing.chord_duration;
            for note in chord {
                events.push(ScheduledMidi {
                    at: now,
                    message: MidiUtils::new_note_off(note, velocity),
                });
            }
        }
        now += timing.space_between;
        for note in exercise.test().display() {
            events.push(ScheduledMidi {
                at: now,
                message: MidiUtils::new_note_on(*note, velocity),
            });
            now += timing.note_duration;
            events.push(ScheduledMidi {
                at: now,
                message: MidiUtils::new_note_off(*note, velocity),
            });
        }

        Ok(Self {
            events,
            duration: now,
        })
    }

    /// The events in the order they should be sent.
    pub fn events(&self) -> &[ScheduledMidi] {
        &self.events
    }

    /// Seconds from the first event to the last.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Renders the performance as a single-track Standard MIDI File.
    pub fn to_smf_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let ticks_per_second = Self::TICKS_PER_QUARTER as f64 * 1_000_000.0
            / Self::MICROSECONDS_PER_QUARTER as f64;

        let mut track = Vec::with_capacity(self.events.len() + 2);
        track.push(TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::from(
                Self::MICROSECONDS_PER_QUARTER,
            ))),
        });
        let mut last_tick = 0u32;
        for event in self.events.iter() {
            let tick = (event.at * ticks_per_second).round() as u32;
            track.push(TrackEvent {
                delta: u28::from(tick.saturating_sub(last_tick)),
                kind: TrackEventKind::Midi {
                    channel: u4::from(0),
                    message: event.message,
                },
            });
            last_tick = last_tick.max(tick);
        }
        track.push(TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });

        let smf = Smf {
            header: Header::new(
                Format::SingleTrack,
                Timing::Metrical(u15::from(Self::TICKS_PER_QUARTER)),
            ),
            tracks: vec![track],
        };
        let mut bytes = Vec::default();
        smf.write_std(&mut bytes)?;
        Ok(bytes)
    }

    /// Writes the performance to a `.mid` file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_smf_bytes()?)?;
        log::info!("wrote {} MIDI events to {}", self.events.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{exercise::ExerciseSettingsBuilder, theory::TheoryTables, util::Rng};
    use float_cmp::approx_eq;

    fn exercise(count: usize) -> Exercise {
        let settings = ExerciseSettingsBuilder::default()
            .syllables(&["do", "mi", "sol"])
            .note_count(count)
            .key("D")
            .build()
            .unwrap();
        Exercise::generate(&TheoryTables::default(), settings, &mut Rng::new_with_seed(4)).unwrap()
    }

    #[test]
    fn schedule_shape() {
        let exercise = exercise(4);
        let p = Performance::new_with(&exercise, &PerformanceTiming::default()).unwrap();

        // Two chords of three notes, plus four single notes, each on and off.
        assert_eq!(p.events().len(), 2 * 3 * 2 + 4 * 2);
        assert!(approx_eq!(f64, p.duration(), 2.0 + 2.0 + 1.0 + 4.0 * 0.5));
        assert!(p.events().windows(2).all(|w| w[0].at <= w[1].at));

        // Dominant first, all at once.
        for (event, note) in p.events()[..3].iter().zip(exercise.cadence().dominant) {
            assert_eq!(event.at, 0.0);
            assert_eq!(event.message, MidiUtils::new_note_on(note, 64));
        }

        // Test notes follow the pause in display order.
        let test_ons: Vec<(f64, u8)> = p
            .events()
            .iter()
            .skip(12)
            .filter(|e| matches!(e.message, MidiMessage::NoteOn { .. }))
            .map(|e| (e.at, MidiUtils::note_of(&e.message).unwrap()))
            .collect();
        assert_eq!(test_ons.len(), 4);
        for (i, ((at, note), expected)) in test_ons
            .iter()
            .zip(exercise.test().display())
            .enumerate()
        {
            assert!(approx_eq!(f64, *at, 5.0 + i as f64 * 0.5));
            assert_eq!(note, expected);
        }
    }

    #[test]
    fn smf_export_parses_back() {
        let exercise = exercise(3);
        let p = Performance::new_with(&exercise, &PerformanceTiming::default()).unwrap();
        let bytes = p.to_smf_bytes().unwrap();

        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 1);
        assert_eq!(
            smf.header.timing,
            Timing::Metrical(u15::from(Performance::TICKS_PER_QUARTER))
        );

        let mut tick = 0u32;
        let mut note_ons = Vec::default();
        for event in smf.tracks[0].iter() {
            tick += event.delta.as_int();
            if let TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, .. },
                ..
            } = event.kind
            {
                note_ons.push((tick, key.as_int()));
            }
        }
        assert_eq!(note_ons.len(), 3 + 3 + 3);
        // 960 ticks per second at 120 BPM: the tonic lands at 2s, the first
        // test note at 5s.
        assert_eq!(note_ons[3].0, 1920);
        assert_eq!(note_ons[6], (4800, exercise.test().display()[0]));
        assert!(matches!(
            smf.tracks[0].last().unwrap().kind,
            TrackEventKind::Meta(MetaMessage::EndOfTrack)
        ));
    }

    #[test]
    fn unplayable_timing_is_refused() {
        let timing = PerformanceTiming {
            velocity: 200,
            note_duration: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Performance::new_with(&exercise(2), &timing),
            Err(crate::error::SolfaError::InvalidTiming(_))
        ));
    }

    #[test]
    fn save_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exercise.mid");
        let p = Performance::new_with(&exercise(2), &PerformanceTiming::default()).unwrap();
        p.save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
    }
}
