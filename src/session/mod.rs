// Copyright (c) 2024 Mike Tsao

//! The live state of an exercise in progress: a running clock and the
//! learner's guesses so far.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Session, SessionObserver, SessionSnapshot, SessionStatus};
}

pub use observer::{LoggingObserver, RecordingObserver, SessionObserver};

mod observer;

use crate::{
    error::{Result, SolfaError},
    exercise::{score_guesses, Score, TestSequence},
    theory::TheoryTables,
};
use crossbeam::channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::JoinHandle,
    time::Duration,
};
use strum_macros::Display;

/// Whether a session's clock is running.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// The clock is stopped.
    #[default]
    Idle,
    /// The clock is ticking.
    Running,
}

/// A copy of a session's state at one moment, as delivered to a
/// [SessionObserver].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SessionSnapshot {
    /// Counts the changes made to the session. A snapshot with a lower
    /// revision than one already seen describes an older state.
    pub revision: u64,
    /// Seconds the clock has run.
    pub elapsed_time: f64,
    /// Guessed syllables, oldest first.
    pub guesses: Vec<String>,
    /// Whether the clock is running.
    pub is_running: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    revision: u64,
    ticks: u64,
    status: SessionStatus,
    guesses: Vec<String>,
}
impl SessionState {
    fn elapsed_time(&self) -> f64 {
        self.ticks as f64 / Session::TICKS_PER_SECOND as f64
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            revision: self.revision,
            elapsed_time: self.elapsed_time(),
            guesses: self.guesses.clone(),
            is_running: self.status == SessionStatus::Running,
        }
    }

    // Call after every mutation.
    fn changed(&mut self) -> SessionSnapshot {
        self.revision += 1;
        self.snapshot()
    }
}

struct Clock {
    quit: Sender<()>,
    handle: JoinHandle<()>,
}

/// Tracks elapsed time and guesses for one exercise.
///
/// [Session::start()] launches a clock thread that adds 1/60 second to the
/// elapsed time sixty times a second. [Session::stop()] waits for that thread
/// to exit, so no tick can land after it returns. The clock thread and the
/// guess methods take turns on the same lock.
///
/// Every change, including every tick, sends a [SessionSnapshot] to the
/// session's [SessionObserver]. Notifications happen outside the lock, so
/// the clock thread and the caller's thread can deliver them out of order;
/// [SessionSnapshot::revision] says which is newer. If the clock fails (for
/// example, because the observer panicked), the session goes idle and the
/// observer hears about it through [SessionObserver::failed()].
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    observer: Arc<dyn SessionObserver>,
    clock: Option<Clock>,
}
impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("observer", &"(skipped)")
            .field("has_clock", &self.clock.is_some())
            .finish()
    }
}
impl Default for Session {
    fn default() -> Self {
        Self::new_with(Arc::new(LoggingObserver::default()))
    }
}
impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("while dropping session: {e}");
        }
    }
}
impl Session {
    /// How often the clock ticks.
    pub const TICKS_PER_SECOND: u32 = 60;
    /// The time between ticks, which is also how much each tick adds.
    pub const TICK_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / 60);

    /// Creates an idle session that reports to `observer`.
    pub fn new_with(observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            state: Default::default(),
            observer,
            clock: None,
        }
    }

    /// Starts the clock. Fails if it's already running. If the observer panics
    /// on the start notification, the clock is stopped again and the session
    /// is idle when the error comes back.
    pub fn start(&mut self) -> Result<()> {
        // A clock that stopped itself after a failure still needs joining.
        self.join_clock()?;

        let snapshot = {
            let mut state = self.lock()?;
            if state.status == SessionStatus::Running {
                return Err(SolfaError::SessionAlreadyRunning);
            }
            state.status = SessionStatus::Running;
            state.changed()
        };

        let (quit, quit_receiver) = crossbeam::channel::bounded(1);
        let state = Arc::clone(&self.state);
        let observer = Arc::clone(&self.observer);
        let handle = std::thread::Builder::new()
            .name("solfa-session-clock".to_string())
            .spawn(move || Self::run_clock(state, observer, quit_receiver))
            .map_err(|e| {
                self.force_idle();
                SolfaError::ClockFailed(e.to_string())
            })?;
        self.clock = Some(Clock { quit, handle });
        log::debug!("session clock started");

        // An observer that can't handle the start shouldn't be left with a
        // clock it doesn't know about.
        if let Err(e) = Self::notify(&self.observer, &snapshot) {
            let _ = self.join_clock();
            self.force_idle();
            return Err(e);
        }
        Ok(())
    }

    /// Stops the clock and waits for its thread to finish. Does nothing if the
    /// clock isn't running.
    pub fn stop(&mut self) -> Result<()> {
        if self.clock.is_none() {
            return Ok(());
        }
        let joined = self.join_clock();
        let snapshot = {
            let mut state = self.lock()?;
            state.status = SessionStatus::Idle;
            state.changed()
        };
        log::debug!("session clock stopped at {:.2}s", snapshot.elapsed_time);
        joined?;
        Self::notify(&self.observer, &snapshot)
    }

    /// Stops the clock, then clears the elapsed time and guesses.
    pub fn reset(&mut self) -> Result<()> {
        self.stop()?;
        let snapshot = {
            let mut state = self.lock()?;
            state.ticks = 0;
            state.guesses.clear();
            state.changed()
        };
        Self::notify(&self.observer, &snapshot)
    }

    /// Appends a guess. Guesses are accepted whether or not the clock is
    /// running.
    pub fn add_guess(&self, syllable: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.lock()?;
            state.guesses.push(syllable.to_string());
            state.changed()
        };
        Self::notify(&self.observer, &snapshot)
    }

    /// Removes the most recent guess, if there is one. Notifies the observer
    /// either way.
    pub fn remove_last_guess(&self) -> Result<()> {
        let snapshot = {
            let mut state = self.lock()?;
            if state.guesses.pop().is_some() {
                state.changed()
            } else {
                state.snapshot()
            }
        };
        Self::notify(&self.observer, &snapshot)
    }

    /// Scores the guesses so far against `test`.
    pub fn score(&self, tables: &TheoryTables, test: &TestSequence) -> Result<Score> {
        let guesses = self.lock()?.guesses.clone();
        score_guesses(tables, test, &guesses[..])
    }

    /// The current state.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    /// Seconds the clock has run.
    pub fn elapsed_time(&self) -> Result<f64> {
        Ok(self.lock()?.elapsed_time())
    }

    /// The guesses so far, oldest first.
    pub fn guesses(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.guesses.clone())
    }

    /// Whether the clock is running.
    pub fn status(&self) -> SessionStatus {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    /// Whether the clock is running.
    pub fn is_running(&self) -> bool {
        self.status() == SessionStatus::Running
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>> {
        self.state.lock().map_err(|_| SolfaError::SessionPoisoned)
    }

    fn force_idle(&self) {
        Self::force_idle_state(&self.state);
    }

    fn force_idle_state(state: &Mutex<SessionState>) {
        state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .status = SessionStatus::Idle;
    }

    fn join_clock(&mut self) -> Result<()> {
        let Some(clock) = self.clock.take() else {
            return Ok(());
        };
        // The clock may already have exited on its own, in which case nobody
        // is listening and that's fine.
        let _ = clock.quit.send(());
        clock.handle.join().map_err(|e| {
            self.force_idle();
            SolfaError::ClockFailed(panic_message(e.as_ref()))
        })
    }

    fn run_clock(
        state: Arc<Mutex<SessionState>>,
        observer: Arc<dyn SessionObserver>,
        quit: Receiver<()>,
    ) {
        let ticker = crossbeam::channel::tick(Self::TICK_PERIOD);
        loop {
            crossbeam::select! {
                recv(quit) -> _ => break,
                recv(ticker) -> _ => {
                    if let Err(e) = Self::tick(&state, &observer) {
                        log::error!("session clock stopping: {e}");
                        Self::force_idle_state(&state);
                        if std::panic::catch_unwind(AssertUnwindSafe(|| observer.failed(&e))).is_err() {
                            log::error!("session observer panicked while handling a failure");
                        }
                        break;
                    }
                }
            }
        }
    }

    fn tick(state: &Mutex<SessionState>, observer: &Arc<dyn SessionObserver>) -> Result<()> {
        let snapshot = {
            let mut state = state.lock().map_err(|_| SolfaError::SessionPoisoned)?;
            state.ticks += 1;
            state.changed()
        };
        Self::notify(observer, &snapshot)
    }

    fn notify(observer: &Arc<dyn SessionObserver>, snapshot: &SessionSnapshot) -> Result<()> {
        std::panic::catch_unwind(AssertUnwindSafe(|| observer.changed(snapshot)))
            .map_err(|e| SolfaError::ObserverFailed(panic_message(e.as_ref())))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{exercise::generate_test_sequence, util::Rng};
    use float_cmp::approx_eq;
    use more_asserts::{assert_ge, assert_gt, assert_lt};
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        time::Instant,
    };

    fn recorded_session() -> (Session, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let session = Session::new_with(Arc::clone(&observer) as Arc<dyn SessionObserver>);
        (session, observer)
    }

    #[test]
    fn clock_runs_between_start_and_stop() {
        let (mut session, observer) = recorded_session();
        assert_eq!(session.status(), SessionStatus::Idle);

        session.start().unwrap();
        assert!(session.is_running());
        std::thread::sleep(Duration::from_millis(200));
        session.stop().unwrap();
        assert!(!session.is_running());

        let elapsed = session.elapsed_time().unwrap();
        assert_gt!(elapsed, 0.0);
        let snapshot_count = observer.snapshots().len();

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(session.elapsed_time().unwrap(), elapsed, "no ticks after stop()");
        assert_eq!(observer.snapshots().len(), snapshot_count);

        let last = observer.last().unwrap();
        assert!(!last.is_running);
        assert_eq!(last.elapsed_time, elapsed);
    }

    #[test]
    fn immediate_stop_is_small() {
        let (mut session, observer) = recorded_session();
        session.start().unwrap();
        session.stop().unwrap();
        let elapsed = session.elapsed_time().unwrap();
        assert_ge!(elapsed, 0.0);
        assert_lt!(elapsed, 1.0);

        let count = observer.snapshots().len();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(session.elapsed_time().unwrap(), elapsed);
        assert_eq!(observer.snapshots().len(), count);
    }

    #[test]
    fn each_tick_adds_one_sixtieth() {
        let (mut session, observer) = recorded_session();
        session.start().unwrap();
        std::thread::sleep(Duration::from_millis(150));
        session.stop().unwrap();

        let ticks: Vec<f64> = observer
            .snapshots()
            .iter()
            .filter(|s| s.is_running && s.elapsed_time > 0.0)
            .map(|s| s.elapsed_time)
            .collect();
        assert!(!ticks.is_empty());
        assert!(approx_eq!(f64, ticks[0], 1.0 / 60.0, ulps = 4));
        for pair in ticks.windows(2) {
            assert!(approx_eq!(f64, pair[1] - pair[0], 1.0 / 60.0, epsilon = 1e-9));
        }
    }

    #[test]
    fn start_twice_fails_and_stop_twice_is_harmless() {
        let (mut session, _) = recorded_session();
        session.stop().unwrap();
        session.start().unwrap();
        assert_eq!(session.start(), Err(SolfaError::SessionAlreadyRunning));
        assert!(session.is_running());
        session.stop().unwrap();
        session.stop().unwrap();
        assert!(!session.is_running());
    }

    #[test]
    fn every_change_bumps_the_revision() {
        let (mut session, observer) = recorded_session();
        session.add_guess("do").unwrap();
        session.remove_last_guess().unwrap();
        session.remove_last_guess().unwrap();
        session.start().unwrap();
        session.stop().unwrap();
        let revisions: Vec<u64> = observer.snapshots().iter().map(|s| s.revision).collect();
        assert_eq!(&revisions[..3], &[1, 2, 2], "an empty removal changes nothing");
        assert!(revisions.windows(2).skip(2).all(|w| w[0] < w[1]));
        assert_eq!(
            session.snapshot().unwrap().revision,
            *revisions.last().unwrap()
        );
    }

    // Holds up delivery of the first tick so that a foreground change can
    // overtake it.
    #[derive(Default)]
    struct SlowFirstTick {
        recorder: RecordingObserver,
        delivered: Mutex<Vec<u64>>,
        stalling: AtomicBool,
        stalled: AtomicBool,
    }
    impl SessionObserver for SlowFirstTick {
        fn changed(&self, snapshot: &SessionSnapshot) {
            if snapshot.is_running
                && snapshot.elapsed_time > 0.0
                && !self.stalled.swap(true, Ordering::SeqCst)
            {
                self.stalling.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(100));
            }
            self.delivered.lock().unwrap().push(snapshot.revision);
            self.recorder.changed(snapshot);
        }
    }

    #[test]
    fn overtaken_snapshots_are_recognizably_stale() {
        let observer = Arc::new(SlowFirstTick::default());
        let mut session = Session::new_with(Arc::clone(&observer) as Arc<dyn SessionObserver>);
        session.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !observer.stalling.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(observer.stalling.load(Ordering::SeqCst));
        session.add_guess("do").unwrap();
        std::thread::sleep(Duration::from_millis(200));
        session.stop().unwrap();

        // The guess was delivered before the tick that preceded it.
        let delivered = observer.delivered.lock().unwrap().clone();
        assert!(delivered.windows(2).any(|w| w[0] > w[1]), "{delivered:?}");

        // Honoring revisions keeps the guess from being forgotten.
        let snapshots = observer.recorder.snapshots();
        assert!(snapshots.windows(2).all(|w| w[0].revision <= w[1].revision));
        let first_with_guess = snapshots
            .iter()
            .position(|s| s.guesses == vec!["do"])
            .unwrap();
        assert!(snapshots[first_with_guess..]
            .iter()
            .all(|s| s.guesses == vec!["do"]));
        assert_eq!(observer.recorder.last().unwrap().guesses, vec!["do"]);
    }

    #[test]
    fn guesses_come_and_go() {
        let (session, observer) = recorded_session();
        session.add_guess("do").unwrap();
        session.add_guess("mi").unwrap();
        session.add_guess("sol").unwrap();
        session.remove_last_guess().unwrap();
        assert_eq!(session.guesses().unwrap(), vec!["do", "mi"]);

        let snapshots = observer.snapshots();
        assert_eq!(snapshots.len(), 4);
        assert_eq!(snapshots[2].guesses, vec!["do", "mi", "sol"]);
        assert_eq!(snapshots[3].guesses, vec!["do", "mi"]);
    }

    #[test]
    fn removing_from_empty_still_notifies() {
        let (session, observer) = recorded_session();
        session.remove_last_guess().unwrap();
        assert!(session.guesses().unwrap().is_empty());
        assert_eq!(session.snapshot().unwrap(), SessionSnapshot::default());
        assert_eq!(observer.snapshots(), vec![SessionSnapshot::default()]);
    }

    #[test]
    fn guesses_during_a_running_clock() {
        let (mut session, observer) = recorded_session();
        session.start().unwrap();
        for syllable in ["re", "fa", "la"] {
            session.add_guess(syllable).unwrap();
            std::thread::sleep(Duration::from_millis(20));
        }
        session.remove_last_guess().unwrap();
        session.stop().unwrap();
        assert_eq!(observer.last().unwrap().guesses, vec!["re", "fa"]);
    }

    #[test]
    fn reset_clears_everything() {
        let (mut session, observer) = recorded_session();
        session.start().unwrap();
        session.add_guess("ti").unwrap();
        std::thread::sleep(Duration::from_millis(50));
        session.reset().unwrap();
        let snapshot = session.snapshot().unwrap();
        assert_eq!(snapshot.elapsed_time, 0.0);
        assert!(snapshot.guesses.is_empty());
        assert!(!snapshot.is_running);
        assert_eq!(observer.last().unwrap(), snapshot);

        // And it can run again.
        session.start().unwrap();
        session.stop().unwrap();
    }

    #[test]
    fn scoring_buffered_guesses() {
        let tables = TheoryTables::default();
        let test = generate_test_sequence(
            &tables,
            3,
            &["do", "re", "mi"],
            2,
            "A",
            &mut Rng::new_with_seed(21),
        )
        .unwrap();
        let session = Session::default();
        for pitch in test.ground_truth() {
            session.add_guess(tables.syllables.syllable_of(*pitch)).unwrap();
        }
        assert!(session.score(&tables, &test).unwrap().is_exact());

        session.remove_last_guess().unwrap();
        assert_eq!(
            session.score(&tables, &test),
            Err(SolfaError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    // Panics on the first tick only.
    #[derive(Default)]
    struct PanicsOnTick {
        exploded: AtomicBool,
        failures: Mutex<Vec<SolfaError>>,
    }
    impl SessionObserver for PanicsOnTick {
        fn changed(&self, snapshot: &SessionSnapshot) {
            if snapshot.is_running
                && snapshot.elapsed_time > 0.0
                && !self.exploded.swap(true, Ordering::SeqCst)
            {
                panic!("observer exploded");
            }
        }

        fn failed(&self, error: &SolfaError) {
            self.failures.lock().unwrap().push(error.clone());
        }
    }

    #[test]
    fn failing_tick_goes_idle_and_reports() {
        let observer = Arc::new(PanicsOnTick::default());
        let mut session = Session::new_with(Arc::clone(&observer) as Arc<dyn SessionObserver>);
        session.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while session.is_running() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!session.is_running());

        let failures = observer.failures.lock().unwrap().clone();
        assert_eq!(
            failures,
            vec![SolfaError::ObserverFailed("observer exploded".to_string())]
        );

        // The foreground is unaffected, and the session can be restarted.
        session.add_guess("do").unwrap();
        session.stop().unwrap();
        assert_eq!(session.guesses().unwrap(), vec!["do"]);
        session.start().unwrap();
        assert!(session.is_running());
    }

    struct PanicsOnStart {}
    impl SessionObserver for PanicsOnStart {
        fn changed(&self, snapshot: &SessionSnapshot) {
            if snapshot.is_running && snapshot.elapsed_time == 0.0 {
                panic!("not ready");
            }
        }
    }

    #[test]
    fn failed_start_leaves_the_clock_stopped() {
        let mut session = Session::new_with(Arc::new(PanicsOnStart {}));
        assert_eq!(
            session.start(),
            Err(SolfaError::ObserverFailed("not ready".to_string()))
        );
        assert!(!session.is_running());
        let elapsed = session.elapsed_time().unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(session.elapsed_time().unwrap(), elapsed);
    }

    #[test]
    fn dropping_a_running_session_stops_the_clock() {
        let observer = Arc::new(RecordingObserver::default());
        {
            let mut session = Session::new_with(Arc::clone(&observer) as Arc<dyn SessionObserver>);
            session.start().unwrap();
            std::thread::sleep(Duration::from_millis(30));
        }
        let count = observer.snapshots().len();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(observer.snapshots().len(), count);
        assert!(!observer.last().unwrap().is_running);
    }
}
