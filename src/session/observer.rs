// Copyright (c) 2024 Mike Tsao

use super::SessionSnapshot;
use crate::error::SolfaError;
use std::sync::Mutex;

/// Receives a [SessionSnapshot] after every change to a session. This is the
/// only way a session talks to the outside world, so it's where a front end
/// hooks in to redraw its clock and guess list.
///
/// Notifications arrive on whichever thread made the change: the session's
/// clock thread for ticks, the caller's thread for everything else. Two
/// threads can race, so a snapshot may arrive after a newer one. Compare
/// [SessionSnapshot::revision] and ignore anything older than what's already
/// been seen.
pub trait SessionObserver: Send + Sync {
    /// The session changed. `snapshot` is its state just after the change.
    fn changed(&self, snapshot: &SessionSnapshot);

    /// The session's clock failed and the session has returned to idle.
    fn failed(&self, error: &SolfaError) {
        log::error!("session failed: {error}");
    }
}

/// Writes every notification to the log. The default observer.
#[derive(Debug, Default)]
pub struct LoggingObserver {}
impl SessionObserver for LoggingObserver {
    fn changed(&self, snapshot: &SessionSnapshot) {
        log::trace!(
            "elapsed {:.2}s, guesses {:?}",
            snapshot.elapsed_time,
            snapshot.guesses
        );
    }
}

/// Keeps every notification, for inspection after the fact. Snapshots that
/// arrive after a newer one are dropped, so [RecordingObserver::snapshots()]
/// is always in revision order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    snapshots: Mutex<Vec<SessionSnapshot>>,
    failures: Mutex<Vec<SolfaError>>,
}
impl RecordingObserver {
    /// All snapshots received so far, oldest first.
    pub fn snapshots(&self) -> Vec<SessionSnapshot> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// All failures received so far.
    pub fn failures(&self) -> Vec<SolfaError> {
        self.failures.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<SessionSnapshot> {
        self.snapshots.lock().ok().and_then(|s| s.last().cloned())
    }
}
impl SessionObserver for RecordingObserver {
    fn changed(&self, snapshot: &SessionSnapshot) {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            if snapshots
                .last()
                .is_some_and(|last| last.revision > snapshot.revision)
            {
                log::trace!("dropping stale snapshot {}", snapshot.revision);
                return;
            }
            snapshots.push(snapshot.clone());
        }
    }

    fn failed(&self, error: &SolfaError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(error.clone());
        }
    }
}
