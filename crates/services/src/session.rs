// Copyright (c) 2024 Mike Tsao

use crate::{ProvidesService, ServiceChannels};
use crossbeam::channel::{Receiver, Sender};
use solfa::{
    exercise::{Score, TestSequence},
    session::{SessionObserver, SessionSnapshot},
    Session, SolfaError, TheoryTables,
};
use std::sync::{Arc, Mutex, PoisonError};

/// A [SessionServiceInput] tells [SessionService] what to do.
#[derive(Debug)]
pub enum SessionServiceInput {
    /// Starts the session clock.
    Start,
    /// Stops the session clock.
    Stop,
    /// Stops the clock and clears elapsed time and guesses.
    Reset,
    /// Appends a guessed syllable.
    AddGuess(String),
    /// Removes the most recent guess.
    RemoveLastGuess,
    /// Scores the guesses so far against the given test.
    Score(TestSequence),
    /// Asks the service to exit.
    Quit,
}

/// A [SessionServiceEvent] informs clients what's going on.
#[derive(Debug)]
pub enum SessionServiceEvent {
    /// The session changed, either because the clock ticked or because of an
    /// input.
    Changed(SessionSnapshot),
    /// An input failed, or the clock failed and the session is now idle.
    Failed(String),
    /// The result of [SessionServiceInput::Score].
    Scored(Score),
    /// [SessionServiceInput::Score] couldn't produce a score.
    ScoreFailed(String),
    /// The service has exited.
    Quit,
}

/// Forwards session notifications to a channel as [SessionServiceEvent]s.
/// Snapshots older than one already sent are dropped, so
/// [SessionServiceEvent::Changed] events arrive in revision order.
#[derive(Debug)]
pub struct ChannelObserver {
    sender: Sender<SessionServiceEvent>,
    last_revision: Mutex<Option<u64>>,
}
impl ChannelObserver {
    #[allow(missing_docs)]
    pub fn new_with(sender: Sender<SessionServiceEvent>) -> Self {
        Self {
            sender,
            last_revision: Default::default(),
        }
    }
}
impl SessionObserver for ChannelObserver {
    fn changed(&self, snapshot: &SessionSnapshot) {
        // Held across the send so that the check and the send can't be split.
        let mut last_revision = self
            .last_revision
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last_revision.is_some_and(|last| last > snapshot.revision) {
            log::trace!("dropping stale snapshot {}", snapshot.revision);
            return;
        }
        *last_revision = Some(snapshot.revision);

        // Nobody listening is fine; the daemon will notice soon enough.
        let _ = self
            .sender
            .send(SessionServiceEvent::Changed(snapshot.clone()));
    }

    fn failed(&self, error: &SolfaError) {
        log::error!("session failed: {error}");
        let _ = self.sender.send(SessionServiceEvent::Failed(error.to_string()));
    }
}

/// A wrapper around a [Session] that provides a channel-based interface to it.
#[derive(Debug)]
pub struct SessionService {
    channels: ServiceChannels<SessionServiceInput, SessionServiceEvent>,
}
impl ProvidesService<SessionServiceInput, SessionServiceEvent> for SessionService {
    fn sender(&self) -> &Sender<SessionServiceInput> {
        self.channels.input_sender()
    }

    fn receiver(&self) -> &Receiver<SessionServiceEvent> {
        self.channels.event_receiver()
    }
}
impl SessionService {
    /// Creates the service and its daemon thread. `tables` are used to turn
    /// guessed syllables into pitches when scoring.
    pub fn new_with(tables: TheoryTables) -> Self {
        let r = Self {
            channels: Default::default(),
        };
        r.spawn_thread(tables);
        r
    }

    fn spawn_thread(&self, tables: TheoryTables) {
        let (receiver, sender) = self.channels.daemon_ends();
        std::thread::spawn(move || {
            let mut daemon = SessionServiceDaemon::new_with(receiver, sender, tables);
            daemon.execute();
        });
    }
}
impl Default for SessionService {
    fn default() -> Self {
        Self::new_with(TheoryTables::default())
    }
}

struct SessionServiceDaemon {
    receiver: Receiver<SessionServiceInput>,
    sender: Sender<SessionServiceEvent>,
    tables: TheoryTables,

    session: Session,
}
impl SessionServiceDaemon {
    fn new_with(
        receiver: Receiver<SessionServiceInput>,
        sender: Sender<SessionServiceEvent>,
        tables: TheoryTables,
    ) -> Self {
        let observer = Arc::new(ChannelObserver::new_with(sender.clone()));
        Self {
            receiver,
            sender,
            tables,
            session: Session::new_with(observer),
        }
    }

    fn report(&self, result: solfa::Result<()>) {
        if let Err(e) = result {
            log::warn!("session input failed: {e}");
            let _ = self.sender.send(SessionServiceEvent::Failed(e.to_string()));
        }
    }

    fn execute(&mut self) {
        while let Ok(input) = self.receiver.recv() {
            match input {
                SessionServiceInput::Start => {
                    let result = self.session.start();
                    self.report(result);
                }
                SessionServiceInput::Stop => {
                    let result = self.session.stop();
                    self.report(result);
                }
                SessionServiceInput::Reset => {
                    let result = self.session.reset();
                    self.report(result);
                }
                SessionServiceInput::AddGuess(syllable) => {
                    self.report(self.session.add_guess(&syllable));
                }
                SessionServiceInput::RemoveLastGuess => {
                    self.report(self.session.remove_last_guess());
                }
                SessionServiceInput::Score(test) => {
                    let event = match self.session.score(&self.tables, &test) {
                        Ok(score) => SessionServiceEvent::Scored(score),
                        Err(e) => SessionServiceEvent::ScoreFailed(e.to_string()),
                    };
                    let _ = self.sender.send(event);
                }
                SessionServiceInput::Quit => {
                    log::debug!("SessionServiceInput::Quit");
                    let result = self.session.stop();
                    self.report(result);
                    let _ = self.sender.send(SessionServiceEvent::Quit);
                    break;
                }
            }
        }
    }
}
