// Copyright (c) 2024 Mike Tsao

//! Traits used by services.

use crossbeam::channel::{Receiver, Sender};

/// A service runs a daemon thread that owns some piece of state. Clients
/// never touch that state directly: they send Inputs and receive Events.
pub trait ProvidesService<I: core::fmt::Debug, E: core::fmt::Debug> {
    /// Where to send Inputs. Clone it to hand out to other threads.
    fn sender(&self) -> &Sender<I>;

    /// Where Events arrive. Suitable for a crossbeam `select!` loop.
    fn receiver(&self) -> &Receiver<E>;

    /// Sends an Input, logging rather than returning a failure. A send fails
    /// only after the daemon has quit.
    fn send_input(&self, input: I) {
        if let Err(e) = self.sender().try_send(input) {
            log::warn!("service input dropped: {e:?}");
        }
    }

    /// Takes every Event that has arrived so far without waiting. Meant for
    /// front ends that poll once per frame.
    fn drain_events(&self) -> Vec<E> {
        self.receiver().try_iter().collect()
    }
}
