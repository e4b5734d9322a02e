// Copyright (c) 2024 Mike Tsao

//! Data types shared among services.

use crossbeam::channel::{Receiver, Sender};

/// The channels that connect a service to its clients. Inputs flow from
/// clients to the daemon thread, and events flow back.
#[derive(Debug)]
pub struct ServiceChannels<I, E> {
    input_sender: Sender<I>,
    input_receiver: Receiver<I>,
    event_sender: Sender<E>,
    event_receiver: Receiver<E>,
}
impl<I, E> Default for ServiceChannels<I, E> {
    fn default() -> Self {
        let (input_sender, input_receiver) = crossbeam::channel::unbounded();
        let (event_sender, event_receiver) = crossbeam::channel::unbounded();
        Self {
            input_sender,
            input_receiver,
            event_sender,
            event_receiver,
        }
    }
}
impl<I, E> ServiceChannels<I, E> {
    /// Where clients send inputs.
    pub fn input_sender(&self) -> &Sender<I> {
        &self.input_sender
    }

    /// Where clients listen for events.
    pub fn event_receiver(&self) -> &Receiver<E> {
        &self.event_receiver
    }

    /// The ends a daemon thread keeps: one to read inputs, one to send events.
    pub fn daemon_ends(&self) -> (Receiver<I>, Sender<E>) {
        (self.input_receiver.clone(), self.event_sender.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daemon_ends_talk_to_client_ends() {
        let channels = ServiceChannels::<u8, String>::default();
        let (inputs, events) = channels.daemon_ends();

        channels.input_sender().send(7).unwrap();
        assert_eq!(inputs.recv().unwrap(), 7);

        events.send("seven".to_string()).unwrap();
        assert_eq!(channels.event_receiver().recv().unwrap(), "seven");
    }
}
