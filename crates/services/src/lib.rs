// Copyright (c) 2024 Mike Tsao

//! Wrappers around solfa sessions that make them easier to use with crossbeam
//! channels. A front end sends inputs to a service and listens for its events,
//! and never touches a lock itself.

#![deny(missing_docs)]

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ProvidesService, ServiceChannels, SessionService, SessionServiceEvent,
        SessionServiceInput,
    };
}

pub use session::{ChannelObserver, SessionService, SessionServiceEvent, SessionServiceInput};
pub use traits::ProvidesService;
pub use types::ServiceChannels;

mod session;
mod traits;
mod types;
