//! Inbound event model and dispatch
//!
//! Messages arriving from the cloud are parsed into `SessionEvent`s and fanned
//! out to handlers registered on the session's `EventDispatcher`.

mod dispatcher;
mod types;

pub use dispatcher::EventDispatcher;
pub use types::{
    AudioChunkEvent, AudioPlayResponseEvent, BatteryEvent, SessionEvent, TranscriptionEvent,
};
