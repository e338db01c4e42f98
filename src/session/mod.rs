//! App session management
//!
//! An `AppSession` represents one connected glasses user: it owns the
//! outbound sink, the event dispatcher handlers are registered on, the
//! subscription set, and the pump that turns transport events into dispatched
//! session events. All traffic in both directions is observed by the
//! interceptor stack injected at construction.

mod session;

pub use session::AppSession;
