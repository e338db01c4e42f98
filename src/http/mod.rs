//! Webhook endpoint the MentraOS cloud calls into
//!
//! - POST /webhook - session connection and stop requests
//! - GET /health - health check with active session count

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
