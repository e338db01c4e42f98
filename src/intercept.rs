//! Traffic interception
//!
//! Every message a session sends and every JSON message the transport delivers
//! passes an ordered `InterceptorStack` injected at construction time. The
//! hooks are observe-only: interceptors see a borrowed message, cannot change
//! it, cannot fail, and run beside the real send/dispatch, so payloads,
//! ordering, and return values are untouched.

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Observer for session traffic. Both hooks default to no-ops so an
/// interceptor can watch a single direction.
pub trait TrafficInterceptor: Send + Sync {
    /// Unique name, used as the double-registration guard key
    fn name(&self) -> &str;

    /// Called with each outbound message just before it reaches the sink
    fn before_send(&self, _message: &Value) {}

    /// Called with each inbound JSON message just after the transport
    /// delivers it, before event parsing
    fn after_receive(&self, _message: &Value) {}
}

/// Ordered list of interceptors shared by a server's sessions.
#[derive(Default)]
pub struct InterceptorStack {
    interceptors: Vec<Arc<dyn TrafficInterceptor>>,
}

impl InterceptorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interceptor. Registering a second interceptor under an
    /// already-present name is a warn-and-no-op, so constructing the owning
    /// component twice cannot stack a second copy of the same observer.
    pub fn register(&mut self, interceptor: Arc<dyn TrafficInterceptor>) -> bool {
        let name = interceptor.name().to_string();
        if self.interceptors.iter().any(|i| i.name() == name) {
            warn!("Interceptor '{}' already registered, skipping", name);
            return false;
        }
        self.interceptors.push(interceptor);
        true
    }

    pub fn notify_outbound(&self, message: &Value) {
        for interceptor in &self.interceptors {
            interceptor.before_send(message);
        }
    }

    pub fn notify_inbound(&self, message: &Value) {
        for interceptor in &self.interceptors {
            interceptor.after_receive(message);
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

/// Logs both traffic directions through `tracing`. One line per outbound
/// send, one line per inbound JSON message.
pub struct LoggingInterceptor;

impl LoggingInterceptor {
    pub const NAME: &'static str = "traffic-log";
}

impl TrafficInterceptor for LoggingInterceptor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_send(&self, message: &Value) {
        info!(direction = "outbound", %message, "session traffic");
    }

    fn after_receive(&self, message: &Value) {
        info!(direction = "inbound", %message, "session traffic");
    }
}
