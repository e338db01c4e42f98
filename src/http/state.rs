use crate::config::Config;
use crate::handler::SessionHandler;
use crate::intercept::InterceptorStack;
use crate::session::AppSession;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared state for the webhook handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Application logic invoked once per new session
    pub handler: Arc<dyn SessionHandler>,

    /// Traffic observers injected into every session
    pub interceptors: Arc<InterceptorStack>,

    /// Active sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<AppSession>>>>,

    /// Session ids reserved while their connection is still being set up.
    /// An id is held here between the webhook's duplicate check and the
    /// insert into `sessions`, so concurrent webhooks for the same id
    /// cannot both bootstrap.
    pub pending: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        handler: Arc<dyn SessionHandler>,
        interceptors: InterceptorStack,
    ) -> Self {
        Self {
            config: Arc::new(config),
            handler,
            interceptors: Arc::new(interceptors),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}
