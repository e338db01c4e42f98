use crate::config::Config;
use crate::handler::SessionHandler;
use crate::http::{create_router, AppState};
use crate::intercept::{InterceptorStack, LoggingInterceptor};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// The session-owning server: binds the webhook endpoint and keeps the map
/// of active sessions.
pub struct AppServer {
    state: AppState,
}

impl AppServer {
    /// Build a server with the default interceptor stack (traffic logging).
    pub fn new(config: Config, handler: Arc<dyn SessionHandler>) -> Self {
        let mut interceptors = InterceptorStack::new();
        interceptors.register(Arc::new(LoggingInterceptor));
        Self::with_interceptors(config, handler, interceptors)
    }

    /// Build a server with a caller-assembled interceptor stack.
    pub fn with_interceptors(
        config: Config,
        handler: Arc<dyn SessionHandler>,
        interceptors: InterceptorStack,
    ) -> Self {
        info!("App server initialized for {}", config.package_name);
        Self {
            state: AppState::new(config, handler, interceptors),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn active_sessions(&self) -> usize {
        self.state.sessions.read().await.len()
    }

    /// Bind the webhook listener and serve until the process exits.
    pub async fn start(&self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.state.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Webhook server listening on {}", addr);

        let router = create_router(self.state.clone());
        axum::serve(listener, router)
            .await
            .context("Webhook server error")
    }
}
