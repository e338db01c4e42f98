use super::state::AppState;
use crate::handler::SessionHandler;
use crate::session::AppSession;
use crate::transport::{self, TransportEvent};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};

/// Webhook payload from the MentraOS cloud. A missing `type` means a
/// connection request.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    #[serde(rename = "type", default)]
    pub webhook_type: Option<String>,

    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,

    #[serde(rename = "userId", default)]
    pub user_id: String,

    /// The per-session WebSocket URL to connect back to
    #[serde(rename = "augmentOSWebsocketUrl", alias = "websocketUrl", default)]
    pub websocket_url: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,
}

impl WebhookRequest {
    fn session_id_or_default(&self, package_name: &str) -> String {
        self.session_id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.user_id, package_name))
    }
}

/// POST /webhook
pub async fn webhook(
    State(state): State<AppState>,
    Json(req): Json<WebhookRequest>,
) -> impl IntoResponse {
    let session_id = req.session_id_or_default(&state.config.package_name);

    if req.webhook_type.as_deref() == Some("stop_request") {
        info!(
            "Received stop request for session {}, reason: {}",
            session_id,
            req.reason.as_deref().unwrap_or("unknown")
        );

        if let Some(session) = state.sessions.write().await.remove(&session_id) {
            session.request_stop();
        }
        return (StatusCode::OK, Json(json!({"status": "ok"})));
    }

    let websocket_url = match req.websocket_url {
        Some(url) => url,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing websocketUrl/augmentOSWebsocketUrl"})),
            );
        }
    };

    info!(
        "Received session request for user {}, session {}",
        req.user_id, session_id
    );

    // Reserve the id before the connect awaits so a concurrent webhook for
    // the same session cannot also bootstrap. Held until the session is in
    // the registry (or bootstrap fails).
    {
        let mut pending = state.pending.lock().await;
        if pending.contains(&session_id) || state.sessions.read().await.contains_key(&session_id) {
            warn!("Session {} already exists", session_id);
            return (StatusCode::OK, Json(json!({"status": "ok"})));
        }
        pending.insert(session_id.clone());
    }

    let result = bootstrap_session(&state, &session_id, &req.user_id, &websocket_url).await;
    state.pending.lock().await.remove(&session_id);

    match result {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))),
        Err(e) => {
            error!("Webhook error: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let active = state.sessions.read().await.len();
    Json(json!({
        "status": "healthy",
        "package_name": state.config.package_name,
        "active_sessions": active,
    }))
}

/// Connect the session's WebSocket, run the handler, and spawn the event
/// pump. The pump task removes the session from the map when it ends.
async fn bootstrap_session(
    state: &AppState,
    session_id: &str,
    user_id: &str,
    websocket_url: &str,
) -> Result<()> {
    let (sink, rx) = transport::connect(websocket_url).await?;

    let session = Arc::new(AppSession::new(
        session_id,
        user_id,
        &state.config.package_name,
        &state.config.api_key,
        sink,
        Arc::clone(&state.interceptors),
    ));

    // Init goes on the wire before the handler's first display command
    session
        .send_connection_init()
        .await
        .context("Failed to send connection init")?;

    state
        .handler
        .on_session(Arc::clone(&session), session_id, user_id)
        .await
        .context("Session handler failed")?;

    state
        .sessions
        .write()
        .await
        .insert(session_id.to_string(), Arc::clone(&session));

    tokio::spawn(run_session_pump(
        Arc::clone(&state.sessions),
        Arc::clone(&state.handler),
        session,
        rx,
    ));

    Ok(())
}

/// Drive the session's event pump, then drop it from the registry. The
/// removal is skipped when another session has since claimed the id, so a
/// finishing pump never evicts a live replacement.
async fn run_session_pump(
    sessions: Arc<RwLock<HashMap<String, Arc<AppSession>>>>,
    handler: Arc<dyn SessionHandler>,
    session: Arc<AppSession>,
    rx: mpsc::Receiver<TransportEvent>,
) {
    Arc::clone(&session).run(rx).await;

    {
        let mut sessions = sessions.write().await;
        let still_ours = sessions
            .get(session.session_id())
            .is_some_and(|live| Arc::ptr_eq(live, &session));
        if still_ours {
            sessions.remove(session.session_id());
        }
    }

    handler
        .on_session_end(session.session_id(), session.user_id())
        .await;
}
