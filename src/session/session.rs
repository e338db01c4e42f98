use crate::events::{AudioChunkEvent, AudioPlayResponseEvent, EventDispatcher, SessionEvent};
use crate::intercept::InterceptorStack;
use crate::protocol::{
    AudioPlayRequest, ConnectionInit, DisplayEvent, Subscription, SubscriptionSet,
    SubscriptionUpdate, ViewType,
};
use crate::transport::{MessageSink, TransportEvent};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex, Notify};
use tracing::{debug, error, info};

/// One connected glasses session.
pub struct AppSession {
    session_id: String,
    user_id: String,
    package_name: String,
    api_key: String,

    /// Outbound half of the connection
    sink: Arc<dyn MessageSink>,

    /// Handlers registered by the session handler
    events: EventDispatcher,

    /// Traffic observers, shared with the owning server
    interceptors: Arc<InterceptorStack>,

    /// Streams this session is subscribed to
    subscriptions: Mutex<SubscriptionSet>,

    /// In-flight audio play requests awaiting their response
    pending_audio: Mutex<HashMap<String, oneshot::Sender<AudioPlayResponseEvent>>>,

    stop_requested: Notify,
    stopped: AtomicBool,
}

impl AppSession {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        package_name: impl Into<String>,
        api_key: impl Into<String>,
        sink: Arc<dyn MessageSink>,
        interceptors: Arc<InterceptorStack>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            package_name: package_name.into(),
            api_key: api_key.into(),
            sink,
            events: EventDispatcher::new(),
            interceptors,
            subscriptions: Mutex::new(SubscriptionSet::new()),
            pending_audio: Mutex::new(HashMap::new()),
            stop_requested: Notify::new(),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Send one JSON message to the cloud.
    ///
    /// Interceptors observe the message beside the real send; the sink
    /// receives it unchanged and its result is returned as-is.
    pub async fn send(&self, message: Value) -> Result<()> {
        self.interceptors.notify_outbound(&message);
        self.sink.send(message).await
    }

    async fn send_message<T: Serialize>(&self, message: &T) -> Result<()> {
        self.send(serde_json::to_value(message)?).await
    }

    /// Authenticate this session with the cloud. Sent once, before any other
    /// outbound message.
    pub async fn send_connection_init(&self) -> Result<()> {
        self.send_message(&ConnectionInit::new(
            &self.session_id,
            &self.package_name,
            &self.api_key,
        ))
        .await
    }

    /// Ask the pump to stop after the current event. Safe to call from
    /// outside the pump task; a no-op once the session is already stopped.
    pub fn request_stop(&self) {
        self.stop_requested.notify_one();
    }

    /// Subscribe to an event stream. Re-sends the full subscription list only
    /// when the set actually changed.
    pub async fn subscribe(&self, subscription: Subscription) -> Result<()> {
        let changed = self.subscriptions.lock().await.add(subscription);
        if changed {
            self.update_subscriptions().await?;
        }
        Ok(())
    }

    pub async fn unsubscribe(&self, subscription: Subscription) -> Result<()> {
        let changed = self.subscriptions.lock().await.remove(subscription);
        if changed {
            self.update_subscriptions().await?;
        }
        Ok(())
    }

    async fn update_subscriptions(&self) -> Result<()> {
        let all = self.subscriptions.lock().await.all();
        info!("Updated subscriptions: {:?}", all);
        self.send_message(&SubscriptionUpdate::new(
            &self.session_id,
            &self.package_name,
            all,
        ))
        .await
    }

    /// Display text on the glasses.
    pub async fn show_text_wall(
        &self,
        text: &str,
        view: ViewType,
        duration_ms: Option<u64>,
    ) -> Result<()> {
        info!("Displaying text wall: '{}' on {:?} view", text, view);
        self.send_message(&DisplayEvent::text_wall(
            &self.session_id,
            &self.package_name,
            text,
            view,
            duration_ms,
        ))
        .await
    }

    /// Show a short notification on the overlay view.
    pub async fn show_notification(
        &self,
        title: &str,
        message: &str,
        duration_ms: u64,
    ) -> Result<()> {
        let text = if title.is_empty() {
            message.to_string()
        } else {
            format!("{}\n{}", title, message)
        };
        self.send_message(&DisplayEvent::text_wall(
            &self.session_id,
            &self.package_name,
            text,
            ViewType::Overlay,
            Some(duration_ms),
        ))
        .await
    }

    /// Ask the glasses to play a remote audio resource and wait for the
    /// cloud's response. There is no timeout here; a hung cloud call hangs the
    /// caller.
    ///
    /// The response arrives through the same pump that dispatches events, so
    /// this must not be awaited from inside an event handler. Spawn a task
    /// instead (see `EchoHandler`).
    pub async fn play_audio(&self, audio_url: &str) -> Result<()> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending_audio
            .lock()
            .await
            .insert(request_id.clone(), tx);

        let request =
            AudioPlayRequest::new(&self.session_id, &self.package_name, &request_id, audio_url);
        if let Err(e) = self.send_message(&request).await {
            self.pending_audio.lock().await.remove(&request_id);
            return Err(e);
        }

        let response = rx
            .await
            .context("Session stopped before audio play response arrived")?;

        if response.success {
            Ok(())
        } else {
            bail!(
                "Audio playback failed: {}",
                response.error.as_deref().unwrap_or("unknown error")
            )
        }
    }

    /// Drive the session until its transport ends.
    ///
    /// Consumes transport events: answers `Connected` with the connection
    /// init, notifies inbound interceptors for each JSON message, resolves
    /// pending audio plays, and dispatches everything else to registered
    /// handlers. Returns once the connection is gone or the app is stopped.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<TransportEvent>) {
        loop {
            let event = tokio::select! {
                _ = self.stop_requested.notified() => {
                    info!("Stop requested for session {}", self.session_id);
                    break;
                }
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            match event {
                TransportEvent::Connected => {
                    info!("WebSocket connected for session {}", self.session_id);
                    if let Err(e) = self.send_connection_init().await {
                        error!("Failed to send connection init: {:#}", e);
                        break;
                    }
                }
                TransportEvent::Message(message) => {
                    self.interceptors.notify_inbound(&message);
                    if self.handle_message(&message).await.is_break() {
                        break;
                    }
                }
                TransportEvent::Binary(data) => {
                    self.events
                        .dispatch(SessionEvent::AudioChunk(AudioChunkEvent { data }))
                        .await;
                }
                TransportEvent::Disconnected => {
                    info!("WebSocket disconnected for session {}", self.session_id);
                    break;
                }
            }
        }

        self.shutdown().await;
    }

    async fn handle_message(&self, message: &Value) -> std::ops::ControlFlow<()> {
        use std::ops::ControlFlow;

        match SessionEvent::from_message(message) {
            SessionEvent::ConnectionAck { success: true, .. } => {
                info!("Session {} authenticated", self.session_id);
                ControlFlow::Continue(())
            }
            SessionEvent::ConnectionAck { error, .. } => {
                error!(
                    "Connection rejected for session {}: {}",
                    self.session_id,
                    error.as_deref().unwrap_or("authentication failed")
                );
                ControlFlow::Break(())
            }
            SessionEvent::AppStopped => {
                info!("Received app_stopped for session {}", self.session_id);
                ControlFlow::Break(())
            }
            SessionEvent::AudioPlayResponse(response) => {
                match self.pending_audio.lock().await.remove(&response.request_id) {
                    // Receiver may have given up; that's fine
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => {
                        debug!("Unmatched audio play response: {}", response.request_id);
                    }
                }
                ControlFlow::Continue(())
            }
            event => {
                self.events.dispatch(event).await;
                ControlFlow::Continue(())
            }
        }
    }

    async fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Stopping session {}", self.session_id);

        self.subscriptions.lock().await.clear();
        // Dropping pending senders wakes any in-flight play_audio with an error
        self.pending_audio.lock().await.clear();
        // Handler closures hold the session Arc; clearing breaks the cycle
        self.events.clear().await;
    }
}

impl std::fmt::Debug for AppSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSession")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("package_name", &self.package_name)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
