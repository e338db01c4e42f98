use crate::protocol::{Subscription, ViewType};
use crate::session::AppSession;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Welcome text shown when a session connects
const WELCOME_TEXT: &str = "Echo app ready! Say \"hello\" for a greeting.";

/// Played when a final transcription starts with "hello"
const GREETING_AUDIO_URL: &str = "https://mentra.glass/media/greeting.mp3";

/// How long echoed transcriptions stay on the display
const ECHO_DURATION_MS: u64 = 3000;

/// Per-session application logic. `on_session` is invoked once per new client
/// connection, after the connection init has been queued but before any
/// events are dispatched.
#[async_trait::async_trait]
pub trait SessionHandler: Send + Sync {
    async fn on_session(
        &self,
        session: Arc<AppSession>,
        session_id: &str,
        user_id: &str,
    ) -> Result<()>;

    /// Called after the session's pump has ended.
    async fn on_session_end(&self, session_id: &str, user_id: &str) {
        info!("Session ended: {} (user {})", session_id, user_id);
    }
}

/// Echoes final transcriptions onto the glasses display and greets users who
/// say hello.
pub struct EchoHandler;

#[async_trait::async_trait]
impl SessionHandler for EchoHandler {
    async fn on_session(
        &self,
        session: Arc<AppSession>,
        session_id: &str,
        user_id: &str,
    ) -> Result<()> {
        info!("Session started: {} (user {})", session_id, user_id);

        session
            .show_text_wall(WELCOME_TEXT, ViewType::Main, None)
            .await?;

        session.subscribe(Subscription::AudioChunk).await?;
        session.subscribe(Subscription::Transcription).await?;
        session.subscribe(Subscription::BatteryUpdate).await?;

        // Hook kept for future use; audio chunks are not processed yet
        session.events().on_audio_chunk(|_chunk| async { Ok(()) }).await;

        let sess = Arc::clone(&session);
        session
            .events()
            .on_transcription(move |event| {
                let sess = Arc::clone(&sess);
                async move {
                    info!("Transcription: {} (final: {})", event.text, event.is_final);

                    if !event.is_final {
                        return Ok(());
                    }

                    sess.show_text_wall(
                        &format!("You said: {}", event.text),
                        ViewType::Main,
                        Some(ECHO_DURATION_MS),
                    )
                    .await?;

                    if event.text.to_lowercase().starts_with("hello") {
                        // Best-effort side channel: playback outcome is logged
                        // and discarded, never raised back into the session.
                        let player = Arc::clone(&sess);
                        tokio::spawn(async move {
                            match player.play_audio(GREETING_AUDIO_URL).await {
                                Ok(()) => info!("Greeting sound played"),
                                Err(e) => warn!("Greeting sound failed: {:#}", e),
                            }
                        });
                    }

                    Ok(())
                }
            })
            .await;

        session
            .events()
            .on_battery(|event| async move {
                info!(
                    "Battery: {}% (charging: {})",
                    event.level, event.is_charging
                );
                Ok(())
            })
            .await;

        Ok(())
    }
}
