use super::types::{AudioChunkEvent, BatteryEvent, SessionEvent, TranscriptionEvent};
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::{debug, error};

type Handler<E> = Box<dyn Fn(E) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Per-session event fan-out.
///
/// Handlers are async closures registered once during session setup and run
/// sequentially per event, matching the run-to-completion callback model.
/// A handler error is logged and never propagated to the transport pump.
#[derive(Default)]
pub struct EventDispatcher {
    transcription: RwLock<Vec<Handler<TranscriptionEvent>>>,
    audio_chunk: RwLock<Vec<Handler<AudioChunkEvent>>>,
    battery: RwLock<Vec<Handler<BatteryEvent>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn on_transcription<F, Fut>(&self, handler: F)
    where
        F: Fn(TranscriptionEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.transcription
            .write()
            .await
            .push(Box::new(move |event| handler(event).boxed()));
    }

    pub async fn on_audio_chunk<F, Fut>(&self, handler: F)
    where
        F: Fn(AudioChunkEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.audio_chunk
            .write()
            .await
            .push(Box::new(move |event| handler(event).boxed()));
    }

    pub async fn on_battery<F, Fut>(&self, handler: F)
    where
        F: Fn(BatteryEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.battery
            .write()
            .await
            .push(Box::new(move |event| handler(event).boxed()));
    }

    /// Dispatch one event to its registered handlers.
    pub async fn dispatch(&self, event: SessionEvent) {
        match event {
            SessionEvent::Transcription(event) => {
                Self::run_handlers("transcription", &self.transcription, event).await;
            }
            SessionEvent::AudioChunk(event) => {
                Self::run_handlers("audio_chunk", &self.audio_chunk, event).await;
            }
            SessionEvent::Battery(event) => {
                Self::run_handlers("battery", &self.battery, event).await;
            }
            SessionEvent::Custom(value) => {
                debug!(message = %value, "Unhandled event");
            }
            // Resolved by the session pump before dispatch reaches them
            SessionEvent::AudioPlayResponse(_)
            | SessionEvent::ConnectionAck { .. }
            | SessionEvent::AppStopped => {}
        }
    }

    async fn run_handlers<E: Clone>(kind: &str, handlers: &RwLock<Vec<Handler<E>>>, event: E) {
        let handlers = handlers.read().await;
        for handler in handlers.iter() {
            if let Err(e) = handler(event.clone()).await {
                error!("Handler error for {}: {:#}", kind, e);
            }
        }
    }

    /// Drop all handlers. Called on session stop so handler closures holding
    /// the session Arc don't keep it alive.
    pub async fn clear(&self) {
        self.transcription.write().await.clear();
        self.audio_chunk.write().await.clear();
        self.battery.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_dispatch_runs_matching_handlers_only() {
        let dispatcher = EventDispatcher::new();
        let transcriptions = Arc::new(AtomicUsize::new(0));
        let batteries = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&transcriptions);
        dispatcher
            .on_transcription(move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        let counter = Arc::clone(&batteries);
        dispatcher
            .on_battery(move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        dispatcher
            .dispatch(SessionEvent::Transcription(TranscriptionEvent {
                text: "hi".into(),
                is_final: true,
                language: "en-US".into(),
            }))
            .await;

        assert_eq!(transcriptions.load(Ordering::SeqCst), 1);
        assert_eq!(batteries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_later_handlers() {
        let dispatcher = EventDispatcher::new();
        let ran = Arc::new(AtomicUsize::new(0));

        dispatcher
            .on_battery(|_| async { Err(anyhow!("boom")) })
            .await;

        let counter = Arc::clone(&ran);
        dispatcher
            .on_battery(move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        dispatcher
            .dispatch(SessionEvent::Battery(BatteryEvent {
                level: 50,
                is_charging: false,
            }))
            .await;

        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_drops_handlers() {
        let dispatcher = EventDispatcher::new();
        let ran = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&ran);
        dispatcher
            .on_audio_chunk(move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        dispatcher.clear().await;
        dispatcher
            .dispatch(SessionEvent::AudioChunk(AudioChunkEvent { data: vec![0] }))
            .await;

        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
