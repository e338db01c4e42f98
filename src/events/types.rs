use crate::protocol::{
    MSG_APP_STOPPED, MSG_AUDIO_PLAY_RESPONSE, MSG_BATTERY_UPDATE, MSG_CONNECTION_ACK,
    MSG_DATA_STREAM,
};
use serde_json::Value;

/// Speech-to-text result, partial or final
#[derive(Debug, Clone)]
pub struct TranscriptionEvent {
    pub text: String,
    pub is_final: bool,
    pub language: String,
}

/// Raw audio from the glasses microphone (16kHz 16-bit mono PCM)
#[derive(Debug, Clone)]
pub struct AudioChunkEvent {
    pub data: Vec<u8>,
}

/// Glasses battery status update
#[derive(Debug, Clone)]
pub struct BatteryEvent {
    /// Charge level, 0-100
    pub level: i64,
    pub is_charging: bool,
}

/// Cloud response to an `audio_play_request`
#[derive(Debug, Clone)]
pub struct AudioPlayResponseEvent {
    pub request_id: String,
    pub success: bool,
    pub error: Option<String>,
}

/// One inbound event, parsed from a cloud message or binary frame
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Transcription(TranscriptionEvent),
    AudioChunk(AudioChunkEvent),
    Battery(BatteryEvent),
    AudioPlayResponse(AudioPlayResponseEvent),
    /// Authentication result for our connection init; an error here is terminal
    ConnectionAck { success: bool, error: Option<String> },
    /// Cloud told us the app was stopped for this session
    AppStopped,
    /// Anything we don't model; kept whole for logging
    Custom(Value),
}

impl SessionEvent {
    /// Parse a JSON cloud message into an event.
    ///
    /// Transcriptions arrive wrapped in `data_stream` envelopes; battery and
    /// audio-play responses are top-level message types. Unknown shapes fall
    /// through to `Custom` rather than failing.
    pub fn from_message(message: &Value) -> SessionEvent {
        let message_type = message.get("type").and_then(Value::as_str).unwrap_or("");

        match message_type {
            MSG_DATA_STREAM => Self::from_data_stream(message),
            MSG_BATTERY_UPDATE => SessionEvent::Battery(BatteryEvent {
                level: message.get("level").and_then(Value::as_i64).unwrap_or(0),
                is_charging: message
                    .get("isCharging")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            }),
            MSG_AUDIO_PLAY_RESPONSE => SessionEvent::AudioPlayResponse(AudioPlayResponseEvent {
                request_id: message
                    .get("requestId")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                success: message
                    .get("success")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                error: message
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            MSG_CONNECTION_ACK => {
                let error = message
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                SessionEvent::ConnectionAck {
                    success: error.is_none(),
                    error,
                }
            }
            MSG_APP_STOPPED => SessionEvent::AppStopped,
            _ => SessionEvent::Custom(message.clone()),
        }
    }

    fn from_data_stream(message: &Value) -> SessionEvent {
        let stream_type = message
            .get("streamType")
            .and_then(Value::as_str)
            .unwrap_or("");
        let data = message.get("data").cloned().unwrap_or(Value::Null);

        if stream_type == "transcription" {
            SessionEvent::Transcription(TranscriptionEvent {
                text: data
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                is_final: data
                    .get("isFinal")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                language: data
                    .get("transcribeLanguage")
                    .and_then(Value::as_str)
                    .unwrap_or("en-US")
                    .to_string(),
            })
        } else {
            SessionEvent::Custom(message.clone())
        }
    }
}
