use chrono::{SecondsFormat, Utc};
use serde::Serialize;

// Inbound message type tags matched by the session pump
pub const MSG_CONNECTION_ACK: &str = "tpa_connection_ack";
pub const MSG_DATA_STREAM: &str = "data_stream";
pub const MSG_BATTERY_UPDATE: &str = "glasses_battery_update";
pub const MSG_AUDIO_PLAY_RESPONSE: &str = "audio_play_response";
pub const MSG_APP_STOPPED: &str = "app_stopped";

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Which glasses view a layout targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    Main,
    Overlay,
}

/// Display layout payload. The glasses currently only get text walls from us.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub layout_type: &'static str,
    pub text: String,
}

impl Layout {
    pub fn text_wall(text: impl Into<String>) -> Self {
        Self {
            layout_type: "text_wall",
            text: text.into(),
        }
    }
}

/// First message on a fresh WebSocket connection, authenticating the app
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInit {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub session_id: String,
    pub package_name: String,
    pub api_key: String,
    pub timestamp: String,
}

impl ConnectionInit {
    pub fn new(session_id: &str, package_name: &str, api_key: &str) -> Self {
        Self {
            message_type: "tpa_connection_init",
            session_id: session_id.to_string(),
            package_name: package_name.to_string(),
            api_key: api_key.to_string(),
            timestamp: timestamp_now(),
        }
    }
}

/// Replaces the full subscription list for this session on the cloud side
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub session_id: String,
    pub package_name: String,
    pub subscriptions: Vec<String>,
    pub timestamp: String,
}

impl SubscriptionUpdate {
    pub fn new(session_id: &str, package_name: &str, subscriptions: Vec<String>) -> Self {
        Self {
            message_type: "subscription_update",
            session_id: session_id.to_string(),
            package_name: package_name.to_string(),
            subscriptions,
            timestamp: timestamp_now(),
        }
    }
}

/// Pushes a layout to the glasses display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEvent {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub session_id: String,
    pub package_name: String,
    pub view: ViewType,
    pub layout: Layout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub timestamp: String,
}

impl DisplayEvent {
    pub fn text_wall(
        session_id: &str,
        package_name: &str,
        text: impl Into<String>,
        view: ViewType,
        duration_ms: Option<u64>,
    ) -> Self {
        Self {
            message_type: "display_event",
            session_id: session_id.to_string(),
            package_name: package_name.to_string(),
            view,
            layout: Layout::text_wall(text),
            duration_ms,
            timestamp: timestamp_now(),
        }
    }
}

/// Asks the glasses to fetch and play a remote audio resource.
/// The cloud answers with an `audio_play_response` carrying the same request id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPlayRequest {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub session_id: String,
    pub package_name: String,
    pub request_id: String,
    pub audio_url: String,
    pub timestamp: String,
}

impl AudioPlayRequest {
    pub fn new(session_id: &str, package_name: &str, request_id: &str, audio_url: &str) -> Self {
        Self {
            message_type: "audio_play_request",
            session_id: session_id.to_string(),
            package_name: package_name.to_string(),
            request_id: request_id.to_string(),
            audio_url: audio_url.to_string(),
            timestamp: timestamp_now(),
        }
    }
}
