//! MentraOS wire protocol pieces this app speaks
//!
//! Only the outbound messages the session actually issues are modeled here
//! (connection init, subscription updates, display events, audio play
//! requests). Inbound messages are parsed in `crate::events`.

mod messages;
mod subscriptions;

pub use messages::{
    AudioPlayRequest, ConnectionInit, DisplayEvent, Layout, SubscriptionUpdate, ViewType,
    MSG_APP_STOPPED, MSG_AUDIO_PLAY_RESPONSE, MSG_BATTERY_UPDATE, MSG_CONNECTION_ACK,
    MSG_DATA_STREAM,
};
pub use subscriptions::{Subscription, SubscriptionSet};
