use std::collections::BTreeSet;
use std::fmt;

/// Event streams an app can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// Raw microphone audio from the glasses
    AudioChunk,
    /// Speech-to-text results (en-US)
    Transcription,
    /// Glasses battery status
    BatteryUpdate,
}

impl Subscription {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subscription::AudioChunk => "audio_chunk",
            Subscription::Transcription => "transcription:en-US",
            Subscription::BatteryUpdate => "glasses_battery_update",
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current subscription set for one session.
///
/// BTreeSet keeps the wire list in a stable order.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    entries: BTreeSet<String>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription. Returns true if it was newly added.
    pub fn add(&mut self, subscription: Subscription) -> bool {
        self.entries.insert(subscription.as_str().to_string())
    }

    /// Remove a subscription. Returns true if it was present.
    pub fn remove(&mut self, subscription: Subscription) -> bool {
        self.entries.remove(subscription.as_str())
    }

    pub fn contains(&self, subscription: Subscription) -> bool {
        self.entries.contains(subscription.as_str())
    }

    pub fn all(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
