//! Inbound WAHA webhook event model.

use serde::{Deserialize, Serialize};

/// A webhook event delivered by the WAHA gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WahaEvent {
    pub id: String,
    pub timestamp: i64,
    /// Event type; only `"message"` events are processed.
    pub event: String,
    /// WAHA session the event belongs to.
    pub session: String,
    pub payload: MessagePayload,
}

/// The message payload inside a WAHA event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: String,
    pub timestamp: i64,
    /// Sender identifier: canonical address or LID alias.
    #[serde(rename = "from")]
    pub from_id: String,
    pub to: String,
    #[serde(default)]
    pub body: String,
    /// Whether the bot itself sent this message (echo).
    #[serde(rename = "fromMe")]
    pub from_me: bool,
}

impl WahaEvent {
    /// Validity filter: message events not originating from the bot,
    /// with a non-empty trimmed body.
    pub fn is_valid_message(&self) -> bool {
        self.event == "message" && !self.payload.from_me && !self.payload.body.trim().is_empty()
    }

    /// Reason an event is dropped, for the `ignored` webhook response.
    pub fn rejection_reason(&self) -> Option<&'static str> {
        if self.event != "message" {
            Some("not a message event")
        } else if self.payload.from_me {
            Some("own message echo")
        } else if self.payload.body.trim().is_empty() {
            Some("empty body")
        } else {
            None
        }
    }
}
