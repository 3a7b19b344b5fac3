//! JSON envelopes exchanged with the gateway, one object per frame.
//!
//! Both directions are internally tagged on `type`. Outbound channel lists are
//! emitted in `Channel` order so identical requests produce identical frames.

use crate::channel::Channel;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client → gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEnvelope {
    Subscribe { channels: Vec<Channel> },
    Unsubscribe { channels: Vec<Channel> },
    Ping,
}

/// Gateway → client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEnvelope {
    Event {
        channel: Channel,
        #[serde(default)]
        data: Value,
    },
    Ack {
        action: AckAction,
        channels: Vec<Channel>,
    },
    Pong,
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckAction {
    Subscribed,
    Unsubscribed,
}
