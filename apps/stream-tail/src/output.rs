//! Stdout rendering of dispatched events.

use models::Channel;

use serde_json::{Value, json};

/// One JSON object per line: `{"channel":"chat","data":...}`.
pub fn event_line(channel: Channel, data: &Value) -> String {
    json!({ "channel": channel, "data": data }).to_string()
}

/// `channel: data` for humans, with string payloads unquoted.
pub fn event_text(channel: Channel, data: &Value) -> String {
    match data {
        Value::String(text) => format!("{channel}: {text}"),
        Value::Null => format!("{channel}"),
        other => format!("{channel}: {other}"),
    }
}
