use crate::{AckAction, Channel, ClientEnvelope, ServerEnvelope};

use serde_json::json;

/// **VALUE**: Verifies outbound envelopes match the gateway's JSON shape exactly.
///
/// **WHY THIS MATTERS**: The gateway matches on `type` and `channels`; any drift in tag
/// name or casing makes every subscribe request a no-op.
///
/// **BUG THIS CATCHES**: Would catch a missing `rename_all` or a switch to external tagging.
#[test]
fn given_client_envelopes_when_serialized_then_use_type_tag() {
    // GIVEN: One of each outbound kind
    let subscribe = ClientEnvelope::Subscribe {
        channels: vec![Channel::Chat, Channel::Workers],
    };
    let unsubscribe = ClientEnvelope::Unsubscribe {
        channels: vec![Channel::Orchestrator],
    };

    // WHEN/THEN: Serialized forms are the documented objects
    assert_eq!(
        serde_json::to_value(&subscribe).unwrap(),
        json!({ "type": "subscribe", "channels": ["chat", "workers"] })
    );
    assert_eq!(
        serde_json::to_value(&unsubscribe).unwrap(),
        json!({ "type": "unsubscribe", "channels": ["orchestrator"] })
    );
    assert_eq!(
        serde_json::to_value(&ClientEnvelope::Ping).unwrap(),
        json!({ "type": "ping" })
    );
}

/// **VALUE**: Verifies every inbound kind decodes from the gateway's JSON.
///
/// **WHY THIS MATTERS**: Dispatch is driven entirely by the decoded variant.
///
/// **BUG THIS CATCHES**: Would catch a wrong field name (`action`, `data`, `message`).
#[test]
fn given_server_frames_when_decoded_then_produce_matching_variants() {
    // GIVEN: One frame of each inbound kind
    let event = json!({ "type": "event", "channel": "chat", "data": { "text": "hi" } });
    let ack = json!({ "type": "ack", "action": "unsubscribed", "channels": ["workers"] });
    let pong = json!({ "type": "pong" });
    let error = json!({ "type": "error", "message": "bad channel" });

    // WHEN/THEN: Each decodes to its variant
    assert_eq!(
        serde_json::from_value::<ServerEnvelope>(event).unwrap(),
        ServerEnvelope::Event {
            channel: Channel::Chat,
            data: json!({ "text": "hi" }),
        }
    );
    assert_eq!(
        serde_json::from_value::<ServerEnvelope>(ack).unwrap(),
        ServerEnvelope::Ack {
            action: AckAction::Unsubscribed,
            channels: vec![Channel::Workers],
        }
    );
    assert_eq!(
        serde_json::from_value::<ServerEnvelope>(pong).unwrap(),
        ServerEnvelope::Pong
    );
    assert_eq!(
        serde_json::from_value::<ServerEnvelope>(error).unwrap(),
        ServerEnvelope::Error {
            message: String::from("bad channel"),
        }
    );
}

/// **VALUE**: Verifies an event without `data` decodes with a null payload.
///
/// **WHY THIS MATTERS**: Some gateway events are pure notifications.
///
/// **BUG THIS CATCHES**: Would catch removal of `#[serde(default)]` on `data`.
#[test]
fn given_event_without_data_when_decoded_then_payload_is_null() {
    let frame = json!({ "type": "event", "channel": "orchestrator" });

    let decoded: ServerEnvelope = serde_json::from_value(frame).unwrap();

    assert_eq!(
        decoded,
        ServerEnvelope::Event {
            channel: Channel::Orchestrator,
            data: serde_json::Value::Null,
        }
    );
}

/// **VALUE**: Verifies unknown tags and unknown channels are rejected.
///
/// **WHY THIS MATTERS**: The codec fails closed; a lenient model would dispatch garbage.
///
/// **BUG THIS CATCHES**: Would catch an `#[serde(other)]` catch-all creeping in.
#[test]
fn given_unknown_type_or_channel_when_decoded_then_fails() {
    let unknown_type = json!({ "type": "hello" });
    let unknown_channel = json!({ "type": "event", "channel": "billing", "data": 1 });

    assert!(serde_json::from_value::<ServerEnvelope>(unknown_type).is_err());
    assert!(serde_json::from_value::<ServerEnvelope>(unknown_channel).is_err());
}
