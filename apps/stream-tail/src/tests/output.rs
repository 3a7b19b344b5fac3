use crate::output::{event_line, event_text};

use models::Channel;

use serde_json::{Value, json};

/// **VALUE**: Verifies JSON output is one parseable object per event.
///
/// **WHY THIS MATTERS**: Output is piped into `jq` and log shippers line by line.
///
/// **BUG THIS CATCHES**: Would catch pretty-printed (multi-line) output or a wrong key.
#[test]
fn given_event_when_rendered_as_json_then_single_line_object() {
    let line = event_line(Channel::Workers, &json!({ "id": 7, "state": "busy" }));

    assert!(!line.contains('\n'));
    let parsed: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(
        parsed,
        json!({ "channel": "workers", "data": { "id": 7, "state": "busy" } })
    );
}

/// **VALUE**: Verifies the text format for the common payload shapes.
///
/// **WHY THIS MATTERS**: Humans tailing chat should read messages, not JSON quoting.
///
/// **BUG THIS CATCHES**: Would catch strings being printed with quotes.
#[test]
fn given_payloads_when_rendered_as_text_then_readable() {
    assert_eq!(event_text(Channel::Chat, &json!("hello")), "chat: hello");
    assert_eq!(event_text(Channel::Chat, &Value::Null), "chat");
    assert_eq!(event_text(Channel::Orchestrator, &json!([1, 2])), "orchestrator: [1,2]");
}
