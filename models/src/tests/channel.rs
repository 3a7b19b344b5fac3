use crate::{Channel, ModelError};

/// **VALUE**: Verifies channel names parse back into the closed channel set.
///
/// **WHY THIS MATTERS**: The CLI and config accept channel names as strings; a mismatch
/// with the wire names would subscribe to nothing.
///
/// **BUG THIS CATCHES**: Would catch `as_str()` drifting from the serde rename.
#[test]
fn given_known_names_when_parsed_then_match_wire_names() {
    for channel in Channel::ALL {
        // GIVEN: The wire name of a channel
        let wire = serde_json::to_value(channel).expect("Channel should serialize");

        // WHEN: Parsing the display name
        let parsed: Channel = channel.to_string().parse().expect("Should parse");

        // THEN: Display, parse and serde agree
        assert_eq!(parsed, channel);
        assert_eq!(wire, channel.as_str());
    }
}

/// **VALUE**: Verifies unknown channel names are rejected with a located error.
///
/// **WHY THIS MATTERS**: The channel set is closed; silently accepting a typo would leave
/// the caller waiting for events that never arrive.
///
/// **BUG THIS CATCHES**: Would catch a permissive fallback in `FromStr`.
#[test]
fn given_unknown_name_when_parsed_then_returns_unknown_channel() {
    // GIVEN: A name outside the closed set
    let name = "billing";

    // WHEN: Parsing it
    let result = name.parse::<Channel>();

    // THEN: UnknownChannel with the offending name
    match result {
        Err(ModelError::UnknownChannel { name: bad, location }) => {
            assert_eq!(bad, "billing");
            assert!(location.line > 0);
        }
        other => panic!("Expected UnknownChannel, got {other:?}"),
    }
}
