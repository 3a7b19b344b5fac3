//! Wire codec for gateway envelopes.
//!
//! One JSON object per frame in both directions. Decoding fails closed: any
//! frame that is not valid UTF-8 JSON describing a known envelope becomes a
//! [`CodecError`] and the caller drops it.

use crate::error::codec::CodecError;
use crate::transport::InboundFrame;

use common::ErrorLocation;
use models::{ClientEnvelope, ServerEnvelope};

use std::panic::Location;

/// Serialize an outbound envelope to its text frame.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails. With the current
/// envelope types this cannot happen, but the signature keeps the codec honest.
pub fn encode(envelope: &ClientEnvelope) -> Result<String, CodecError> {
    serde_json::to_string(envelope).map_err(|e| CodecError::Encode {
        message: format!("Failed to encode {envelope:?}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Parse a single text frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for invalid JSON, an unknown `type`, an
/// unknown channel, or missing fields.
pub fn decode(text: &str) -> Result<ServerEnvelope, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::Decode {
        message: format!("Invalid frame ({e}): {}", preview(text)),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Parse a frame as delivered by the transport.
///
/// Binary frames are accepted when they carry UTF-8 JSON.
///
/// # Errors
///
/// Returns [`CodecError::Utf8`] for non-UTF-8 binary payloads, otherwise as
/// [`decode`].
pub fn decode_frame(frame: InboundFrame) -> Result<ServerEnvelope, CodecError> {
    match frame {
        InboundFrame::Text(text) => decode(&text),
        InboundFrame::Binary(bytes) => {
            let text = String::from_utf8(bytes)?;
            decode(&text)
        }
    }
}

const PREVIEW_CHARS: usize = 120;

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}…")
    }
}
