//! Envelope decoding.
//!
//! Every inbound message is a JSON object `{ "type": string, "payload": object }`.
//! The tag selects how the payload is read. Tags this client does not know are
//! not errors: they decode to `None` so newer servers can add message kinds
//! without breaking older viewers.

use serde::Deserialize;
use serde_json::Value;

use crate::{ArenaConstants, ProtocolError, WorldState};

/// Tag of the one-time configuration message.
pub const CONSTANTS_TAG: &str = "constants";
/// Tag of the per-step snapshot message.
pub const STATE_TAG: &str = "state";

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaMessage {
    Constants(ArenaConstants),
    State(WorldState),
}

impl ArenaMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            ArenaMessage::Constants(_) => CONSTANTS_TAG,
            ArenaMessage::State(_) => STATE_TAG,
        }
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    tag: Option<Value>,
    #[serde(default)]
    payload: Value,
}

/// Decodes one text frame.
///
/// Returns `Ok(None)` for well-formed envelopes with an unrecognized tag.
/// Malformed JSON, a missing tag, or a payload that does not match its tag
/// are errors.
pub fn decode_envelope(text: &str) -> Result<Option<ArenaMessage>, ProtocolError> {
    let raw: RawEnvelope = serde_json::from_str(text)?;

    let tag = match raw.tag {
        Some(Value::String(tag)) => tag,
        _ => return Err(ProtocolError::MissingType),
    };

    let message = match tag.as_str() {
        CONSTANTS_TAG => ArenaMessage::Constants(decode_payload(&tag, raw.payload)?),
        STATE_TAG => ArenaMessage::State(decode_payload(&tag, raw.payload)?),
        _ => return Ok(None),
    };

    Ok(Some(message))
}

fn decode_payload<T>(tag: &str, payload: Value) -> Result<T, ProtocolError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(payload).map_err(|source| ProtocolError::Payload {
        tag: tag.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_state() {
        let text = r#"{"type":"state","payload":{"robots":[{"id":1,"x":1,"y":2,"z":0,"r":1.2}],"balls":[]}}"#;
        let Some(ArenaMessage::State(state)) = decode_envelope(text).unwrap() else {
            panic!("expected a state message");
        };
        assert_eq!(state.robots[0].x, 1.0);
        assert_eq!(state.robots[0].r, 1.2);
    }

    #[test]
    fn test_unknown_tag_is_ignored() {
        let text = r#"{"type":"vision","payload":{"balls":[]}}"#;
        assert!(decode_envelope(text).unwrap().is_none());
    }

    #[test]
    fn test_unknown_tag_without_payload_is_ignored() {
        assert!(decode_envelope(r#"{"type":"ping"}"#).unwrap().is_none());
    }

    #[test]
    fn test_missing_type() {
        let err = decode_envelope(r#"{"payload":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingType));
    }

    #[test]
    fn test_non_string_type() {
        let err = decode_envelope(r#"{"type":3,"payload":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingType));
    }

    #[test]
    fn test_malformed_json() {
        let err = decode_envelope("{\"type\": \"state\"").unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
    }

    #[test]
    fn test_state_missing_robots() {
        let err = decode_envelope(r#"{"type":"state","payload":{"balls":[]}}"#).unwrap_err();
        match err {
            ProtocolError::Payload { tag, .. } => assert_eq!(tag, "state"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_message_tag() {
        let msg = ArenaMessage::State(WorldState::default());
        assert_eq!(msg.tag(), STATE_TAG);
    }
}
