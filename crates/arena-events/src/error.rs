use thiserror::Error;

/// Errors produced while decoding an inbound message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The message was not valid JSON or not an object.
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope had no string `type` field.
    #[error("envelope is missing a string `type` field")]
    MissingType,

    /// The payload did not have the shape the tag requires.
    #[error("invalid `{tag}` payload: {source}")]
    Payload {
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    /// The constants decoded but describe an impossible arena.
    #[error("invalid constants: {0}")]
    InvalidConstants(String),
}
