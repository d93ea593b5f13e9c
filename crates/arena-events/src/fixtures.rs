//! Sample message fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // arena-events = { path = "../arena-events", features = ["test-fixtures"] }
//!
//! use arena_events::fixtures;
//!
//! let constants = fixtures::sample_constants();
//! let states = fixtures::sample_states();
//! ```

use crate::{decode_envelope, ArenaConstants, ArenaMessage, WorldState};

/// Raw constants envelope as the simulator sends it on connect.
pub const CONSTANTS_ENVELOPE: &str = include_str!("../tests/fixtures/constants.json");

/// Raw stream of envelopes following the constants message.
///
/// Contains 4 frames:
/// - 2 state frames with two robots and three balls, in shuffled order
/// - 1 `vision` frame, a tag viewers do not handle
/// - 1 state frame with ball `b0` lifted into flight
pub const STATE_STREAM: &str = include_str!("../tests/fixtures/state_stream.jsonl");

/// Returns the constants from the fixtures file.
pub fn sample_constants() -> ArenaConstants {
    match decode_envelope(CONSTANTS_ENVELOPE) {
        Ok(Some(ArenaMessage::Constants(constants))) => constants,
        other => panic!("constants.json did not decode to constants: {:?}", other),
    }
}

/// Returns every frame of the state stream, in order, as raw text.
pub fn sample_frames() -> Vec<&'static str> {
    STATE_STREAM
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect()
}

/// Returns the decoded state snapshots from the stream, skipping unknown tags.
pub fn sample_states() -> Vec<WorldState> {
    sample_frames()
        .into_iter()
        .filter_map(|frame| match decode_envelope(frame) {
            Ok(Some(ArenaMessage::State(state))) => Some(state),
            Ok(_) => None,
            Err(e) => panic!("Failed to parse frame: {}\nError: {}", frame, e),
        })
        .collect()
}
