//! Shared wire types for the arena viewer.
//!
//! This crate contains pure data structures and decoding with no rendering
//! logic. The visualization crate depends on it, and so can any tool that
//! wants to read the simulator's message stream.

pub mod constants;
pub mod envelope;
pub mod error;
pub mod id;
pub mod state;
pub mod vision;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use constants::{ArenaConstants, Basket};
pub use envelope::{decode_envelope, ArenaMessage, CONSTANTS_TAG, STATE_TAG};
pub use error::ProtocolError;
pub use id::EntityId;
pub use state::{BallState, RobotState, WorldState};
pub use vision::RobotCameraModel;
