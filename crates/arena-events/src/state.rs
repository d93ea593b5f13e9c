//! State snapshot types.
//!
//! A state message carries the full set of robot and ball poses at one
//! simulation step. Order within the lists carries no meaning.

use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Pose of one robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Heading about the vertical axis, radians.
    pub r: f32,
}

/// Position of one ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Snapshot of every robot and ball.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub robots: Vec<RobotState>,
    pub balls: Vec<BallState>,
}

impl RobotState {
    pub fn new(id: impl Into<EntityId>, x: f32, y: f32, z: f32, r: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
            r,
        }
    }
}

impl BallState {
    pub fn new(id: impl Into<EntityId>, x: f32, y: f32, z: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
        }
    }
}
