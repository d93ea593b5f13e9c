//! Arena Constants
//!
//! The one-time configuration payload describing the field, the baskets, the
//! robots and the robot camera. The simulator sends it as a flat mapping of
//! upper-case keys; unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::ProtocolError;

/// Named dimensions of the arena, in meters unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ArenaConstants {
    pub area_width: f32,
    pub area_height: f32,
    pub play_area_width: f32,
    pub play_area_height: f32,
    pub competition_area_width: f32,
    pub competition_area_height: f32,
    pub line_width: f32,

    pub backboard_width: f32,
    pub backboard_height: f32,
    pub backboard_depth: f32,
    pub basket_height: f32,
    pub basket_outer_radius: f32,
    pub basket_inner_radius: f32,

    pub ball_radius: f32,

    pub robot_radius: f32,
    pub robot_height: f32,

    /// Camera offset from the robot origin, robot frame.
    pub robot_camera_x: f32,
    pub robot_camera_y: f32,
    pub robot_camera_z: f32,
    /// Camera tilt about the robot's X axis, radians.
    pub robot_camera_r: f32,
    /// Vertical field of view, degrees.
    pub robot_camera_fov: f32,
    pub robot_camera_aspect: f32,
    pub robot_camera_near: f32,
    pub robot_camera_far: f32,
}

impl Default for ArenaConstants {
    /// Reference values used by the simulator.
    fn default() -> Self {
        Self {
            area_width: 8.1,
            area_height: 6.0,
            play_area_width: 6.1,
            play_area_height: 4.0,
            competition_area_width: 4.6,
            competition_area_height: 3.1,
            line_width: 0.05,
            backboard_width: 0.66,
            backboard_height: 0.8,
            backboard_depth: 0.01,
            basket_height: 0.5,
            basket_outer_radius: 0.16 / 2.0,
            basket_inner_radius: 0.148 / 2.0,
            ball_radius: 0.04 / 2.0,
            robot_radius: 0.35 / 2.0,
            robot_height: 0.15,
            robot_camera_x: 0.0,
            robot_camera_y: 0.0,
            robot_camera_z: 0.3,
            robot_camera_r: PI / 2.6,
            robot_camera_fov: 45.0,
            robot_camera_aspect: 16.0 / 9.0,
            robot_camera_near: 0.2,
            robot_camera_far: 5.0,
        }
    }
}

impl ArenaConstants {
    /// Rejects constants the viewer cannot render.
    ///
    /// Sizes must be positive and finite, the basket rim needs a positive
    /// thickness, and the robot camera needs a proper frustum. How the areas
    /// nest is up to the simulator; overlapping bands are drawn as given.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let positive = [
            ("AREA_WIDTH", self.area_width),
            ("AREA_HEIGHT", self.area_height),
            ("PLAY_AREA_WIDTH", self.play_area_width),
            ("PLAY_AREA_HEIGHT", self.play_area_height),
            ("COMPETITION_AREA_WIDTH", self.competition_area_width),
            ("COMPETITION_AREA_HEIGHT", self.competition_area_height),
            ("LINE_WIDTH", self.line_width),
            ("BACKBOARD_WIDTH", self.backboard_width),
            ("BACKBOARD_HEIGHT", self.backboard_height),
            ("BACKBOARD_DEPTH", self.backboard_depth),
            ("BASKET_HEIGHT", self.basket_height),
            ("BASKET_OUTER_RADIUS", self.basket_outer_radius),
            ("BASKET_INNER_RADIUS", self.basket_inner_radius),
            ("BALL_RADIUS", self.ball_radius),
            ("ROBOT_RADIUS", self.robot_radius),
            ("ROBOT_HEIGHT", self.robot_height),
            ("ROBOT_CAMERA_FOV", self.robot_camera_fov),
            ("ROBOT_CAMERA_ASPECT", self.robot_camera_aspect),
            ("ROBOT_CAMERA_NEAR", self.robot_camera_near),
            ("ROBOT_CAMERA_FAR", self.robot_camera_far),
        ];

        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }

        for (name, value) in [
            ("ROBOT_CAMERA_X", self.robot_camera_x),
            ("ROBOT_CAMERA_Y", self.robot_camera_y),
            ("ROBOT_CAMERA_Z", self.robot_camera_z),
            ("ROBOT_CAMERA_R", self.robot_camera_r),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }

        if self.basket_inner_radius >= self.basket_outer_radius {
            return Err(invalid(format!(
                "basket inner radius {} must be below outer radius {}",
                self.basket_inner_radius, self.basket_outer_radius
            )));
        }
        if self.robot_camera_fov >= 180.0 {
            return Err(invalid(format!(
                "ROBOT_CAMERA_FOV must be below 180 degrees, got {}",
                self.robot_camera_fov
            )));
        }
        if self.robot_camera_far <= self.robot_camera_near {
            return Err(invalid("robot camera far plane must lie beyond the near plane".into()));
        }

        Ok(())
    }

    /// Vertical field of view of the robot camera in radians.
    pub fn robot_camera_fov_radians(&self) -> f32 {
        self.robot_camera_fov.to_radians()
    }
}

fn invalid(reason: String) -> ProtocolError {
    ProtocolError::InvalidConstants(reason)
}

/// The two baskets at either end of the competition area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basket {
    Magenta,
    Blue,
}

impl Basket {
    pub const ALL: [Basket; 2] = [Basket::Magenta, Basket::Blue];

    /// -1 for the left (magenta) end, +1 for the right (blue) end.
    pub fn side(self) -> f32 {
        match self {
            Basket::Magenta => -1.0,
            Basket::Blue => 1.0,
        }
    }

    /// X coordinate of the basket's backboard plane.
    pub fn backboard_x(self, constants: &ArenaConstants) -> f32 {
        self.side() * constants.competition_area_width / 2.0
    }

    /// Heading of the basket group about Z; the blue basket faces back
    /// toward the center.
    pub fn heading(self) -> f32 {
        match self {
            Basket::Magenta => 0.0,
            Basket::Blue => PI,
        }
    }

    /// Center of the basket tube on the floor.
    pub fn tube_center_x(self, constants: &ArenaConstants) -> f32 {
        self.side() * (constants.competition_area_width / 2.0 - constants.basket_outer_radius)
    }

    pub fn name(self) -> &'static str {
        match self {
            Basket::Magenta => "magenta",
            Basket::Blue => "blue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        ArenaConstants::default().validate().unwrap();
    }

    #[test]
    fn test_parse_screaming_case_keys() {
        let json = serde_json::to_string(&ArenaConstants::default()).unwrap();
        assert!(json.contains("\"COMPETITION_AREA_WIDTH\""));
        assert!(json.contains("\"ROBOT_CAMERA_FAR\""));

        let parsed: ArenaConstants = serde_json::from_str(&json).unwrap();
        let reference = ArenaConstants::default();
        assert!((parsed.robot_camera_r - reference.robot_camera_r).abs() < 1e-6);
        assert!((parsed.basket_inner_radius - reference.basket_inner_radius).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_inverted_rim() {
        let constants = ArenaConstants {
            basket_inner_radius: 0.2,
            basket_outer_radius: 0.1,
            ..Default::default()
        };
        assert!(matches!(
            constants.validate(),
            Err(ProtocolError::InvalidConstants(_))
        ));
    }

    #[test]
    fn test_accepts_competition_area_wider_than_play_area() {
        let constants = ArenaConstants {
            competition_area_width: 10.0,
            competition_area_height: 6.0,
            ..Default::default()
        };
        constants.validate().unwrap();
    }

    #[test]
    fn test_rejects_zero_aspect() {
        let constants = ArenaConstants {
            robot_camera_aspect: 0.0,
            ..Default::default()
        };
        assert!(constants.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_camera_tilt() {
        let constants = ArenaConstants {
            robot_camera_r: f32::NAN,
            ..Default::default()
        };
        assert!(constants.validate().is_err());
    }

    #[test]
    fn test_basket_mirroring() {
        let constants = ArenaConstants {
            competition_area_width: 10.0,
            competition_area_height: 6.0,
            ..Default::default()
        };
        assert_eq!(Basket::Magenta.backboard_x(&constants), -5.0);
        assert_eq!(Basket::Blue.backboard_x(&constants), 5.0);
        assert_eq!(Basket::Magenta.heading(), 0.0);
        assert_eq!(Basket::Blue.heading(), PI);
    }
}
