//! Robot camera model.
//!
//! Reproduces the simulator's pinhole model for the camera mounted on each
//! robot: an OpenGL-style projection built from the camera intrinsics and a
//! local transform (offset, then tilt about the robot's X axis). Projected
//! points land in normalized screen coordinates where the visible image spans
//! `[-0.5, 0.5]` on both axes.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::{ArenaConstants, BallState, Basket, RobotState};

/// Projection and mounting of the robot camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotCameraModel {
    /// Camera space to clip space.
    pub projection: Mat4,
    /// Camera frame relative to the robot frame.
    pub mount: Mat4,
}

impl RobotCameraModel {
    pub fn new(constants: &ArenaConstants) -> Self {
        let projection = Mat4::perspective_rh_gl(
            constants.robot_camera_fov_radians(),
            constants.robot_camera_aspect,
            constants.robot_camera_near,
            constants.robot_camera_far,
        );
        let mount = Mat4::from_translation(Vec3::new(
            constants.robot_camera_x,
            constants.robot_camera_y,
            constants.robot_camera_z,
        )) * Mat4::from_rotation_x(constants.robot_camera_r);

        Self { projection, mount }
    }

    /// World transform of a robot's body frame.
    pub fn robot_frame(robot: &RobotState) -> Mat4 {
        Mat4::from_translation(Vec3::new(robot.x, robot.y, robot.z))
            * Mat4::from_rotation_z(robot.r)
    }

    /// World transform of the camera mounted on `robot`.
    pub fn camera_to_world(&self, robot: &RobotState) -> Mat4 {
        Self::robot_frame(robot) * self.mount
    }

    /// Projects a world point into the robot's image.
    ///
    /// Returns `None` when the point is behind the camera or outside the
    /// image.
    pub fn project(&self, robot: &RobotState, point: Vec3) -> Option<Vec2> {
        let view = self.camera_to_world(robot).inverse();
        let clip: Vec4 = self.projection * view * point.extend(1.0);

        if clip.w <= 0.0 {
            return None;
        }

        let screen = Vec2::new(clip.x, clip.y) / clip.w / 2.0;
        (screen.abs().max_element() < 0.5).then_some(screen)
    }

    /// Screen positions of the basket tubes the robot can see.
    pub fn visible_baskets(
        &self,
        robot: &RobotState,
        constants: &ArenaConstants,
    ) -> Vec<(Basket, Vec2)> {
        Basket::ALL
            .into_iter()
            .filter_map(|basket| {
                let center = Vec3::new(basket.tube_center_x(constants), 0.0, 0.0);
                self.project(robot, center).map(|screen| (basket, screen))
            })
            .collect()
    }

    /// Screen positions of the balls the robot can see.
    ///
    /// Balls outside the competition area are skipped, matching what the
    /// simulator reports to robot controllers.
    pub fn visible_balls(
        &self,
        robot: &RobotState,
        balls: &[BallState],
        constants: &ArenaConstants,
    ) -> Vec<Vec2> {
        let half_w = constants.competition_area_width / 2.0;
        let half_h = constants.competition_area_height / 2.0;

        balls
            .iter()
            .filter(|ball| {
                ball.x.abs() + constants.ball_radius <= half_w
                    && ball.y.abs() + constants.ball_radius <= half_h
            })
            .filter_map(|ball| self.project(robot, Vec3::new(ball.x, ball.y, ball.z)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> (RobotCameraModel, ArenaConstants) {
        let constants = ArenaConstants::default();
        (RobotCameraModel::new(&constants), constants)
    }

    #[test]
    fn test_camera_sits_above_robot() {
        let (model, constants) = model();
        let robot = RobotState::new("r0", 1.0, -0.5, 0.0, 0.7);
        let camera = model.camera_to_world(&robot);
        let origin = camera.transform_point3(Vec3::ZERO);

        assert!((origin - Vec3::new(1.0, -0.5, constants.robot_camera_z)).length() < 1e-5);
    }

    #[test]
    fn test_point_ahead_is_visible() {
        let (model, _) = model();
        // Heading 0: the tilted camera looks toward +Y.
        let robot = RobotState::new("r0", 0.0, 0.0, 0.0, 0.0);
        let screen = model.project(&robot, Vec3::new(0.0, 1.0, 0.0));

        let screen = screen.expect("point in front of the robot should be visible");
        assert!(screen.x.abs() < 1e-4);
    }

    #[test]
    fn test_point_behind_is_hidden() {
        let (model, _) = model();
        let robot = RobotState::new("r0", 0.0, 0.0, 0.0, 0.0);
        assert!(model.project(&robot, Vec3::new(0.0, -1.0, 0.0)).is_none());
    }

    #[test]
    fn test_heading_rotates_view() {
        let (model, _) = model();
        // Facing -X after a quarter turn.
        let robot = RobotState::new("r0", 0.0, 0.0, 0.0, std::f32::consts::FRAC_PI_2);
        assert!(model.project(&robot, Vec3::new(-1.0, 0.0, 0.0)).is_some());
        assert!(model.project(&robot, Vec3::new(0.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_visible_basket_from_center() {
        let (model, constants) = model();
        // Facing +X toward the blue basket.
        let robot = RobotState::new("r0", 0.8, 0.0, 0.0, -std::f32::consts::FRAC_PI_2);
        let baskets = model.visible_baskets(&robot, &constants);

        assert_eq!(baskets.len(), 1);
        assert_eq!(baskets[0].0, Basket::Blue);
    }

    #[test]
    fn test_balls_outside_competition_area_are_skipped() {
        let (model, constants) = model();
        let robot = RobotState::new("r0", 0.0, 0.0, 0.0, 0.0);
        let balls = vec![
            BallState::new("b0", 0.0, 1.0, constants.ball_radius),
            BallState::new("b1", 0.0, 2.5, constants.ball_radius),
        ];

        assert_eq!(model.visible_balls(&robot, &balls, &constants).len(), 1);
    }
}
