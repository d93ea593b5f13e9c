//! Spectator camera: orbit controller and user input handling.
//!
//! The camera orbits a fixed target at the field center. Left-drag rotates,
//! the wheel dollies in and out. The world is Z-up, so the polar angle is
//! measured from +Z and clamped to stay above the floor.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Plugin for the spectator camera.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitController>()
            .add_systems(Startup, setup_spectator)
            .add_systems(
                Update,
                (handle_orbit_input, apply_orbit_to_transform).chain(),
            );
    }
}

/// Spectator field of view, degrees.
const SPECTATOR_FOV: f32 = 75.0;
const SPECTATOR_NEAR: f32 = 0.1;
const SPECTATOR_FAR: f32 = 1000.0;

/// Mouse-wheel pixels that count as one line step.
const PIXELS_PER_LINE: f32 = 100.0;

/// Orbit limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConstraints {
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitConstraints {
    fn default() -> Self {
        Self {
            min_polar: 0.0,
            max_polar: FRAC_PI_2 - 0.05,
            min_distance: 1.0,
            max_distance: 10.0,
        }
    }
}

/// Spherical-coordinate camera controller around a target.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitController {
    pub target: Vec3,
    pub distance: f32,
    /// Angle around Z, measured from +X.
    pub azimuth: f32,
    /// Angle down from +Z.
    pub polar: f32,
    pub constraints: OrbitConstraints,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        let mut controller = Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            polar: 0.0,
            constraints: OrbitConstraints::default(),
            rotate_speed: 0.5,
            zoom_speed: 1.0,
        };
        controller.look_from(Vec3::new(0.0, -5.0, 5.0));
        controller
    }
}

impl OrbitController {
    /// Moves the camera to `position`, keeping the current target.
    pub fn look_from(&mut self, position: Vec3) {
        let offset = position - self.target;
        self.distance = offset.length();
        self.azimuth = offset.y.atan2(offset.x);
        self.polar = if self.distance > 0.0 {
            (offset.z / self.distance).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        self.clamp();
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target
            + self.distance * Vec3::new(sin_polar * cos_az, sin_polar * sin_az, cos_polar)
    }

    /// Camera transform looking at the target with +Z as up.
    ///
    /// Built from the angles directly so looking straight down stays defined.
    pub fn transform(&self) -> Transform {
        let rotation =
            Quat::from_rotation_z(self.azimuth + FRAC_PI_2) * Quat::from_rotation_x(self.polar);
        Transform::from_translation(self.position()).with_rotation(rotation)
    }

    /// Rotates by a mouse drag of `delta` pixels in a viewport `height` tall.
    ///
    /// Dragging the full viewport height turns one full circle at speed 1.
    pub fn rotate(&mut self, delta: Vec2, height: f32) {
        if height <= 0.0 {
            return;
        }
        let scale = TAU / height * self.rotate_speed;
        self.azimuth = (self.azimuth - delta.x * scale).rem_euclid(TAU);
        self.polar -= delta.y * scale;
        self.clamp();
    }

    /// Dollies by `steps` wheel lines; positive steps move closer.
    pub fn zoom(&mut self, steps: f32) {
        let scale = 0.95f32.powf(self.zoom_speed * steps);
        self.distance *= scale;
        self.clamp();
    }

    fn clamp(&mut self) {
        let c = &self.constraints;
        self.polar = self.polar.clamp(c.min_polar, c.max_polar.min(PI));
        self.distance = self.distance.clamp(c.min_distance, c.max_distance);
    }
}

/// Marker component for the spectator camera.
#[derive(Component)]
pub struct SpectatorCamera;

fn setup_spectator(mut commands: Commands, controller: Res<OrbitController>) {
    commands.spawn((
        Camera3dBundle {
            camera: Camera {
                order: 0,
                ..default()
            },
            projection: Projection::Perspective(PerspectiveProjection {
                fov: SPECTATOR_FOV.to_radians(),
                near: SPECTATOR_NEAR,
                far: SPECTATOR_FAR,
                ..default()
            }),
            transform: controller.transform(),
            ..default()
        },
        SpectatorCamera,
    ));
}

fn handle_orbit_input(
    mut controller: ResMut<OrbitController>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    if mouse_button.pressed(MouseButton::Left) {
        let delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
        if delta != Vec2::ZERO {
            controller.rotate(delta, window.height());
        }
    } else {
        mouse_motion.clear();
    }

    for ev in scroll.read() {
        let steps = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / PIXELS_PER_LINE,
        };
        controller.zoom(steps);
    }
}

fn apply_orbit_to_transform(
    controller: Res<OrbitController>,
    mut cameras: Query<&mut Transform, With<SpectatorCamera>>,
) {
    if !controller.is_changed() {
        return;
    }
    for mut transform in cameras.iter_mut() {
        *transform = controller.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_look_from_round_trips_position() {
        let mut controller = OrbitController::default();
        controller.look_from(Vec3::new(0.0, -3.1, 3.1));

        assert_close(controller.position(), Vec3::new(0.0, -3.1, 3.1));
        assert!((controller.polar - PI / 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_faces_target() {
        let mut controller = OrbitController::default();
        controller.look_from(Vec3::new(2.0, 1.0, 3.0));

        let transform = controller.transform();
        let expected = (controller.target - transform.translation).normalize();
        assert_close(*transform.forward(), expected);
        // Camera stays upright.
        assert!(transform.up().z >= 0.0);
    }

    #[test]
    fn test_straight_down_is_defined() {
        let mut controller = OrbitController::default();
        controller.look_from(Vec3::new(0.0, 0.0, 4.0));

        let transform = controller.transform();
        assert_close(*transform.forward(), Vec3::NEG_Z);
    }

    #[test]
    fn test_polar_clamped_above_floor() {
        let mut controller = OrbitController::default();
        controller.rotate(Vec2::new(0.0, -10_000.0), 720.0);

        assert!(controller.polar <= FRAC_PI_2 - 0.05 + 1e-6);
        assert!(controller.position().z > 0.0);

        controller.rotate(Vec2::new(0.0, 10_000.0), 720.0);
        assert_eq!(controller.polar, 0.0);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut controller = OrbitController::default();
        controller.zoom(1000.0);
        assert_eq!(controller.distance, 1.0);

        controller.zoom(-1000.0);
        assert_eq!(controller.distance, 10.0);
    }

    #[test]
    fn test_zoom_in_moves_closer() {
        let mut controller = OrbitController::default();
        let before = controller.distance;
        controller.zoom(1.0);
        assert!(controller.distance < before);
    }

    #[test]
    fn test_rotate_ignores_empty_viewport() {
        let mut controller = OrbitController::default();
        let before = controller.clone();
        controller.rotate(Vec2::new(50.0, 50.0), 0.0);
        assert_eq!(controller, before);
    }
}
