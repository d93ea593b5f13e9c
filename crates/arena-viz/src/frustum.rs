//! Wireframe frustums of the robot cameras, drawn with gizmos.

use bevy::prelude::*;

use crate::config::ViewerConfig;
use crate::scene::{ArenaScene, RobotCamera};

/// Plugin for frustum gizmos.
pub struct FrustumPlugin;

impl Plugin for FrustumPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrustumSettings>()
            .add_systems(Startup, init_frustum_settings)
            .add_systems(Update, (toggle_frustums, draw_frustums).chain());
    }
}

const FRUSTUM_COLOR: Color = Color::srgb(1.0, 0.85, 0.2);

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrustumSettings {
    pub visible: bool,
}

impl Default for FrustumSettings {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Corners of a perspective frustum in camera space, looking down -Z.
///
/// Near plane first, then far, each counter-clockwise from bottom-left.
pub fn frustum_corners(fov: f32, aspect: f32, near: f32, far: f32) -> [Vec3; 8] {
    let tan = (fov / 2.0).tan();
    let plane = |d: f32| {
        let half_h = d * tan;
        let half_w = half_h * aspect;
        [
            Vec3::new(-half_w, -half_h, -d),
            Vec3::new(half_w, -half_h, -d),
            Vec3::new(half_w, half_h, -d),
            Vec3::new(-half_w, half_h, -d),
        ]
    };
    let [n0, n1, n2, n3] = plane(near);
    let [f0, f1, f2, f3] = plane(far);
    [n0, n1, n2, n3, f0, f1, f2, f3]
}

/// Index pairs of the 12 frustum edges.
const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

fn init_frustum_settings(config: Res<ViewerConfig>, mut settings: ResMut<FrustumSettings>) {
    settings.visible = config.show_frustums;
}

fn toggle_frustums(keys: Res<ButtonInput<KeyCode>>, mut settings: ResMut<FrustumSettings>) {
    if keys.just_pressed(KeyCode::KeyF) {
        settings.visible = !settings.visible;
        tracing::debug!("Frustums {}", if settings.visible { "on" } else { "off" });
    }
}

fn draw_frustums(
    settings: Res<FrustumSettings>,
    scene: Res<ArenaScene>,
    cameras: Query<&GlobalTransform, With<RobotCamera>>,
    mut gizmos: Gizmos,
) {
    if !settings.visible {
        return;
    }
    let Some(c) = scene.constants() else {
        return;
    };

    let corners = frustum_corners(
        c.robot_camera_fov_radians(),
        c.robot_camera_aspect,
        c.robot_camera_near,
        c.robot_camera_far,
    );

    for transform in cameras.iter() {
        let world = corners.map(|p| transform.transform_point(p));
        for (a, b) in EDGES {
            gizmos.line(world[a], world[b], FRUSTUM_COLOR);
        }
    }
}
