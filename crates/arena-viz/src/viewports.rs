//! Robot camera tiles along the bottom of the window.
//!
//! Every known robot gets a fixed-width tile, laid out left to right in the
//! order robots first appeared. Each robot camera renders only inside its tile
//! with its own depth pass, on top of the spectator view.

use bevy::prelude::*;
use bevy::render::camera::Viewport;
use bevy::window::PrimaryWindow;

use crate::config::ViewerConfig;
use crate::scene::ArenaScene;

/// Plugin for robot camera tile layout.
pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, layout_robot_viewports);
    }
}

/// Tile sizing shared by every robot camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    /// Tile width in logical pixels.
    pub width: f32,
    /// Gap between tiles and from the window edges.
    pub margin: f32,
    /// Robot camera aspect ratio, width over height.
    pub aspect: f32,
}

impl TileLayout {
    pub fn height(&self) -> f32 {
        self.width / self.aspect
    }

    /// Logical rectangle of tile `index` in a window of `window` logical size,
    /// origin top-left. `None` if the tile would not fit entirely.
    pub fn tile(&self, index: usize, window: Vec2) -> Option<Rect> {
        if self.width <= 0.0 || self.aspect <= 0.0 || !self.aspect.is_finite() {
            return None;
        }

        let height = self.height();
        let x = self.margin + index as f32 * (self.width + self.margin);
        let y = window.y - height - self.margin;

        if x < 0.0 || y < 0.0 || x + self.width > window.x {
            return None;
        }

        Some(Rect::new(x, y, x + self.width, y + height))
    }
}

/// Converts a logical tile into a physical viewport inside `physical` bounds.
pub fn to_viewport(rect: Rect, scale: f32, physical: UVec2) -> Option<Viewport> {
    let position = (rect.min * scale).floor().as_uvec2();
    if position.x >= physical.x || position.y >= physical.y {
        return None;
    }

    let size = (rect.size() * scale).floor().as_uvec2().max(UVec2::ONE);
    let size = size.min(physical - position);

    Some(Viewport {
        physical_position: position,
        physical_size: size,
        ..default()
    })
}

fn layout_robot_viewports(
    scene: Res<ArenaScene>,
    config: Res<ViewerConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut Camera>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(constants) = scene.constants() else {
        return;
    };

    let layout = TileLayout {
        width: config.tile_width,
        margin: config.tile_margin,
        aspect: constants.robot_camera_aspect,
    };
    let logical = Vec2::new(window.width(), window.height());
    let physical = UVec2::new(window.physical_width(), window.physical_height());

    for (index, robot) in scene.robots().enumerate() {
        let Ok(mut camera) = cameras.get_mut(robot.camera) else {
            continue;
        };

        let viewport = layout
            .tile(index, logical)
            .and_then(|rect| to_viewport(rect, window.scale_factor(), physical));
        let active = viewport.is_some();

        if camera.is_active != active {
            camera.is_active = active;
        }
        if let Some(viewport) = viewport {
            let unchanged = camera.viewport.as_ref().is_some_and(|v| {
                v.physical_position == viewport.physical_position
                    && v.physical_size == viewport.physical_size
            });
            if !unchanged {
                camera.viewport = Some(viewport);
            }
        }
    }
}
