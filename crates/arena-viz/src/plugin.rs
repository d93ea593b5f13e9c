//! Main viewer plugin that ties all systems together.

use bevy::prelude::*;

use crate::camera::CameraPlugin;
use crate::config::ViewerConfig;
use crate::connection::ConnectionPlugin;
use crate::frustum::FrustumPlugin;
use crate::scene::ScenePlugin;
use crate::viewports::ViewportPlugin;

/// Main plugin for the arena viewer.
///
/// Sets up the window from the `ViewerConfig` resource (inserting defaults
/// if the app has none) and adds all sub-plugins.
pub struct ArenaVizPlugin;

impl Plugin for ArenaVizPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<ViewerConfig>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(config.clone())
            .insert_resource(ClearColor(Color::BLACK))
            .add_plugins(DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Arena Viewer".into(),
                    resolution: (config.window_width, config.window_height).into(),
                    ..default()
                }),
                ..default()
            }))
            .add_plugins((
                ConnectionPlugin,
                CameraPlugin,
                ScenePlugin,
                ViewportPlugin,
                FrustumPlugin,
            ));
    }
}
