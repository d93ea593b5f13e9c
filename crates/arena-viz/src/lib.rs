//! Arena viewer: live 3D view of the robot basketball simulator.

pub mod camera;
pub mod config;
pub mod connection;
pub mod field;
pub mod frustum;
pub mod plugin;
pub mod scene;
pub mod viewports;

pub use plugin::ArenaVizPlugin;
