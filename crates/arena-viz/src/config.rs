//! Viewer configuration.
//!
//! Settings come from an optional TOML file; command-line flags override
//! individual values in `main.rs`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Simulator address used when nothing else is configured.
pub const DEFAULT_SERVER: &str = "127.0.0.1:1337";
/// Path of the simulator's WebSocket endpoint.
pub const DEFAULT_PATH: &str = "/ws";
/// Fixed delay between a lost connection and the next attempt.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 1000;

/// Runtime configuration for the viewer.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// `host:port` of the simulator.
    pub server: String,
    /// Path of the WebSocket endpoint on the server.
    pub path: String,
    /// Delay before reconnecting after the connection drops.
    pub reconnect_delay_ms: u64,
    /// Draw robot camera frustums on startup.
    pub show_frustums: bool,
    /// Initial window width in logical pixels.
    pub window_width: f32,
    /// Initial window height in logical pixels.
    pub window_height: f32,
    /// Width of each robot camera tile in logical pixels.
    pub tile_width: f32,
    /// Gap between robot camera tiles and the window edge.
    pub tile_margin: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.into(),
            path: DEFAULT_PATH.into(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            show_frustums: true,
            window_width: 1280.0,
            window_height: 720.0,
            tile_width: 200.0,
            tile_margin: 16.0,
        }
    }
}

impl ViewerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Full WebSocket URL of the simulator endpoint.
    pub fn server_url(&self) -> String {
        let path = self.path.trim_start_matches('/');
        format!("ws://{}/{}", self.server.trim_end_matches('/'), path)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
