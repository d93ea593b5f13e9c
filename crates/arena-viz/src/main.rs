//! Arena Viewer
//!
//! Run with: cargo run -p arena-viz
//!
//! Examples:
//!   cargo run -p arena-viz -- --server 192.168.1.20:1337
//!   cargo run -p arena-viz -- --config viewer.toml --no-frustums

use arena_viz::config::ViewerConfig;
use arena_viz::ArenaVizPlugin;
use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;

/// Live 3D viewer for the robot basketball simulator
#[derive(Parser, Debug)]
#[command(name = "arena-viz")]
#[command(about = "Live 3D viewer for the robot basketball simulator")]
struct Args {
    /// Simulator address as host:port
    #[arg(long)]
    server: Option<String>,

    /// Path of the WebSocket endpoint
    #[arg(long)]
    path: Option<String>,

    /// Delay before reconnecting, in milliseconds
    #[arg(long)]
    reconnect_delay_ms: Option<u64>,

    /// TOML file with viewer settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with robot camera frustums hidden
    #[arg(long)]
    no_frustums: bool,

    /// Initial window width
    #[arg(long)]
    width: Option<f32>,

    /// Initial window height
    #[arg(long)]
    height: Option<f32>,
}

impl Args {
    fn into_config(self) -> ViewerConfig {
        let mut config = match &self.config {
            Some(path) => match ViewerConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to load {}: {}; using defaults", path.display(), e);
                    ViewerConfig::default()
                }
            },
            None => ViewerConfig::default(),
        };

        if let Some(server) = self.server {
            config.server = server;
        }
        if let Some(path) = self.path {
            config.path = path;
        }
        if let Some(delay) = self.reconnect_delay_ms {
            config.reconnect_delay_ms = delay;
        }
        if self.no_frustums {
            config.show_frustums = false;
        }
        if let Some(width) = self.width {
            config.window_width = width;
        }
        if let Some(height) = self.height {
            config.window_height = height;
        }
        config
    }
}

fn main() {
    let config = Args::parse().into_config();

    App::new()
        .insert_resource(config)
        .add_plugins(ArenaVizPlugin)
        .run();
}
