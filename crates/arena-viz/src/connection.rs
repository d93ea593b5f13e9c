//! Connection manager: WebSocket link to the simulator.
//!
//! The link runs on its own thread with a single-threaded tokio runtime and
//! hands everything it hears to Bevy through an unbounded channel. Every
//! closure, clean or not, and every failed connect attempt produce exactly one
//! `LinkEvent::Closed`, followed by a fixed delay and a fresh attempt. There is
//! no backoff and no retry limit.
//!
//! On the Bevy side, `poll_link` drains the channel once per frame and turns
//! link events into an ordered stream of `ArenaCommand`s for the scene.

use arena_events::{decode_envelope, ArenaConstants, ArenaMessage, WorldState};
use bevy::prelude::*;
use futures_util::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::config::ViewerConfig;

/// Plugin for the simulator connection.
pub struct ConnectionPlugin;

impl Plugin for ConnectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConnectionStatus>()
            .add_event::<ArenaCommand>()
            .add_systems(Startup, start_link)
            .add_systems(Update, poll_link);
    }
}

/// What the link thread reports, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Message(String),
    Closed,
}

/// Errors raised by the transport.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),
}

/// Opens sessions to a server.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Session: Session;

    async fn connect(&mut self, url: &str) -> Result<Self::Session, LinkError>;
}

/// An open message channel yielding text frames.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Next text frame. `None` once the channel has closed.
    async fn next_text(&mut self) -> Option<Result<String, LinkError>>;
}

/// `Connector` backed by tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

pub struct WsSession {
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
}

impl Connector for WsConnector {
    type Session = WsSession;

    async fn connect(&mut self, url: &str) -> Result<WsSession, LinkError> {
        let (stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|source| LinkError::Connect {
                url: url.to_owned(),
                source,
            })?;
        Ok(WsSession { stream })
    }
}

impl Session for WsSession {
    async fn next_text(&mut self) -> Option<Result<String, LinkError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(_)) => return None,
                // Binary, ping and pong frames carry nothing for us.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Runs the connect / forward / retry loop.
///
/// Returns only once the receiving side of `events` has been dropped.
pub async fn run_link<C: Connector>(
    mut connector: C,
    url: String,
    retry_delay: Duration,
    events: mpsc::UnboundedSender<LinkEvent>,
) {
    loop {
        match connector.connect(&url).await {
            Ok(mut session) => {
                tracing::info!("Connected to {}", url);
                if events.send(LinkEvent::Connected).is_err() {
                    return;
                }

                while let Some(frame) = session.next_text().await {
                    match frame {
                        Ok(text) => {
                            if events.send(LinkEvent::Message(text)).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Connection error: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => tracing::warn!("{}", e),
        }

        if events.send(LinkEvent::Closed).is_err() {
            return;
        }

        tracing::info!(
            "Connection lost! Reconnecting in {} ms...",
            retry_delay.as_millis()
        );
        tokio::time::sleep(retry_delay).await;
        tracing::info!("Reconnecting...");
    }
}

/// Spawns the link thread for the configured server.
pub fn spawn_link(config: &ViewerConfig) -> mpsc::UnboundedReceiver<LinkEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let url = config.server_url();
    let retry_delay = config.reconnect_delay();

    let spawned = std::thread::Builder::new()
        .name("arena-link".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to build tokio runtime for the link: {}", e);
                    return;
                }
            };
            rt.block_on(run_link(WsConnector, url, retry_delay, tx));
        });

    if let Err(e) = spawned {
        tracing::error!("Failed to spawn link thread: {}", e);
    }

    rx
}

/// Scene commands derived from the link, in arrival order.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ArenaCommand {
    /// Build the static scene for a new connection.
    Setup(ArenaConstants),
    /// Apply a state snapshot.
    Update(WorldState),
    /// The connection is gone; release everything.
    Teardown,
}

/// Connection state as seen from the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Connecting,
    Connected,
    Lost,
}

/// Connection bookkeeping.
#[derive(Resource, Debug, Default)]
pub struct ConnectionStatus {
    pub state: LinkState,
    /// Successful connections so far.
    pub connections: u32,
    /// Closure events so far, including failed attempts.
    pub losses: u32,
    /// Messages that failed to decode.
    pub dropped_messages: u32,
    /// Messages with a tag this viewer does not handle.
    pub ignored_messages: u32,
}

/// Receiving end of the link channel.
#[derive(Resource)]
pub struct LinkReceiver(pub mpsc::UnboundedReceiver<LinkEvent>);

fn start_link(mut commands: Commands, config: Res<ViewerConfig>) {
    tracing::info!("Connecting to {}", config.server_url());
    commands.insert_resource(LinkReceiver(spawn_link(&config)));
}

/// Drains the link channel and emits scene commands.
pub fn poll_link(
    receiver: Option<ResMut<LinkReceiver>>,
    mut status: ResMut<ConnectionStatus>,
    mut commands: EventWriter<ArenaCommand>,
) {
    let Some(mut receiver) = receiver else {
        return;
    };

    while let Ok(event) = receiver.0.try_recv() {
        match event {
            LinkEvent::Connected => {
                status.state = LinkState::Connected;
                status.connections += 1;
            }
            LinkEvent::Message(text) => match decode_envelope(&text) {
                Ok(Some(message)) => {
                    tracing::trace!("Received {} message", message.tag());
                    match message {
                        ArenaMessage::Constants(constants) => {
                            tracing::info!("Received arena constants");
                            tracing::debug!("{:?}", constants);
                            commands.send(ArenaCommand::Setup(constants));
                        }
                        ArenaMessage::State(state) => {
                            commands.send(ArenaCommand::Update(state));
                        }
                    }
                }
                Ok(None) => {
                    status.ignored_messages += 1;
                    tracing::debug!("Ignoring message with unknown type");
                }
                Err(e) => {
                    status.dropped_messages += 1;
                    tracing::warn!("Dropping message: {}", e);
                }
            },
            LinkEvent::Closed => {
                status.state = LinkState::Lost;
                status.losses += 1;
                commands.send(ArenaCommand::Teardown);
            }
        }
    }
}
