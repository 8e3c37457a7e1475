//! WebSocket Game Server
//!
//! Async WebSocket server for multiplayer connections.
//! Accepts connections, parses client frames and forwards them to the
//! session coordinator, and writes the coordinator's messages back out.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

use crate::core::rng::{derive_world_seed, WorldRng};
use crate::game::movement::WithinBounds;
use crate::game::player::ConnectionId;
use crate::game::state::GameState;
use crate::network::protocol::{ClientEvent, ServerEvent};
use crate::network::session::{SessionCoordinator, SessionHandle};
use crate::world::generator::{generate_world, WorldGenConfig};
use crate::TILE_SIZE;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// World generation parameters.
    pub world: WorldGenConfig,
    /// Fixed world seed; `None` seeds from the clock.
    pub world_seed: Option<u64>,
    /// Reject moves that leave the world instead of trusting the client.
    pub bounded_moves: bool,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_connections: 1000,
            world: WorldGenConfig::default(),
            world_seed: None,
            bounded_moves: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// - `TILE_WORLD_BIND`: listen address (`0.0.0.0:3000`)
    /// - `TILE_WORLD_MAX_CONNECTIONS`: connection cap (`1000`)
    /// - `TILE_WORLD_SEED`: world seed, a number or any text label
    /// - `TILE_WORLD_SIZE`: world side length in cells (`50`)
    /// - `TILE_WORLD_BOUNDED_MOVES`: `1`/`true` to reject out-of-world moves
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any variable source, with the same rules
    /// as [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse_var::<SocketAddr, _>(&lookup, "TILE_WORLD_BIND") {
            config.bind_addr = addr;
        }
        if let Some(max) = parse_var::<usize, _>(&lookup, "TILE_WORLD_MAX_CONNECTIONS") {
            config.max_connections = max;
        }
        if let Some(size) = parse_var::<i32, _>(&lookup, "TILE_WORLD_SIZE") {
            if size > 0 {
                config.world = WorldGenConfig::with_size(size);
            } else {
                warn!("Ignoring non-positive TILE_WORLD_SIZE={}", size);
            }
        }
        config.world_seed = lookup("TILE_WORLD_SEED").map(|label| derive_world_seed(&label));
        config.bounded_moves = lookup("TILE_WORLD_BOUNDED_MOVES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        config
    }

    /// Generate the world and wrap it in fresh game state.
    pub fn build_state(&self) -> GameState {
        let mut rng = match self.world_seed {
            Some(seed) => WorldRng::new(seed),
            None => WorldRng::from_entropy(),
        };
        let world = generate_world(&self.world, &mut rng);
        let state = GameState::new(world, self.world.spawn_point());

        if self.bounded_moves {
            let side = f64::from(self.world.size) * TILE_SIZE;
            state.with_validator(Box::new(WithinBounds { width: side, height: side }))
        } else {
            state
        }
    }
}

/// Look up and parse one variable, warning on bad values.
fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),
}

/// One reserved connection slot, released when dropped.
struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    /// Reserve a slot, or `None` if `max` are already taken.
    fn acquire(active: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| Self(active.clone()))
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Connected client bookkeeping.
struct ConnectedClient {
    /// Remote address.
    addr: SocketAddr,
    /// Connection time.
    connected_at: Instant,
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Bound listener.
    listener: TcpListener,
    /// Submitter to the session coordinator.
    session: SessionHandle,
    /// Coordinator task.
    coordinator: JoinHandle<SessionCoordinator>,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<ConnectionId, ConnectedClient>>>,
    /// Sockets holding a slot, including those still handshaking.
    active: Arc<AtomicUsize>,
    /// Shutdown flag; stays set once raised.
    shutdown_tx: watch::Sender<bool>,
}

impl GameServer {
    /// Generate the world, start the session coordinator, and bind the
    /// listener. No connection is accepted until [`GameServer::run`].
    pub async fn bind(config: ServerConfig) -> Result<Self, GameServerError> {
        let state = config.build_state();
        let listener = TcpListener::bind(config.bind_addr).await?;
        let (session, coordinator) = SessionCoordinator::new(state).spawn();
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            listener,
            session,
            coordinator,
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            active: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, GameServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept loop until [`GameServer::shutdown`] is called.
    ///
    /// Returns immediately if shutdown was already requested.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        info!("Game server v{} listening on {}", self.config.version, self.local_addr()?);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let Some(slot) = ConnectionSlot::acquire(&self.active, self.config.max_connections) else {
                                warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            };

                            debug!("New connection from {}", addr);
                            self.handle_connection(stream, addr, slot);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.wait_for(|stop| *stop) => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr, slot: ConnectionSlot) {
        let clients = self.clients.clone();
        let session = self.session.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let _slot = slot;

            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let id = ConnectionId::new();
            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<ServerEvent>();

            // Register client
            {
                let mut clients = clients.write().await;
                clients.insert(id, ConnectedClient {
                    addr,
                    connected_at: Instant::now(),
                });
            }
            session.connect(id, msg_tx);

            // Spawn message sender task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize {}: {}", msg.name(), e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                let _ = ws_sender.close().await;
            });

            // Handle incoming messages
            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                match ClientEvent::from_json(&text) {
                                    Ok(event) => session.event(id, event),
                                    Err(e) => debug!("Invalid message from {}: {}", addr, e),
                                }
                            }
                            Some(Ok(Message::Binary(data))) => {
                                match ClientEvent::from_slice(&data) {
                                    Ok(event) => session.event(id, event),
                                    Err(e) => debug!("Invalid binary message from {}: {}", addr, e),
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                warn!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.wait_for(|stop| *stop) => {
                        break;
                    }
                }
            }

            // Cleanup: the coordinator drops its sender, which ends the writer
            session.disconnect(id);
            let _ = sender_task.await;

            let removed = clients.write().await.remove(&id);
            if let Some(client) = removed {
                info!(
                    "Client {} ({}) cleaned up after {:.1}s",
                    id,
                    client.addr,
                    client.connected_at.elapsed().as_secs_f64()
                );
            }
        });
    }

    /// Shutdown the server: stop accepting and close every live connection.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Get active connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Whether the session coordinator task is still running.
    pub fn coordinator_running(&self) -> bool {
        !self.coordinator.is_finished()
    }
}
