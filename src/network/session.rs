//! Session Coordination
//!
//! Owns the game state and the set of live connections. Connection tasks
//! never touch state directly: they submit [`SessionCommand`]s to one
//! coordinator task, which handles each command to completion (including
//! queueing every outbound message) before taking the next. That single
//! ordered stream is what keeps concurrent clients from racing on a cell.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::game::events::{Audience, GameEvent};
use crate::game::interact::interact;
use crate::game::player::ConnectionId;
use crate::game::state::GameState;
use crate::network::protocol::{ClientEvent, ServerEvent};

/// Outbound message queue of one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Work submitted to the coordinator.
#[derive(Debug)]
pub enum SessionCommand {
    /// A connection opened; `sender` is its outbound queue.
    Connect {
        /// New connection.
        id: ConnectionId,
        /// Outbound queue for the connection.
        sender: EventSender,
    },
    /// A connection sent an event.
    Event {
        /// Sending connection.
        id: ConnectionId,
        /// Parsed event.
        event: ClientEvent,
    },
    /// A connection closed.
    Disconnect {
        /// Closed connection.
        id: ConnectionId,
    },
}

// =============================================================================
// CONNECTION SET
// =============================================================================

/// Live connections and their outbound queues.
///
/// Queues are unbounded so a broadcast never suspends the coordinator. A
/// send to a connection whose writer already stopped is dropped; its
/// `Disconnect` command is on the way.
///
/// Nothing caps a queue: a client that stops reading while its socket stays
/// open keeps every broadcast buffered in memory until the connection
/// closes. Per-connection write timeouts or a bounded queue that
/// disconnects laggards would close that gap.
#[derive(Debug, Default)]
pub struct ConnectionSet {
    connections: BTreeMap<ConnectionId, EventSender>,
}

impl ConnectionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection.
    pub fn insert(&mut self, id: ConnectionId, sender: EventSender) {
        self.connections.insert(id, sender);
    }

    /// Remove a connection. Returns whether it was present.
    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        self.connections.remove(id).is_some()
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether there are no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send to one connection.
    pub fn send_to(&self, id: &ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.connections.get(id) {
            if sender.send(event).is_err() {
                debug!("Outbound queue closed for {}", id);
            }
        }
    }

    /// Send to every connection.
    pub fn send_to_all(&self, event: &ServerEvent) {
        for (id, sender) in &self.connections {
            if sender.send(event.clone()).is_err() {
                debug!("Outbound queue closed for {}", id);
            }
        }
    }

    /// Send to every connection except `excluded`.
    pub fn send_to_others(&self, excluded: &ConnectionId, event: &ServerEvent) {
        for (id, sender) in &self.connections {
            if id == excluded {
                continue;
            }
            if sender.send(event.clone()).is_err() {
                debug!("Outbound queue closed for {}", id);
            }
        }
    }

    /// Deliver a game event to its audience.
    pub fn dispatch(&self, event: GameEvent) {
        let audience = event.audience;
        let message = ServerEvent::from(event);
        match audience {
            Audience::All => self.send_to_all(&message),
            Audience::Others(excluded) => self.send_to_others(&excluded, &message),
            Audience::Only(target) => self.send_to(&target, message),
        }
    }
}

// =============================================================================
// COORDINATOR
// =============================================================================

/// Serializes all state mutation and fans results out to connections.
pub struct SessionCoordinator {
    state: GameState,
    connections: ConnectionSet,
}

impl SessionCoordinator {
    /// Create a coordinator over existing game state.
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            connections: ConnectionSet::new(),
        }
    }

    /// Read access to the game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Number of registered players.
    pub fn player_count(&self) -> usize {
        self.state.players.len()
    }

    /// Number of objects in the world.
    pub fn object_count(&self) -> usize {
        self.state.world.len()
    }

    /// Handle one command to completion.
    pub fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Connect { id, sender } => self.connect(id, sender),
            SessionCommand::Event { id, event } => self.handle_event(id, event),
            SessionCommand::Disconnect { id } => self.disconnect(id),
        }
    }

    /// Register a player, send it the world, and announce it to the rest.
    pub fn connect(&mut self, id: ConnectionId, sender: EventSender) {
        let announcements = match self.state.join(id) {
            Ok(events) => events,
            Err(e) => {
                warn!("Rejecting connection: {}", e);
                return;
            }
        };

        self.connections.insert(id, sender);
        self.connections.send_to(&id, ServerEvent::CurrentWorld(self.state.world.snapshot()));
        self.connections.send_to(&id, ServerEvent::CurrentPlayers(self.state.players.snapshot()));
        self.dispatch_all(announcements);

        info!("Player joined: {} ({} online)", id, self.state.players.len());
    }

    /// Apply a client event from `id`.
    pub fn handle_event(&mut self, id: ConnectionId, event: ClientEvent) {
        let events = match event {
            ClientEvent::PlayerMove(movement) => self.state.move_player(id, movement.to_move_update()),
            ClientEvent::Interact(request) => interact(&mut self.state, id, request.to_intent()),
        };
        self.dispatch_all(events);
    }

    /// Drop the connection and its player, and tell everyone left.
    pub fn disconnect(&mut self, id: ConnectionId) {
        self.connections.remove(&id);

        let events = self.state.leave(id);
        if events.is_empty() {
            debug!("Disconnect for unknown player {}", id);
            return;
        }
        self.dispatch_all(events);

        info!("Player left: {} ({} online)", id, self.state.players.len());
    }

    fn dispatch_all(&self, events: Vec<GameEvent>) {
        for event in events {
            self.connections.dispatch(event);
        }
    }

    /// Drain commands until every [`SessionHandle`] is dropped.
    ///
    /// Returns the coordinator so callers can inspect final state.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) -> Self {
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        debug!("Session coordinator stopped");
        self
    }

    /// Spawn the coordinator task and return a handle for submitting commands.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<SessionCoordinator>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (SessionHandle { commands: tx }, task)
    }
}

/// Cloneable submitter of commands to a running coordinator.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Announce a new connection.
    pub fn connect(&self, id: ConnectionId, sender: EventSender) {
        self.submit(SessionCommand::Connect { id, sender });
    }

    /// Forward a client event.
    pub fn event(&self, id: ConnectionId, event: ClientEvent) {
        self.submit(SessionCommand::Event { id, event });
    }

    /// Announce a closed connection.
    pub fn disconnect(&self, id: ConnectionId) {
        self.submit(SessionCommand::Disconnect { id });
    }

    fn submit(&self, command: SessionCommand) {
        if self.commands.send(command).is_err() {
            warn!("Session coordinator is gone; command dropped");
        }
    }
}
