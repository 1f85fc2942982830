//! Arena Session
//!
//! The single writer of the arena. [`ArenaSession`] owns the `GameState` and
//! the [`SessionRouter`]; connection tasks only ever reach it through
//! [`SessionInput`]s on one queue, and the world loop drives its ticks.
//!
//! Every send is a non-blocking `try_send`: a full per-connection queue drops
//! the message, a closed one is cleaned up when its `Disconnected` arrives.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use chrono::Utc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::command::{apply_command, Command, CommandOutcome};
use crate::game::snapshot::StateSnapshot;
use crate::game::state::{GameState, PlayerSlot};
use crate::game::tick::{tick, TickResult};
use crate::network::protocol::{ClientMessage, ErrorCode, LegacyFrame, Role, ServerMessage};

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// Outbound message queue of one connection.
pub type Outbound = mpsc::Sender<ServerMessage>;

/// Events delivered to the session by connection tasks.
#[derive(Debug)]
pub enum SessionInput {
    /// A WebSocket handshake completed.
    Connected {
        /// Connection identifier
        id: ConnectionId,
        /// Peer address
        addr: SocketAddr,
        /// Queue drained by the connection's writer task
        sender: Outbound,
    },
    /// A decoded tagged message.
    Message {
        /// Sender
        id: ConnectionId,
        /// Message
        message: ClientMessage,
    },
    /// A decoded frame of the old relay protocol.
    Legacy {
        /// Sender
        id: ConnectionId,
        /// Frame
        frame: LegacyFrame,
    },
    /// A frame that could not be decoded.
    Malformed {
        /// Sender
        id: ConnectionId,
        /// Decode error
        error: String,
    },
    /// The connection closed.
    Disconnected {
        /// Connection identifier
        id: ConnectionId,
    },
}

// =============================================================================
// ROUTER
// =============================================================================

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Requested slot is held by another connection.
    #[error("{0} is already taken")]
    SlotTaken(PlayerSlot),

    /// Both player slots are held.
    #[error("no free player slot")]
    NoFreeSlot,

    /// Another connection is the display.
    #[error("a display is already registered")]
    DisplayTaken,

    /// The connection already controls a slot.
    #[error("already playing as {0}")]
    AlreadyPlaying(PlayerSlot),

    /// Command from a connection that holds no slot.
    #[error("connection does not control a player")]
    NotAPlayer,

    /// The connection never completed registration with the session.
    #[error("unknown connection")]
    UnknownConnection,
}

impl SessionError {
    /// Wire error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::SlotTaken(_) => ErrorCode::SlotTaken,
            SessionError::NoFreeSlot => ErrorCode::NoFreeSlot,
            SessionError::DisplayTaken => ErrorCode::DisplayTaken,
            SessionError::AlreadyPlaying(_) => ErrorCode::AlreadyPlaying,
            SessionError::NotAPlayer | SessionError::UnknownConnection => ErrorCode::NotAPlayer,
        }
    }
}

/// A role slot that at most one connection can hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Seat {
    /// Nobody holds it.
    #[default]
    Vacant,
    /// Held by this connection.
    Occupied(ConnectionId),
}

impl Seat {
    /// Whether `id` holds this seat.
    pub fn is_held_by(&self, id: ConnectionId) -> bool {
        *self == Seat::Occupied(id)
    }

    /// Whether nobody holds this seat.
    pub fn is_vacant(&self) -> bool {
        matches!(self, Seat::Vacant)
    }

    /// The holding connection.
    pub fn holder(&self) -> Option<ConnectionId> {
        match self {
            Seat::Vacant => None,
            Seat::Occupied(id) => Some(*id),
        }
    }
}

/// A live connection.
#[derive(Debug, Clone)]
struct Connection {
    addr: SocketAddr,
    sender: Outbound,
}

/// Roles a connection held when it was released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Released {
    /// It was the display
    pub display: bool,
    /// It controlled this slot
    pub player: Option<PlayerSlot>,
    /// It was subscribed to logs
    pub log: bool,
}

/// Maps connections to roles and delivers outbound messages.
#[derive(Debug, Default)]
pub struct SessionRouter {
    connections: BTreeMap<ConnectionId, Connection>,
    display: Seat,
    players: [Seat; 2],
    logs: Vec<ConnectionId>,
}

impl SessionRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection. It holds no role yet.
    pub fn connect(&mut self, id: ConnectionId, addr: SocketAddr, sender: Outbound) {
        self.connections.insert(id, Connection { addr, sender });
    }

    /// Peer address of a connection.
    pub fn addr(&self, id: ConnectionId) -> Option<SocketAddr> {
        self.connections.get(&id).map(|c| c.addr)
    }

    /// Number of tracked connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Claim the display seat. Re-claiming by the holder is a no-op.
    pub fn claim_display(&mut self, id: ConnectionId) -> Result<(), SessionError> {
        self.ensure_known(id)?;
        match self.display {
            Seat::Occupied(holder) if holder != id => Err(SessionError::DisplayTaken),
            _ => {
                self.display = Seat::Occupied(id);
                Ok(())
            }
        }
    }

    /// Claim a player slot, or the first vacant one (red, then blue).
    pub fn claim_player(
        &mut self,
        id: ConnectionId,
        requested: Option<PlayerSlot>,
    ) -> Result<PlayerSlot, SessionError> {
        self.ensure_known(id)?;

        if let Some(current) = self.player_of(id) {
            return match requested {
                Some(slot) if slot != current => Err(SessionError::AlreadyPlaying(current)),
                _ => Ok(current),
            };
        }

        let slot = match requested {
            Some(slot) if self.players[slot.index()].is_vacant() => slot,
            Some(slot) => return Err(SessionError::SlotTaken(slot)),
            None => PlayerSlot::ALL
                .into_iter()
                .find(|slot| self.players[slot.index()].is_vacant())
                .ok_or(SessionError::NoFreeSlot)?,
        };
        self.players[slot.index()] = Seat::Occupied(id);
        Ok(slot)
    }

    /// Subscribe to diagnostics.
    pub fn subscribe_log(&mut self, id: ConnectionId) -> Result<(), SessionError> {
        self.ensure_known(id)?;
        if !self.logs.contains(&id) {
            self.logs.push(id);
        }
        Ok(())
    }

    /// Slot controlled by a connection.
    pub fn player_of(&self, id: ConnectionId) -> Option<PlayerSlot> {
        PlayerSlot::ALL
            .into_iter()
            .find(|slot| self.players[slot.index()].is_held_by(id))
    }

    /// Seat of a player slot.
    pub fn player_seat(&self, slot: PlayerSlot) -> Seat {
        self.players[slot.index()]
    }

    /// The display seat.
    pub fn display_seat(&self) -> Seat {
        self.display
    }

    /// Whether a connection is the display.
    pub fn is_display(&self, id: ConnectionId) -> bool {
        self.display.is_held_by(id)
    }

    /// Forget a connection and free every role it held.
    pub fn release(&mut self, id: ConnectionId) -> Released {
        self.connections.remove(&id);

        let mut released = Released::default();
        if self.display.is_held_by(id) {
            self.display = Seat::Vacant;
            released.display = true;
        }
        for slot in PlayerSlot::ALL {
            if self.players[slot.index()].is_held_by(id) {
                self.players[slot.index()] = Seat::Vacant;
                released.player = Some(slot);
            }
        }
        let before = self.logs.len();
        self.logs.retain(|log| *log != id);
        released.log = self.logs.len() != before;
        released
    }

    /// Send to one connection without waiting. Returns false if dropped.
    pub fn send_to(&self, id: ConnectionId, message: ServerMessage) -> bool {
        let Some(connection) = self.connections.get(&id) else {
            return false;
        };
        match connection.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(%id, "outbound queue full, message dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Send to the display, if one is registered.
    pub fn send_display(&self, message: ServerMessage) -> bool {
        match self.display.holder() {
            Some(id) => self.send_to(id, message),
            None => false,
        }
    }

    /// Fan a diagnostic line out to every log subscriber.
    pub fn send_log(&self, text: &str) {
        if self.logs.is_empty() {
            return;
        }
        let at = Utc::now();
        for id in &self.logs {
            self.send_to(
                *id,
                ServerMessage::Log {
                    message: text.to_string(),
                    at,
                },
            );
        }
    }

    fn ensure_known(&self, id: ConnectionId) -> Result<(), SessionError> {
        if self.connections.contains_key(&id) {
            Ok(())
        } else {
            Err(SessionError::UnknownConnection)
        }
    }
}

// =============================================================================
// SESSION ACTOR
// =============================================================================

/// The arena and everyone connected to it.
pub struct ArenaSession {
    state: GameState,
    router: SessionRouter,
}

impl ArenaSession {
    /// Create a session with a fresh arena.
    pub fn new(rng_seed: u64) -> Self {
        Self {
            state: GameState::new(rng_seed),
            router: SessionRouter::new(),
        }
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Connection roles.
    pub fn router(&self) -> &SessionRouter {
        &self.router
    }

    /// Apply one input from a connection task.
    pub fn handle(&mut self, input: SessionInput) {
        match input {
            SessionInput::Connected { id, addr, sender } => {
                self.router.connect(id, addr, sender);
                self.diagnostic(format!("new connection from {addr}"));
            }
            SessionInput::Message { id, message } => self.handle_message(id, message),
            SessionInput::Legacy { id, frame } => self.handle_legacy(id, frame),
            SessionInput::Malformed { id, error } => {
                self.diagnostic(format!("ignored malformed message from {}: {error}", self.peer(id)));
                self.router
                    .send_to(id, ServerMessage::error(ErrorCode::InvalidMessage, error));
            }
            SessionInput::Disconnected { id } => {
                let addr = self.peer(id);
                let released = self.router.release(id);
                if released.display {
                    self.diagnostic(format!("display at {addr} disconnected"));
                }
                if let Some(slot) = released.player {
                    self.diagnostic(format!("{slot} controller at {addr} disconnected"));
                }
                self.diagnostic(format!("disconnected: {addr}"));
            }
        }
    }

    /// Run one tick, then broadcast the snapshot and publish diagnostics.
    pub fn run_tick(&mut self) -> TickResult {
        let result = tick(&mut self.state);

        for event in &result.events {
            info!(tick = event.tick, "{}", event.data);
            self.router.send_log(&event.to_string());
        }

        self.router
            .send_display(ServerMessage::Update(StateSnapshot::project(&self.state)));
        if result.score_changed {
            self.router.send_display(ServerMessage::Score(self.state.score));
        }

        result
    }

    fn handle_message(&mut self, id: ConnectionId, message: ClientMessage) {
        if let ClientMessage::Register { role, player } = message {
            self.register(id, role, player);
            return;
        }
        if let Some(command) = message.command() {
            self.command(id, command);
        }
    }

    fn handle_legacy(&mut self, id: ConnectionId, frame: LegacyFrame) {
        match frame.role {
            Role::Display if !self.router.is_display(id) => self.register(id, Role::Display, None),
            Role::Player if self.router.player_of(id).is_none() => {
                self.register(id, Role::Player, None)
            }
            Role::Log => self.register(id, Role::Log, None),
            _ => {}
        }
        if let Some(command) = frame.command() {
            debug!(%id, ?command, "relay controller input");
            self.command(id, command);
        }
    }

    fn register(&mut self, id: ConnectionId, role: Role, requested: Option<PlayerSlot>) {
        let addr = self.peer(id);
        let result = match role {
            Role::Display => self.router.claim_display(id).map(|()| {
                self.router.send_to(
                    id,
                    ServerMessage::Init {
                        state: self.state.clone(),
                    },
                );
                format!("display registered from {addr}")
            }),
            Role::Player => self.router.claim_player(id, requested).map(|slot| {
                self.router.send_to(id, ServerMessage::PlayerAssigned { player: slot });
                format!("{slot} controller registered from {addr}")
            }),
            Role::Log => self
                .router
                .subscribe_log(id)
                .map(|()| format!("log subscriber registered from {addr}")),
        };

        match result {
            Ok(line) => self.diagnostic(line),
            Err(error) => self.reject(id, error),
        }
    }

    fn command(&mut self, id: ConnectionId, command: Command) {
        let Some(slot) = self.router.player_of(id) else {
            self.reject(id, SessionError::NotAPlayer);
            return;
        };
        match apply_command(&mut self.state, slot, command) {
            CommandOutcome::Applied => {}
            CommandOutcome::Exhausted => debug!(%slot, ?command, "per-round resource already spent"),
            CommandOutcome::Dropped => debug!(%slot, ?command, "player cannot act"),
            CommandOutcome::Invalid => {
                warn!(%slot, ?command, "command with non-finite numbers ignored");
                self.diagnostic(format!("ignored {slot} command with non-finite numbers"));
            }
        }
    }

    fn reject(&mut self, id: ConnectionId, error: SessionError) {
        warn!(%id, %error, "request rejected");
        self.router.send_log(&format!("rejected request from {}: {error}", self.peer(id)));
        self.router
            .send_to(id, ServerMessage::error(error.code(), error.to_string()));
    }

    fn diagnostic(&self, line: String) {
        info!("{line}");
        self.router.send_log(&line);
    }

    fn peer(&self, id: ConnectionId) -> String {
        match self.router.addr(id) {
            Some(addr) => addr.to_string(),
            None => id.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
