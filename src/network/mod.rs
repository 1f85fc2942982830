//! Network Layer
//!
//! WebSocket server, role routing and the session actor.
//! All game rules run through `game/`; this layer only moves messages.

pub mod config;
pub mod protocol;
pub mod session;
pub mod server;

pub use config::{ConfigError, ServerConfig, TICK_INTERVAL};
pub use protocol::{ClientMessage, ErrorCode, Inbound, LegacyFrame, ProtocolError, Role, ServerMessage};
pub use session::{ArenaSession, ConnectionId, Seat, SessionError, SessionInput, SessionRouter};
pub use server::{run_world_loop, GameServer, GameServerError};
