//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Every frame is a JSON text frame tagged by `type`. Frames of the old relay
//! (`{"role": "...", "angle": .., "power": ..}`) carry no tag and are decoded
//! separately as [`LegacyFrame`]s.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::game::command::Command;
use crate::game::snapshot::StateSnapshot;
use crate::game::state::{GameState, PlayerSlot, Score};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Role a connection can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The screen that renders the arena. At most one.
    #[serde(alias = "laptop")]
    Display,
    /// A controller bound to one player slot.
    #[serde(alias = "mobile")]
    Player,
    /// A diagnostics subscriber.
    Log,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Claim a role. Players may ask for a specific slot.
    Register {
        /// Requested role
        role: Role,
        /// Requested slot, first vacant when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<PlayerSlot>,
    },

    /// Joystick movement.
    Move {
        /// Degrees
        angle: f32,
        /// 0..1
        power: f32,
    },

    /// Aim direction.
    Aim {
        /// Degrees
        angle: f32,
    },

    /// Fire a bullet.
    Shoot {
        /// Super shot
        #[serde(rename = "super", default)]
        is_super: bool,
    },

    /// Place the round's dynamite.
    PlaceDynamite {
        /// Arena x
        #[serde(default)]
        x: Option<f32>,
        /// Arena y
        #[serde(default)]
        y: Option<f32>,
    },
}

impl ClientMessage {
    /// The game command carried by this message, if any.
    pub fn command(&self) -> Option<Command> {
        match *self {
            ClientMessage::Register { .. } => None,
            ClientMessage::Move { angle, power } => Some(Command::Move { angle, power }),
            ClientMessage::Aim { angle } => Some(Command::Aim { angle }),
            ClientMessage::Shoot { is_super } => Some(Command::Shoot { is_super }),
            ClientMessage::PlaceDynamite { x, y } => Some(Command::PlaceDynamite { x, y }),
        }
    }
}

/// Untagged frame of the original relay protocol.
///
/// The role is repeated on every frame; a controller frame with an `angle` is
/// a joystick reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyFrame {
    /// Sender role (`laptop` or `mobile`)
    pub role: Role,
    /// Joystick angle in degrees
    #[serde(default)]
    pub angle: Option<f32>,
    /// Joystick power, full power when omitted
    #[serde(default)]
    pub power: Option<f32>,
}

impl LegacyFrame {
    /// Joystick reading as a move command.
    pub fn command(&self) -> Option<Command> {
        let angle = self.angle?;
        Some(Command::Move {
            angle,
            power: self.power.unwrap_or(1.0),
        })
    }
}

/// A decoded inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Tagged message.
    Message(ClientMessage),
    /// Old relay frame.
    Legacy(LegacyFrame),
}

impl Inbound {
    /// Decode a text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        let inbound = if value.get("type").is_some() {
            ClientMessage::deserialize(value)
                .map(Inbound::Message)
                .map_err(|e| ProtocolError::Unrecognised(e.to_string()))?
        } else if value.get("role").is_some() {
            LegacyFrame::deserialize(value)
                .map(Inbound::Legacy)
                .map_err(|e| ProtocolError::Unrecognised(e.to_string()))?
        } else {
            return Err(ProtocolError::Unrecognised("missing `type` field".to_string()));
        };

        // Numbers beyond f32 range decode as infinity
        if !inbound.is_finite() {
            return Err(ProtocolError::Unrecognised("number out of range".to_string()));
        }
        Ok(inbound)
    }

    fn is_finite(&self) -> bool {
        match self {
            Inbound::Message(message) => message.command().map_or(true, |c| c.is_finite()),
            Inbound::Legacy(frame) => {
                frame.angle.map_or(true, f32::is_finite) && frame.power.map_or(true, f32::is_finite)
            }
        }
    }
}

/// Decode failures. Never fatal for the connection.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Not JSON at all.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON, but not a message we know.
    #[error("unrecognised message: {0}")]
    Unrecognised(String),

    /// Binary frames are not part of the protocol.
    #[error("binary frames are not supported")]
    Binary,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full internal state, sent once when the display registers.
    Init {
        /// Complete arena state
        state: GameState,
    },

    /// Minimal snapshot, every tick, display only.
    Update(StateSnapshot),

    /// A player slot was granted.
    PlayerAssigned {
        /// Granted slot
        player: PlayerSlot,
    },

    /// The score changed.
    Score(Score),

    /// A diagnostic line for log subscribers.
    Log {
        /// Diagnostic text
        message: String,
        /// When it was emitted
        at: DateTime<Utc>,
    },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown {
        /// Why the server is stopping
        reason: String,
    },
}

/// Server error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Frame could not be decoded.
    InvalidMessage,
    /// Requested player slot is held by another connection.
    SlotTaken,
    /// Both player slots are held.
    NoFreeSlot,
    /// Another connection is the display.
    DisplayTaken,
    /// This connection already controls a player.
    AlreadyPlaying,
    /// Command sent by a connection that holds no player slot.
    NotAPlayer,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Build an error message.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error(ServerError {
            code,
            message: message.into(),
        })
    }
}
