//! # Duel Arena Server
//!
//! Authoritative server for a two-player arena game: two controllers steer
//! the red and blue players, a display renders the arena, and the server owns
//! every rule of the match.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DUEL ARENA SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Numeric primitives                        │
//! │  ├── vec2.rs     - glam Vec2 helpers in arena units          │
//! │  └── rng.rs      - Seeded PCG32 for ball serves              │
//! │                                                              │
//! │  game/           - Game logic (no I/O)                       │
//! │  ├── state.rs    - Players, ball, bullets, dynamite, score   │
//! │  ├── command.rs  - Command validation and application        │
//! │  ├── tick.rs     - Authoritative simulation step             │
//! │  ├── collision.rs- Overlap tests and responses               │
//! │  ├── snapshot.rs - Per-tick projection for the display       │
//! │  ├── events.rs   - Diagnostic events                         │
//! │  └── tuning.rs   - Gameplay constants                        │
//! │                                                              │
//! │  network/        - Networking                                │
//! │  ├── server.rs   - WebSocket server and world loop           │
//! │  ├── session.rs  - Session actor and role routing            │
//! │  ├── protocol.rs - Message types                             │
//! │  └── config.rs   - Environment configuration                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single Writer
//!
//! One task owns the `GameState`. Connection tasks decode frames and queue
//! them to that task; the same task runs the 60 Hz tick. Commands and ticks
//! therefore never overlap, and no lock is held across I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::vec2::Vec2;
pub use core::rng::ArenaRng;
pub use game::state::{GameState, PlayerState, PlayerSlot};
pub use game::command::Command;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
