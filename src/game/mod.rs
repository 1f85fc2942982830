//! Game Logic Module
//!
//! The arena simulation. No I/O: the network layer feeds commands in and
//! drains events and snapshots out.
//!
//! ## Module Structure
//!
//! - `state`: Arena state, players, ball, bullets, dynamite
//! - `command`: Command validation and application
//! - `tick`: Authoritative simulation step
//! - `collision`: Overlap tests and collision responses
//! - `snapshot`: Minimal per-tick projection for the display
//! - `events`: Diagnostic events
//! - `tuning`: Gameplay constants

pub mod state;
pub mod command;
pub mod tick;
pub mod collision;
pub mod snapshot;
pub mod events;
pub mod tuning;

// Re-export key types
pub use state::{GameState, PlayerState, PlayerSlot, Score};
pub use command::{apply_command, Command, CommandOutcome};
pub use tick::{tick, TickResult};
pub use snapshot::StateSnapshot;
pub use events::{GameEvent, GameEventData};
