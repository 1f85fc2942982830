//! Game Events
//!
//! Diagnostics raised by the command processor and the simulation. They carry
//! no state of their own: the session logs them and fans their text out to
//! log subscribers.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::{PlayerSlot, Score};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEventData {
    /// A `move` command was applied.
    Moved {
        /// Acting player
        player: PlayerSlot,
        /// Degrees
        angle: f32,
        /// Clamped power
        power: f32,
    },

    /// An `aim` command was applied.
    Aimed {
        /// Acting player
        player: PlayerSlot,
        /// Degrees
        angle: f32,
    },

    /// A bullet was fired.
    Shot {
        /// Acting player
        player: PlayerSlot,
        /// Super shot
        is_super: bool,
    },

    /// A dynamite was placed.
    DynamitePlaced {
        /// Acting player
        player: PlayerSlot,
        /// Where it lies
        position: Vec2,
    },

    /// A player hit an inset wall hard enough to be hurt.
    WallImpact {
        /// Acting player
        player: PlayerSlot,
        /// Damage dealt
        damage: i32,
        /// Health left
        health: i32,
    },

    /// A bullet struck the ball and was consumed.
    BallStruck {
        /// Owner
        owner: PlayerSlot,
        /// Super shot
        is_super: bool,
    },

    /// A bullet struck a player.
    PlayerHit {
        /// Player struck
        victim: PlayerSlot,
        /// Bullet owner
        shooter: PlayerSlot,
        /// Super shot
        is_super: bool,
        /// Health left
        health: i32,
    },

    /// A player's health reached zero.
    KnockedOut {
        /// Acting player
        player: PlayerSlot,
    },

    /// The ball crossed a goal line.
    Goal {
        /// Credited player
        scorer: PlayerSlot,
        /// Score after the goal
        score: Score,
    },

    /// A dynamite went off with the ball next to it.
    ExplosiveGoal {
        /// Owner
        owner: PlayerSlot,
        /// Score after the goal
        score: Score,
    },

    /// A dynamite went off next to a player without the ball.
    Blast {
        /// Owner
        owner: PlayerSlot,
        /// Player struck
        victim: PlayerSlot,
        /// Health left
        health: i32,
    },

    /// Positions, ball, bullets and flags were reset.
    RoundReset,
}

/// A game event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create a goal event.
    pub fn goal(tick: u64, scorer: PlayerSlot, score: Score) -> Self {
        Self::new(tick, GameEventData::Goal { scorer, score })
    }

    /// Create an explosive goal event.
    pub fn explosive_goal(tick: u64, owner: PlayerSlot, score: Score) -> Self {
        Self::new(tick, GameEventData::ExplosiveGoal { owner, score })
    }

    /// Create a player hit event.
    pub fn player_hit(
        tick: u64,
        victim: PlayerSlot,
        shooter: PlayerSlot,
        is_super: bool,
        health: i32,
    ) -> Self {
        Self::new(
            tick,
            GameEventData::PlayerHit {
                victim,
                shooter,
                is_super,
                health,
            },
        )
    }

    /// Create a knockout event.
    pub fn knocked_out(tick: u64, player: PlayerSlot) -> Self {
        Self::new(tick, GameEventData::KnockedOut { player })
    }

    /// Whether the score changed with this event.
    pub fn changes_score(&self) -> bool {
        matches!(
            self.data,
            GameEventData::Goal { .. } | GameEventData::ExplosiveGoal { .. }
        )
    }
}

impl fmt::Display for GameEventData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEventData::Moved { player, angle, power } => {
                write!(f, "{player} moves at {angle:.0}° with power {power:.2}")
            }
            GameEventData::Aimed { player, angle } => write!(f, "{player} aims at {angle:.0}°"),
            GameEventData::Shot { player, is_super: true } => write!(f, "{player} fires a SUPER shot"),
            GameEventData::Shot { player, is_super: false } => write!(f, "{player} fires"),
            GameEventData::DynamitePlaced { player, position } => {
                write!(f, "{player} places dynamite at {position}")
            }
            GameEventData::WallImpact { player, damage, health } => {
                write!(f, "{player} slams into the wall for {damage} damage ({health} hp left)")
            }
            GameEventData::BallStruck { owner, is_super } => {
                let kind = if *is_super { "super shot" } else { "shot" };
                write!(f, "{owner}'s {kind} strikes the ball")
            }
            GameEventData::PlayerHit { victim, shooter, is_super, health } => {
                let kind = if *is_super { "super shot" } else { "shot" };
                write!(f, "{shooter}'s {kind} hits {victim} ({health} hp left)")
            }
            GameEventData::KnockedOut { player } => write!(f, "{player} is knocked out"),
            GameEventData::Goal { scorer, score } => write!(f, "GOAL for {scorer}! {score}"),
            GameEventData::ExplosiveGoal { owner, score } => {
                write!(f, "{owner}'s dynamite blasts the ball in! {score}")
            }
            GameEventData::Blast { owner, victim, health } => {
                write!(f, "{owner}'s dynamite catches {victim} ({health} hp left)")
            }
            GameEventData::RoundReset => f.write_str("round reset"),
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tick {}] {}", self.tick, self.data)
    }
}
