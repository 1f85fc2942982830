//! Gameplay Tuning
//!
//! Every constant of the arena simulation. Distances are in normalised arena
//! units ([0, 1] on both axes) and velocities in arena units per tick.

use crate::core::vec2::Vec2;

// =============================================================================
// PLAYERS
// =============================================================================

/// Full health, also the clamp ceiling.
pub const MAX_HEALTH: i32 = 100;

/// Collision radius of a player.
pub const PLAYER_RADIUS: f32 = 0.03;

/// Velocity per unit of `move` power.
pub const SPEED_SCALE: f32 = 0.01;

/// Per-tick velocity damping for players.
pub const FRICTION: f32 = 0.98;

/// Inset wall: lowest reachable coordinate on both axes.
pub const WALL_MIN: f32 = 0.1;

/// Inset wall: highest reachable coordinate on both axes.
pub const WALL_MAX: f32 = 0.9;

/// Fraction of perpendicular speed kept when bouncing off a wall.
pub const WALL_RESTITUTION: f32 = 0.5;

/// Wall impacts at or below this speed are harmless.
pub const WALL_DAMAGE_THRESHOLD: f32 = 0.005;

/// Damage per unit of impact speed.
pub const WALL_DAMAGE_SCALE: f32 = 1000.0;

/// Restitution of the player-player bounce. Below 1 for a soft response.
pub const PLAYER_RESTITUTION: f32 = 0.6;

/// Multiplier on a player's velocity when it strikes the ball.
pub const PLAYER_BOUNCE: f32 = 1.2;

/// Stun after a bullet hit that leaves the player alive.
pub const HIT_FREEZE_TICKS: u32 = 15;

/// Stun when health reaches zero.
pub const KO_FREEZE_TICKS: u32 = 180;

/// Starting position of the red player.
pub const RED_START: Vec2 = Vec2::new(0.25, 0.5);

/// Starting position of the blue player.
pub const BLUE_START: Vec2 = Vec2::new(0.75, 0.5);

// =============================================================================
// BALL
// =============================================================================

/// Ball radius.
pub const BALL_RADIUS: f32 = 0.02;

/// Fraction of speed kept when the ball bounces off the arena edge.
pub const BALL_RESTITUTION: f32 = 0.8;

/// Largest per-axis speed of the ball after a serve.
pub const BALL_SERVE_SPEED: f32 = 0.01;

/// Arena centre, where the ball is served from.
pub const ARENA_CENTER: Vec2 = Vec2::new(0.5, 0.5);

// =============================================================================
// BULLETS
// =============================================================================

/// Speed of a normal bullet.
pub const BULLET_SPEED: f32 = 0.02;

/// Speed multiplier of a super bullet.
pub const SUPER_SPEED_MULTIPLIER: f32 = 1.5;

/// Travel distance after which a normal bullet is removed.
pub const NORMAL_RANGE: f32 = 0.6;

/// Travel distance after which a super bullet is removed.
///
/// Must stay below the arena diagonal or only the bounds check ever fires.
pub const SUPER_RANGE: f32 = 1.0;

/// Bullets closer than this annihilate each other.
pub const BULLET_COLLISION_RADIUS: f32 = 0.02;

/// A bullet closer than this to the ball centre strikes the ball.
pub const BULLET_BALL_RADIUS: f32 = 0.03;

/// Fraction of bullet velocity transferred to the ball.
pub const BALL_IMPULSE: f32 = 0.5;

/// Half extent of the axis-aligned box a bullet must enter to hit a player.
pub const PLAYER_HIT_BOX: f32 = 0.03;

/// Damage of one bullet hit.
pub const BULLET_DAMAGE: i32 = 10;

/// Fraction of bullet velocity applied to the struck player.
pub const KNOCKBACK: f32 = 0.5;

// =============================================================================
// GOALS
// =============================================================================

/// Ball x below this inside the goal mouth scores for blue.
pub const GOAL_LINE_LOW: f32 = 0.05;

/// Ball x above this inside the goal mouth scores for red.
pub const GOAL_LINE_HIGH: f32 = 0.95;

/// Lower edge of the goal mouth.
pub const GOAL_MOUTH_MIN: f32 = 0.4;

/// Upper edge of the goal mouth.
pub const GOAL_MOUTH_MAX: f32 = 0.6;

// =============================================================================
// DYNAMITE
// =============================================================================

/// A player inside this radius detonates the dynamite.
pub const DYNAMITE_TRIGGER_RADIUS: f32 = 0.05;

/// Ball inside this radius at detonation scores for the owner.
pub const DYNAMITE_BALL_RADIUS: f32 = 0.04;

/// Radial speed given to a player caught in a blast.
pub const EXPLOSION_KNOCKBACK: f32 = 0.03;

/// Damage of a blast.
pub const EXPLOSION_DAMAGE: i32 = 25;
