//! Game State Definitions
//!
//! Plain data records for the arena: two players, one ball, bullets,
//! dynamites and the score. Behaviour lives in `command` and `tick`.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::rng::{self, ArenaRng};
use crate::core::vec2::Vec2;
use crate::game::events::GameEvent;
use crate::game::tuning::{
    ARENA_CENTER, BALL_SERVE_SPEED, BLUE_START, KO_FREEZE_TICKS, MAX_HEALTH, RED_START,
};

// =============================================================================
// PLAYER SLOT
// =============================================================================

/// One of the two fixed player slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSlot {
    /// Left side, defends the low goal.
    Red,
    /// Right side, defends the high goal.
    Blue,
}

impl PlayerSlot {
    /// Both slots in claim order.
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::Red, PlayerSlot::Blue];

    /// Array index of this slot.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PlayerSlot::Red => 0,
            PlayerSlot::Blue => 1,
        }
    }

    /// The other slot.
    #[inline]
    pub const fn opponent(self) -> PlayerSlot {
        match self {
            PlayerSlot::Red => PlayerSlot::Blue,
            PlayerSlot::Blue => PlayerSlot::Red,
        }
    }

    /// Where this slot stands at the start of every round.
    pub const fn start_position(self) -> Vec2 {
        match self {
            PlayerSlot::Red => RED_START,
            PlayerSlot::Blue => BLUE_START,
        }
    }

    /// Initial aim, towards the opposing goal.
    pub const fn facing(self) -> Vec2 {
        match self {
            PlayerSlot::Red => Vec2::X,
            PlayerSlot::Blue => Vec2::NEG_X,
        }
    }

    /// Lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            PlayerSlot::Red => "red",
            PlayerSlot::Blue => "blue",
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// State of a single player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Slot identity
    pub slot: PlayerSlot,

    /// Current position in arena
    pub position: Vec2,

    /// Current velocity (arena units per tick)
    pub velocity: Vec2,

    /// Unit aim direction, independent of movement
    pub aim: Vec2,

    /// Health in [0, MAX_HEALTH]
    pub health: i32,

    /// Stun frames remaining; blocks motion and input while > 0
    pub freeze: u32,

    /// Super shot spent this round
    pub super_used: bool,

    /// Dynamite placed this round
    pub dynamite_placed: bool,
}

impl PlayerState {
    /// Create a player at its slot's start position.
    pub fn new(slot: PlayerSlot) -> Self {
        Self {
            slot,
            position: slot.start_position(),
            velocity: Vec2::ZERO,
            aim: slot.facing(),
            health: MAX_HEALTH,
            freeze: 0,
            super_used: false,
            dynamite_placed: false,
        }
    }

    /// Alive and not stunned: the only state in which commands apply.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.health > 0 && self.freeze == 0
    }

    /// Stunned or knocked out.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.freeze > 0
    }

    /// Subtract damage, clamping at zero.
    ///
    /// Reaching zero forces the KO stun. Returns true if this call knocked
    /// the player out.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.health > 0;
        self.health = (self.health - amount.max(0)).clamp(0, MAX_HEALTH);
        if self.health == 0 {
            self.freeze = self.freeze.max(KO_FREEZE_TICKS);
        }
        was_alive && self.health == 0
    }

    /// Count the stun down by one frame.
    ///
    /// A knocked-out player whose stun expires comes back at full health.
    pub fn tick_freeze(&mut self) {
        self.freeze = self.freeze.saturating_sub(1);
        if self.freeze == 0 && self.health == 0 {
            self.health = MAX_HEALTH;
        }
    }

    /// Back to the start of a round.
    pub fn reset_for_round(&mut self) {
        *self = Self::new(self.slot);
    }
}

// =============================================================================
// BALL
// =============================================================================

/// The ball.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    /// Centre position
    pub position: Vec2,
    /// Velocity (arena units per tick)
    pub velocity: Vec2,
}

impl BallState {
    /// Ball at the arena centre, at rest.
    pub fn new() -> Self {
        Self {
            position: ARENA_CENTER,
            velocity: Vec2::ZERO,
        }
    }
}

impl Default for BallState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// BULLETS & DYNAMITE
// =============================================================================

/// A projectile in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Current position
    pub position: Vec2,
    /// Velocity (arena units per tick)
    pub velocity: Vec2,
    /// Who fired it
    pub owner: PlayerSlot,
    /// Cumulative distance travelled
    pub traveled: f32,
    /// Super shot: longer range, survives player hits
    #[serde(rename = "super")]
    pub is_super: bool,
    /// Super bullets only: the player it last deflected off (starts as the owner)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<PlayerSlot>,
}

impl Bullet {
    /// A normal bullet.
    pub fn normal(owner: PlayerSlot, position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            owner,
            traveled: 0.0,
            is_super: false,
            color: None,
        }
    }

    /// A super bullet, tinted with its owner's colour.
    pub fn super_shot(owner: PlayerSlot, position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            owner,
            traveled: 0.0,
            is_super: true,
            color: Some(owner),
        }
    }
}

/// A placed explosive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dynamite {
    /// Position in arena
    pub position: Vec2,
    /// Who placed it (credited for explosive goals)
    pub owner: PlayerSlot,
}

// =============================================================================
// SCORE
// =============================================================================

/// Goals per player. Only ever increases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Red's goals
    pub red: u32,
    /// Blue's goals
    pub blue: u32,
}

impl Score {
    /// Goals of one slot.
    pub fn get(&self, slot: PlayerSlot) -> u32 {
        match slot {
            PlayerSlot::Red => self.red,
            PlayerSlot::Blue => self.blue,
        }
    }

    /// Add a goal for `slot`.
    pub fn credit(&mut self, slot: PlayerSlot) {
        match slot {
            PlayerSlot::Red => self.red = self.red.saturating_add(1),
            PlayerSlot::Blue => self.blue = self.blue.saturating_add(1),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "red {} - {} blue", self.red, self.blue)
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of the arena.
///
/// Owned by a single writer (the session actor); the command processor and the
/// tick borrow it mutably one at a time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Ticks simulated so far
    pub tick: u64,

    /// Both players, indexed by `PlayerSlot::index`
    pub players: [PlayerState; 2],

    /// The ball
    pub ball: BallState,

    /// Bullets in flight (order irrelevant)
    pub bullets: Vec<Bullet>,

    /// Placed dynamites (order irrelevant)
    pub dynamites: Vec<Dynamite>,

    /// Current score
    pub score: Score,

    /// Serve RNG
    #[serde(skip, default = "unseeded")]
    pub rng: ArenaRng,

    /// Events generated since the last drain
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh arena: players at their starts, ball at rest in the centre.
    pub fn new(rng_seed: u64) -> Self {
        Self {
            tick: 0,
            players: [PlayerState::new(PlayerSlot::Red), PlayerState::new(PlayerSlot::Blue)],
            ball: BallState::new(),
            bullets: Vec::new(),
            dynamites: Vec::new(),
            score: Score::default(),
            rng: rng::seeded(rng_seed),
            pending_events: Vec::new(),
        }
    }

    /// Get a player.
    #[inline]
    pub fn player(&self, slot: PlayerSlot) -> &PlayerState {
        &self.players[slot.index()]
    }

    /// Get a player mutably.
    #[inline]
    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut PlayerState {
        &mut self.players[slot.index()]
    }

    /// Full round reset after a goal.
    ///
    /// Serves the ball from the centre, puts both players back at their
    /// starts and clears bullets, dynamites and all per-round flags. The score
    /// is kept.
    pub fn reset_round(&mut self) {
        self.ball.position = ARENA_CENTER;
        self.ball.velocity = rng::random_serve(&mut self.rng, BALL_SERVE_SPEED);
        for player in self.players.iter_mut() {
            player.reset_for_round();
        }
        self.bullets.clear();
        self.dynamites.clear();
    }

    /// Queue an event for the next drain.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take all events generated since the previous call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

fn unseeded() -> ArenaRng {
    rng::seeded(0)
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::game::tuning::BULLET_SPEED;

    #[test]
    fn test_slot_helpers() {
        assert_eq!(PlayerSlot::Red.opponent(), PlayerSlot::Blue);
        assert_eq!(PlayerSlot::Blue.opponent(), PlayerSlot::Red);
        assert_eq!(PlayerSlot::Red.index(), 0);
        assert_eq!(PlayerSlot::Blue.index(), 1);
        assert_eq!(PlayerSlot::Blue.to_string(), "blue");
    }

    #[test]
    fn test_new_state_layout() {
        let state = GameState::new(1);
        assert_eq!(state.player(PlayerSlot::Red).position, RED_START);
        assert_eq!(state.player(PlayerSlot::Blue).position, BLUE_START);
        assert_eq!(state.ball.position, ARENA_CENTER);
        assert_eq!(state.ball.velocity, Vec2::ZERO);
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, Score::default());
    }

    #[test]
    fn test_apply_damage_clamps_and_stuns() {
        let mut player = PlayerState::new(PlayerSlot::Red);

        assert!(!player.apply_damage(30));
        assert_eq!(player.health, 70);
        assert_eq!(player.freeze, 0);

        assert!(player.apply_damage(500));
        assert_eq!(player.health, 0);
        assert_eq!(player.freeze, KO_FREEZE_TICKS);
        assert!(!player.is_active());

        // Already down: no second knockout
        assert!(!player.apply_damage(10));
        assert_eq!(player.health, 0);
    }

    #[test]
    fn test_knocked_out_player_revives_when_stun_ends() {
        let mut player = PlayerState::new(PlayerSlot::Blue);
        player.apply_damage(MAX_HEALTH);

        for _ in 0..KO_FREEZE_TICKS - 1 {
            player.tick_freeze();
            assert_eq!(player.health, 0);
            assert!(player.freeze > 0);
        }
        player.tick_freeze();
        assert_eq!(player.freeze, 0);
        assert_eq!(player.health, MAX_HEALTH);
        assert!(player.is_active());
    }

    #[test]
    fn test_reset_round_keeps_score() {
        let mut state = GameState::new(42);
        state.score.credit(PlayerSlot::Blue);
        state.player_mut(PlayerSlot::Red).position = Vec2::new(0.8, 0.8);
        state.player_mut(PlayerSlot::Red).super_used = true;
        state.player_mut(PlayerSlot::Blue).dynamite_placed = true;
        state.bullets.push(Bullet::normal(PlayerSlot::Red, Vec2::new(0.5, 0.5), Vec2::new(BULLET_SPEED, 0.0)));
        state.dynamites.push(Dynamite { position: Vec2::new(0.3, 0.3), owner: PlayerSlot::Blue });

        state.reset_round();

        assert_eq!(state.score.blue, 1);
        assert_eq!(state.player(PlayerSlot::Red).position, RED_START);
        assert!(!state.player(PlayerSlot::Red).super_used);
        assert!(!state.player(PlayerSlot::Blue).dynamite_placed);
        assert!(state.bullets.is_empty());
        assert!(state.dynamites.is_empty());
        assert!(state.ball.velocity.x.abs() <= BALL_SERVE_SPEED);
        assert!(state.ball.velocity.y.abs() <= BALL_SERVE_SPEED);
    }

    #[test]
    fn test_events_drain() {
        let mut state = GameState::new(0);
        state.push_event(GameEvent::new(0, GameEventData::RoundReset));
        assert_eq!(state.take_events().len(), 1);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_state_serializes_super_flag() {
        let mut state = GameState::new(0);
        state.bullets.push(Bullet::super_shot(PlayerSlot::Blue, Vec2::new(0.5, 0.5), Vec2::ZERO));
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"super\":true"));
        assert!(json.contains("\"color\":\"blue\""));
        assert!(!json.contains("pending_events"));
    }
}
