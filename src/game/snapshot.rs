//! State Projection
//!
//! The per-tick view sent to the display. It carries only what is drawn:
//! aim, velocities, stun counters, flags and dynamites stay server side.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::{GameState, PlayerSlot};

/// A player as seen by the display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Slot identity
    pub player: PlayerSlot,
    /// Position
    pub position: Vec2,
    /// Health
    pub health: i32,
}

/// A bullet as seen by the display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    /// Position
    pub position: Vec2,
    /// Who fired it
    pub owner: PlayerSlot,
}

/// Minimal snapshot broadcast every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Tick the snapshot was taken after
    pub tick: u64,
    /// Both players in slot order
    pub players: Vec<PlayerView>,
    /// Ball position
    pub ball: Vec2,
    /// Surviving bullets
    pub bullets: Vec<BulletView>,
}

impl StateSnapshot {
    /// Project `state` into a snapshot.
    pub fn project(state: &GameState) -> Self {
        Self {
            tick: state.tick,
            players: state
                .players
                .iter()
                .map(|p| PlayerView {
                    player: p.slot,
                    position: p.position,
                    health: p.health,
                })
                .collect(),
            ball: state.ball.position,
            bullets: state
                .bullets
                .iter()
                .map(|b| BulletView {
                    position: b.position,
                    owner: b.owner,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Bullet, Dynamite};

    #[test]
    fn test_projection_copies_visible_fields() {
        let mut state = GameState::new(0);
        state.tick = 12;
        state.player_mut(PlayerSlot::Blue).health = 55;
        state.ball.position = Vec2::new(0.4, 0.6);
        state.bullets.push(Bullet::normal(PlayerSlot::Red, Vec2::new(0.3, 0.5), Vec2::new(0.02, 0.0)));

        let snapshot = StateSnapshot::project(&state);

        assert_eq!(snapshot.tick, 12);
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.players[1].player, PlayerSlot::Blue);
        assert_eq!(snapshot.players[1].health, 55);
        assert_eq!(snapshot.ball, Vec2::new(0.4, 0.6));
        assert_eq!(snapshot.bullets, vec![BulletView { position: Vec2::new(0.3, 0.5), owner: PlayerSlot::Red }]);
    }

    #[test]
    fn test_projection_hides_internal_fields() {
        let mut state = GameState::new(0);
        state.player_mut(PlayerSlot::Red).freeze = 10;
        state.player_mut(PlayerSlot::Red).velocity = Vec2::new(0.01, 0.0);
        state.ball.velocity = Vec2::new(0.01, 0.01);
        state.dynamites.push(Dynamite { position: Vec2::new(0.2, 0.2), owner: PlayerSlot::Red });
        state.bullets.push(Bullet::super_shot(PlayerSlot::Red, Vec2::new(0.3, 0.5), Vec2::new(0.02, 0.0)));

        let json = serde_json::to_string(&StateSnapshot::project(&state)).unwrap();

        for hidden in ["velocity", "aim", "freeze", "super", "dynamite", "color", "traveled"] {
            assert!(!json.contains(hidden), "snapshot leaks {hidden}: {json}");
        }
    }
}
