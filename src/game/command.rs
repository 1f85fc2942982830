//! Command Processor
//!
//! Validates and applies a single control command to one player. Commands for
//! a knocked-out or stunned player are dropped without a trace; every applied
//! command leaves a diagnostic event on the state.

use serde::{Serialize, Deserialize};

use crate::core::vec2::{heading, Vec2};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::state::{Bullet, Dynamite, GameState, PlayerSlot};
use crate::game::tuning::{BULLET_SPEED, SPEED_SCALE, SUPER_SPEED_MULTIPLIER};

/// A decoded control command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Set velocity from a joystick angle and power.
    Move {
        /// Degrees, 0 along +X
        angle: f32,
        /// 0..1, clamped
        power: f32,
    },
    /// Set the aim direction.
    Aim {
        /// Degrees, 0 along +X
        angle: f32,
    },
    /// Fire a bullet.
    Shoot {
        /// Ask for the once-per-round super shot
        #[serde(rename = "super", default)]
        is_super: bool,
    },
    /// Place the once-per-round dynamite, at the player if no position is given.
    PlaceDynamite {
        /// Arena x, 0..1
        #[serde(default)]
        x: Option<f32>,
        /// Arena y, 0..1
        #[serde(default)]
        y: Option<f32>,
    },
}

impl Command {
    /// Whether every number carried by the command is finite.
    pub fn is_finite(&self) -> bool {
        match *self {
            Command::Move { angle, power } => angle.is_finite() && power.is_finite(),
            Command::Aim { angle } => angle.is_finite(),
            Command::Shoot { .. } => true,
            Command::PlaceDynamite { x, y } => {
                x.map_or(true, f32::is_finite) && y.map_or(true, f32::is_finite)
            }
        }
    }
}

/// What happened to a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State changed and a diagnostic was queued.
    Applied,
    /// The per-round resource was already spent; nothing changed.
    Exhausted,
    /// The player is knocked out or stunned; nothing changed.
    Dropped,
    /// The command carried a non-finite number; nothing changed.
    Invalid,
}

/// Apply `command` for `slot`.
pub fn apply_command(state: &mut GameState, slot: PlayerSlot, command: Command) -> CommandOutcome {
    if !command.is_finite() {
        return CommandOutcome::Invalid;
    }
    if !state.player(slot).is_active() {
        return CommandOutcome::Dropped;
    }

    let tick = state.tick;
    let data = match command {
        Command::Move { angle, power } => {
            let power = power.clamp(0.0, 1.0);
            state.player_mut(slot).velocity = heading(angle) * (power * SPEED_SCALE);
            GameEventData::Moved { player: slot, angle, power }
        }
        Command::Aim { angle } => {
            state.player_mut(slot).aim = heading(angle);
            GameEventData::Aimed { player: slot, angle }
        }
        Command::Shoot { is_super: true } => {
            let player = state.player_mut(slot);
            if player.super_used {
                return CommandOutcome::Exhausted;
            }
            player.super_used = true;
            let velocity = player.aim * (BULLET_SPEED * SUPER_SPEED_MULTIPLIER);
            let bullet = Bullet::super_shot(slot, player.position, velocity);
            state.bullets.push(bullet);
            GameEventData::Shot { player: slot, is_super: true }
        }
        Command::Shoot { is_super: false } => {
            let player = state.player(slot);
            let bullet = Bullet::normal(slot, player.position, player.aim * BULLET_SPEED);
            state.bullets.push(bullet);
            GameEventData::Shot { player: slot, is_super: false }
        }
        Command::PlaceDynamite { x, y } => {
            let player = state.player_mut(slot);
            if player.dynamite_placed {
                return CommandOutcome::Exhausted;
            }
            player.dynamite_placed = true;
            let position = Vec2::new(
                x.unwrap_or(player.position.x).clamp(0.0, 1.0),
                y.unwrap_or(player.position.y).clamp(0.0, 1.0),
            );
            state.dynamites.push(Dynamite { position, owner: slot });
            GameEventData::DynamitePlaced { player: slot, position }
        }
    };

    state.push_event(GameEvent::new(tick, data));
    CommandOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tuning::{HIT_FREEZE_TICKS, RED_START};

    const EPS: f32 = 1e-6;

    #[test]
    fn test_move_overwrites_velocity() {
        let mut state = GameState::new(0);
        state.player_mut(PlayerSlot::Red).velocity = Vec2::new(0.5, 0.5);

        let outcome = apply_command(&mut state, PlayerSlot::Red, Command::Move { angle: 90.0, power: 0.5 });

        assert_eq!(outcome, CommandOutcome::Applied);
        let v = state.player(PlayerSlot::Red).velocity;
        assert!(v.x.abs() < EPS);
        assert!((v.y - 0.5 * SPEED_SCALE).abs() < EPS);
        assert_eq!(state.take_events().len(), 1);
    }

    #[test]
    fn test_move_power_is_clamped() {
        let mut state = GameState::new(0);
        apply_command(&mut state, PlayerSlot::Blue, Command::Move { angle: 0.0, power: 7.0 });
        assert!((state.player(PlayerSlot::Blue).velocity.x - SPEED_SCALE).abs() < EPS);
    }

    #[test]
    fn test_aim_is_independent_of_movement() {
        let mut state = GameState::new(0);
        apply_command(&mut state, PlayerSlot::Red, Command::Move { angle: 0.0, power: 1.0 });
        apply_command(&mut state, PlayerSlot::Red, Command::Aim { angle: 180.0 });

        let player = state.player(PlayerSlot::Red);
        assert!((player.aim.x + 1.0).abs() < EPS);
        assert!(player.velocity.x > 0.0);
    }

    #[test]
    fn test_normal_shot_always_spawns() {
        let mut state = GameState::new(0);
        state.player_mut(PlayerSlot::Red).super_used = true;

        for _ in 0..3 {
            let outcome = apply_command(&mut state, PlayerSlot::Red, Command::Shoot { is_super: false });
            assert_eq!(outcome, CommandOutcome::Applied);
        }
        assert_eq!(state.bullets.len(), 3);
        let bullet = &state.bullets[0];
        assert!(!bullet.is_super);
        assert_eq!(bullet.position, RED_START);
        assert!((bullet.velocity.x - BULLET_SPEED).abs() < EPS);
    }

    #[test]
    fn test_super_shot_once_per_round() {
        let mut state = GameState::new(0);

        let first = apply_command(&mut state, PlayerSlot::Blue, Command::Shoot { is_super: true });
        assert_eq!(first, CommandOutcome::Applied);
        assert_eq!(state.bullets.len(), 1);
        assert!(state.bullets[0].is_super);
        assert_eq!(state.bullets[0].color, Some(PlayerSlot::Blue));
        // Blue faces left
        assert!((state.bullets[0].velocity.x + BULLET_SPEED * SUPER_SPEED_MULTIPLIER).abs() < EPS);

        let second = apply_command(&mut state, PlayerSlot::Blue, Command::Shoot { is_super: true });
        assert_eq!(second, CommandOutcome::Exhausted);
        assert_eq!(state.bullets.len(), 1);
        assert!(state.player(PlayerSlot::Blue).super_used);
    }

    #[test]
    fn test_dynamite_defaults_to_player_position() {
        let mut state = GameState::new(0);
        apply_command(&mut state, PlayerSlot::Red, Command::PlaceDynamite { x: None, y: None });

        assert_eq!(state.dynamites.len(), 1);
        assert_eq!(state.dynamites[0].position, RED_START);
        assert_eq!(state.dynamites[0].owner, PlayerSlot::Red);
        assert!(state.player(PlayerSlot::Red).dynamite_placed);
    }

    #[test]
    fn test_second_dynamite_is_noop() {
        let mut state = GameState::new(0);
        apply_command(&mut state, PlayerSlot::Blue, Command::PlaceDynamite { x: Some(0.3), y: Some(0.7) });
        let outcome = apply_command(&mut state, PlayerSlot::Blue, Command::PlaceDynamite { x: Some(0.6), y: Some(0.6) });

        assert_eq!(outcome, CommandOutcome::Exhausted);
        assert_eq!(state.dynamites.len(), 1);
        assert_eq!(state.dynamites[0].position, Vec2::new(0.3, 0.7));
    }

    #[test]
    fn test_frozen_or_dead_player_drops_commands() {
        let mut state = GameState::new(0);
        state.player_mut(PlayerSlot::Red).freeze = HIT_FREEZE_TICKS;

        let outcome = apply_command(&mut state, PlayerSlot::Red, Command::Shoot { is_super: false });
        assert_eq!(outcome, CommandOutcome::Dropped);
        assert!(state.bullets.is_empty());

        state.player_mut(PlayerSlot::Blue).apply_damage(1_000);
        let outcome = apply_command(&mut state, PlayerSlot::Blue, Command::Move { angle: 0.0, power: 1.0 });
        assert_eq!(outcome, CommandOutcome::Dropped);
        assert_eq!(state.player(PlayerSlot::Blue).velocity, Vec2::ZERO);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_non_finite_commands_are_invalid() {
        let mut state = GameState::new(0);
        let before = state.player(PlayerSlot::Red).clone();
        let commands = [
            Command::Move { angle: f32::INFINITY, power: 1.0 },
            Command::Move { angle: 0.0, power: f32::NAN },
            Command::Aim { angle: f32::NEG_INFINITY },
            Command::PlaceDynamite { x: Some(f32::INFINITY), y: None },
            Command::PlaceDynamite { x: None, y: Some(f32::NAN) },
        ];

        for command in commands {
            assert_eq!(apply_command(&mut state, PlayerSlot::Red, command), CommandOutcome::Invalid, "{command:?}");
        }
        assert_eq!(state.player(PlayerSlot::Red), &before);
        assert!(state.dynamites.is_empty());
        assert!(state.take_events().is_empty());

        // Aim stays usable: the next shot flies
        apply_command(&mut state, PlayerSlot::Red, Command::Shoot { is_super: false });
        assert!(state.bullets[0].velocity.is_finite());
    }

    #[test]
    fn test_command_json_shape() {
        let cmd: Command = serde_json::from_str(r#"{"type":"shoot","super":true}"#).unwrap();
        assert_eq!(cmd, Command::Shoot { is_super: true });

        let cmd: Command = serde_json::from_str(r#"{"type":"place_dynamite"}"#).unwrap();
        assert_eq!(cmd, Command::PlaceDynamite { x: None, y: None });
    }
}
