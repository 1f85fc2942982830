//! Authoritative Simulation Tick
//!
//! One fixed-rate step over the whole arena. The phases run in a fixed order
//! and later phases observe what earlier ones did in the same tick; the
//! session actor projects and broadcasts the result afterwards.
//!
//! Nothing here can fail: every response that needs a contact normal is
//! skipped when the two centres coincide.

use crate::core::vec2::within;
use crate::game::collision::{
    bounce_off_walls, circles_overlap, kick_ball, resolve_player_contact, within_box, within_radius,
};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::state::{GameState, PlayerSlot};
use crate::game::tuning::{
    BALL_IMPULSE, BALL_RADIUS, BALL_RESTITUTION, BULLET_BALL_RADIUS, BULLET_COLLISION_RADIUS,
    BULLET_DAMAGE, DYNAMITE_BALL_RADIUS, DYNAMITE_TRIGGER_RADIUS, EXPLOSION_DAMAGE,
    EXPLOSION_KNOCKBACK, FRICTION, GOAL_LINE_HIGH, GOAL_LINE_LOW, GOAL_MOUTH_MAX, GOAL_MOUTH_MIN,
    HIT_FREEZE_TICKS, KNOCKBACK, NORMAL_RANGE, PLAYER_HIT_BOX, PLAYER_RADIUS, SUPER_RANGE,
    WALL_DAMAGE_SCALE, WALL_DAMAGE_THRESHOLD, WALL_MAX, WALL_MIN, WALL_RESTITUTION,
};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated since the previous drain (commands included)
    pub events: Vec<GameEvent>,
    /// A goal or an explosive goal was credited this tick
    pub score_changed: bool,
    /// The round was reset by a ball goal this tick
    pub round_reset: bool,
}

/// Run one simulation tick.
pub fn tick(state: &mut GameState) -> TickResult {
    // 0. Advance tick counter
    state.tick += 1;

    // 1. Player kinematics and inset walls
    update_players(state);

    // 2. Player-player contact
    let [red, blue] = &mut state.players;
    resolve_player_contact(red, blue);

    // 3. Ball kinematics
    update_ball(state);

    // 4-8. Bullets, removals are only marked
    let mut removed = vec![false; state.bullets.len()];
    advance_bullets(state, &mut removed);
    collide_bullets(state, &mut removed);
    strike_ball(state, &mut removed);
    strike_players(state, &mut removed);
    cull_super_bullets(state, &mut removed);

    // 9. Commit removals in one pass
    let mut flags = removed.into_iter();
    state.bullets.retain(|_| !flags.next().unwrap_or(false));

    // 10. Players strike the ball
    kick_phase(state);

    // 11. Goal detection
    let round_reset = check_goal(state);

    // 12. Dynamite
    resolve_dynamites(state);

    let events = state.take_events();
    let score_changed = events.iter().any(GameEvent::changes_score);
    TickResult {
        events,
        score_changed,
        round_reset,
    }
}

// =============================================================================
// PLAYERS & BALL
// =============================================================================

fn update_players(state: &mut GameState) {
    let tick = state.tick;

    for slot in PlayerSlot::ALL {
        let player = state.player_mut(slot);
        if player.is_frozen() {
            player.tick_freeze();
            continue;
        }

        player.position += player.velocity;
        player.velocity *= FRICTION;
        let impact = bounce_off_walls(
            &mut player.position,
            &mut player.velocity,
            WALL_MIN,
            WALL_MAX,
            WALL_RESTITUTION,
        );
        if impact <= WALL_DAMAGE_THRESHOLD {
            continue;
        }

        let damage = (impact * WALL_DAMAGE_SCALE).round() as i32;
        let knocked_out = player.apply_damage(damage);
        let health = player.health;
        state.push_event(GameEvent::new(
            tick,
            GameEventData::WallImpact { player: slot, damage, health },
        ));
        if knocked_out {
            state.push_event(GameEvent::knocked_out(tick, slot));
        }
    }
}

fn update_ball(state: &mut GameState) {
    let ball = &mut state.ball;
    ball.position += ball.velocity;
    bounce_off_walls(
        &mut ball.position,
        &mut ball.velocity,
        BALL_RADIUS,
        1.0 - BALL_RADIUS,
        BALL_RESTITUTION,
    );
}

fn kick_phase(state: &mut GameState) {
    let GameState { players, ball, .. } = state;
    for player in players.iter() {
        if player.is_frozen() {
            continue;
        }
        if circles_overlap(player.position, PLAYER_RADIUS, ball.position, BALL_RADIUS) {
            kick_ball(player.position, player.velocity, ball);
        }
    }
}

// =============================================================================
// BULLETS
// =============================================================================

fn advance_bullets(state: &mut GameState, removed: &mut [bool]) {
    for (bullet, gone) in state.bullets.iter_mut().zip(removed.iter_mut()) {
        bullet.position += bullet.velocity;
        bullet.traveled += bullet.velocity.length();

        let spent = !bullet.is_super && bullet.traveled > NORMAL_RANGE;
        if spent || !within(bullet.position, 0.0, 1.0) {
            *gone = true;
        }
    }
}

fn collide_bullets(state: &GameState, removed: &mut [bool]) {
    let bullets = &state.bullets;
    let limit = BULLET_COLLISION_RADIUS * BULLET_COLLISION_RADIUS;

    for i in 0..bullets.len() {
        for j in (i + 1)..bullets.len() {
            if removed[i] {
                break;
            }
            if removed[j] {
                continue;
            }
            let (a, b) = (&bullets[i], &bullets[j]);
            if a.position.distance_squared(b.position) >= limit {
                continue;
            }
            // The fresher bullet survives
            if a.traveled >= b.traveled {
                removed[i] = true;
            }
            if b.traveled >= a.traveled {
                removed[j] = true;
            }
        }
    }
}

fn strike_ball(state: &mut GameState, removed: &mut [bool]) {
    let tick = state.tick;

    for (i, bullet) in state.bullets.iter().enumerate() {
        if removed[i] || !within_radius(bullet.position, state.ball.position, BULLET_BALL_RADIUS) {
            continue;
        }
        state.ball.velocity += bullet.velocity * BALL_IMPULSE;
        state.pending_events.push(GameEvent::new(
            tick,
            GameEventData::BallStruck { owner: bullet.owner, is_super: bullet.is_super },
        ));
        removed[i] = true;
    }
}

fn strike_players(state: &mut GameState, removed: &mut [bool]) {
    let tick = state.tick;

    for i in 0..state.bullets.len() {
        if removed[i] {
            continue;
        }

        for slot in PlayerSlot::ALL {
            let bullet = &state.bullets[i];
            if slot == bullet.owner || (bullet.is_super && bullet.color == Some(slot)) {
                continue;
            }
            let (owner, is_super) = (bullet.owner, bullet.is_super);
            let (position, velocity) = (bullet.position, bullet.velocity);

            let player = state.player_mut(slot);
            if !within_box(position, player.position, PLAYER_HIT_BOX) {
                continue;
            }

            let knocked_out = player.apply_damage(BULLET_DAMAGE);
            if !knocked_out && player.health > 0 {
                player.freeze = player.freeze.max(HIT_FREEZE_TICKS);
            }
            player.velocity += velocity * KNOCKBACK;
            let health = player.health;

            state.push_event(GameEvent::player_hit(tick, slot, owner, is_super, health));
            if knocked_out {
                state.push_event(GameEvent::knocked_out(tick, slot));
            }

            if !is_super {
                removed[i] = true;
                break;
            }
            let bullet = &mut state.bullets[i];
            bullet.color = Some(slot);
            if slot == owner.opponent() {
                bullet.velocity *= 0.5;
            }
        }
    }
}

fn cull_super_bullets(state: &mut GameState, removed: &mut [bool]) {
    for (bullet, gone) in state.bullets.iter().zip(removed.iter_mut()) {
        if bullet.is_super && (bullet.traveled > SUPER_RANGE || !within(bullet.position, 0.0, 1.0)) {
            *gone = true;
        }
    }
}

// =============================================================================
// GOALS & DYNAMITE
// =============================================================================

/// Returns true if a goal was scored (and the round reset).
fn check_goal(state: &mut GameState) -> bool {
    let ball = state.ball.position;
    if !(GOAL_MOUTH_MIN..=GOAL_MOUTH_MAX).contains(&ball.y) {
        return false;
    }

    let scorer = if ball.x < GOAL_LINE_LOW {
        PlayerSlot::Blue
    } else if ball.x > GOAL_LINE_HIGH {
        PlayerSlot::Red
    } else {
        return false;
    };

    let tick = state.tick;
    state.score.credit(scorer);
    let score = state.score;
    state.push_event(GameEvent::goal(tick, scorer, score));

    state.reset_round();
    state.push_event(GameEvent::new(tick, GameEventData::RoundReset));
    true
}

fn resolve_dynamites(state: &mut GameState) {
    if state.dynamites.is_empty() {
        return;
    }

    let tick = state.tick;
    let mut exploded = false;
    let dynamites = std::mem::take(&mut state.dynamites);
    let mut remaining = Vec::with_capacity(dynamites.len());

    for dynamite in dynamites {
        let caught: Vec<PlayerSlot> = PlayerSlot::ALL
            .into_iter()
            .filter(|slot| {
                within_radius(state.player(*slot).position, dynamite.position, DYNAMITE_TRIGGER_RADIUS)
            })
            .collect();
        if caught.is_empty() {
            remaining.push(dynamite);
            continue;
        }

        if within_radius(state.ball.position, dynamite.position, DYNAMITE_BALL_RADIUS) {
            state.score.credit(dynamite.owner);
            let score = state.score;
            state.push_event(GameEvent::explosive_goal(tick, dynamite.owner, score));
            exploded = true;
            continue;
        }

        // Everyone standing on it takes the blast
        for slot in caught {
            let player = state.player_mut(slot);
            if let Some(direction) = (player.position - dynamite.position).try_normalize() {
                player.velocity += direction * EXPLOSION_KNOCKBACK;
            }
            let knocked_out = player.apply_damage(EXPLOSION_DAMAGE);
            let health = player.health;
            state.push_event(GameEvent::new(
                tick,
                GameEventData::Blast { owner: dynamite.owner, victim: slot, health },
            ));
            if knocked_out {
                state.push_event(GameEvent::knocked_out(tick, slot));
            }
        }
    }

    if exploded {
        // One explosion ends the dynamite phase for both players
        for player in state.players.iter_mut() {
            player.dynamite_placed = false;
        }
    } else {
        state.dynamites = remaining;
    }
}

// =============================================================================
// TESTS
// =============================================================================
