//! Collision Detection
//!
//! Overlap tests and the three physical responses of the arena: wall bounce,
//! the soft player-player bounce and the player kick on the ball.
//! Every response skips coincident centres, where no contact normal exists.

use crate::core::vec2::Vec2;
use crate::game::state::{BallState, PlayerState};
use crate::game::tuning::{PLAYER_BOUNCE, PLAYER_RADIUS, PLAYER_RESTITUTION};

/// Check if two circles overlap (strictly).
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    let combined = radius_a + radius_b;
    pos_a.distance_squared(pos_b) < combined * combined
}

/// Check if `point` lies within `radius` of `center`.
#[inline]
pub fn within_radius(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// Check if `point` lies inside the axis-aligned box of half extent `half`
/// around `center`.
#[inline]
pub fn within_box(point: Vec2, center: Vec2, half: f32) -> bool {
    (point.x - center.x).abs() <= half && (point.y - center.y).abs() <= half
}

/// Keep a body inside `[min, max]` on both axes.
///
/// A crossing clamps the position and reflects that axis' velocity scaled by
/// `restitution`. Returns the largest pre-reflection speed into a wall this
/// call (0.0 when nothing was crossed).
pub fn bounce_off_walls(
    position: &mut Vec2,
    velocity: &mut Vec2,
    min: f32,
    max: f32,
    restitution: f32,
) -> f32 {
    let impact_x = reflect_axis(&mut position.x, &mut velocity.x, min, max, restitution);
    let impact_y = reflect_axis(&mut position.y, &mut velocity.y, min, max, restitution);
    impact_x.max(impact_y)
}

fn reflect_axis(pos: &mut f32, vel: &mut f32, min: f32, max: f32, restitution: f32) -> f32 {
    if *pos < min {
        *pos = min;
    } else if *pos > max {
        *pos = max;
    } else {
        return 0.0;
    }
    let impact = vel.abs();
    *vel = -*vel * restitution;
    impact
}

/// Resolve an overlap between the two players.
///
/// Pushes both apart by half the overlap along the line of centres, then
/// exchanges their normal velocity with the equal-mass restitution formula.
/// Returns true if the players were touching.
pub fn resolve_player_contact(a: &mut PlayerState, b: &mut PlayerState) -> bool {
    let min_dist = 2.0 * PLAYER_RADIUS;
    let delta = b.position - a.position;
    let dist = delta.length();
    if dist >= min_dist {
        return false;
    }
    let Some(normal) = delta.try_normalize() else {
        return false;
    };

    let push = normal * ((min_dist - dist) * 0.5);
    a.position = a.position - push;
    b.position += push;

    let va = a.velocity.dot(normal);
    let vb = b.velocity.dot(normal);
    if va > vb {
        let e = PLAYER_RESTITUTION;
        let va_after = ((1.0 - e) * va + (1.0 + e) * vb) * 0.5;
        let vb_after = ((1.0 + e) * va + (1.0 - e) * vb) * 0.5;
        a.velocity += normal * (va_after - va);
        b.velocity += normal * (vb_after - vb);
    }
    true
}

/// Let a player strike the ball.
///
/// The player acts as an immovable body moving at `velocity · PLAYER_BOUNCE`:
/// the ball's normal velocity becomes `2·p − b` while it approaches. The
/// player is not pushed back. Returns true if the ball velocity changed.
pub fn kick_ball(player_position: Vec2, player_velocity: Vec2, ball: &mut BallState) -> bool {
    let Some(normal) = (ball.position - player_position).try_normalize() else {
        return false;
    };

    let pn = (player_velocity * PLAYER_BOUNCE).dot(normal);
    let bn = ball.velocity.dot(normal);
    if bn >= pn {
        // Already separating
        return false;
    }
    ball.velocity += normal * (2.0 * (pn - bn));
    true
}
