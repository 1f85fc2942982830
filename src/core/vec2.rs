//! 2D Vector helpers
//!
//! Positions, velocities and directions are `glam::Vec2` in normalised arena
//! units. This module adds the two conversions the arena needs on top.

pub use glam::Vec2;

/// Unit vector for an angle given in degrees.
///
/// 0° points along +X, 90° along +Y.
#[inline]
pub fn heading(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

/// Check whether both components lie within `[min, max]`.
#[inline]
pub fn within(v: Vec2, min: f32, max: f32) -> bool {
    v.x >= min && v.x <= max && v.y >= min && v.y <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_heading() {
        let right = heading(0.0);
        assert!((right.x - 1.0).abs() < EPS && right.y.abs() < EPS);

        let up = heading(90.0);
        assert!(up.x.abs() < EPS && (up.y - 1.0).abs() < EPS);

        let left = heading(180.0);
        assert!((left.x + 1.0).abs() < EPS);
    }

    #[test]
    fn test_within() {
        assert!(within(Vec2::new(0.5, 0.5), 0.0, 1.0));
        assert!(!within(Vec2::new(1.01, 0.5), 0.0, 1.0));
        assert!(!within(Vec2::new(0.5, -0.01), 0.0, 1.0));
        assert!(!within(Vec2::NAN, 0.0, 1.0));
    }
}
