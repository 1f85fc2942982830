//! Seeded Random Number Generator
//!
//! PCG32 from `rand_pcg`, used for ball serves after a goal. The same seed
//! gives the same serves, which keeps round resets reproducible in tests.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::vec2::Vec2;

/// Serve RNG.
pub type ArenaRng = Pcg32;

/// Create the serve RNG from a 64-bit seed.
pub fn seeded(seed: u64) -> ArenaRng {
    Pcg32::seed_from_u64(seed)
}

/// Random velocity with each component in `[-max, max]`.
pub fn random_serve(rng: &mut ArenaRng, max: f32) -> Vec2 {
    if max <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(rng.random_range(-max..=max), rng.random_range(-max..=max))
}
