//! Seeded randomness for spawning and scene generation.
//!
//! [`SpawnContext`] wraps a small, fast RNG behind helpers for the spawn
//! patterns the simulation actually uses: annulus placement around the
//! tunnel wall, lifetimes, and color jitter. Keeping all randomness behind
//! one reseedable context is what makes `regenerate(seed)` reproducible —
//! the same seed replays the same lesion set and initial particle layout.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Reseedable random source for spawn decisions.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context seeded with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in the given range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Random angle in `[0, 2π)`.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    // ========== Tunnel-specific helpers ==========

    /// Random radial distance for the spawn annulus: 70–100% of
    /// `wall_radius`, square-root weighted so density leans toward the
    /// wall and the centerline stays sparse.
    pub fn annulus_radius(&mut self, wall_radius: f32) -> f32 {
        let variation = self.rng.gen::<f32>().sqrt();
        wall_radius * (0.7 + variation * 0.3)
    }

    /// Random lifetime drawn from an inclusive range of seconds.
    pub fn lifetime(&mut self, range: (f32, f32)) -> f32 {
        self.random_range(range.0, range.1)
    }

    /// Small per-axis drift used for freshly spawned particles.
    pub fn drift(&mut self, magnitude: f32) -> Vec3 {
        Vec3::new(
            self.random_range(-magnitude, magnitude),
            self.random_range(-magnitude, magnitude),
            self.random_range(-magnitude, magnitude),
        )
    }

    // ========== Color helpers ==========

    /// Jitter each channel of `base` by up to `±amount`, clamped to [0, 1].
    pub fn jitter_color(&mut self, base: Vec3, amount: f32) -> Vec3 {
        if amount <= 0.0 {
            return base;
        }
        let jitter = Vec3::new(
            self.random_range(-amount, amount),
            self.random_range(-amount, amount),
            self.random_range(-amount, amount),
        );
        (base + jitter).clamp(Vec3::ZERO, Vec3::ONE)
    }
}
