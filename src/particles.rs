//! Particle storage.
//!
//! [`ParticleStore`] keeps the whole population as structure-of-arrays:
//! per-attribute `Vec`s indexed by particle. The layout serves the renderer
//! boundary — a renderer wants flat `positions`/`colors`/`alphas`/`sizes`
//! arrays it can upload wholesale, and [`ParticleSnapshot`] hands those out
//! as zero-copy views. The store owns no rendering resources and never
//! reallocates during a frame; the capacity is fixed for the lifetime of an
//! instance.

use glam::Vec3;

/// Structure-of-arrays particle population.
///
/// All arrays have identical length, fixed at construction. Changing the
/// particle count means building a new store (the simulation does this on
/// `configure` when the count changes).
pub struct ParticleStore {
    pub(crate) positions: Vec<Vec3>,
    pub(crate) velocities: Vec<Vec3>,
    pub(crate) colors: Vec<Vec3>,
    pub(crate) ages: Vec<f32>,
    pub(crate) lifetimes: Vec<f32>,
    pub(crate) sizes: Vec<f32>,
    pub(crate) alphas: Vec<f32>,
    pub(crate) alpha_targets: Vec<f32>,
    /// Weak reference into the lesion entry list; carries no ownership and
    /// is cleared wholesale on regeneration.
    pub(crate) lesions: Vec<Option<u32>>,
}

impl ParticleStore {
    /// Allocate a zeroed store for `count` particles.
    pub fn new(count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; count],
            velocities: vec![Vec3::ZERO; count],
            colors: vec![Vec3::ZERO; count],
            ages: vec![0.0; count],
            lifetimes: vec![0.0; count],
            sizes: vec![0.0; count],
            alphas: vec![0.0; count],
            alpha_targets: vec![1.0; count],
            lesions: vec![None; count],
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the store holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Read-only view of the render-relevant attributes.
    ///
    /// Valid until the next mutation of the store (in practice: until the
    /// next `step`, `configure`, or `regenerate` call).
    pub fn snapshot(&self) -> ParticleSnapshot<'_> {
        ParticleSnapshot {
            positions: bytemuck::cast_slice(&self.positions),
            colors: bytemuck::cast_slice(&self.colors),
            alphas: &self.alphas,
            sizes: &self.sizes,
        }
    }
}

/// Flat, read-only view of the particle attributes a renderer consumes.
///
/// `positions` and `colors` are interleaved triples (`3 * len` floats);
/// `alphas` and `sizes` have one entry per particle. The views borrow the
/// store directly — no copies, no per-frame allocation.
#[derive(Clone, Copy)]
pub struct ParticleSnapshot<'a> {
    /// World-space positions, `[x0, y0, z0, x1, ...]`.
    pub positions: &'a [f32],
    /// RGB colors in [0, 1], `[r0, g0, b0, r1, ...]`.
    pub colors: &'a [f32],
    /// Per-particle opacity in [0, 1].
    pub alphas: &'a [f32],
    /// Per-particle point size in world units.
    pub sizes: &'a [f32],
}

impl ParticleSnapshot<'_> {
    /// Number of particles in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.alphas.len()
    }

    /// Whether the view is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alphas.is_empty()
    }
}
