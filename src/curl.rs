//! Divergence-free flow field derived from gradient noise.
//!
//! Curl noise advects particles without net compression or expansion:
//! because the sampled field has (approximately) zero divergence, particles
//! never bunch up at sinks, which is what gives smoke- and fluid-like
//! motion its even density.
//!
//! Two derivations are supported and selectable at runtime:
//!
//! - [`CurlMode::CrossGradient`] — take the noise gradient at `p` and a
//!   second gradient at `p` offset by a decorrelating constant, normalize
//!   both, and return their cross product. The cross product of two
//!   gradients is divergence-free by construction.
//! - [`CurlMode::VectorCurl`] — treat three phase-shifted noise reads as a
//!   vector field and compute its literal curl via central differences.
//!
//! Both produce visually similar swirls; neither is "the" correct one, so
//! the choice is exposed as a tuning knob rather than hidden.

use crate::noise::NoiseField;
use glam::Vec3;

/// Offset applied to the second gradient read in cross-gradient mode, large
/// enough to decorrelate it from the first.
const DECORRELATE_OFFSET: f32 = 10.5;

/// Phase shift separating the three components of the vector-noise field.
const COMPONENT_PHASE: f32 = 1000.0;

/// Direction substituted when the derivation degenerates to NaN. Aligned
/// with the tunnel's long axis so a recovered particle keeps flowing.
const FALLBACK_DIR: Vec3 = Vec3::Z;

/// How a divergence-free field is derived from the scalar noise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CurlMode {
    /// Cross product of two decorrelated, normalized noise gradients.
    #[default]
    CrossGradient,
    /// Literal curl of a phase-shifted vector-valued noise field.
    VectorCurl,
}

/// Samples a normalized, divergence-free vector field from a [`NoiseField`].
///
/// # Example
///
/// ```ignore
/// let noise = NoiseField::new(42);
/// let sampler = CurlSampler::new(CurlMode::CrossGradient);
/// let dir = sampler.curl(&noise, position / noise_scale);
/// assert!((dir.length() - 1.0).abs() < 1e-4 || dir == Vec3::ZERO);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct CurlSampler {
    mode: CurlMode,
    /// Central-difference step.
    eps: f32,
}

impl CurlSampler {
    /// Create a sampler using the given derivation mode and the default
    /// finite-difference step of `1e-4`.
    pub fn new(mode: CurlMode) -> Self {
        Self { mode, eps: 1e-4 }
    }

    /// Override the finite-difference step.
    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// The active derivation mode.
    pub fn mode(&self) -> CurlMode {
        self.mode
    }

    /// Sample the curl field at `p`.
    ///
    /// The result is unit length, or zero when the field magnitude vanishes
    /// exactly. NaN never escapes: a degenerate derivation yields a fixed
    /// fallback direction instead.
    pub fn curl(&self, noise: &NoiseField, p: Vec3) -> Vec3 {
        let raw = match self.mode {
            CurlMode::CrossGradient => self.cross_gradient(noise, p),
            CurlMode::VectorCurl => self.vector_curl(noise, p),
        };
        if !raw.is_finite() {
            return FALLBACK_DIR;
        }
        raw.normalize_or_zero()
    }

    /// Gradient of the scalar field at `p` via central differences.
    fn gradient(&self, noise: &NoiseField, p: Vec3) -> Vec3 {
        let e = self.eps;
        let inv = 1.0 / (2.0 * e);
        Vec3::new(
            (noise.sample3(p.x + e, p.y, p.z) - noise.sample3(p.x - e, p.y, p.z)) * inv,
            (noise.sample3(p.x, p.y + e, p.z) - noise.sample3(p.x, p.y - e, p.z)) * inv,
            (noise.sample3(p.x, p.y, p.z + e) - noise.sample3(p.x, p.y, p.z - e)) * inv,
        )
    }

    fn cross_gradient(&self, noise: &NoiseField, p: Vec3) -> Vec3 {
        let g0 = self.gradient(noise, p);
        let g1 = self.gradient(noise, p + Vec3::splat(DECORRELATE_OFFSET));
        // Detect degeneracy before normalizing: normalize_or_zero would
        // quietly turn a NaN gradient into the zero vector and mask it.
        if !g0.is_finite() || !g1.is_finite() {
            return Vec3::NAN;
        }
        g0.normalize_or_zero().cross(g1.normalize_or_zero())
    }

    /// Three phase-shifted reads interpreted as one vector sample.
    fn noise3(&self, noise: &NoiseField, p: Vec3) -> Vec3 {
        Vec3::new(
            noise.sample3(p.x, p.y, p.z),
            noise.sample3(p.x, p.y, p.z + COMPONENT_PHASE),
            noise.sample3(p.x + COMPONENT_PHASE, p.y, p.z),
        )
    }

    fn vector_curl(&self, noise: &NoiseField, p: Vec3) -> Vec3 {
        let e = self.eps;
        let inv = 1.0 / (2.0 * e);

        let dx = self.noise3(noise, p + Vec3::X * e) - self.noise3(noise, p - Vec3::X * e);
        let dy = self.noise3(noise, p + Vec3::Y * e) - self.noise3(noise, p - Vec3::Y * e);
        let dz = self.noise3(noise, p + Vec3::Z * e) - self.noise3(noise, p - Vec3::Z * e);

        Vec3::new(
            (dy.z - dz.y) * inv,
            (dz.x - dx.z) * inv,
            (dx.y - dy.x) * inv,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit_or_zero(v: Vec3) {
        assert!(v.is_finite(), "non-finite curl: {:?}", v);
        let len = v.length();
        assert!(
            len < 1e-6 || (len - 1.0).abs() < 1e-4,
            "curl length {} is neither 0 nor 1",
            len
        );
    }

    #[test]
    fn test_cross_gradient_normalized() {
        let noise = NoiseField::new(11);
        let sampler = CurlSampler::new(CurlMode::CrossGradient);
        for i in 0..200 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.21, i as f32 * 0.11);
            assert_unit_or_zero(sampler.curl(&noise, p));
        }
    }

    #[test]
    fn test_vector_curl_normalized() {
        let noise = NoiseField::new(11);
        let sampler = CurlSampler::new(CurlMode::VectorCurl);
        for i in 0..200 {
            let p = Vec3::new(i as f32 * 0.29, i as f32 * 0.31, i as f32 * -0.17);
            assert_unit_or_zero(sampler.curl(&noise, p));
        }
    }

    #[test]
    fn test_pathological_inputs_never_yield_nan() {
        let noise = NoiseField::new(0);
        for mode in [CurlMode::CrossGradient, CurlMode::VectorCurl] {
            let sampler = CurlSampler::new(mode);
            for p in [
                Vec3::ZERO,
                Vec3::splat(1.0),
                Vec3::splat(-1.0),
                Vec3::new(1e6, 1e6, 1e6),
                Vec3::new(f32::NAN, 0.0, 0.0),
                Vec3::splat(f32::NAN),
                Vec3::new(f32::INFINITY, 1.0, -1.0),
            ] {
                let c = sampler.curl(&noise, p);
                assert!(c.is_finite(), "mode {:?} leaked NaN for {:?}", mode, p);
            }
        }
    }

    #[test]
    fn test_nan_input_falls_back_to_flow_axis() {
        let noise = NoiseField::new(3);
        let sampler = CurlSampler::new(CurlMode::CrossGradient);
        assert_eq!(sampler.curl(&noise, Vec3::splat(f32::NAN)), Vec3::Z);
    }

    #[test]
    fn test_deterministic() {
        let noise = NoiseField::new(21);
        let sampler = CurlSampler::new(CurlMode::CrossGradient);
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(sampler.curl(&noise, p), sampler.curl(&noise, p));
    }
}
