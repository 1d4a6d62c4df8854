//! Simulation configuration.
//!
//! [`SimConfig`] is one immutable value describing the whole scene. The
//! simulation never mutates a config in place; callers build a new value
//! (all fields are public, `with_*` helpers cover the common knobs) and
//! hand it to `Simulation::configure`, which validates it, diffs it against
//! the active config, and rebuilds the scene geometry only when a
//! geometry-affecting field actually changed. Tuning-only changes (speeds,
//! strengths, colors) apply to the next frame without disturbing particle
//! state.

use crate::curl::CurlMode;
use crate::error::ConfigError;
use crate::lesion::LesionMode;
use glam::{Vec2, Vec3};

/// Full parameter set for a tunnel scene.
///
/// Defaults reproduce the classic look: a fuchsia tunnel 8000 units deep
/// and 400 wide, 15k particles, gentle spiral, eight green wall lesions.
///
/// # Example
///
/// ```ignore
/// let config = SimConfig::default()
///     .with_particle_count(25_000)
///     .with_tunnel(500.0, 10_000.0)
///     .with_curl_mode(CurlMode::VectorCurl);
/// let mut sim = Simulation::new(config)?;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    // ----- geometry -----
    /// Number of particle slots; fixed until the next reconfigure.
    pub particle_count: usize,
    /// Tunnel wall radius in world units.
    pub tunnel_radius: f32,
    /// Tunnel length along z.
    pub tunnel_depth: f32,
    /// Number of spline segments in the generated centerline.
    pub path_segments: usize,
    /// Uniform x/y shift applied to every centerline point (biases the
    /// tunnel toward one side of the viewport).
    pub lateral_offset: Vec2,

    // ----- flow -----
    /// Curl derivation strategy.
    pub curl_mode: CurlMode,
    /// Gain on the curl direction (per-frame velocity units).
    pub curl_speed: f32,
    /// World-units-per-noise-unit scale; larger values give broader swirls.
    pub noise_scale: f32,
    /// Rate at which the noise field drifts over time, animating the flow.
    pub noise_drift: f32,
    /// Forward flow along the path tangent.
    pub flow_speed: f32,
    /// Tangential swirl around the tunnel axis.
    pub spiral_factor: f32,
    /// Gain of the radial restoring force.
    pub confinement_strength: f32,

    // ----- appearance -----
    /// Base particle size in world units.
    pub base_size: f32,
    /// Base particle color (RGB in [0, 1]).
    pub base_color: Vec3,
    /// Min/max particle lifetime in seconds.
    pub lifetime_range: (f32, f32),
    /// Exponential rate at which alpha approaches its target; higher means
    /// faster fade-in.
    pub fade_in_rate: f32,
    /// Distance within which particles render at full opacity when a
    /// camera feed is supplied.
    pub fog_distance: f32,
    /// Exponential opacity falloff beyond `fog_distance`.
    pub fog_density: f32,

    // ----- camera flight -----
    /// Per-step smoothing applied to the host's scroll progress.
    pub scroll_smoothing: f32,

    // ----- lesions -----
    /// Membership strategy: fixed wall set or pointer-tracked.
    pub lesion_mode: LesionMode,
    /// Number of wall entries (ignored in pointer mode; zero disables).
    pub lesion_count: usize,
    /// Base influence radius of an entry.
    pub lesion_radius: f32,
    /// Base entry color.
    pub lesion_color: Vec3,
    /// Per-channel random color jitter amplitude.
    pub lesion_color_variation: f32,
    /// Brightening multiplier near the entry center.
    pub lesion_intensity_boost: f32,
    /// Size multiplier for member particles.
    pub lesion_size_multiplier: f32,
    /// Depression depth as a fraction of entry radius; zero disables the
    /// wall depression.
    pub lesion_depth_factor: f32,
    /// Fraction of the entry radius forming the depression footprint.
    pub lesion_compactness: f32,
    /// Rim roll-off exponent; smaller values give sharper rims.
    pub lesion_edge_softness: f32,
    /// Central fraction of the tunnel length that receives entries.
    pub lesion_distribution: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count: 15_000,
            tunnel_radius: 400.0,
            tunnel_depth: 8000.0,
            path_segments: 20,
            lateral_offset: Vec2::ZERO,

            curl_mode: CurlMode::CrossGradient,
            curl_speed: 4.0,
            noise_scale: 1500.0,
            noise_drift: 0.05,
            flow_speed: 1.0,
            spiral_factor: 0.2,
            confinement_strength: 0.1,

            base_size: 25.0,
            base_color: Vec3::new(0.918, 0.212, 0.557),
            lifetime_range: (2.0, 5.0),
            fade_in_rate: 3.0,
            fog_distance: 1500.0,
            fog_density: 0.001,

            scroll_smoothing: 0.1,

            lesion_mode: LesionMode::Wall,
            lesion_count: 8,
            lesion_radius: 150.0,
            lesion_color: Vec3::new(0.0, 1.0, 0.0),
            lesion_color_variation: 0.0,
            lesion_intensity_boost: 1.2,
            lesion_size_multiplier: 2.0,
            lesion_depth_factor: 0.4,
            lesion_compactness: 0.6,
            lesion_edge_softness: 0.3,
            lesion_distribution: 0.8,
        }
    }
}

impl SimConfig {
    /// Set the particle slot count.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set tunnel radius and depth together.
    pub fn with_tunnel(mut self, radius: f32, depth: f32) -> Self {
        self.tunnel_radius = radius;
        self.tunnel_depth = depth;
        self
    }

    /// Choose the curl derivation strategy.
    pub fn with_curl_mode(mut self, mode: CurlMode) -> Self {
        self.curl_mode = mode;
        self
    }

    /// Set forward flow speed.
    pub fn with_flow_speed(mut self, speed: f32) -> Self {
        self.flow_speed = speed;
        self
    }

    /// Set the spiral swirl gain.
    pub fn with_spiral_factor(mut self, factor: f32) -> Self {
        self.spiral_factor = factor;
        self
    }

    /// Choose the lesion membership strategy.
    pub fn with_lesion_mode(mut self, mode: LesionMode) -> Self {
        self.lesion_mode = mode;
        self
    }

    /// Set the number of wall lesions.
    pub fn with_lesion_count(mut self, count: usize) -> Self {
        self.lesion_count = count;
        self
    }

    /// Set the particle lifetime range in seconds.
    pub fn with_lifetime_range(mut self, min: f32, max: f32) -> Self {
        self.lifetime_range = (min, max);
        self
    }

    /// Check every parameter; returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ParticleCountZero);
        }

        let positive: [(&'static str, f32); 8] = [
            ("tunnel_radius", self.tunnel_radius),
            ("tunnel_depth", self.tunnel_depth),
            ("noise_scale", self.noise_scale),
            ("base_size", self.base_size),
            ("fade_in_rate", self.fade_in_rate),
            ("fog_distance", self.fog_distance),
            ("fog_density", self.fog_density),
            ("lesion_radius", self.lesion_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        let non_negative: [(&'static str, f32); 6] = [
            ("curl_speed", self.curl_speed),
            ("noise_drift", self.noise_drift),
            ("flow_speed", self.flow_speed),
            ("spiral_factor", self.spiral_factor),
            ("confinement_strength", self.confinement_strength),
            ("lesion_depth_factor", self.lesion_depth_factor),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        let fractions: [(&'static str, f32); 4] = [
            ("scroll_smoothing", self.scroll_smoothing),
            ("lesion_compactness", self.lesion_compactness),
            ("lesion_edge_softness", self.lesion_edge_softness),
            ("lesion_distribution", self.lesion_distribution),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }

        if self.path_segments < 3 {
            return Err(ConfigError::TooFewSegments(self.path_segments));
        }

        let (min, max) = self.lifetime_range;
        if !(min > 0.0 && max >= min) {
            return Err(ConfigError::InvalidLifetimeRange { min, max });
        }

        Ok(())
    }

    /// Whether switching from `self` to `next` requires rebuilding the
    /// scene (path, lesion set, particle placement).
    ///
    /// Only geometry-affecting fields count; retuning speeds, forces, or
    /// base colors never disturbs particle state. In particular an
    /// unchanged config never regenerates, so re-applying the active
    /// config is a no-op.
    pub fn needs_regenerate(&self, next: &SimConfig) -> bool {
        self.particle_count != next.particle_count
            || self.tunnel_radius != next.tunnel_radius
            || self.tunnel_depth != next.tunnel_depth
            || self.path_segments != next.path_segments
            || self.lateral_offset != next.lateral_offset
            || self.lesion_mode != next.lesion_mode
            || self.lesion_count != next.lesion_count
            || self.lesion_radius != next.lesion_radius
            || self.lesion_color != next.lesion_color
            || self.lesion_color_variation != next.lesion_color_variation
            || self.lesion_distribution != next.lesion_distribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_particles() {
        let config = SimConfig::default().with_particle_count(0);
        assert_eq!(config.validate().unwrap_err(), ConfigError::ParticleCountZero);
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let config = SimConfig::default().with_tunnel(0.0, 8000.0);
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::NonPositive {
                name: "tunnel_radius",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_nan_radius() {
        let config = SimConfig::default().with_tunnel(f32::NAN, 8000.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_lifetime_range() {
        let config = SimConfig::default().with_lifetime_range(5.0, 2.0);
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidLifetimeRange { .. }
        ));
    }

    #[test]
    fn test_rejects_out_of_range_fraction() {
        let mut config = SimConfig::default();
        config.lesion_edge_softness = 1.5;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::FractionOutOfRange {
                name: "lesion_edge_softness",
                ..
            }
        ));
    }

    #[test]
    fn test_identical_config_never_regenerates() {
        let config = SimConfig::default();
        assert!(!config.needs_regenerate(&config.clone()));
    }

    #[test]
    fn test_geometry_change_regenerates() {
        let config = SimConfig::default();
        assert!(config.needs_regenerate(&config.clone().with_tunnel(500.0, 8000.0)));
        assert!(config.needs_regenerate(&config.clone().with_particle_count(1)));
        assert!(config.needs_regenerate(&config.clone().with_lesion_count(3)));
    }

    #[test]
    fn test_tuning_change_does_not_regenerate() {
        let config = SimConfig::default();
        assert!(!config.needs_regenerate(&config.clone().with_flow_speed(3.0)));
        assert!(!config.needs_regenerate(&config.clone().with_spiral_factor(0.5)));
        assert!(!config.needs_regenerate(&config.clone().with_curl_mode(CurlMode::VectorCurl)));
    }
}
