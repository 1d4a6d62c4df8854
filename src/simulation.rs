//! Simulation orchestrator.
//!
//! [`Simulation`] owns the whole scene — noise field, curl sampler, tunnel
//! path, lesion set, and particle store — and advances it one synchronous
//! `step(dt)` at a time. There is no internal threading and no locking: the
//! host's render loop calls `step`, then reads the [`ParticleSnapshot`]
//! and uploads it however it likes. Regeneration calls (`configure` with a
//! geometry change, `regenerate`) fully replace the relevant state between
//! steps; they are never interleaved with one.
//!
//! # Example
//!
//! ```ignore
//! let mut sim = Simulation::new(SimConfig::default())?;
//! loop {
//!     sim.set_scroll_target(scroll_progress);
//!     sim.step(frame_dt)?;
//!     let snap = sim.snapshot();
//!     renderer.upload(snap.positions, snap.colors, snap.alphas, snap.sizes);
//! }
//! ```

use crate::config::SimConfig;
use crate::confinement::ConfinementPolicy;
use crate::curl::CurlSampler;
use crate::error::{ConfigError, StepError};
use crate::lesion::LesionField;
use crate::noise::NoiseField;
use crate::particles::{ParticleSnapshot, ParticleStore};
use crate::path::TunnelPath;
use crate::respawn::{RespawnPolicy, Spawn};
use crate::spawn::SpawnContext;
use glam::Vec3;
use log::{debug, info};

/// Upper bound on a single step's delta. Tab-resume and debugger pauses
/// hand the host huge deltas; integrating them in one go would fling
/// particles out of the tunnel.
pub const MAX_STEP_DELTA: f32 = 1.0 / 30.0;

/// Velocities are expressed in per-frame units at a 60 Hz reference (the
/// tuned constants predate dt-scaling), so integration multiplies by
/// `dt * 60`.
const FRAME_RATE_NORMALIZATION: f32 = 60.0;

/// How far beyond the current scroll progress the camera looks.
const LOOK_AHEAD: f32 = 0.05;

/// Host-supplied camera pose used for distance-fog alpha targeting.
#[derive(Clone, Copy, Debug)]
pub struct CameraFeed {
    /// Camera position in world space.
    pub position: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
}

/// Where on the path the camera should sit for the current (smoothed)
/// scroll progress.
#[derive(Clone, Copy, Debug)]
pub struct CameraSample {
    /// Centerline point at the smoothed scroll progress.
    pub position: Vec3,
    /// Centerline point slightly ahead, to aim the camera at.
    pub look_at: Vec3,
    /// Path tangent at the smoothed scroll progress.
    pub tangent: Vec3,
}

/// The tunnel particle simulation.
pub struct Simulation {
    config: SimConfig,
    noise: NoiseField,
    sampler: CurlSampler,
    path: TunnelPath,
    lesions: LesionField,
    store: ParticleStore,
    ctx: SpawnContext,
    elapsed: f32,
    scroll_progress: f32,
    scroll_target: f32,
    pointer: Option<Vec3>,
    camera: Option<CameraFeed>,
}

impl Simulation {
    /// Build a simulation from `config`, seeding the scene from a
    /// non-reproducible random source. Use [`Simulation::regenerate`] with
    /// an explicit seed for reproducible scenes.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = rand::random::<u64>();
        let path = Self::build_path(&config)?;
        let mut sim = Self {
            sampler: CurlSampler::new(config.curl_mode),
            noise: NoiseField::new(seed),
            lesions: LesionField::generate(&config, &path, &mut SpawnContext::from_seed(seed)),
            store: ParticleStore::new(config.particle_count),
            ctx: SpawnContext::from_seed(seed),
            path,
            config,
            elapsed: 0.0,
            scroll_progress: 0.0,
            scroll_target: 0.0,
            pointer: None,
            camera: None,
        };
        sim.rebuild(seed)?;
        Ok(sim)
    }

    /// Apply a new configuration.
    ///
    /// The config is validated first; on rejection the active state is
    /// untouched. Geometry-affecting changes (counts, tunnel shape, lesion
    /// layout) trigger a full regeneration with a fresh random seed;
    /// tuning-only changes take effect on the next step without disturbing
    /// particle state. Re-applying an unchanged config is a no-op.
    pub fn configure(&mut self, config: SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let regenerate = self.config.needs_regenerate(&config);

        if regenerate {
            // Build the only fallible piece before committing anything.
            let path = Self::build_path(&config)?;
            self.path = path;
            self.config = config;
            self.sampler = CurlSampler::new(self.config.curl_mode);
            self.rebuild(rand::random::<u64>())?;
            info!(
                "reconfigured with geometry change: {} particles, radius {}, depth {}",
                self.config.particle_count, self.config.tunnel_radius, self.config.tunnel_depth
            );
        } else {
            self.config = config;
            self.sampler = CurlSampler::new(self.config.curl_mode);
            debug!("reconfigured tuning parameters in place");
        }
        Ok(())
    }

    /// Rebuild the noise table, tunnel path, lesion set, and particle
    /// placement.
    ///
    /// With `Some(seed)` the rebuild is fully deterministic: equal seeds
    /// (and equal configs) reproduce identical noise tables, lesion sets,
    /// and initial particle layouts. With `None` a random seed is drawn.
    pub fn regenerate(&mut self, seed: Option<u64>) -> Result<(), ConfigError> {
        let seed = seed.unwrap_or_else(rand::random);
        self.path = Self::build_path(&self.config)?;
        self.rebuild(seed)
    }

    fn build_path(config: &SimConfig) -> Result<TunnelPath, ConfigError> {
        Ok(TunnelPath::generate(
            config.tunnel_depth,
            config.tunnel_radius,
            config.lateral_offset,
            config.path_segments,
        )?)
    }

    /// Replace everything derived from the seed. The path must already
    /// match the current config.
    fn rebuild(&mut self, seed: u64) -> Result<(), ConfigError> {
        self.noise.reseed(seed);
        self.ctx = SpawnContext::from_seed(seed);
        self.lesions = LesionField::generate(&self.config, &self.path, &mut self.ctx);

        if self.store.len() != self.config.particle_count {
            self.store = ParticleStore::new(self.config.particle_count);
        }

        let respawn = self.respawn_policy();
        for i in 0..self.store.len() {
            let spawn = respawn.respawn(&self.path, &mut self.ctx);
            apply_spawn(&mut self.store, i, spawn, &self.config);
        }

        self.elapsed = 0.0;
        info!(
            "regenerated scene: seed {}, {} particles, {} lesions",
            seed,
            self.store.len(),
            self.lesions.entries().len()
        );
        Ok(())
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `dt` must be finite and non-negative — anything else is a host bug
    /// and is reported rather than silently clamped. Deltas above
    /// [`MAX_STEP_DELTA`] *are* clamped (slow frames should stutter, not
    /// explode). Numerical degeneracies inside the frame never fail the
    /// call: a particle that turns NaN is respawned on the spot.
    pub fn step(&mut self, dt: f32) -> Result<(), StepError> {
        if !dt.is_finite() {
            return Err(StepError::NonFiniteDelta(dt));
        }
        if dt < 0.0 {
            return Err(StepError::NegativeDelta(dt));
        }
        let dt = dt.min(MAX_STEP_DELTA);

        self.elapsed += dt;
        self.scroll_progress +=
            (self.scroll_target - self.scroll_progress) * self.config.scroll_smoothing;

        if let Some(world) = self.pointer {
            self.lesions.track_pointer(world);
        }

        let confinement = ConfinementPolicy {
            radius: self.config.tunnel_radius,
            strength: self.config.confinement_strength,
            spiral: self.config.spiral_factor,
        };
        let respawn = self.respawn_policy();
        let drift = Vec3::splat(self.elapsed * self.config.noise_drift);
        let inv_scale = 1.0 / self.config.noise_scale;
        let half_depth = self.config.tunnel_depth / 2.0;
        let alpha_blend = 1.0 - (-self.config.fade_in_rate * dt).exp();

        let config = &self.config;
        let store = &mut self.store;
        let ctx = &mut self.ctx;
        let path = &self.path;
        let lesions = &self.lesions;
        let noise = &self.noise;
        let sampler = &self.sampler;
        let camera = self.camera;

        for i in 0..store.len() {
            let pos = store.positions[i];

            // Contain numerical corruption: a bad particle is recycled,
            // never allowed to poison the frame.
            if !pos.is_finite() || !store.velocities[i].is_finite() {
                debug!("particle {} state went non-finite, respawning", i);
                apply_spawn(store, i, respawn.respawn(path, ctx), config);
                continue;
            }

            // Approximate path parameter from z progress; monotonic along
            // the tunnel, which is all confinement needs.
            let u = ((pos.z + half_depth) / config.tunnel_depth).clamp(0.0, 1.0);
            let frame = path.frame_at(u);

            let curl = sampler.curl(noise, pos * inv_scale + drift);
            let in_plane = confinement.radial_force(frame.to_plane(pos - frame.point));

            // Velocity is recomputed from the current forces every frame,
            // not accumulated.
            let velocity = curl * (config.curl_speed * 0.5)
                + frame.to_world(in_plane)
                + frame.tangent * (config.flow_speed * 5.0);

            if !velocity.is_finite() {
                debug!("particle {} velocity went non-finite, respawning", i);
                apply_spawn(store, i, respawn.respawn(path, ctx), config);
                continue;
            }

            let new_pos = pos + velocity * (dt * FRAME_RATE_NORMALIZATION);
            store.velocities[i] = velocity;
            store.positions[i] = new_pos;
            store.ages[i] += dt;

            if respawn.should_respawn(new_pos, frame.point, store.ages[i], store.lifetimes[i]) {
                apply_spawn(store, i, respawn.respawn(path, ctx), config);
            }

            // Lesion tinting and sizing on the settled position.
            match lesions.classify(store.positions[i]) {
                Some(hit) => {
                    store.colors[i] = hit.color;
                    store.sizes[i] = config.base_size
                        * config.lesion_size_multiplier
                        * (0.8 + 0.4 * hit.intensity);
                    // Depress once, on entry into the zone; members already
                    // inside keep their depressed position.
                    if store.lesions[i] != Some(hit.index) {
                        store.positions[i] = lesions.depress(hit.index, store.positions[i]);
                    }
                    store.lesions[i] = Some(hit.index);
                }
                None => {
                    store.colors[i] = config.base_color;
                    store.sizes[i] = config.base_size;
                    store.lesions[i] = None;
                }
            }

            // Smooth alpha toward its target; snapping would flicker.
            store.alpha_targets[i] = match camera {
                Some(cam) => fog_alpha(config, cam, store.positions[i]),
                None => 1.0,
            };
            store.alphas[i] += (store.alpha_targets[i] - store.alphas[i]) * alpha_blend;
        }

        Ok(())
    }

    /// Read-only view of the render attributes; valid until the next
    /// mutating call.
    pub fn snapshot(&self) -> ParticleSnapshot<'_> {
        self.store.snapshot()
    }

    /// Feed the host's scroll progress target in [0, 1]; the live progress
    /// eases toward it each step.
    pub fn set_scroll_target(&mut self, progress: f32) {
        self.scroll_target = progress.clamp(0.0, 1.0);
    }

    /// Feed the pointer's world-space position, or `None` when the pointer
    /// leaves. Only consumed in [`LesionMode::Pointer`](crate::LesionMode).
    pub fn set_pointer(&mut self, world: Option<Vec3>) {
        self.pointer = world;
    }

    /// Feed the camera pose for distance-fog alpha targeting, or `None` to
    /// render every particle at full target opacity.
    pub fn set_camera(&mut self, camera: Option<CameraFeed>) {
        self.camera = camera.map(|cam| CameraFeed {
            position: cam.position,
            forward: cam.forward.normalize_or(Vec3::Z),
        });
    }

    /// Camera placement on the path for the current smoothed scroll
    /// progress.
    pub fn camera_sample(&self) -> CameraSample {
        let u = self.scroll_progress;
        CameraSample {
            position: self.path.point_at(u),
            look_at: self.path.point_at((u + LOOK_AHEAD).min(1.0)),
            tangent: self.path.tangent_at(u),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The tunnel centerline.
    pub fn path(&self) -> &TunnelPath {
        &self.path
    }

    /// The lesion set.
    pub fn lesions(&self) -> &LesionField {
        &self.lesions
    }

    /// Simulated seconds since the last regeneration.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The smoothed scroll progress in [0, 1].
    pub fn scroll_progress(&self) -> f32 {
        self.scroll_progress
    }

    fn respawn_policy(&self) -> RespawnPolicy {
        RespawnPolicy {
            tunnel_radius: self.config.tunnel_radius,
            tunnel_depth: self.config.tunnel_depth,
            lifetime_range: self.config.lifetime_range,
        }
    }
}

/// Install a fresh spawn into slot `i`: age and alpha restart at zero so
/// the particle fades in.
fn apply_spawn(store: &mut ParticleStore, i: usize, spawn: Spawn, config: &SimConfig) {
    store.positions[i] = spawn.position;
    store.velocities[i] = spawn.velocity;
    store.ages[i] = 0.0;
    store.lifetimes[i] = spawn.lifetime;
    store.sizes[i] = config.base_size;
    store.colors[i] = config.base_color;
    store.alphas[i] = 0.0;
    store.alpha_targets[i] = 1.0;
    store.lesions[i] = None;
}

/// Distance-fog opacity target: full within `fog_distance`, exponential
/// falloff beyond it, zero behind the camera.
fn fog_alpha(config: &SimConfig, camera: CameraFeed, position: Vec3) -> f32 {
    let to_particle = position - camera.position;
    if to_particle.dot(camera.forward) <= 0.0 {
        return 0.0;
    }
    let distance = to_particle.length();
    if distance < config.fog_distance {
        1.0
    } else {
        (-(distance - config.fog_distance) * config.fog_density).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesion::LesionMode;

    fn small_config() -> SimConfig {
        SimConfig::default().with_particle_count(200)
    }

    #[test]
    fn test_rejects_negative_dt() {
        let mut sim = Simulation::new(small_config()).unwrap();
        assert_eq!(sim.step(-0.01), Err(StepError::NegativeDelta(-0.01)));
    }

    #[test]
    fn test_rejects_nan_dt() {
        let mut sim = Simulation::new(small_config()).unwrap();
        assert!(matches!(
            sim.step(f32::NAN),
            Err(StepError::NonFiniteDelta(_))
        ));
    }

    #[test]
    fn test_zero_dt_is_allowed() {
        let mut sim = Simulation::new(small_config()).unwrap();
        assert!(sim.step(0.0).is_ok());
    }

    #[test]
    fn test_large_dt_is_clamped_not_rejected() {
        let mut sim = Simulation::new(small_config()).unwrap();
        assert!(sim.step(5.0).is_ok());
        // The clamp bounds elapsed time too.
        assert!(sim.elapsed() <= MAX_STEP_DELTA + 1e-6);
    }

    #[test]
    fn test_invalid_configure_keeps_previous_state() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.step(1.0 / 60.0).unwrap();
        let before: Vec<f32> = sim.snapshot().positions.to_vec();

        let bad = small_config().with_tunnel(-1.0, 8000.0);
        assert!(sim.configure(bad).is_err());

        assert_eq!(sim.snapshot().positions, &before[..]);
        assert_eq!(sim.config().tunnel_radius, 400.0);
    }

    #[test]
    fn test_scroll_progress_eases_toward_target() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.set_scroll_target(1.0);
        sim.step(1.0 / 60.0).unwrap();
        let first = sim.scroll_progress();
        assert!(first > 0.0 && first < 1.0);
        for _ in 0..200 {
            sim.step(1.0 / 60.0).unwrap();
        }
        assert!(sim.scroll_progress() > 0.99);
    }

    #[test]
    fn test_camera_sample_follows_path() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let sample = sim.camera_sample();
        assert!(sample.position.distance(sim.path().point_at(0.0)) < 1e-3);
        assert!((sample.tangent.length() - 1.0).abs() < 1e-4);

        sim.set_scroll_target(0.5);
        for _ in 0..500 {
            sim.step(1.0 / 60.0).unwrap();
        }
        let mid = sim.camera_sample();
        assert!(mid.position.distance(sim.path().point_at(0.5)) < 1.0);
        assert!(mid.look_at.distance(sim.path().point_at(0.55)) < 1.0);
    }

    #[test]
    fn test_fog_alpha_behind_camera_is_zero() {
        let config = small_config();
        let cam = CameraFeed {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        };
        assert_eq!(fog_alpha(&config, cam, Vec3::new(0.0, 0.0, -100.0)), 0.0);
        assert_eq!(fog_alpha(&config, cam, Vec3::new(0.0, 0.0, 100.0)), 1.0);
        let far = fog_alpha(&config, cam, Vec3::new(0.0, 0.0, 3000.0));
        assert!(far > 0.0 && far < 1.0);
    }

    #[test]
    fn test_alpha_fades_in_without_snapping() {
        let mut sim = Simulation::new(small_config()).unwrap();
        // Freshly seeded particles start transparent.
        assert!(sim.snapshot().alphas.iter().all(|&a| a == 0.0));
        sim.step(1.0 / 60.0).unwrap();
        let after_one = sim.snapshot().alphas.to_vec();
        assert!(after_one.iter().all(|&a| a > 0.0 && a < 1.0));
        sim.step(1.0 / 60.0).unwrap();
        let after_two = sim.snapshot().alphas;
        for (a, b) in after_one.iter().zip(after_two) {
            assert!(b > a, "alpha should keep rising toward 1");
        }
    }

    #[test]
    fn test_pointer_mode_retints_nearby_particles() {
        let mut config = small_config();
        config.lesion_mode = LesionMode::Pointer;
        config.lesion_radius = 1e5; // swallow the whole tunnel
        let mut sim = Simulation::new(config).unwrap();

        sim.set_pointer(Some(Vec3::ZERO));
        sim.step(1.0 / 60.0).unwrap();

        let lesion_color = sim.lesions().entries()[0].color;
        let colors = sim.snapshot().colors;
        // With an all-encompassing radius every particle is a member.
        assert!((colors[0] - lesion_color.x).abs() < 0.3);
        assert!(sim
            .snapshot()
            .sizes
            .iter()
            .all(|&s| s > sim.config().base_size));
    }
}
