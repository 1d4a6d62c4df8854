//! # lumenflow
//!
//! Curl-noise particle simulation for scroll-driven tunnel fly-through
//! animations.
//!
//! lumenflow advects tens of thousands of particles along a procedurally
//! generated 3D tunnel: a divergence-free curl-noise field supplies the
//! swirl, a radial confinement force keeps the cloud tube-shaped, and a
//! respawn policy recycles particles that age out or stray. Lesion zones
//! on the tunnel wall re-tint and re-size particles passing through them.
//! The crate is renderer-agnostic — each frame it hands back flat
//! position/color/alpha/size arrays and never touches a GPU resource.
//!
//! ## Quick Start
//!
//! ```ignore
//! use lumenflow::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sim = Simulation::new(
//!         SimConfig::default()
//!             .with_particle_count(15_000)
//!             .with_tunnel(400.0, 8000.0),
//!     )?;
//!
//!     let mut time = Time::new();
//!     loop {
//!         let (_, dt) = time.update();
//!         sim.set_scroll_target(host_scroll_progress());
//!         sim.step(dt)?;
//!
//!         let snap = sim.snapshot();
//!         upload_points(snap.positions, snap.colors, snap.alphas, snap.sizes);
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The frame loop
//!
//! One `step(dt)` call advances the whole population synchronously. For
//! each particle the velocity is *recomputed* from the current forces —
//! curl sample, confinement, forward flow — then integrated; velocity is
//! never accumulated across frames. Respawn and lesion classification run
//! in the same pass, and alpha eases toward its target instead of
//! snapping, so nothing pops.
//!
//! ### Configuration
//!
//! [`SimConfig`] is an immutable value. `configure` diffs it against the
//! active config: geometry changes (tunnel shape, counts, lesion layout)
//! rebuild the scene, tuning changes (speeds, strengths, colors) apply in
//! place. Re-applying an unchanged config does nothing.
//!
//! ### Variants
//!
//! The two curl derivations and the two lesion strategies found in the
//! wild are first-class, runtime-selectable modes rather than forks:
//!
//! | Knob | Options |
//! |------|---------|
//! | [`CurlMode`] | `CrossGradient` (cross of two decorrelated gradients) / `VectorCurl` (literal curl of vector noise) |
//! | [`LesionMode`] | `Wall` (fixed set, optional depression) / `Pointer` (follows the host pointer) |
//!
//! ### Host feeds
//!
//! The host supplies per-frame inputs; all are optional except `dt`:
//!
//! - `step(dt)` — elapsed seconds, finite and non-negative.
//! - `set_scroll_target(t)` — scroll progress in [0, 1] for camera flight.
//! - `set_pointer(world)` — pointer position for `LesionMode::Pointer`.
//! - `set_camera(feed)` — camera pose for distance-fog alpha targeting.

pub mod config;
pub mod confinement;
pub mod curl;
pub mod error;
pub mod lesion;
pub mod noise;
pub mod particles;
pub mod path;
pub mod respawn;
pub mod simulation;
pub mod spawn;
pub mod time;

pub use config::SimConfig;
pub use confinement::ConfinementPolicy;
pub use curl::{CurlMode, CurlSampler};
pub use error::{ConfigError, PathError, StepError};
pub use glam::{Vec2, Vec3};
pub use lesion::{LesionEntry, LesionField, LesionHit, LesionMode};
pub use noise::NoiseField;
pub use particles::{ParticleSnapshot, ParticleStore};
pub use path::{PathFrame, TunnelPath};
pub use respawn::{RespawnPolicy, Spawn};
pub use simulation::{CameraFeed, CameraSample, Simulation, MAX_STEP_DELTA};
pub use spawn::SpawnContext;
pub use time::Time;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use lumenflow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::curl::CurlMode;
    pub use crate::error::{ConfigError, StepError};
    pub use crate::lesion::LesionMode;
    pub use crate::particles::ParticleSnapshot;
    pub use crate::simulation::{CameraFeed, CameraSample, Simulation};
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3};
}
