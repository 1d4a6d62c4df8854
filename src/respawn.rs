//! Particle recycling.
//!
//! Particles are never destroyed; slots are recycled. A slot is recycled
//! when its particle strays too far from the centerline, exits the tunnel
//! ends, ages out, or (handled by the step loop) turns numerically invalid.
//! The replacement spawns on an annulus around a fresh point of the path,
//! with its alpha reset to zero so it fades in instead of popping into
//! view.

use crate::path::TunnelPath;
use crate::spawn::SpawnContext;
use glam::Vec3;

/// Central band of the path parameter used for respawn positions; the
/// extreme ends are avoided so new particles don't appear at the tunnel
/// mouth.
const RESPAWN_PARAM_MIN: f32 = 0.1;
const RESPAWN_PARAM_MAX: f32 = 0.9;

/// Inward-drift gain applied to a fresh particle's velocity so the first
/// frames already hug the tunnel shape.
const INWARD_DRIFT: f32 = 0.01;

/// Magnitude of the random per-axis velocity jitter at spawn.
const SPAWN_JITTER: f32 = 0.2;

/// Fresh state for a recycled particle slot.
///
/// Age and alpha are implicitly zero; the step loop applies them together
/// with this struct.
#[derive(Clone, Copy, Debug)]
pub struct Spawn {
    /// Position on the spawn annulus.
    pub position: Vec3,
    /// Initial velocity: slight inward drift plus jitter.
    pub velocity: Vec3,
    /// Lifetime in seconds drawn from the configured range.
    pub lifetime: f32,
}

/// Decides when a particle is recycled and what it is recycled into.
#[derive(Clone, Copy, Debug)]
pub struct RespawnPolicy {
    /// Tunnel wall radius.
    pub tunnel_radius: f32,
    /// Tunnel length along z.
    pub tunnel_depth: f32,
    /// Inclusive lifetime range in seconds.
    pub lifetime_range: (f32, f32),
}

impl RespawnPolicy {
    /// Whether the particle in this state should be recycled.
    ///
    /// True when any of: distance from its nearest path point exceeds twice
    /// the tunnel radius, z leaves the tunnel (with a two-radius margin),
    /// or age exceeds lifetime.
    pub fn should_respawn(&self, position: Vec3, path_point: Vec3, age: f32, lifetime: f32) -> bool {
        let margin = 2.0 * self.tunnel_radius;
        let half_depth = self.tunnel_depth / 2.0;

        position.distance(path_point) > margin
            || position.z < -half_depth - margin
            || position.z > half_depth + margin
            || age > lifetime
    }

    /// Compute a fresh spawn state on the annulus around a random interior
    /// point of `path`.
    pub fn respawn(&self, path: &TunnelPath, ctx: &mut SpawnContext) -> Spawn {
        let u = ctx.random_range(RESPAWN_PARAM_MIN, RESPAWN_PARAM_MAX);
        let frame = path.frame_at(u);

        let theta = ctx.random_angle();
        let radius = ctx.annulus_radius(self.tunnel_radius);
        let position =
            frame.point + (frame.right * theta.cos() + frame.up * theta.sin()) * radius;

        let velocity = (frame.point - position) * INWARD_DRIFT + ctx.drift(SPAWN_JITTER);

        Spawn {
            position,
            velocity,
            lifetime: ctx.lifetime(self.lifetime_range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn fixture() -> (RespawnPolicy, TunnelPath) {
        let policy = RespawnPolicy {
            tunnel_radius: 400.0,
            tunnel_depth: 8000.0,
            lifetime_range: (2.0, 5.0),
        };
        let path = TunnelPath::generate(8000.0, 400.0, Vec2::ZERO, 20).unwrap();
        (policy, path)
    }

    #[test]
    fn test_age_past_lifetime_always_triggers() {
        let (policy, path) = fixture();
        let on_path = path.point_at(0.5);
        assert!(policy.should_respawn(on_path, on_path, 2.01, 2.0));
    }

    #[test]
    fn test_age_within_lifetime_keeps_particle() {
        let (policy, path) = fixture();
        let on_path = path.point_at(0.5);
        assert!(!policy.should_respawn(on_path, on_path, 1.99, 2.0));
    }

    #[test]
    fn test_distance_bound_triggers() {
        let (policy, path) = fixture();
        let center = path.point_at(0.5);
        let far = center + Vec3::new(801.0, 0.0, 0.0);
        assert!(policy.should_respawn(far, center, 0.0, 10.0));
        let near = center + Vec3::new(799.0, 0.0, 0.0);
        assert!(!policy.should_respawn(near, center, 0.0, 10.0));
    }

    #[test]
    fn test_z_exit_triggers() {
        let (policy, path) = fixture();
        let center = path.point_at(0.5);
        let out = Vec3::new(center.x, center.y, 4000.0 + 801.0);
        assert!(policy.should_respawn(out, Vec3::new(center.x, center.y, 4000.0), 0.0, 10.0));
    }

    #[test]
    fn test_respawn_lands_on_annulus() {
        let (policy, path) = fixture();
        let mut ctx = SpawnContext::from_seed(17);
        for _ in 0..200 {
            let spawn = policy.respawn(&path, &mut ctx);
            // Within the wall radius of *some* interior path point; the
            // sampled centerline adds a few units of slack.
            let mut best = f32::MAX;
            for i in 0..=2000 {
                let u = i as f32 / 2000.0;
                best = best.min(spawn.position.distance(path.point_at(u)));
            }
            assert!(
                best <= policy.tunnel_radius + 5.0,
                "spawn {} units off-path",
                best
            );
            assert!((2.0..5.0).contains(&spawn.lifetime));
        }
    }

    #[test]
    fn test_respawn_velocity_is_gentle() {
        let (policy, path) = fixture();
        let mut ctx = SpawnContext::from_seed(5);
        for _ in 0..100 {
            let spawn = policy.respawn(&path, &mut ctx);
            // Inward drift of at most radius * 0.01 plus jitter.
            assert!(spawn.velocity.length() < policy.tunnel_radius * 0.01 + 0.4);
        }
    }
}
