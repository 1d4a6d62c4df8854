//! Radial confinement around the tunnel centerline.
//!
//! The curl field alone would let particles drift anywhere; confinement is
//! what shapes the cloud into a tube. Working in the plane perpendicular to
//! the path tangent, it pushes strays back toward the wall radius from both
//! sides: inward when a particle wanders past the radius, outward when it
//! falls toward the centerline (which would otherwise read as a dense core
//! instead of a hollow tunnel). An optional spiral term adds a tangential
//! swirl around the axis.

use glam::Vec2;

/// Fraction of the tunnel radius below which the outward (anti-clumping)
/// force engages.
const INNER_EDGE: f32 = 0.8;

/// Per-particle radial force policy.
///
/// Forces are expressed in the 2D plane perpendicular to the path tangent;
/// `PathFrame::to_world` maps them back into world space.
#[derive(Clone, Copy, Debug)]
pub struct ConfinementPolicy {
    /// Target wall radius.
    pub radius: f32,
    /// Restoring-force gain.
    pub strength: f32,
    /// Tangential swirl gain; zero disables the spiral.
    pub spiral: f32,
}

impl ConfinementPolicy {
    /// Compute the in-plane force for a particle whose offset from the
    /// centerline (in the perpendicular plane) is `offset`.
    ///
    /// A particle exactly on the centerline gets no force at all this
    /// frame — there is no meaningful radial direction to push along.
    pub fn radial_force(&self, offset: Vec2) -> Vec2 {
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return Vec2::ZERO;
        }
        let outward = offset / distance;

        let mut force = Vec2::ZERO;
        if distance > self.radius {
            // Too far out: pull back toward the wall.
            force -= outward * (distance - self.radius) * self.strength;
        } else if distance < self.radius * INNER_EDGE {
            // Too close to the axis: push back out.
            force += outward * (self.radius - distance) * self.strength;
        }

        if self.spiral > 0.0 {
            // Perpendicular to the radial direction: swirl around the axis.
            force += Vec2::new(-outward.y, outward.x) * self.spiral;
        }

        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ConfinementPolicy {
        ConfinementPolicy {
            radius: 400.0,
            strength: 0.1,
            spiral: 0.0,
        }
    }

    #[test]
    fn test_no_force_on_centerline() {
        assert_eq!(policy().radial_force(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_no_force_inside_band() {
        // Between 0.8r and r the particle is where it belongs.
        let force = policy().radial_force(Vec2::new(360.0, 0.0));
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn test_inward_beyond_radius() {
        let force = policy().radial_force(Vec2::new(500.0, 0.0));
        assert!(force.x < 0.0, "expected inward pull, got {:?}", force);
        assert!((force.x - (-(500.0 - 400.0) * 0.1)).abs() < 1e-3);
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn test_outward_near_centerline() {
        let force = policy().radial_force(Vec2::new(100.0, 0.0));
        assert!(force.x > 0.0, "expected outward push, got {:?}", force);
        assert!((force.x - (400.0 - 100.0) * 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_force_scales_with_strength() {
        let weak = ConfinementPolicy {
            strength: 0.05,
            ..policy()
        };
        let strong = ConfinementPolicy {
            strength: 0.2,
            ..policy()
        };
        let offset = Vec2::new(600.0, 0.0);
        assert!(strong.radial_force(offset).length() > weak.radial_force(offset).length());
    }

    #[test]
    fn test_spiral_is_perpendicular_to_radial() {
        let swirling = ConfinementPolicy {
            spiral: 0.2,
            ..policy()
        };
        // In the dead band the only contribution is the spiral term.
        let offset = Vec2::new(360.0, 0.0);
        let force = swirling.radial_force(offset);
        assert!(force.dot(offset).abs() < 1e-4);
        assert!((force.length() - 0.2).abs() < 1e-4);
    }
}
