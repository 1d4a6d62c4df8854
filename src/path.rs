//! The tunnel centerline.
//!
//! [`TunnelPath`] is a C¹-continuous Catmull-Rom spline through an ordered
//! set of control points. Everything in the simulation is organized around
//! it: confinement measures radial distance from it, respawn places
//! particles on an annulus around it, lesions sit on the wall it implies,
//! and the host's scroll progress picks camera positions along it.
//!
//! The parameter `u ∈ [0, 1]` is a segment parameter, not true arc length;
//! it is monotonic and continuous, which is all the callers need.

use crate::error::PathError;
use glam::{Vec2, Vec3};

/// Minimum squared distance between adjacent control points. Closer pairs
/// are rejected at construction since they would degenerate the tangent.
const MIN_SEGMENT_LENGTH_SQ: f32 = 1e-8;

/// An orthonormal frame on the path: the tangent plus a `right`/`up` basis
/// spanning the plane perpendicular to it.
///
/// `right` and `up` are derived from an arbitrary world up-vector, swapped
/// to `+X` when the tangent runs nearly vertical so the cross products stay
/// well-conditioned.
#[derive(Clone, Copy, Debug)]
pub struct PathFrame {
    /// Point on the centerline.
    pub point: Vec3,
    /// Unit tangent, pointing toward increasing `u`.
    pub tangent: Vec3,
    /// Unit vector perpendicular to the tangent.
    pub right: Vec3,
    /// Unit vector completing the right-handed frame.
    pub up: Vec3,
}

impl PathFrame {
    /// Map an in-plane offset into world space.
    #[inline]
    pub fn to_world(&self, offset: Vec2) -> Vec3 {
        self.right * offset.x + self.up * offset.y
    }

    /// Project a world-space displacement into the perpendicular plane.
    #[inline]
    pub fn to_plane(&self, delta: Vec3) -> Vec2 {
        Vec2::new(delta.dot(self.right), delta.dot(self.up))
    }
}

/// A smooth 3D centerline through at least four control points.
#[derive(Clone, Debug)]
pub struct TunnelPath {
    points: Vec<Vec3>,
}

impl TunnelPath {
    /// Build a path from explicit control points.
    ///
    /// Rejects sets with fewer than four points or with coinciding adjacent
    /// points (which would produce a zero-length tangent).
    pub fn new(points: Vec<Vec3>) -> Result<Self, PathError> {
        if points.len() < 4 {
            return Err(PathError::TooFewPoints(points.len()));
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[0].distance_squared(pair[1]) < MIN_SEGMENT_LENGTH_SQ {
                return Err(PathError::DuplicateAdjacentPoints(i));
            }
        }
        Ok(Self { points })
    }

    /// Generate an organic tunnel centerline.
    ///
    /// Control points march along z from `-depth/2` to `+depth/2` in even
    /// steps. Each is displaced laterally by a large primary bend, a
    /// smaller higher-frequency ripple, and the uniform `lateral_offset`
    /// (useful for biasing the tunnel to one side of a viewport). The
    /// harmonic mix keeps the curve smooth and non-self-intersecting for
    /// any positive radius and depth.
    pub fn generate(
        depth: f32,
        radius: f32,
        lateral_offset: Vec2,
        segments: usize,
    ) -> Result<Self, PathError> {
        let amplitude = radius * 3.0;
        let frequency = 0.5;

        let mut points = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            let z = -depth / 2.0 + depth * t;

            // Primary bend, strongest through the middle of the run.
            let x = amplitude * (t * std::f32::consts::PI * frequency).sin() * (t * 5.0).sin();
            let y = amplitude * (t * std::f32::consts::PI * frequency).cos() * (t * 4.0).sin();

            // Small undulations layered on top.
            let ripple = radius * (t * 20.0).sin() * 0.2;

            points.push(Vec3::new(
                x + ripple + lateral_offset.x,
                y + ripple + lateral_offset.y,
                z,
            ));
        }
        Self::new(points)
    }

    /// The control points the spline interpolates.
    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Point on the path at `u ∈ [0, 1]`; values outside the interval are
    /// clamped, never extrapolated.
    pub fn point_at(&self, u: f32) -> Vec3 {
        let (seg, t) = self.locate(u);
        let [p0, p1, p2, p3] = self.segment(seg);

        // Uniform Catmull-Rom basis.
        let t2 = t * t;
        let t3 = t2 * t;
        0.5 * (p1 * 2.0
            + (p2 - p0) * t
            + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
            + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
    }

    /// Unit tangent at `u ∈ [0, 1]` (clamped).
    ///
    /// Always unit length and non-zero: construction rejects the degenerate
    /// point sets that could produce a vanishing derivative, and the rare
    /// numerically flat spot falls back to the segment direction.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let (seg, t) = self.locate(u);
        let [p0, p1, p2, p3] = self.segment(seg);

        let t2 = t * t;
        let derivative = 0.5 * ((p2 - p0)
            + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * (2.0 * t)
            + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * (3.0 * t2));

        if derivative.length_squared() > 1e-12 {
            derivative.normalize()
        } else {
            (p2 - p1).normalize_or(Vec3::Z)
        }
    }

    /// Orthonormal frame at `u`: centerline point, tangent, and the
    /// `right`/`up` pair spanning the perpendicular plane.
    pub fn frame_at(&self, u: f32) -> PathFrame {
        let tangent = self.tangent_at(u);
        // Swap the reference up-vector when the tangent is nearly vertical.
        let world_up = if tangent.y.abs() > 0.9 { Vec3::X } else { Vec3::Y };
        let right = tangent.cross(world_up).normalize();
        let up = right.cross(tangent).normalize();
        PathFrame {
            point: self.point_at(u),
            tangent,
            right,
            up,
        }
    }

    /// Map `u` to a segment index and local parameter.
    #[inline]
    fn locate(&self, u: f32) -> (usize, f32) {
        let segments = self.points.len() - 1;
        let scaled = u.clamp(0.0, 1.0) * segments as f32;
        let seg = (scaled.floor() as usize).min(segments - 1);
        (seg, scaled - seg as f32)
    }

    /// The four control points governing segment `seg`, with clamped
    /// virtual endpoints.
    #[inline]
    fn segment(&self, seg: usize) -> [Vec3; 4] {
        let last = self.points.len() - 1;
        [
            self.points[seg.saturating_sub(1)],
            self.points[seg],
            self.points[(seg + 1).min(last)],
            self.points[(seg + 2).min(last)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_path() -> TunnelPath {
        TunnelPath::generate(8000.0, 400.0, Vec2::ZERO, 20).unwrap()
    }

    #[test]
    fn test_rejects_too_few_points() {
        let points = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        assert_eq!(
            TunnelPath::new(points).unwrap_err(),
            PathError::TooFewPoints(3)
        );
    }

    #[test]
    fn test_rejects_duplicate_adjacent_points() {
        let points = vec![Vec3::ZERO, Vec3::X, Vec3::X, Vec3::Y, Vec3::Z];
        assert_eq!(
            TunnelPath::new(points).unwrap_err(),
            PathError::DuplicateAdjacentPoints(1)
        );
    }

    #[test]
    fn test_endpoints_interpolated() {
        let path = test_path();
        let first = *path.control_points().first().unwrap();
        let last = *path.control_points().last().unwrap();
        assert!(path.point_at(0.0).distance(first) < 1e-3);
        assert!(path.point_at(1.0).distance(last) < 1e-3);
    }

    #[test]
    fn test_tangent_unit_length() {
        let path = test_path();
        for i in 0..=1000 {
            let u = i as f32 / 1000.0;
            let len = path.tangent_at(u).length();
            assert!((len - 1.0).abs() < 1e-4, "tangent length {} at u={}", len, u);
        }
    }

    #[test]
    fn test_point_continuity() {
        let path = test_path();
        let delta = 1e-4;
        let mut prev = path.point_at(0.0);
        let mut u = delta;
        while u <= 1.0 {
            let p = path.point_at(u);
            // One ten-thousandth of the parameter range should never move
            // the point more than a few world units on an 8000-deep tunnel.
            assert!(p.distance(prev) < 10.0, "jump at u={}", u);
            prev = p;
            u += delta;
        }
    }

    #[test]
    fn test_clamps_out_of_range_parameters() {
        let path = test_path();
        assert_eq!(path.point_at(-0.5), path.point_at(0.0));
        assert_eq!(path.point_at(1.5), path.point_at(1.0));
    }

    #[test]
    fn test_frame_is_orthonormal() {
        let path = test_path();
        for i in 0..=100 {
            let frame = path.frame_at(i as f32 / 100.0);
            assert!((frame.tangent.length() - 1.0).abs() < 1e-4);
            assert!((frame.right.length() - 1.0).abs() < 1e-4);
            assert!((frame.up.length() - 1.0).abs() < 1e-4);
            assert!(frame.tangent.dot(frame.right).abs() < 1e-4);
            assert!(frame.tangent.dot(frame.up).abs() < 1e-4);
            assert!(frame.right.dot(frame.up).abs() < 1e-4);
        }
    }

    #[test]
    fn test_lateral_offset_shifts_whole_path() {
        let base = TunnelPath::generate(1000.0, 100.0, Vec2::ZERO, 10).unwrap();
        let shifted =
            TunnelPath::generate(1000.0, 100.0, Vec2::new(250.0, -40.0), 10).unwrap();
        for i in 0..=10 {
            let u = i as f32 / 10.0;
            let d = shifted.point_at(u) - base.point_at(u);
            assert!((d.x - 250.0).abs() < 1e-2);
            assert!((d.y + 40.0).abs() < 1e-2);
            assert!(d.z.abs() < 1e-2);
        }
    }
}
