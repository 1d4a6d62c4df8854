//! Lesion influence zones on the tunnel wall.
//!
//! Lesions are localized 3D regions that re-tint and re-size particles
//! passing through them, depicting irregularities in the tunnel wall. Two
//! modes exist:
//!
//! - [`LesionMode::Wall`] — a fixed set generated on the wall, spread over
//!   the central stretch of the tunnel. When a depth factor is configured,
//!   member particles are additionally pressed inward along the wall
//!   normal, carving a visible depression.
//! - [`LesionMode::Pointer`] — a single live entry that follows a
//!   host-provided world-space pointer position every frame. It is
//!   repositioned, never destroyed. (Projecting the pointer into world
//!   space is the host's job; this module only consumes the 3D point.)
//!
//! Entries are immutable once generated; the only mutations are bulk
//! regeneration and, in pointer mode, repositioning the live entry.

use crate::config::SimConfig;
use crate::path::TunnelPath;
use crate::spawn::SpawnContext;
use glam::Vec3;

/// Lesions sit just inside the wall so member particles surround them.
const WALL_INSET: f32 = 0.98;

/// Intensity above which a member's color is brightened.
const BRIGHTEN_THRESHOLD: f32 = 0.7;

/// How lesion membership is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LesionMode {
    /// Fixed set placed on the tunnel wall at generation time.
    #[default]
    Wall,
    /// One live entry tracking the host's pointer position.
    Pointer,
}

/// A single influence zone.
#[derive(Clone, Copy, Debug)]
pub struct LesionEntry {
    /// Center, on or near the tunnel wall.
    pub position: Vec3,
    /// Unit normal pointing inward from the wall. Only meaningful in wall
    /// mode; the pointer entry carries a placeholder.
    pub normal: Vec3,
    /// Influence radius, always positive.
    pub radius: f32,
    /// Tint applied to member particles.
    pub color: Vec3,
}

/// Result of classifying a particle against the lesion set.
#[derive(Clone, Copy, Debug)]
pub struct LesionHit {
    /// Index of the matched entry.
    pub index: u32,
    /// Normalized proximity to the entry center: 1 at the center, 0 at the
    /// influence boundary.
    pub intensity: f32,
    /// The entry's color, brightened near the center.
    pub color: Vec3,
}

/// The set of lesion zones for one scene.
pub struct LesionField {
    mode: LesionMode,
    entries: Vec<LesionEntry>,
    intensity_boost: f32,
    depth_factor: f32,
    compactness: f32,
    edge_softness: f32,
}

impl LesionField {
    /// Generate the lesion set for `config` along `path`.
    ///
    /// Wall mode places `lesion_count` entries at path parameters spread
    /// evenly across the central `lesion_distribution` fraction of the
    /// tunnel, each at a random circumference angle, with size jittered to
    /// 70–130% of the base radius and optional per-channel color jitter.
    /// Pointer mode creates the single live entry at the tunnel middle;
    /// it follows the pointer from the first `track_pointer` call on.
    pub fn generate(config: &SimConfig, path: &TunnelPath, ctx: &mut SpawnContext) -> Self {
        let entries = match config.lesion_mode {
            LesionMode::Wall => Self::generate_wall_entries(config, path, ctx),
            LesionMode::Pointer => vec![LesionEntry {
                position: path.point_at(0.5),
                normal: Vec3::NEG_Z,
                radius: config.lesion_radius,
                color: config.lesion_color,
            }],
        };
        Self {
            mode: config.lesion_mode,
            entries,
            intensity_boost: config.lesion_intensity_boost,
            depth_factor: config.lesion_depth_factor,
            compactness: config.lesion_compactness,
            edge_softness: config.lesion_edge_softness,
        }
    }

    fn generate_wall_entries(
        config: &SimConfig,
        path: &TunnelPath,
        ctx: &mut SpawnContext,
    ) -> Vec<LesionEntry> {
        let count = config.lesion_count;
        let spread = config.lesion_distribution;
        let mut entries = Vec::with_capacity(count);

        for i in 0..count {
            // Even spread across the central fraction of the tunnel, so
            // lesions never crowd the mouth or the far end.
            let t = if count > 1 {
                i as f32 / (count - 1) as f32 * spread + (1.0 - spread) / 2.0
            } else {
                0.5
            };
            let frame = path.frame_at(t);

            let angle = ctx.random_angle();
            let outward = frame.right * angle.cos() + frame.up * angle.sin();
            let position = frame.point + outward * (config.tunnel_radius * WALL_INSET);

            entries.push(LesionEntry {
                position,
                normal: -outward,
                radius: config.lesion_radius * ctx.random_range(0.7, 1.3),
                color: ctx.jitter_color(config.lesion_color, config.lesion_color_variation),
            });
        }
        entries
    }

    /// The active mode.
    pub fn mode(&self) -> LesionMode {
        self.mode
    }

    /// The current entry set.
    pub fn entries(&self) -> &[LesionEntry] {
        &self.entries
    }

    /// Move the live entry to the latest pointer position. No-op outside
    /// pointer mode.
    pub fn track_pointer(&mut self, world: Vec3) {
        if self.mode == LesionMode::Pointer {
            if let Some(entry) = self.entries.first_mut() {
                entry.position = world;
            }
        }
    }

    /// Classify a particle position against the lesion set.
    ///
    /// Returns the nearest entry whose influence radius strictly contains
    /// the position (a particle exactly on the boundary is outside), with
    /// intensity `1 - distance/radius` and the entry color, brightened by
    /// the configured boost when intensity exceeds 0.7.
    pub fn classify(&self, position: Vec3) -> Option<LesionHit> {
        let mut best: Option<(usize, f32)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            let distance = position.distance(entry.position);
            if distance < entry.radius {
                match best {
                    Some((_, d)) if d <= distance => {}
                    _ => best = Some((i, distance)),
                }
            }
        }

        best.map(|(i, distance)| {
            let entry = &self.entries[i];
            let intensity = 1.0 - distance / entry.radius;
            let color = if intensity > BRIGHTEN_THRESHOLD {
                (entry.color * self.intensity_boost).min(Vec3::ONE)
            } else {
                entry.color
            };
            LesionHit {
                index: i as u32,
                intensity,
                color,
            }
        })
    }

    /// Wall-depression displacement for a member of entry `index`.
    ///
    /// Presses the position inward along the entry's wall normal by
    /// `radius * depth_factor * profile`, where the profile falls from 1 at
    /// the center to 0 at `radius * compactness`, with the edge-softness
    /// exponent controlling how sharply the rim rolls off. Returns the
    /// position unchanged when depressions are disabled or the position
    /// lies outside the compacted footprint.
    pub fn depress(&self, index: u32, position: Vec3) -> Vec3 {
        if self.depth_factor <= 0.0 || self.mode != LesionMode::Wall {
            return position;
        }
        let Some(entry) = self.entries.get(index as usize) else {
            return position;
        };

        // In-plane distance from the entry center (perpendicular to the
        // wall normal).
        let delta = position - entry.position;
        let in_plane = delta - entry.normal * delta.dot(entry.normal);
        let r = in_plane.length();

        let footprint = entry.radius * self.compactness;
        if footprint <= 0.0 || r >= footprint {
            return position;
        }

        let profile = 1.0 - (r / footprint).powf(1.0 / self.edge_softness);
        if profile <= 0.0 {
            return position;
        }

        position + entry.normal * (entry.radius * self.depth_factor * profile)
    }
}
