//! Error types for lumenflow.
//!
//! This module provides error types for configuration validation, path
//! construction, and per-frame stepping. Numerical degeneracies inside a
//! frame (NaN velocities, zero-length vectors) are recovered per particle
//! and never surface here.

use std::fmt;

/// Errors raised while constructing the tunnel centerline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathError {
    /// Fewer than four control points were supplied.
    TooFewPoints(usize),
    /// Two adjacent control points coincide, which would produce a
    /// zero-length tangent.
    DuplicateAdjacentPoints(usize),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::TooFewPoints(n) => {
                write!(f, "Tunnel path needs at least 4 control points, got {}", n)
            }
            PathError::DuplicateAdjacentPoints(i) => {
                write!(f, "Tunnel path control points {} and {} coincide", i, i + 1)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Errors that can occur when validating a [`SimConfig`](crate::SimConfig).
///
/// Returned by `Simulation::new`, `configure`, and `regenerate`. On error the
/// previously valid state stays in effect; no partial mutation occurs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// `particle_count` was zero.
    ParticleCountZero,
    /// A parameter that must be strictly positive was not.
    NonPositive {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A parameter that must be non-negative was negative (or NaN).
    Negative {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// `path_segments` was too small to form a valid spline.
    TooFewSegments(usize),
    /// A parameter constrained to `(0, 1]` fell outside that range.
    FractionOutOfRange {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// `lifetime_range` was empty, inverted, or non-positive.
    InvalidLifetimeRange {
        /// Lower bound of the rejected range.
        min: f32,
        /// Upper bound of the rejected range.
        max: f32,
    },
    /// The tunnel path could not be built from the configured geometry.
    Path(PathError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParticleCountZero => {
                write!(f, "particle_count must be at least 1")
            }
            ConfigError::NonPositive { name, value } => {
                write!(f, "{} must be > 0, got {}", name, value)
            }
            ConfigError::Negative { name, value } => {
                write!(f, "{} must be >= 0, got {}", name, value)
            }
            ConfigError::TooFewSegments(n) => {
                write!(f, "path_segments must be at least 3, got {}", n)
            }
            ConfigError::FractionOutOfRange { name, value } => {
                write!(f, "{} must be in (0, 1], got {}", name, value)
            }
            ConfigError::InvalidLifetimeRange { min, max } => {
                write!(
                    f,
                    "lifetime_range must satisfy 0 < min <= max, got {}..{}",
                    min, max
                )
            }
            ConfigError::Path(e) => write!(f, "invalid tunnel path: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Path(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PathError> for ConfigError {
    fn from(e: PathError) -> Self {
        ConfigError::Path(e)
    }
}

/// Errors that can occur when advancing the simulation.
///
/// These indicate host bugs: the core refuses to guess what a negative or
/// non-finite frame delta was supposed to mean. A *large* positive delta is
/// not an error; it is clamped (see `Simulation::step`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepError {
    /// The host passed a negative frame delta.
    NegativeDelta(f32),
    /// The host passed a NaN or infinite frame delta.
    NonFiniteDelta(f32),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::NegativeDelta(dt) => {
                write!(f, "step() requires dt >= 0, got {}", dt)
            }
            StepError::NonFiniteDelta(dt) => {
                write!(f, "step() requires a finite dt, got {}", dt)
            }
        }
    }
}

impl std::error::Error for StepError {}
