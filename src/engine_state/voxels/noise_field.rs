//! # Noise Field
//!
//! Deterministic 3D gradient noise used as the terrain height field.
//!
//! The field wraps Perlin's improved noise from the `noise` crate. The permutation table is
//! fixed when the field is constructed and never reseeded, so for one instance identical
//! coordinates always produce identical samples.

use noise::{NoiseFn, Perlin};

/// Seed of the permutation table used when none is specified.
pub const DEFAULT_NOISE_SEED: u32 = 0;

/// An immutable scalar noise field over 3D space.
#[derive(Clone, Debug)]
pub struct NoiseField {
    perlin: Perlin,
}

impl NoiseField {
    /// Creates a field whose permutation table is derived from `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    /// Samples the field at `(x, y, z)`.
    ///
    /// The result always lies in `[-1, 1]`.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z]).clamp(-1.0, 1.0)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED)
    }
}
