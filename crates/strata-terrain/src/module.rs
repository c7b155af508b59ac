//! Noise collaborators consumed by the blending engine.
//!
//! The engine only relies on the [`NoiseModule`] and [`DomainWarp`] contracts:
//! pure, deterministic functions of `(x, z)` that can be re-seeded into a new
//! instance. The concrete implementations here wrap the `noise` crate.

use std::fmt;
use std::sync::Arc;

use noise::{Fbm, MultiFractal, NoiseFn, RidgedMulti, Simplex};

/// A pure, deterministic scalar field over the plane with values in `[0, 1]`.
pub trait NoiseModule: Send + Sync + fmt::Debug {
    /// Sample the field at `(x, z)`.
    fn value(&self, x: f64, z: f64) -> f64;

    /// Return an equivalent module driven by a different seed.
    fn with_seed(&self, seed: u64) -> Arc<dyn NoiseModule>;
}

/// A pure, deterministic 2-axis coordinate offset.
pub trait DomainWarp: Send + Sync + fmt::Debug {
    /// Offset to add to `(x, z)`.
    fn offset(&self, x: f64, z: f64) -> (f64, f64);

    /// Return an equivalent warp driven by a different seed.
    fn with_seed(&self, seed: u64) -> Arc<dyn DomainWarp>;
}

/// Map a noise sample from roughly `[-1, 1]` into `[0, 1]`.
#[inline]
fn to_unit(raw: f64) -> f64 {
    ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// A field with the same value everywhere. Re-seeding is a no-op.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantNoise {
    value: f64,
}

impl ConstantNoise {
    /// Create a constant field. The value is clamped into `[0, 1]`.
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
        }
    }
}

impl NoiseModule for ConstantNoise {
    fn value(&self, _x: f64, _z: f64) -> f64 {
        self.value
    }

    fn with_seed(&self, _seed: u64) -> Arc<dyn NoiseModule> {
        Arc::new(*self)
    }
}

/// Parameters shared by the fractal noise modules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalParams {
    /// Frequency of the first octave, in cycles per world unit.
    pub frequency: f64,
    /// Number of octaves to composite.
    pub octaves: usize,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            frequency: 1.0 / 256.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Fractal Brownian motion over simplex noise, normalized to `[0, 1]`.
pub struct SimplexNoise {
    seed: u64,
    params: FractalParams,
    fbm: Fbm<Simplex>,
}

impl SimplexNoise {
    /// Create a new module for the given seed.
    pub fn new(seed: u64, params: FractalParams) -> Self {
        let fbm = Fbm::<Simplex>::new(seed as u32)
            .set_octaves(params.octaves.max(1))
            .set_frequency(params.frequency)
            .set_persistence(params.persistence)
            .set_lacunarity(params.lacunarity);
        Self { seed, params, fbm }
    }

    /// The parameters this module was built with.
    pub fn params(&self) -> &FractalParams {
        &self.params
    }
}

impl fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplexNoise")
            .field("seed", &self.seed)
            .field("params", &self.params)
            .finish()
    }
}

impl NoiseModule for SimplexNoise {
    fn value(&self, x: f64, z: f64) -> f64 {
        to_unit(self.fbm.get([x, z]))
    }

    fn with_seed(&self, seed: u64) -> Arc<dyn NoiseModule> {
        Arc::new(Self::new(seed, self.params))
    }
}

/// Ridged multifractal noise, normalized to `[0, 1]`. Good for mountain ranges.
pub struct RidgedNoise {
    seed: u64,
    frequency: f64,
    octaves: usize,
    ridged: RidgedMulti<Simplex>,
}

impl RidgedNoise {
    /// Create a new module for the given seed.
    pub fn new(seed: u64, frequency: f64, octaves: usize) -> Self {
        let ridged = RidgedMulti::<Simplex>::new(seed as u32)
            .set_octaves(octaves.max(1))
            .set_frequency(frequency);
        Self {
            seed,
            frequency,
            octaves,
            ridged,
        }
    }
}

impl fmt::Debug for RidgedNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RidgedNoise")
            .field("seed", &self.seed)
            .field("frequency", &self.frequency)
            .field("octaves", &self.octaves)
            .finish()
    }
}

impl NoiseModule for RidgedNoise {
    fn value(&self, x: f64, z: f64) -> f64 {
        to_unit(self.ridged.get([x, z]))
    }

    fn with_seed(&self, seed: u64) -> Arc<dyn NoiseModule> {
        Arc::new(Self::new(seed, self.frequency, self.octaves))
    }
}

/// The identity warp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoWarp;

impl DomainWarp for NoWarp {
    fn offset(&self, _x: f64, _z: f64) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn with_seed(&self, _seed: u64) -> Arc<dyn DomainWarp> {
        Arc::new(NoWarp)
    }
}

/// Low-frequency two-axis warp built from two decorrelated fBm fields.
pub struct SimplexWarp {
    seed: u64,
    frequency: f64,
    octaves: usize,
    strength: f64,
    x_field: Fbm<Simplex>,
    z_field: Fbm<Simplex>,
}

impl SimplexWarp {
    /// Create a warp that displaces points by up to `strength` world units.
    pub fn new(seed: u64, frequency: f64, octaves: usize, strength: f64) -> Self {
        let x_field = Fbm::<Simplex>::new(seed as u32)
            .set_octaves(octaves.max(1))
            .set_frequency(frequency);
        let z_field = Fbm::<Simplex>::new(seed.wrapping_add(0xDEAD_BEEF) as u32)
            .set_octaves(octaves.max(1))
            .set_frequency(frequency);
        Self {
            seed,
            frequency,
            octaves,
            strength,
            x_field,
            z_field,
        }
    }

    /// The warp used for a blender with cells `scale` units wide: half-scale
    /// features, three octaves, displacement up to half a cell.
    pub fn for_cell_scale(seed: u64, scale: f64) -> Self {
        let half = (scale * 0.5).max(1.0);
        Self::new(seed, 1.0 / half, 3, half)
    }

    /// Maximum displacement along each axis.
    pub fn strength(&self) -> f64 {
        self.strength
    }
}

impl fmt::Debug for SimplexWarp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplexWarp")
            .field("seed", &self.seed)
            .field("frequency", &self.frequency)
            .field("octaves", &self.octaves)
            .field("strength", &self.strength)
            .finish()
    }
}

impl DomainWarp for SimplexWarp {
    fn offset(&self, x: f64, z: f64) -> (f64, f64) {
        let dx = self.x_field.get([x, z]).clamp(-1.0, 1.0) * self.strength;
        let dz = self.z_field.get([x, z]).clamp(-1.0, 1.0) * self.strength;
        (dx, dz)
    }

    fn with_seed(&self, seed: u64) -> Arc<dyn DomainWarp> {
        Arc::new(Self::new(seed, self.frequency, self.octaves, self.strength))
    }
}
