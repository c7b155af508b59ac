//! Cellular terrain-type assignment with distance-weighted blending.
//!
//! The plane is partitioned into jittered cells, each assigned a terrain
//! variant from a [`WeightedVariantTable`]. Deep inside a cell the variant's
//! noise is returned untouched; near a boundary the noise of every nearby
//! cell is mixed with a quadratic falloff whose radius adapts to the local
//! cell spacing, so transitions keep a consistent width under jitter.

use std::fmt;
use std::sync::Arc;

use crate::cell::{self, BlendScratch, NEIGHBORHOOD};
use crate::error::ConfigError;
use crate::module::{DomainWarp, SimplexWarp};
use crate::variant::{TerrainVariant, WeightedVariantTable};

/// Offset applied to the world seed for the cell lattice.
pub const REGION_SEED_OFFSET: u64 = 21_491_124;

/// Offset applied to the world seed for the domain warp.
pub const WARP_SEED_OFFSET: u64 = 12_678;

/// Parameters of a [`TerrainBlender`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendParams {
    /// World units per cell. Must be positive.
    pub scale: f64,
    /// Fraction of a cell a feature point may move from its lattice corner, in `[0, 1]`.
    pub jitter: f64,
    /// Edge-noise threshold below which neighboring cells are blended, in `(0, 1]`.
    pub blend_width: f64,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            scale: 800.0,
            jitter: 0.8,
            blend_width: 0.35,
        }
    }
}

impl BlendParams {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::NonPositiveScale(self.scale));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::InvalidJitter(self.jitter));
        }
        if !(self.blend_width > 0.0 && self.blend_width <= 1.0) {
            return Err(ConfigError::InvalidBlendWidth(self.blend_width));
        }
        Ok(())
    }
}

/// Blends terrain variants across a jittered cell field.
///
/// Immutable and shareable across threads; all per-call state lives in the
/// caller's [`BlendScratch`].
pub struct TerrainBlender {
    seed: u64,
    region_seed: u32,
    frequency: f64,
    params: BlendParams,
    warp: Arc<dyn DomainWarp>,
    table: WeightedVariantTable,
}

impl TerrainBlender {
    /// Create a blender with the default warp for its cell scale.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the parameters are out of range.
    pub fn new(
        seed: u64,
        params: BlendParams,
        table: WeightedVariantTable,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        let warp = Arc::new(SimplexWarp::for_cell_scale(
            seed.wrapping_add(WARP_SEED_OFFSET),
            params.scale,
        ));
        Self::with_warp(seed, params, table, warp)
    }

    /// Create a blender with an explicit domain warp.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the parameters are out of range.
    pub fn with_warp(
        seed: u64,
        params: BlendParams,
        table: WeightedVariantTable,
        warp: Arc<dyn DomainWarp>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        tracing::debug!(
            seed,
            scale = params.scale,
            jitter = params.jitter,
            blend_width = params.blend_width,
            variants = table.len(),
            "created terrain blender"
        );
        Ok(Self {
            seed,
            region_seed: seed.wrapping_add(REGION_SEED_OFFSET) as u32,
            frequency: 1.0 / params.scale,
            params,
            warp,
            table,
        })
    }

    /// A new blender for `seed`, with every variant and the warp re-seeded.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            region_seed: seed.wrapping_add(REGION_SEED_OFFSET) as u32,
            frequency: self.frequency,
            params: self.params,
            warp: self.warp.with_seed(seed.wrapping_add(WARP_SEED_OFFSET)),
            table: self.table.with_seed(seed),
        }
    }

    /// The world seed this blender was built for.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Blend parameters.
    pub fn params(&self) -> &BlendParams {
        &self.params
    }

    /// The variant table.
    pub fn table(&self) -> &WeightedVariantTable {
        &self.table
    }

    /// Run the neighborhood search for the warped, scaled position of `(x, z)`.
    fn locate(&self, x: f64, z: f64, scratch: &mut BlendScratch) {
        let (dx, dz) = self.warp.offset(x, z);
        let cx = (x + dx) * self.frequency;
        let cz = (z + dz) * self.frequency;
        cell::locate(self.region_seed, cx, cz, self.params.jitter, scratch);
    }

    /// Blended terrain value at `(x, z)`, in `[0, 1]`.
    pub fn evaluate(&self, x: f64, z: f64, scratch: &mut BlendScratch) -> f64 {
        self.locate(x, z, scratch);
        scratch.memo.clear();

        let d0 = scratch.distance(scratch.nearest);
        let d1 = scratch.distance(scratch.second);

        // Coincident feature points or a sample sitting exactly on one.
        if d0 == 0.0 || d1 == 0.0 {
            return self.centre_value(x, z, scratch);
        }

        let edge = 1.0 - d0 / d1;
        let width = self.params.blend_width;
        if edge >= width {
            return self.centre_value(x, z, scratch);
        }

        let range = blend_range(d0, d1, width, edge);
        if !(range.is_finite() && range > 0.0) {
            return self.centre_value(x, z, scratch);
        }
        self.blended_value(x, z, d0, range, scratch)
    }

    /// Edge noise at `(x, z)`: `0` on a cell boundary, approaching `1` at a
    /// feature point.
    pub fn edge_at(&self, x: f64, z: f64, scratch: &mut BlendScratch) -> f64 {
        self.locate(x, z, scratch);
        let d0 = scratch.distance(scratch.nearest);
        let d1 = scratch.distance(scratch.second);
        if d1 == 0.0 { 1.0 } else { 1.0 - d0 / d1 }
    }

    /// The variant owning the cell that contains `(x, z)`.
    pub fn terrain_at(&self, x: f64, z: f64, scratch: &mut BlendScratch) -> &TerrainVariant {
        let index = self.terrain_index_at(x, z, scratch);
        &self.table.variants()[index]
    }

    /// Table index of the variant owning the cell that contains `(x, z)`.
    pub fn terrain_index_at(&self, x: f64, z: f64, scratch: &mut BlendScratch) -> usize {
        self.locate(x, z, scratch);
        self.table.index_at(scratch.selector(scratch.nearest))
    }

    fn centre_value(&self, x: f64, z: f64, scratch: &BlendScratch) -> f64 {
        self.table
            .value_at(scratch.selector(scratch.nearest))
            .value(x, z)
    }

    fn blended_value(
        &self,
        x: f64,
        z: f64,
        nearest: f64,
        range: f64,
        scratch: &mut BlendScratch,
    ) -> f64 {
        let mut sum_noise = 0.0;
        let mut sum_weight = 0.0;

        for i in 0..NEIGHBORHOOD {
            let w = weight(scratch.distance(i), nearest, range);
            if w > 0.0 {
                let index = self.table.index_at(scratch.selector(i));
                let table = &self.table;
                let noise = scratch
                    .memo
                    .get_or_insert_with(index, || table.variants()[index].value(x, z));
                sum_noise += noise * w;
                sum_weight += w;
            }
        }

        // The nearest cell always carries weight 1, so the sum is positive.
        (sum_noise / sum_weight).clamp(0.0, 1.0)
    }
}

impl fmt::Debug for TerrainBlender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainBlender")
            .field("seed", &self.seed)
            .field("params", &self.params)
            .field("variants", &self.table.len())
            .finish()
    }
}

/// Blend radius beyond the nearest distance, proportional to local spacing.
#[inline]
fn blend_range(d0: f64, d1: f64, width: f64, edge: f64) -> f64 {
    let alpha = edge / width;
    if alpha == 0.0 {
        return d0 * width;
    }
    let mid = (d0 + d1) * 0.5;
    (mid - d0) / alpha
}

/// Quadratic falloff: `1` at the nearest distance, `0` at `nearest + range`.
#[inline]
fn weight(dist: f64, nearest: f64, range: f64) -> f64 {
    let delta = dist - nearest;
    if delta >= range {
        return 0.0;
    }
    let w = 1.0 - delta / range;
    w * w
}
