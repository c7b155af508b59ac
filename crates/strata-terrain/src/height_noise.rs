//! Normalized height sources consumed by the height pipeline.

use std::fmt;
use std::sync::Arc;

use crate::blend::TerrainBlender;
use crate::context::WorkerContext;
use crate::levels::HeightLevels;
use crate::module::NoiseModule;

/// Seed offset of the continent-scale base noise from the world seed.
pub const BASE_SEED_OFFSET: u64 = 7_919;

/// Source of normalized terrain height in `[0, 1]`.
///
/// Implementations are shared between workers; any per-call state must live
/// in the supplied [`WorkerContext`].
pub trait HeightNoise: Send + Sync {
    /// Normalized height at world column `(x, z)`.
    fn height_noise(&self, x: f64, z: f64, ctx: &mut WorkerContext) -> f64;
}

impl<G: HeightNoise + ?Sized> HeightNoise for Arc<G> {
    fn height_noise(&self, x: f64, z: f64, ctx: &mut WorkerContext) -> f64 {
        (**self).height_noise(x, z, ctx)
    }
}

/// Base continent noise plus blended terrain variants, mapped into the land
/// band of a [`HeightLevels`].
///
/// World coordinates are multiplied by the levels' horizontal frequency
/// before sampling, so taller worlds get proportionally wider features.
pub struct BlendedHeightNoise {
    levels: Arc<HeightLevels>,
    base: Arc<dyn NoiseModule>,
    blender: Arc<TerrainBlender>,
}

impl BlendedHeightNoise {
    /// Combine a base noise and a blender under `levels`.
    pub fn new(
        levels: Arc<HeightLevels>,
        base: Arc<dyn NoiseModule>,
        blender: Arc<TerrainBlender>,
    ) -> Self {
        Self {
            levels,
            base,
            blender,
        }
    }

    /// The same noise with base and blender re-seeded for world `seed`.
    ///
    /// The base gets `seed + BASE_SEED_OFFSET`; variants are offset by their
    /// table index.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            levels: Arc::clone(&self.levels),
            base: self.base.with_seed(seed.wrapping_add(BASE_SEED_OFFSET)),
            blender: Arc::new(self.blender.with_seed(seed)),
        }
    }

    #[inline]
    fn sample_point(&self, x: f64, z: f64) -> (f64, f64) {
        (x * self.levels.frequency, z * self.levels.frequency)
    }

    /// Index of the variant whose cell owns world column `(x, z)`.
    pub fn terrain_index_at(&self, x: f64, z: f64, ctx: &mut WorkerContext) -> usize {
        let (sx, sz) = self.sample_point(x, z);
        self.blender.terrain_index_at(sx, sz, &mut ctx.scratch)
    }

    /// The calibration heights are mapped into.
    pub fn levels(&self) -> &Arc<HeightLevels> {
        &self.levels
    }

    /// The variant blender.
    pub fn blender(&self) -> &Arc<TerrainBlender> {
        &self.blender
    }
}

impl HeightNoise for BlendedHeightNoise {
    fn height_noise(&self, x: f64, z: f64, ctx: &mut WorkerContext) -> f64 {
        let (sx, sz) = self.sample_point(x, z);
        let base = self.base.value(sx, sz);
        let height = self.blender.evaluate(sx, sz, &mut ctx.scratch);
        self.levels.to_height_noise(base, height)
    }
}

impl fmt::Debug for BlendedHeightNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlendedHeightNoise")
            .field("levels", &self.levels)
            .field("base", &self.base)
            .field("blender", &self.blender)
            .finish()
    }
}
