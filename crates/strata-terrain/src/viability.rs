//! Scoring how far a column's height sits from a preferred band.

use crate::context::WorkerContext;
use crate::height_noise::HeightNoise;
use crate::levels::HeightLevels;
use crate::pipeline::TerrainHeightPipeline;

/// A preferred height band, expressed relative to sea level.
///
/// Offsets are fractions of the land column (`gen_depth - sea_level`): `0.0`
/// is sea level and `1.0` the top of the world. Negative offsets reach below
/// the sea surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightViability {
    /// Lower edge of the band.
    pub min: f64,
    /// Ideal height.
    pub mid: f64,
    /// Upper edge of the band.
    pub max: f64,
}

impl Default for HeightViability {
    fn default() -> Self {
        Self {
            min: 0.0,
            mid: 0.25,
            max: 1.0,
        }
    }
}

impl HeightViability {
    /// Create a band. `min <= mid <= max` is expected.
    pub fn new(min: f64, mid: f64, max: f64) -> Self {
        Self { min, mid, max }
    }

    /// Distance of `height` from the ideal height.
    ///
    /// `0.0` at `mid`, rising linearly to `1.0` at either edge of the band.
    /// Heights outside the band score `1.0`.
    pub fn score(&self, height: i32, levels: &HeightLevels) -> f64 {
        let sea = f64::from(levels.sea_level());
        let land = f64::from(levels.gen_depth() - levels.sea_level());
        let min = sea + self.min * land;
        let mid = sea + self.mid * land;
        let max = sea + self.max * land;
        let h = f64::from(height);

        if h < min || h > max {
            return 1.0;
        }
        if h < mid {
            (mid - h) / (mid - min)
        } else if max > mid {
            (h - mid) / (max - mid)
        } else {
            0.0
        }
    }

    /// Score of the column at `(x, z)` produced by `pipeline`.
    pub fn score_at<G: HeightNoise>(
        &self,
        x: i32,
        z: i32,
        pipeline: &TerrainHeightPipeline<G>,
        ctx: &mut WorkerContext,
    ) -> f64 {
        let height = pipeline.height_with(x, z, ctx);
        self.score(height, pipeline.levels())
    }
}
