//! Vertical calibration: maps normalized noise onto world-space height bands.
//!
//! A [`HeightLevels`] is derived once from the sea level, sea floor and
//! vertical generation depth of a world. Normalized noise in `[0, 1]` is
//! remapped into two bands: the underwater band between the sea floor and
//! sea level, and the land band between sea level and the top of the world.

use crate::error::ConfigError;

/// Fraction of the generation depth reserved for base (lowland) variation
/// directly above sea level.
const BASE_RANGE: f64 = 0.15;

/// Depth the automatic frequency scaling is calibrated against.
const REFERENCE_DEPTH: f64 = 256.0;

/// Sea level the automatic frequency scaling is calibrated against.
const REFERENCE_SEA_LEVEL: f64 = 62.0;

/// Immutable per-world height calibration.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightLevels {
    sea_level: i32,
    sea_floor: i32,
    gen_depth: i32,
    auto_scale: bool,
    scale: f64,
    /// Normalized height of the sea floor.
    pub depth_min: f64,
    /// Normalized span between sea floor and sea level.
    pub depth_range: f64,
    /// Normalized height of sea level.
    pub height_min: f64,
    /// Normalized span used for base (lowland) noise.
    pub base_range: f64,
    /// Normalized span left for height noise above the base band.
    pub height_range: f64,
    /// Horizontal frequency multiplier for height noise.
    pub frequency: f64,
}

impl HeightLevels {
    /// Sea level used by the presets (inclusive index of the highest water block).
    pub const DEFAULT_SEA_LEVEL: i32 = 62;
    /// Generation depth of the standard preset.
    pub const DEFAULT_GEN_DEPTH: i32 = 384;
    /// Generation depth of the legacy preset.
    pub const LEGACY_GEN_DEPTH: i32 = 256;

    /// Derive the levels for a world.
    ///
    /// `scale` is a user multiplier on the horizontal frequency; non-positive
    /// values fall back to `1`. With `auto_scale`, the frequency is further
    /// stretched so terrain taller than the reference world keeps its slopes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLevels`] unless
    /// `0 <= sea_floor <= sea_level < gen_depth`.
    pub fn new(
        sea_level: i32,
        sea_floor: i32,
        gen_depth: i32,
        auto_scale: bool,
        scale: f64,
    ) -> Result<Self, ConfigError> {
        if sea_floor < 0 || sea_floor > sea_level || sea_level >= gen_depth {
            return Err(ConfigError::InvalidLevels {
                sea_floor,
                sea_level,
                gen_depth,
            });
        }

        let depth = f64::from(gen_depth);
        let depth_min = f64::from(sea_floor) / depth;
        let height_min = f64::from(sea_level) / depth;
        let height_range = 1.0 - (height_min + BASE_RANGE);
        let depth_range = height_min - depth_min;
        let frequency = calc_frequency(gen_depth - sea_level, auto_scale, scale);

        Ok(Self {
            sea_level,
            sea_floor,
            gen_depth,
            auto_scale,
            scale,
            depth_min,
            depth_range,
            height_min,
            base_range: BASE_RANGE,
            height_range,
            frequency,
        })
    }

    /// Levels for a 384-deep world with sea level at 62.
    pub fn standard() -> Self {
        Self::preset(Self::DEFAULT_GEN_DEPTH)
    }

    /// Levels for a 256-deep world with sea level at 62.
    pub fn legacy() -> Self {
        Self::preset(Self::LEGACY_GEN_DEPTH)
    }

    fn preset(gen_depth: i32) -> Self {
        let depth = f64::from(gen_depth);
        let height_min = f64::from(Self::DEFAULT_SEA_LEVEL) / depth;
        Self {
            sea_level: Self::DEFAULT_SEA_LEVEL,
            sea_floor: 0,
            gen_depth,
            auto_scale: true,
            scale: 1.0,
            depth_min: 0.0,
            depth_range: height_min,
            height_min,
            base_range: BASE_RANGE,
            height_range: 1.0 - (height_min + BASE_RANGE),
            frequency: calc_frequency(gen_depth - Self::DEFAULT_SEA_LEVEL, true, 1.0),
        }
    }

    /// Map normalized depth noise into the underwater band.
    #[inline]
    pub fn to_depth_noise(&self, noise: f64) -> f64 {
        self.depth_min + noise * self.depth_range
    }

    /// Map normalized base and height noise into the land band.
    ///
    /// `to_height_noise(1.0, 1.0)` is exactly `1.0`.
    #[inline]
    pub fn to_height_noise(&self, base: f64, height: f64) -> f64 {
        self.height_min + self.base_range * base + self.height_range * height
    }

    /// Scale a normalized height to world units.
    #[inline]
    pub fn scaled_height(&self, normalized: f64) -> f64 {
        normalized * f64::from(self.gen_depth)
    }

    /// Block height of a scaled height.
    #[inline]
    pub fn world_height(&self, scaled: f64) -> i32 {
        libm::floor(scaled) as i32
    }

    /// Inclusive index of the highest water block.
    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Lowest ocean floor height.
    pub fn sea_floor(&self) -> i32 {
        self.sea_floor
    }

    /// Exclusive maximum block height.
    pub fn gen_depth(&self) -> i32 {
        self.gen_depth
    }

    /// Whether the frequency was derived automatically from the depth.
    pub fn auto_scale(&self) -> bool {
        self.auto_scale
    }

    /// The user frequency multiplier this calibration was built with.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for HeightLevels {
    fn default() -> Self {
        Self::standard()
    }
}

fn calc_frequency(vertical_range: i32, auto_scale: bool, scale: f64) -> f64 {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    if !auto_scale {
        return scale;
    }
    ((REFERENCE_DEPTH - REFERENCE_SEA_LEVEL) / f64::from(vertical_range)) * scale
}
