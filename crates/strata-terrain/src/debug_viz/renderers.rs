//! Preview renderers: column heights, variant cells and viability.

use super::PreviewRegion;
use super::image::DebugImage;
use crate::context::WorkerContext;
use crate::height_noise::{BlendedHeightNoise, HeightNoise};
use crate::levels::HeightLevels;
use crate::pipeline::TerrainHeightPipeline;
use crate::viability::HeightViability;

/// Render world heights of a region, coloured by elevation band.
pub fn render_height_debug<G: HeightNoise>(
    pipeline: &TerrainHeightPipeline<G>,
    region: PreviewRegion,
) -> DebugImage {
    let mut ctx = WorkerContext::new();
    let levels = pipeline.levels();
    render(region, |x, z| {
        height_to_color(pipeline.height_with(x, z, &mut ctx), levels)
    })
}

/// Render which variant owns each column of a region.
pub fn render_terrain_map(noise: &BlendedHeightNoise, region: PreviewRegion) -> DebugImage {
    let mut ctx = WorkerContext::new();
    render(region, |x, z| {
        variant_color(noise.terrain_index_at(f64::from(x), f64::from(z), &mut ctx))
    })
}

/// Render a viability score as grayscale: white at the ideal height, black at
/// or beyond the band edges.
pub fn render_viability<G: HeightNoise>(
    viability: &HeightViability,
    pipeline: &TerrainHeightPipeline<G>,
    region: PreviewRegion,
) -> DebugImage {
    let mut ctx = WorkerContext::new();
    render(region, |x, z| {
        let score = viability.score_at(x, z, pipeline, &mut ctx);
        let v = ((1.0 - score).clamp(0.0, 1.0) * 255.0) as u8;
        [v, v, v]
    })
}

fn render(region: PreviewRegion, mut color_at: impl FnMut(i32, i32) -> [u8; 3]) -> DebugImage {
    let mut image = DebugImage::new(region.width, region.height);
    let step = region.step.max(1) as i32;
    for py in 0..region.height {
        for px in 0..region.width {
            let x = region.origin_x + px as i32 * step;
            let z = region.origin_z + py as i32 * step;
            image.set_rgb(px, py, color_at(x, z));
        }
    }
    image
}

/// Map a world height to an RGB colour.
///
/// Bands: deep water below the sea floor, shallow water below sea level, a
/// beach just above it, then lowland green, mountain brown and snow, split by
/// the fraction of the land column reached.
pub fn height_to_color(height: i32, levels: &HeightLevels) -> [u8; 3] {
    let sea = levels.sea_level();
    if height < levels.sea_floor() {
        return [0, 0, 128];
    }
    if height < sea {
        return [30, 80, 200];
    }
    if height < sea + 2 {
        return [220, 200, 130];
    }

    let land = f64::from((levels.gen_depth() - sea).max(1));
    let t = (f64::from(height - sea) / land).clamp(0.0, 1.0);
    if t < 0.35 {
        let k = t / 0.35;
        [
            (30.0 + k * 80.0) as u8,
            (160.0 - k * 40.0) as u8,
            (30.0 + k * 20.0) as u8,
        ]
    } else if t < 0.65 {
        let k = (t - 0.35) / 0.3;
        [
            (110.0 + k * 40.0) as u8,
            (120.0 - k * 50.0) as u8,
            (50.0 + k * 20.0) as u8,
        ]
    } else {
        let k = ((t - 0.65) / 0.35).min(1.0);
        let v = (150.0 + k * 105.0) as u8;
        [v, v, v]
    }
}

const VARIANT_PALETTE: [[u8; 3]; 10] = [
    [100, 180, 60],
    [130, 110, 90],
    [220, 190, 80],
    [30, 120, 30],
    [200, 210, 220],
    [180, 170, 60],
    [40, 90, 60],
    [160, 60, 60],
    [90, 90, 200],
    [200, 120, 180],
];

/// Colour for a variant index. Cycles after ten variants.
pub fn variant_color(index: usize) -> [u8; 3] {
    VARIANT_PALETTE[index % VARIANT_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::{BlendParams, TerrainBlender};
    use crate::module::ConstantNoise;
    use crate::variant::{TerrainVariant, WeightedVariantTable};
    use std::sync::Arc;

    struct Ramp;

    impl HeightNoise for Ramp {
        fn height_noise(&self, x: f64, _z: f64, _ctx: &mut WorkerContext) -> f64 {
            (x / 64.0).clamp(0.0, 1.0)
        }
    }

    fn region(width: u32, height: u32) -> PreviewRegion {
        PreviewRegion {
            origin_x: 0,
            origin_z: 0,
            width,
            height,
            step: 1,
        }
    }

    #[test]
    fn test_height_bands() {
        let levels = HeightLevels::new(62, 40, 256, true, 1.0).unwrap();
        assert_eq!(height_to_color(10, &levels), [0, 0, 128]);
        assert_eq!(height_to_color(50, &levels), [30, 80, 200]);
        assert_eq!(height_to_color(62, &levels), [220, 200, 130]);
        assert_eq!(height_to_color(255, &levels)[0], height_to_color(255, &levels)[2]);
    }

    #[test]
    fn test_height_debug_shows_several_bands() {
        let pipeline = TerrainHeightPipeline::new(Arc::new(HeightLevels::legacy()), Ramp);
        let image = render_height_debug(&pipeline, region(64, 4));
        assert_eq!(image.dimensions(), (64, 4));
        assert!(image.unique_color_count() > 5);
        assert_eq!(image.rgba(0, 0)[3], 255);
    }

    #[test]
    fn test_terrain_map_uses_one_colour_per_variant() {
        let levels = Arc::new(HeightLevels::standard());
        let table = WeightedVariantTable::build(vec![
            TerrainVariant::new("low", 1.0, Arc::new(ConstantNoise::new(0.2))),
            TerrainVariant::new("high", 1.0, Arc::new(ConstantNoise::new(0.8))),
        ])
        .unwrap();
        let params = BlendParams {
            scale: 16.0,
            ..BlendParams::default()
        };
        let blender = Arc::new(TerrainBlender::new(9, params, table).unwrap());
        let noise = BlendedHeightNoise::new(levels, Arc::new(ConstantNoise::new(0.5)), blender);

        let image = render_terrain_map(&noise, region(128, 128));
        assert_eq!(image.unique_color_count(), 2);
    }

    #[test]
    fn test_viability_is_brightest_at_ideal_height() {
        let pipeline = TerrainHeightPipeline::new(Arc::new(HeightLevels::legacy()), Ramp);
        let band = HeightViability::new(0.0, 0.5, 1.0);
        let image = render_viability(&band, &pipeline, region(64, 1));
        // Ramp x/64 puts height 4x; 159 (the band middle) is near x = 40.
        let bright = image.rgba(40, 0)[0];
        assert!(bright > image.rgba(0, 0)[0]);
        assert!(bright > image.rgba(63, 0)[0]);
    }

    #[test]
    fn test_variant_palette_cycles() {
        assert_eq!(variant_color(0), variant_color(10));
        assert_ne!(variant_color(0), variant_color(1));
    }
}
