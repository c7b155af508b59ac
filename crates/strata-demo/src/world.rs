//! Builds the terrain pipeline from the loaded configuration.

use std::sync::Arc;

use strata_config::{Config, LevelsConfig, ModuleConfig, TerrainConfig};
use strata_terrain::{
    BASE_SEED_OFFSET, BlendParams, BlendedHeightNoise, ConfigError, ConstantNoise, DomainWarp,
    FractalParams, HeightLevels, NoWarp, NoiseModule, RidgedNoise, SimplexNoise, SimplexWarp,
    TerrainBlender, TerrainHeightPipeline, TerrainVariant, WARP_SEED_OFFSET, WeightedVariantTable,
};

/// The pipeline type the demo runs.
pub type Pipeline = TerrainHeightPipeline<BlendedHeightNoise>;

/// Height calibration from the `levels` section.
pub fn build_levels(config: &LevelsConfig) -> Result<HeightLevels, ConfigError> {
    HeightLevels::new(
        config.sea_level,
        config.sea_floor,
        config.gen_depth,
        config.auto_scale,
        config.scale,
    )
}

/// Instantiate a noise module description.
pub fn build_module(seed: u64, module: &ModuleConfig) -> Arc<dyn NoiseModule> {
    match *module {
        ModuleConfig::Constant { value } => Arc::new(ConstantNoise::new(value)),
        ModuleConfig::Simplex {
            frequency,
            octaves,
            persistence,
            lacunarity,
        } => Arc::new(SimplexNoise::new(
            seed,
            FractalParams {
                frequency,
                octaves,
                persistence,
                lacunarity,
            },
        )),
        ModuleConfig::Ridged { frequency, octaves } => {
            Arc::new(RidgedNoise::new(seed, frequency, octaves))
        }
    }
}

/// The domain warp described by the `terrain.warp` section.
pub fn build_warp(config: &TerrainConfig) -> Arc<dyn DomainWarp> {
    let warp = &config.warp;
    if warp.strength_scale <= 0.0 {
        return Arc::new(NoWarp);
    }
    let half = (config.scale * 0.5).max(1.0);
    Arc::new(SimplexWarp::new(
        config.seed.wrapping_add(WARP_SEED_OFFSET),
        warp.frequency_scale / half,
        warp.octaves,
        half * warp.strength_scale,
    ))
}

/// The variant blender described by the `terrain` section.
pub fn build_blender(config: &TerrainConfig) -> Result<TerrainBlender, ConfigError> {
    let variants = config
        .variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            TerrainVariant::new(
                variant.name.as_str(),
                variant.weight,
                build_module(config.seed.wrapping_add(i as u64), &variant.module),
            )
        })
        .collect();
    let table = WeightedVariantTable::build(variants)?;
    let params = BlendParams {
        scale: config.scale,
        jitter: config.jitter,
        blend_width: config.blend_width,
    };
    TerrainBlender::with_warp(config.seed, params, table, build_warp(config))
}

/// The full height pipeline for `config`.
pub fn build_pipeline(config: &Config) -> Result<Arc<Pipeline>, ConfigError> {
    let levels = Arc::new(build_levels(&config.levels)?);
    let blender = Arc::new(build_blender(&config.terrain)?);
    let base = build_module(
        config.terrain.seed.wrapping_add(BASE_SEED_OFFSET),
        &config.terrain.base,
    );
    let noise = BlendedHeightNoise::new(Arc::clone(&levels), base, blender);
    Ok(Arc::new(TerrainHeightPipeline::new(levels, noise)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::{VariantConfig, WarpConfig};
    use strata_terrain::{HeightNoise, WorkerContext};

    #[test]
    fn test_default_config_builds() {
        let pipeline = build_pipeline(&Config::default()).unwrap();
        let levels = pipeline.levels();
        for (x, z) in [(0, 0), (1000, -250), (-4096, 77)] {
            let h = pipeline.height(x, z);
            assert!(h >= levels.sea_level() - 1 && h <= levels.gen_depth());
        }
        assert_eq!(pipeline.noise().blender().table().len(), 4);
    }

    #[test]
    fn test_empty_variant_list_is_rejected() {
        let mut config = Config::default();
        config.terrain.variants.clear();
        assert_eq!(
            build_pipeline(&config).unwrap_err(),
            ConfigError::EmptyVariantTable
        );
    }

    #[test]
    fn test_bad_weight_reports_its_index() {
        let mut config = Config::default();
        config.terrain.variants.push(VariantConfig {
            name: "broken".to_string(),
            weight: 0.0,
            module: ModuleConfig::Constant { value: 0.5 },
        });
        assert_eq!(
            build_pipeline(&config).unwrap_err(),
            ConfigError::InvalidWeight {
                index: 4,
                weight: 0.0
            }
        );
    }

    #[test]
    fn test_inconsistent_levels_are_rejected() {
        let mut config = Config::default();
        config.levels.sea_floor = 100;
        assert!(matches!(
            build_pipeline(&config),
            Err(ConfigError::InvalidLevels { .. })
        ));
    }

    #[test]
    fn test_zero_strength_disables_warp() {
        let config = TerrainConfig {
            warp: WarpConfig {
                strength_scale: 0.0,
                ..WarpConfig::default()
            },
            ..TerrainConfig::default()
        };
        assert_eq!(build_warp(&config).offset(123.0, -9.0), (0.0, 0.0));
    }

    #[test]
    fn test_constant_module_ignores_seed() {
        let module = ModuleConfig::Constant { value: 0.3 };
        assert_eq!(build_module(1, &module).value(5.0, 5.0), 0.3);
        assert_eq!(build_module(2, &module).value(-5.0, 9.0), 0.3);
    }

    #[test]
    fn test_reseed_matches_a_fresh_build() {
        let mut config = Config::default();
        let reseeded = build_pipeline(&config).unwrap().noise().with_seed(5);
        config.terrain.seed = 5;
        let fresh = build_pipeline(&config).unwrap();

        let mut ctx = WorkerContext::new();
        for i in 0..200 {
            let (x, z) = (i as f64 * 97.0, i as f64 * -53.0);
            assert_eq!(
                reseeded.height_noise(x, z, &mut ctx),
                fresh.noise().height_noise(x, z, &mut ctx)
            );
        }
    }
}
