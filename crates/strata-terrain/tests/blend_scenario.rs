use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_terrain::{
    BlendParams, BlendScratch, BlendedHeightNoise, CHUNK_SIZE, ChunkCoord, ConstantNoise,
    FractalParams, HeightLevels, NoiseModule, ParallelChunkGenerator, SimplexNoise,
    TerrainBlender, TerrainHeightPipeline, TerrainVariant, WeightedVariantTable, WorkerContext,
};

fn two_plateaus() -> WeightedVariantTable {
    WeightedVariantTable::build(vec![
        TerrainVariant::new("lowland", 1.0, Arc::new(ConstantNoise::new(0.2))),
        TerrainVariant::new("highland", 1.0, Arc::new(ConstantNoise::new(0.8))),
    ])
    .unwrap()
}

fn scenario_params() -> BlendParams {
    BlendParams {
        scale: 64.0,
        jitter: 0.8,
        blend_width: 0.1,
    }
}

#[test]
fn blended_values_average_out_between_plateaus() {
    let blender = TerrainBlender::new(1337, scenario_params(), two_plateaus()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut scratch = BlendScratch::new();

    let mut sum = 0.0;
    let mut blended = 0;
    for _ in 0..1000 {
        let x = rng.random_range(-10_000.0..10_000.0);
        let z = rng.random_range(-10_000.0..10_000.0);
        let v = blender.evaluate(x, z, &mut scratch);
        assert!(
            (0.2 - 1e-9..=0.8 + 1e-9).contains(&v),
            "value {v} at ({x}, {z}) escaped the plateau range"
        );
        if v != 0.2 && v != 0.8 {
            blended += 1;
        }
        sum += v;
    }

    let mean = sum / 1000.0;
    assert!((mean - 0.5).abs() < 0.1, "mean {mean} too far from 0.5");
    assert!(blended > 0, "no sample landed in a transition zone");
}

#[test]
fn same_seed_reproduces_the_same_terrain() {
    let a = TerrainBlender::new(99, scenario_params(), two_plateaus()).unwrap();
    let b = TerrainBlender::new(99, scenario_params(), two_plateaus()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut scratch_a = BlendScratch::new();
    let mut scratch_b = BlendScratch::new();
    for _ in 0..500 {
        let x = rng.random_range(-5_000.0..5_000.0);
        let z = rng.random_range(-5_000.0..5_000.0);
        assert_eq!(
            a.evaluate(x, z, &mut scratch_a),
            b.evaluate(x, z, &mut scratch_b)
        );
    }
}

#[test]
fn chunks_generated_in_parallel_stay_above_sea_and_below_the_sky() {
    let levels = Arc::new(HeightLevels::standard());
    let base: Arc<dyn NoiseModule> = Arc::new(SimplexNoise::new(5, FractalParams::default()));
    let blender = Arc::new(TerrainBlender::new(5, scenario_params(), two_plateaus()).unwrap());
    let noise = BlendedHeightNoise::new(Arc::clone(&levels), base, blender);
    let pipeline = Arc::new(TerrainHeightPipeline::new(Arc::clone(&levels), noise));

    let generator = ParallelChunkGenerator::new(Arc::clone(&pipeline), 4, 64, 64).unwrap();
    let coords: Vec<_> = ChunkCoord::new(0, 0).square(2).collect();
    for &coord in &coords {
        generator.submit(coord).unwrap();
    }

    let mut chunks = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(30);
    while chunks.len() < coords.len() && Instant::now() < deadline {
        chunks.extend(generator.drain_results());
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(chunks.len(), coords.len());

    let mut ctx = WorkerContext::new();
    for chunk in chunks {
        let (ox, oz) = chunk.coord.origin();
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let h = chunk.buffer.get(x, z);
                assert!(h >= levels.sea_level() - 1, "height {h} below sea level");
                assert!(h <= levels.gen_depth(), "height {h} above world top");
            }
        }
        assert_eq!(
            chunk.buffer.get(3, 11),
            pipeline.height_with(ox + 3, oz + 11, &mut ctx)
        );
        pipeline.release(chunk.buffer).unwrap();
    }

    let stats = pipeline.pool_stats();
    assert_eq!(stats.outstanding, 0);
    assert_eq!(stats.idle, stats.created);
}
