//! Strata demo: generates the chunks around the origin, logs a height and
//! variant summary, and optionally writes preview images.

mod preview;
mod stats;
mod world;

use std::collections::VecDeque;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use strata_config::{CliArgs, Config};
use strata_terrain::debug_viz::{render_height_debug, render_terrain_map};
use strata_terrain::{
    ChunkCoord, ParallelChunkGenerator, ResourceInvariantError, SubmitError, WorkerContext,
};
use tracing::{error, info, warn};

use crate::preview::PreviewError;
use crate::stats::RegionStats;
use crate::world::Pipeline;

/// Errors that abort a demo run.
#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("invalid terrain configuration: {0}")]
    Terrain(#[from] strata_terrain::ConfigError),

    #[error("failed to start generation workers: {0}")]
    Workers(#[from] std::io::Error),

    #[error("buffer pool misuse: {0}")]
    Pool(#[from] ResourceInvariantError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("generation stalled after {received} of {expected} chunks")]
    Incomplete { received: usize, expected: usize },
}

fn generate_region(config: &Config, pipeline: &Arc<Pipeline>) -> Result<RegionStats, DemoError> {
    let generator = match config.generation.worker_threads {
        0 => ParallelChunkGenerator::with_defaults(Arc::clone(pipeline))?,
        n => ParallelChunkGenerator::new(Arc::clone(pipeline), n, 256, 256)?,
    };

    let radius = config.generation.chunk_radius as i32;
    let mut queue: VecDeque<ChunkCoord> = ChunkCoord::new(0, 0).square(radius).collect();
    let expected = queue.len();
    info!("Generating {expected} chunks (radius {radius})");

    let variants = pipeline.noise().blender().table().len();
    let mut stats = RegionStats::new(variants);
    let mut ctx = WorkerContext::new();
    let start = Instant::now();

    while stats.chunks < expected {
        while let Some(coord) = queue.pop_front() {
            match generator.submit(coord) {
                Ok(()) => {}
                Err(SubmitError::QueueFull(coord)) => {
                    queue.push_front(coord);
                    break;
                }
                Err(err @ SubmitError::AlreadyPending(_)) => warn!("Skipping chunk: {err}"),
            }
        }

        // Read the counter before draining so a late result is never missed.
        let idle = generator.in_flight_count() == 0;
        let results = generator.drain_results();
        if results.is_empty() {
            if idle && queue.is_empty() {
                return Err(DemoError::Incomplete {
                    received: stats.chunks,
                    expected,
                });
            }
            std::thread::sleep(Duration::from_millis(1));
            continue;
        }

        for chunk in results {
            stats.record(
                &chunk.buffer,
                chunk.generation_time_us,
                pipeline.noise(),
                &mut ctx,
            );
            pipeline.release(chunk.buffer)?;
        }
    }

    info!(
        "Generated {} chunks in {}ms, total worker time {}us",
        stats.chunks,
        start.elapsed().as_millis(),
        stats.generation_time_us
    );
    Ok(stats)
}

fn log_summary(stats: &RegionStats, pipeline: &Pipeline) {
    let levels = pipeline.levels();
    info!(
        "Heights: min {}, max {}, mean {:.1} (sea level {}, world top {})",
        stats.min_height,
        stats.max_height,
        stats.mean_height().unwrap_or(0.0),
        levels.sea_level(),
        levels.gen_depth()
    );

    let table = pipeline.noise().blender().table();
    for (index, variant) in table.variants().iter().enumerate() {
        let expected = variant.weight() / table.total_weight();
        info!(
            "Variant {:<12} coverage {:>5.1}% (weight share {:>5.1}%)",
            variant.name(),
            stats.coverage_fraction(index) * 100.0,
            expected * 100.0
        );
    }

    let pool = pipeline.pool_stats();
    info!(
        "Buffer pool: {} created, {} idle, {} outstanding",
        pool.created, pool.idle, pool.outstanding
    );
}

fn write_previews(dir: &Path, config: &Config, pipeline: &Pipeline) -> Result<(), PreviewError> {
    let region = preview::region_for_radius(config.generation.chunk_radius);

    let heights = render_height_debug(pipeline, region);
    let path = dir.join("heights.png");
    preview::write_png(&path, &heights)?;
    info!("Wrote {}x{} height preview to {}", heights.width, heights.height, path.display());

    let terrain = render_terrain_map(pipeline.noise(), region);
    let path = dir.join("terrain.png");
    preview::write_png(&path, &terrain)?;
    info!(
        "Wrote terrain map with {} variant colours to {}",
        terrain.unique_color_count(),
        path.display()
    );
    Ok(())
}

fn run(config: &Config) -> Result<(), DemoError> {
    let pipeline = world::build_pipeline(config)?;
    let stats = generate_region(config, &pipeline)?;
    log_summary(&stats, &pipeline);

    if let Some(dir) = &config.generation.preview_dir {
        write_previews(dir, config, &pipeline)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(Config::default_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        "Strata terrain demo: seed {}, cell scale {}, jitter {}, blend width {}",
        config.terrain.seed, config.terrain.scale, config.terrain.jitter, config.terrain.blend_width
    );
    if config.terrain.variants.len() > 10 {
        warn!("More than ten variants; terrain map colours will repeat");
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Terrain demo failed: {e}");
            ExitCode::FAILURE
        }
    }
}
