//! Terrain height generation: weighted terrain variants blended across a
//! jittered cell field, scaled to world heights and produced per chunk.

mod blend;
mod buffer;
mod cell;
mod chunk;
mod context;
mod error;
mod generation;
mod height_noise;
mod levels;
mod module;
mod pipeline;
mod pool;
mod variant;
mod viability;

pub mod debug_viz;

pub use blend::{BlendParams, REGION_SEED_OFFSET, TerrainBlender, WARP_SEED_OFFSET};
pub use buffer::{MAX_BORDER, TerrainHeightBuffer};
pub use cell::{BlendScratch, NEIGHBORHOOD, VariantMemo, hash2d, locate};
pub use chunk::{CHUNK_AREA, CHUNK_SIZE, ChunkCoord};
pub use context::WorkerContext;
pub use error::{ConfigError, ResourceInvariantError};
pub use generation::{GeneratedChunk, ParallelChunkGenerator, SubmitError};
pub use height_noise::{BASE_SEED_OFFSET, BlendedHeightNoise, HeightNoise};
pub use levels::HeightLevels;
pub use module::{
    ConstantNoise, DomainWarp, FractalParams, NoWarp, NoiseModule, RidgedNoise, SimplexNoise,
    SimplexWarp,
};
pub use pipeline::TerrainHeightPipeline;
pub use pool::{BufferPool, PoolStats, Pooled};
pub use variant::{TerrainVariant, WeightedVariantTable};
pub use viability::HeightViability;
