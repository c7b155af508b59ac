//! Chunk height generation on top of a [`HeightNoise`] source.

use std::sync::Arc;

use crate::buffer::{TerrainHeightBuffer, checked_border};
use crate::chunk::{CHUNK_SIZE, ChunkCoord};
use crate::context::WorkerContext;
use crate::error::{ConfigError, ResourceInvariantError};
use crate::height_noise::HeightNoise;
use crate::levels::HeightLevels;
use crate::pool::{BufferPool, PoolStats, Pooled};

/// Turns normalized height noise into per-chunk world heights.
///
/// Shared between worker threads. Output buffers come from an internal pool
/// and should be handed back with [`release`](Self::release) once consumed.
#[derive(Debug)]
pub struct TerrainHeightPipeline<G> {
    levels: Arc<HeightLevels>,
    noise: G,
    border: i32,
    pool: BufferPool<TerrainHeightBuffer>,
}

impl<G: HeightNoise> TerrainHeightPipeline<G> {
    /// Create a pipeline producing one-chunk buffers.
    pub fn new(levels: Arc<HeightLevels>, noise: G) -> Self {
        Self::bordered(levels, noise, 0)
    }

    /// Create a pipeline whose buffers also cover `border` columns around each chunk.
    ///
    /// # Errors
    ///
    /// [`ConfigError::BorderTooLarge`] if `border` exceeds
    /// [`MAX_BORDER`](crate::MAX_BORDER).
    pub fn with_border(
        levels: Arc<HeightLevels>,
        noise: G,
        border: u32,
    ) -> Result<Self, ConfigError> {
        Ok(Self::bordered(levels, noise, checked_border(border)?))
    }

    fn bordered(levels: Arc<HeightLevels>, noise: G, border: i32) -> Self {
        let factory_levels = Arc::clone(&levels);
        let pool = BufferPool::new(move || {
            TerrainHeightBuffer::sized(Arc::clone(&factory_levels), border)
        });
        tracing::debug!(
            sea_level = levels.sea_level(),
            gen_depth = levels.gen_depth(),
            border,
            pool = pool.id(),
            "created terrain height pipeline"
        );
        Self {
            levels,
            noise,
            border,
            pool,
        }
    }

    /// Fill a pooled buffer with the heights of every column of `coord`.
    pub fn generate(
        &self,
        coord: ChunkCoord,
        ctx: &mut WorkerContext,
    ) -> Pooled<TerrainHeightBuffer> {
        let mut buffer = self.pool.acquire();
        buffer.begin(coord);

        // Border columns of edge chunks lie outside the i32 range.
        let ox = i64::from(coord.x) * i64::from(CHUNK_SIZE);
        let oz = i64::from(coord.z) * i64::from(CHUNK_SIZE);
        for lz in -self.border..CHUNK_SIZE + self.border {
            for lx in -self.border..CHUNK_SIZE + self.border {
                let x = (ox + i64::from(lx)) as f64;
                let z = (oz + i64::from(lz)) as f64;
                let noise = self.noise.height_noise(x, z, ctx);
                let height = self.levels.world_height(self.levels.scaled_height(noise));
                buffer.set(lx, lz, noise, height);
            }
        }

        ctx.record_chunk(buffer.column_count());
        tracing::trace!(
            x = coord.x,
            z = coord.z,
            max_height = buffer.max_height(),
            "generated chunk heights"
        );
        buffer
    }

    /// World height of a single column, using a throwaway context.
    pub fn height(&self, x: i32, z: i32) -> i32 {
        let mut ctx = WorkerContext::new();
        self.height_with(x, z, &mut ctx)
    }

    /// World height of a single column, using the caller's context.
    pub fn height_with(&self, x: i32, z: i32, ctx: &mut WorkerContext) -> i32 {
        let noise = self
            .noise
            .height_noise(f64::from(x), f64::from(z), ctx);
        self.levels.world_height(self.levels.scaled_height(noise))
    }

    /// Return a buffer produced by [`generate`](Self::generate).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceInvariantError::ForeignBuffer`] if the buffer came from
    /// a different pipeline.
    pub fn release(&self, buffer: Pooled<TerrainHeightBuffer>) -> Result<(), ResourceInvariantError> {
        self.pool.release(buffer)
    }

    /// The calibration heights are scaled with.
    pub fn levels(&self) -> &Arc<HeightLevels> {
        &self.levels
    }

    /// The height source.
    pub fn noise(&self) -> &G {
        &self.noise
    }

    /// Border width of generated buffers, in columns.
    pub fn border(&self) -> i32 {
        self.border
    }

    /// Counters of the buffer pool.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
