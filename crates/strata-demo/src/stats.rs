//! Summary statistics over generated chunks.

use strata_terrain::{BlendedHeightNoise, CHUNK_SIZE, TerrainHeightBuffer, WorkerContext};

/// Running height and variant coverage totals.
#[derive(Debug, Clone)]
pub struct RegionStats {
    pub chunks: usize,
    pub columns: u64,
    pub min_height: i32,
    pub max_height: i32,
    height_sum: i64,
    pub generation_time_us: u64,
    /// Columns owned by each variant, by table index.
    pub coverage: Vec<u64>,
}

impl RegionStats {
    pub fn new(variant_count: usize) -> Self {
        Self {
            chunks: 0,
            columns: 0,
            min_height: i32::MAX,
            max_height: i32::MIN,
            height_sum: 0,
            generation_time_us: 0,
            coverage: vec![0; variant_count],
        }
    }

    /// Fold one generated chunk into the totals.
    pub fn record(
        &mut self,
        buffer: &TerrainHeightBuffer,
        generation_time_us: u64,
        noise: &BlendedHeightNoise,
        ctx: &mut WorkerContext,
    ) {
        let (ox, oz) = buffer.coord().origin();
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let h = buffer.get(x, z);
                self.height_sum += i64::from(h);
                self.min_height = self.min_height.min(h);
                self.max_height = self.max_height.max(h);

                let index = noise.terrain_index_at(f64::from(ox + x), f64::from(oz + z), ctx);
                if let Some(count) = self.coverage.get_mut(index) {
                    *count += 1;
                }
            }
        }
        self.columns += (CHUNK_SIZE * CHUNK_SIZE) as u64;
        self.chunks += 1;
        self.generation_time_us += generation_time_us;
    }

    /// Mean column height, or `None` before any chunk was recorded.
    pub fn mean_height(&self) -> Option<f64> {
        (self.columns > 0).then(|| self.height_sum as f64 / self.columns as f64)
    }

    /// Fraction of columns owned by variant `index`.
    pub fn coverage_fraction(&self, index: usize) -> f64 {
        if self.columns == 0 {
            return 0.0;
        }
        self.coverage.get(index).copied().unwrap_or(0) as f64 / self.columns as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::build_pipeline;
    use strata_config::Config;
    use strata_terrain::ChunkCoord;

    #[test]
    fn test_record_accumulates_heights_and_coverage() {
        let pipeline = build_pipeline(&Config::default()).unwrap();
        let variants = pipeline.noise().blender().table().len();
        let mut stats = RegionStats::new(variants);
        let mut ctx = WorkerContext::new();

        for coord in ChunkCoord::new(0, 0).square(1) {
            let buffer = pipeline.generate(coord, &mut ctx);
            stats.record(&buffer, 10, pipeline.noise(), &mut ctx);
            assert!(stats.max_height >= buffer.max_height());
            pipeline.release(buffer).unwrap();
        }

        assert_eq!(stats.chunks, 9);
        assert_eq!(stats.columns, 9 * 256);
        assert_eq!(stats.coverage.iter().sum::<u64>(), stats.columns);
        assert_eq!(stats.generation_time_us, 90);
        let mean = stats.mean_height().unwrap();
        assert!(mean >= f64::from(stats.min_height) && mean <= f64::from(stats.max_height));
        let total: f64 = (0..variants).map(|i| stats.coverage_fraction(i)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats_have_no_mean() {
        let stats = RegionStats::new(3);
        assert_eq!(stats.mean_height(), None);
        assert_eq!(stats.coverage_fraction(0), 0.0);
    }
}
