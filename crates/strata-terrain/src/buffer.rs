//! Per-chunk height results.

use std::sync::Arc;

use crate::chunk::{CHUNK_SIZE, ChunkCoord};
use crate::error::ConfigError;
use crate::levels::HeightLevels;

/// Widest border a buffer accepts, in columns.
pub const MAX_BORDER: u32 = 1024;

/// `border` as a signed column count, if it is within [`MAX_BORDER`].
pub(crate) fn checked_border(border: u32) -> Result<i32, ConfigError> {
    i32::try_from(border)
        .ok()
        .filter(|_| border <= MAX_BORDER)
        .ok_or(ConfigError::BorderTooLarge {
            border,
            max: MAX_BORDER,
        })
}

/// Normalized noise and world height for every column of a chunk, plus an
/// optional ring of `border` columns around it.
///
/// Columns are addressed by chunk-local coordinates in
/// `-border..CHUNK_SIZE + border`. Buffers are recycled through a pool, so a
/// freshly acquired buffer holds stale data from its previous chunk until it
/// is refilled.
#[derive(Clone, Debug)]
pub struct TerrainHeightBuffer {
    levels: Arc<HeightLevels>,
    coord: ChunkCoord,
    border: i32,
    size: i32,
    noise: Vec<f64>,
    heights: Vec<i32>,
    max_height: i32,
}

impl TerrainHeightBuffer {
    /// A buffer covering exactly one chunk.
    pub fn new(levels: Arc<HeightLevels>) -> Self {
        Self::sized(levels, 0)
    }

    /// A buffer covering one chunk plus `border` columns on every side.
    ///
    /// # Errors
    ///
    /// [`ConfigError::BorderTooLarge`] if `border` exceeds [`MAX_BORDER`].
    pub fn with_border(levels: Arc<HeightLevels>, border: u32) -> Result<Self, ConfigError> {
        Ok(Self::sized(levels, checked_border(border)?))
    }

    /// `border` must already be checked with [`checked_border`].
    pub(crate) fn sized(levels: Arc<HeightLevels>, border: i32) -> Self {
        let size = CHUNK_SIZE + 2 * border;
        let area = (size * size) as usize;
        Self {
            levels,
            coord: ChunkCoord::default(),
            border,
            size,
            noise: vec![0.0; area],
            heights: vec![0; area],
            max_height: i32::MIN,
        }
    }

    /// Prepare the buffer for refilling with the columns of `coord`.
    pub fn begin(&mut self, coord: ChunkCoord) {
        self.coord = coord;
        self.max_height = i32::MIN;
    }

    #[inline]
    fn index(&self, x: i32, z: i32) -> usize {
        debug_assert!(
            (-self.border..CHUNK_SIZE + self.border).contains(&x)
                && (-self.border..CHUNK_SIZE + self.border).contains(&z),
            "column ({x}, {z}) outside buffer with border {}",
            self.border
        );
        ((z + self.border) * self.size + (x + self.border)) as usize
    }

    /// Store a column's normalized noise and world height.
    #[inline]
    pub fn set(&mut self, x: i32, z: i32, noise: f64, height: i32) {
        let index = self.index(x, z);
        self.noise[index] = noise;
        self.heights[index] = height;
        self.max_height = self.max_height.max(height);
    }

    /// World height of a column.
    #[inline]
    pub fn get(&self, x: i32, z: i32) -> i32 {
        self.heights[self.index(x, z)]
    }

    /// Normalized height noise of a column.
    #[inline]
    pub fn noise(&self, x: i32, z: i32) -> f64 {
        self.noise[self.index(x, z)]
    }

    /// Highest world height written since [`begin`](Self::begin).
    pub fn max_height(&self) -> i32 {
        self.max_height
    }

    /// Lowest world height among the chunk's own columns (border excluded).
    pub fn min_height(&self) -> i32 {
        let mut min = i32::MAX;
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                min = min.min(self.get(x, z));
            }
        }
        min
    }

    /// The chunk this buffer was last filled for.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Border width in columns.
    pub fn border(&self) -> i32 {
        self.border
    }

    /// Side length including the border.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Number of stored columns, border included.
    pub fn column_count(&self) -> usize {
        self.heights.len()
    }

    /// Raw row-major heights, border included.
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// The calibration used to produce the heights.
    pub fn levels(&self) -> &Arc<HeightLevels> {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_tracks_max_and_addresses_border() {
        let levels = Arc::new(HeightLevels::standard());
        let mut buffer = TerrainHeightBuffer::with_border(levels, 2).unwrap();
        assert_eq!(buffer.size(), 20);
        assert_eq!(buffer.column_count(), 400);

        buffer.begin(ChunkCoord::new(1, 1));
        buffer.set(-2, -2, 0.1, 10);
        buffer.set(17, 17, 0.9, 300);
        buffer.set(5, 5, 0.5, 120);

        assert_eq!(buffer.get(-2, -2), 10);
        assert_eq!(buffer.get(17, 17), 300);
        assert_eq!(buffer.noise(5, 5), 0.5);
        assert_eq!(buffer.max_height(), 300);
        assert_eq!(buffer.heights()[0], 10);
    }

    #[test]
    fn test_begin_resets_max_but_keeps_contents() {
        let mut buffer = TerrainHeightBuffer::new(Arc::new(HeightLevels::legacy()));
        buffer.begin(ChunkCoord::new(0, 0));
        buffer.set(3, 4, 0.7, 90);
        buffer.begin(ChunkCoord::new(5, 5));
        assert_eq!(buffer.max_height(), i32::MIN);
        assert_eq!(buffer.get(3, 4), 90);
        assert_eq!(buffer.coord(), ChunkCoord::new(5, 5));
    }

    #[test]
    fn test_oversized_border_is_rejected() {
        let levels = Arc::new(HeightLevels::standard());
        assert!(TerrainHeightBuffer::with_border(Arc::clone(&levels), MAX_BORDER).is_ok());
        for border in [MAX_BORDER + 1, u32::MAX] {
            assert_eq!(
                TerrainHeightBuffer::with_border(Arc::clone(&levels), border).err(),
                Some(ConfigError::BorderTooLarge {
                    border,
                    max: MAX_BORDER
                })
            );
        }
    }
}
