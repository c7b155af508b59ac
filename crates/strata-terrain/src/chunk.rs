//! Chunk addressing on the 2D column grid.

/// Side length of a chunk, in columns.
pub const CHUNK_SIZE: i32 = 16;

/// Columns per chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Integer address of a `CHUNK_SIZE`×`CHUNK_SIZE` column grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk index along X.
    pub x: i32,
    /// Chunk index along Z.
    pub z: i32,
}

impl ChunkCoord {
    /// Create a chunk coordinate.
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing world column `(x, z)`.
    #[inline]
    pub const fn containing(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_SIZE),
            z: z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Lowest chunk coordinate whose columns fit in `i32`.
    pub const MIN_COORD: i32 = i32::MIN / CHUNK_SIZE;
    /// Highest chunk coordinate whose columns fit in `i32`.
    pub const MAX_COORD: i32 = i32::MAX / CHUNK_SIZE;

    /// Returns `true` if every column of the chunk has an `i32` world coordinate.
    ///
    /// Every chunk returned by [`containing`](Self::containing) is addressable.
    #[inline]
    pub const fn is_addressable(self) -> bool {
        self.x >= Self::MIN_COORD
            && self.x <= Self::MAX_COORD
            && self.z >= Self::MIN_COORD
            && self.z <= Self::MAX_COORD
    }

    /// World coordinates of the chunk's `(0, 0)` column.
    ///
    /// Exact for addressable chunks; wraps outside that range.
    #[inline]
    pub const fn origin(self) -> (i32, i32) {
        (
            self.x.wrapping_mul(CHUNK_SIZE),
            self.z.wrapping_mul(CHUNK_SIZE),
        )
    }

    /// Squared distance in chunks to `other`.
    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dz = i64::from(self.z - other.z);
        dx * dx + dz * dz
    }

    /// All chunks within a square of `radius` chunks around `self`, row-major.
    ///
    /// Chunks past the `i32` coordinate range are skipped.
    pub fn square(self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        let radius = radius.max(0);
        (-radius..=radius).flat_map(move |dz| {
            (-radius..=radius).filter_map(move |dx| {
                Some(ChunkCoord::new(
                    self.x.checked_add(dx)?,
                    self.z.checked_add(dz)?,
                ))
            })
        })
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_and_containing_agree() {
        for (x, z) in [(0, 0), (15, 15), (16, -1), (-17, 33)] {
            let coord = ChunkCoord::containing(x, z);
            let (ox, oz) = coord.origin();
            assert!((ox..ox + CHUNK_SIZE).contains(&x));
            assert!((oz..oz + CHUNK_SIZE).contains(&z));
        }
        assert_eq!(ChunkCoord::containing(-1, -16), ChunkCoord::new(-1, -1));
    }

    #[test]
    fn test_square_covers_radius() {
        let chunks: Vec<_> = ChunkCoord::new(2, -3).square(1).collect();
        assert_eq!(chunks.len(), 9);
        assert_eq!(chunks[0], ChunkCoord::new(1, -4));
        assert_eq!(chunks[8], ChunkCoord::new(3, -2));
        assert_eq!(ChunkCoord::new(0, 0).square(0).count(), 1);
    }

    #[test]
    fn test_extreme_columns_stay_addressable() {
        for (x, z) in [(i32::MAX, i32::MIN), (i32::MIN, i32::MAX)] {
            let coord = ChunkCoord::containing(x, z);
            assert!(coord.is_addressable());
            let (ox, oz) = coord.origin();
            assert!(i64::from(x) - i64::from(ox) < i64::from(CHUNK_SIZE));
            assert!(i64::from(z) - i64::from(oz) < i64::from(CHUNK_SIZE));
        }
        assert!(!ChunkCoord::new(ChunkCoord::MAX_COORD + 1, 0).is_addressable());
    }

    #[test]
    fn test_square_at_the_coordinate_edge_does_not_overflow() {
        let edge = ChunkCoord::new(i32::MAX, i32::MIN);
        assert_eq!(edge.square(1).count(), 4);
    }
}
