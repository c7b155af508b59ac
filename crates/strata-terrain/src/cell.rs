//! Jittered-lattice cell field and the per-worker scratch it writes into.
//!
//! Every integer lattice cell `(cx, cz)` owns one feature point, displaced
//! from the cell corner by a hash-derived jitter. Cells are never stored:
//! the same `(seed, cx, cz)` always reproduces the same point and selector.

/// Number of cells in the 3×3 neighborhood around a sample.
pub const NEIGHBORHOOD: usize = 9;

const X_SALT: u32 = 1619;
const Z_SALT: u32 = 31337;

/// 32-bit hash of a lattice cell.
#[inline]
pub fn hash2d(seed: u32, cx: i32, cz: i32) -> u32 {
    let mut h = u64::from(seed).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= (cx as u32 as u64).wrapping_mul(0x517C_C1B7_2722_0A95);
    h ^= (cz as u32 as u64).wrapping_mul(0x2545_F491_4F6C_DD1D);
    (fmix64(h) & 0xFFFF_FFFF) as u32
}

/// Murmur3 64-bit finalizer.
#[inline]
fn fmix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    h = h.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    h ^= h >> 33;
    h
}

/// Uniform value in `[0, 1)` derived from a cell hash.
#[inline]
pub fn rand_unit(hash: u32) -> f64 {
    let mixed = fmix64(u64::from(hash) ^ 0x2545_F491_4F6C_DD1D);
    (mixed >> 11) as f64 / (1u64 << 53) as f64
}

/// Uniform value in `[-1, 1]` derived from a cell hash and an axis salt.
#[inline]
pub fn rand_signed(hash: u32, salt: u32) -> f64 {
    let mixed = fmix64((u64::from(salt) << 32) | u64::from(hash));
    let unit = (mixed >> 11) as f64 / ((1u64 << 53) - 1) as f64;
    unit * 2.0 - 1.0
}

/// Jitter of a cell's feature point from its lattice corner.
#[inline]
pub fn feature_offset(hash: u32, jitter: f64) -> (f64, f64) {
    (
        rand_signed(hash, X_SALT) * jitter,
        rand_signed(hash, Z_SALT) * jitter,
    )
}

/// Lattice cell containing `v` and the position of `v` inside it.
///
/// The cell index wraps modulo 2^32, so the plane repeats every 2^32 cells.
/// Non-finite input is treated as the corner of cell 0.
#[inline]
fn split_lattice(v: f64) -> (i32, f64) {
    if !v.is_finite() {
        return (0, 0.0);
    }
    let floor = libm::floor(v);
    (floor as i64 as i32, v - floor)
}

/// Fixed-capacity memo of variant noise values, keyed by variant index.
#[derive(Clone, Debug, Default)]
pub struct VariantMemo {
    keys: [usize; NEIGHBORHOOD],
    values: [f64; NEIGHBORHOOD],
    len: usize,
}

impl VariantMemo {
    /// Forget every entry.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Cached value for `key`, if present.
    #[inline]
    pub fn get(&self, key: usize) -> Option<f64> {
        self.keys[..self.len]
            .iter()
            .position(|&k| k == key)
            .map(|slot| self.values[slot])
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// A neighborhood holds at most nine distinct variants, so a full memo
    /// only happens when callers forget to [`clear`](Self::clear); the value
    /// is then computed without being stored.
    #[inline]
    pub fn get_or_insert_with(&mut self, key: usize, compute: impl FnOnce() -> f64) -> f64 {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        if self.len < NEIGHBORHOOD {
            self.keys[self.len] = key;
            self.values[self.len] = value;
            self.len += 1;
        }
        value
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Reusable per-worker state for one neighborhood search.
///
/// Overwritten by every [`locate`] call. Never share one between threads;
/// each worker owns its own.
#[derive(Clone, Debug, Default)]
pub struct BlendScratch {
    /// Hash of each neighborhood cell, row-major from `(cx-1, cz-1)`.
    pub hashes: [u32; NEIGHBORHOOD],
    /// Squared distance from the sample to each cell's feature point.
    pub distances: [f64; NEIGHBORHOOD],
    /// Neighborhood index of the nearest cell.
    pub nearest: usize,
    /// Neighborhood index of the second-nearest cell.
    pub second: usize,
    /// Per-call noise memo.
    pub memo: VariantMemo,
}

impl BlendScratch {
    /// Create an empty scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance (not squared) to neighborhood cell `index`.
    #[inline]
    pub fn distance(&self, index: usize) -> f64 {
        libm::sqrt(self.distances[index])
    }

    /// Selector of neighborhood cell `index`.
    #[inline]
    pub fn selector(&self, index: usize) -> f64 {
        rand_unit(self.hashes[index])
    }
}

/// Populate `scratch` with the 3×3 neighborhood of the cell containing `(x, z)`.
///
/// Cells are scanned row-major. A candidate replaces the nearest only when
/// strictly closer; the previous nearest then becomes the second-nearest.
///
/// Distances are measured from the sample's position inside its own cell, so
/// they keep full precision however far the sample is from the origin.
pub fn locate(seed: u32, x: f64, z: f64, jitter: f64, scratch: &mut BlendScratch) {
    let (xr, fx) = split_lattice(x);
    let (zr, fz) = split_lattice(z);

    let mut nearest = 0;
    let mut second = 0;
    let mut nearest_dist = f64::MAX;
    let mut second_dist = f64::MAX;

    let mut i = 0;
    for oz in -1i32..=1 {
        for ox in -1i32..=1 {
            let hash = hash2d(seed, xr.wrapping_add(ox), zr.wrapping_add(oz));
            let (jx, jz) = feature_offset(hash, jitter);
            let dx = fx - (f64::from(ox) + jx);
            let dz = fz - (f64::from(oz) + jz);
            let dist2 = dx * dx + dz * dz;

            scratch.hashes[i] = hash;
            scratch.distances[i] = dist2;

            if dist2 < nearest_dist {
                second_dist = nearest_dist;
                second = nearest;
                nearest_dist = dist2;
                nearest = i;
            } else if dist2 < second_dist {
                second_dist = dist2;
                second = i;
            }
            i += 1;
        }
    }

    scratch.nearest = nearest;
    scratch.second = second;
}
