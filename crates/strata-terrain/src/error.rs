//! Error types for terrain configuration and pooled-resource misuse.

/// Errors raised while building a terrain generator from its parameters.
///
/// These are detected at construction time. A generator that failed to build
/// never exists, so no partially configured instance can be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The variant list was empty.
    #[error("terrain variant table is empty")]
    EmptyVariantTable,

    /// A single variant had a weight that is not a positive finite number.
    #[error("terrain variant {index} has invalid weight {weight}")]
    InvalidWeight {
        /// Position of the offending variant in the input list.
        index: usize,
        /// The rejected weight.
        weight: f64,
    },

    /// The summed weight of all variants was not positive.
    #[error("total terrain variant weight must be positive, got {0}")]
    NonPositiveTotalWeight(f64),

    /// The cell scale (world units per cell) was not positive.
    #[error("terrain cell scale must be positive, got {0}")]
    NonPositiveScale(f64),

    /// Cell jitter must lie in `[0, 1]`.
    #[error("cell jitter must be within [0, 1], got {0}")]
    InvalidJitter(f64),

    /// Blend width must lie in `(0, 1]`.
    #[error("blend width must be within (0, 1], got {0}")]
    InvalidBlendWidth(f64),

    /// Sea floor, sea level and generation depth are inconsistent.
    #[error(
        "invalid height levels: sea floor {sea_floor}, sea level {sea_level}, gen depth {gen_depth}"
    )]
    InvalidLevels {
        /// Lowest ocean floor height.
        sea_floor: i32,
        /// Highest water block height.
        sea_level: i32,
        /// Exclusive maximum world height.
        gen_depth: i32,
    },

    /// A buffer border wider than the supported maximum.
    #[error("buffer border {border} exceeds the maximum of {max} columns")]
    BorderTooLarge {
        /// The requested border.
        border: u32,
        /// The largest accepted border.
        max: u32,
    },
}

/// Misuse of a pooled resource. Always an integration bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResourceInvariantError {
    /// The value was acquired from a different pool than the one it is released to.
    #[error("buffer from pool {found} released into pool {expected}")]
    ForeignBuffer {
        /// Id of the pool the value was released to.
        expected: u64,
        /// Id of the pool the value came from.
        found: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_bad_value() {
        let err = ConfigError::InvalidWeight {
            index: 2,
            weight: -1.0,
        };
        assert_eq!(err.to_string(), "terrain variant 2 has invalid weight -1");

        let err = ResourceInvariantError::ForeignBuffer {
            expected: 1,
            found: 7,
        };
        assert_eq!(err.to_string(), "buffer from pool 7 released into pool 1");
    }
}
