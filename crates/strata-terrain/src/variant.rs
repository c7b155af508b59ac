//! Terrain variants and the weighted table that selects between them.

use std::sync::Arc;

use crate::error::ConfigError;
use crate::module::NoiseModule;

/// A named terrain type: a weight and the noise module producing its heights.
#[derive(Clone, Debug)]
pub struct TerrainVariant {
    name: Arc<str>,
    weight: f64,
    noise: Arc<dyn NoiseModule>,
}

impl TerrainVariant {
    /// Create a variant. The weight is validated when the table is built.
    pub fn new(name: impl Into<Arc<str>>, weight: f64, noise: Arc<dyn NoiseModule>) -> Self {
        Self {
            name: name.into(),
            weight,
            noise,
        }
    }

    /// Display name of the variant.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relative selection weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The variant's noise module.
    pub fn noise(&self) -> &Arc<dyn NoiseModule> {
        &self.noise
    }

    /// Sample the variant's noise at `(x, z)`.
    #[inline]
    pub fn value(&self, x: f64, z: f64) -> f64 {
        self.noise.value(x, z)
    }

    /// A copy of this variant whose noise module uses `seed`.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            name: Arc::clone(&self.name),
            weight: self.weight,
            noise: self.noise.with_seed(seed),
        }
    }
}

/// Immutable weighted index from a selector in `[0, 1)` to a variant.
///
/// Variant `i` owns the half-open interval `[bounds[i-1], bounds[i])` of the
/// unit range, where `bounds` are the normalized cumulative weights.
#[derive(Clone, Debug)]
pub struct WeightedVariantTable {
    variants: Vec<TerrainVariant>,
    /// Normalized cumulative upper bound of each variant's interval.
    bounds: Vec<f64>,
    total_weight: f64,
}

impl WeightedVariantTable {
    /// Build a table from an ordered variant list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyVariantTable`] for an empty list,
    /// [`ConfigError::InvalidWeight`] for a non-finite or non-positive weight
    /// and [`ConfigError::NonPositiveTotalWeight`] if the sum is not positive.
    pub fn build(variants: Vec<TerrainVariant>) -> Result<Self, ConfigError> {
        if variants.is_empty() {
            return Err(ConfigError::EmptyVariantTable);
        }
        if let Some((index, variant)) = variants
            .iter()
            .enumerate()
            .find(|(_, v)| !v.weight.is_finite() || v.weight <= 0.0)
        {
            return Err(ConfigError::InvalidWeight {
                index,
                weight: variant.weight,
            });
        }

        let total_weight: f64 = variants.iter().map(|v| v.weight).sum();
        if !(total_weight.is_finite() && total_weight > 0.0) {
            return Err(ConfigError::NonPositiveTotalWeight(total_weight));
        }

        let mut running = 0.0;
        let mut bounds: Vec<f64> = variants
            .iter()
            .map(|v| {
                running += v.weight;
                running / total_weight
            })
            .collect();
        // Rounding must never leave a gap at the top of the range.
        if let Some(last) = bounds.last_mut() {
            *last = 1.0;
        }

        tracing::debug!(
            variants = variants.len(),
            total_weight,
            "built weighted variant table"
        );

        Ok(Self {
            variants,
            bounds,
            total_weight,
        })
    }

    /// Index of the variant whose interval contains `selector`.
    ///
    /// Selectors outside `[0, 1)` are clamped; NaN selects the first variant.
    pub fn index_at(&self, selector: f64) -> usize {
        let s = if selector.is_nan() {
            0.0
        } else {
            selector.clamp(0.0, 1.0)
        };
        // First bound strictly greater than the selector.
        let index = self.bounds.partition_point(|&bound| bound <= s);
        index.min(self.variants.len() - 1)
    }

    /// The variant whose interval contains `selector`.
    pub fn value_at(&self, selector: f64) -> &TerrainVariant {
        &self.variants[self.index_at(selector)]
    }

    /// Variant by index.
    pub fn get(&self, index: usize) -> Option<&TerrainVariant> {
        self.variants.get(index)
    }

    /// All variants, in table order.
    pub fn variants(&self) -> &[TerrainVariant] {
        &self.variants
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always `false`: an empty table cannot be built.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// A new table with every variant re-seeded, preserving order and weights.
    ///
    /// Variant `i` gets `seed + i`, so variants sharing module settings still
    /// sample distinct fields.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            variants: self
                .variants
                .iter()
                .enumerate()
                .map(|(i, v)| v.with_seed(seed.wrapping_add(i as u64)))
                .collect(),
            bounds: self.bounds.clone(),
            total_weight: self.total_weight,
        }
    }
}
