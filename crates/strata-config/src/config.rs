//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Terrain variants and how they are blended.
    pub terrain: TerrainConfig,
    /// Vertical calibration of the world.
    pub levels: LevelsConfig,
    /// Chunk generation settings.
    pub generation: GenerationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// A noise module description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ModuleConfig {
    /// The same value everywhere, in `[0, 1]`.
    Constant {
        /// The value.
        value: f64,
    },
    /// Fractal simplex noise.
    Simplex {
        /// Frequency of the first octave, in cycles per block.
        frequency: f64,
        /// Number of octaves.
        octaves: usize,
        /// Amplitude multiplier between octaves.
        persistence: f64,
        /// Frequency multiplier between octaves.
        lacunarity: f64,
    },
    /// Ridged multifractal noise.
    Ridged {
        /// Frequency of the first octave, in cycles per block.
        frequency: f64,
        /// Number of octaves.
        octaves: usize,
    },
}

/// One selectable terrain variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantConfig {
    /// Display name, used in logs and previews.
    pub name: String,
    /// Relative selection weight. Must be positive.
    pub weight: f64,
    /// Height noise of the variant.
    pub module: ModuleConfig,
}

/// Domain warp applied before cell lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WarpConfig {
    /// Multiplier on the default warp frequency (one cycle per half cell).
    pub frequency_scale: f64,
    /// Number of warp octaves.
    pub octaves: usize,
    /// Multiplier on the default warp strength (half a cell). Zero disables warping.
    pub strength_scale: f64,
}

/// Terrain variant blending configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// World seed.
    pub seed: u64,
    /// Blocks per cell.
    pub scale: f64,
    /// Feature point jitter, in `[0, 1]`.
    pub jitter: f64,
    /// Edge-noise threshold below which cells are blended, in `(0, 1]`.
    pub blend_width: f64,
    /// Continent-scale base noise added under every variant.
    pub base: ModuleConfig,
    /// Domain warp settings.
    pub warp: WarpConfig,
    /// Selectable variants. Must not be empty.
    pub variants: Vec<VariantConfig>,
}

/// Vertical calibration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LevelsConfig {
    /// Highest water block.
    pub sea_level: i32,
    /// Lowest ocean floor.
    pub sea_floor: i32,
    /// Exclusive world height.
    pub gen_depth: i32,
    /// Derive horizontal frequency from the world depth.
    pub auto_scale: bool,
    /// User horizontal scale multiplier.
    pub scale: f64,
}

/// Chunk generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Worker threads (0 = one per CPU, minus two).
    pub worker_threads: usize,
    /// Chunks generated in each direction around the origin.
    pub chunk_radius: u32,
    /// Directory for preview images. `None` disables previews.
    pub preview_dir: Option<PathBuf>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 800.0,
            jitter: 0.8,
            blend_width: 0.35,
            base: ModuleConfig::Simplex {
                frequency: 1.0 / 2048.0,
                octaves: 3,
                persistence: 0.5,
                lacunarity: 2.0,
            },
            warp: WarpConfig::default(),
            variants: vec![
                VariantConfig {
                    name: "plains".to_string(),
                    weight: 3.0,
                    module: ModuleConfig::Simplex {
                        frequency: 1.0 / 512.0,
                        octaves: 3,
                        persistence: 0.4,
                        lacunarity: 2.0,
                    },
                },
                VariantConfig {
                    name: "hills".to_string(),
                    weight: 2.0,
                    module: ModuleConfig::Simplex {
                        frequency: 1.0 / 256.0,
                        octaves: 5,
                        persistence: 0.5,
                        lacunarity: 2.0,
                    },
                },
                VariantConfig {
                    name: "mountains".to_string(),
                    weight: 1.0,
                    module: ModuleConfig::Ridged {
                        frequency: 1.0 / 384.0,
                        octaves: 5,
                    },
                },
                VariantConfig {
                    name: "plateau".to_string(),
                    weight: 1.0,
                    module: ModuleConfig::Constant { value: 0.45 },
                },
            ],
        }
    }
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            frequency_scale: 1.0,
            octaves: 3,
            strength_scale: 1.0,
        }
    }
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            sea_level: 62,
            sea_floor: 40,
            gen_depth: 384,
            auto_scale: true,
            scale: 1.0,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            chunk_radius: 4,
            preview_dir: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for Strata, or `.strata` in the working
    /// directory when the platform has none.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("strata"))
            .unwrap_or_else(|| PathBuf::from(".strata"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
