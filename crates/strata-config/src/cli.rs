//! Command-line argument parsing for the terrain generator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Blended terrain height generator")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Blocks per terrain cell.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Cell feature point jitter, 0 to 1.
    #[arg(long)]
    pub jitter: Option<f64>,

    /// Blend width, above 0 and at most 1.
    #[arg(long)]
    pub blend_width: Option<f64>,

    /// Chunk radius to generate around the origin.
    #[arg(long)]
    pub radius: Option<u32>,

    /// Worker threads (0 = automatic).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Write preview images to this directory.
    #[arg(long)]
    pub preview: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(scale) = args.scale {
            self.terrain.scale = scale;
        }
        if let Some(jitter) = args.jitter {
            self.terrain.jitter = jitter;
        }
        if let Some(width) = args.blend_width {
            self.terrain.blend_width = width;
        }
        if let Some(radius) = args.radius {
            self.generation.chunk_radius = radius;
        }
        if let Some(threads) = args.threads {
            self.generation.worker_threads = threads;
        }
        if let Some(ref dir) = args.preview {
            self.generation.preview_dir = Some(dir.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(77),
            blend_width: Some(0.1),
            preview: Some(PathBuf::from("out")),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.seed, 77);
        assert_eq!(config.terrain.blend_width, 0.1);
        assert_eq!(config.generation.preview_dir, Some(PathBuf::from("out")));
        // Non-overridden fields retain defaults
        assert_eq!(config.terrain.scale, 800.0);
        assert_eq!(config.generation.chunk_radius, 4);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "strata",
            "--seed",
            "5",
            "--blend-width",
            "0.25",
            "--radius",
            "2",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.seed, Some(5));
        assert_eq!(args.blend_width, Some(0.25));
        assert_eq!(args.radius, Some(2));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }
}
