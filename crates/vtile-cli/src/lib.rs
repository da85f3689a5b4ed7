//! # vtile CLI
//!
//! Command-line interface for the virtual texture tile creator.
//!
//! ```text
//! vtile [OPTIONS] <SUBTEXTURE_FILES>...
//! ```
//!
//! Input arguments may contain `*` wildcards in their file name part. Settings
//! come from the built-in defaults, then an optional JSON config file, then
//! the command-line flags, each layer overriding the one before.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use vtile_assets::{RunReport, TileCreator};
use vtile_core::{PipelineConfig, normalize_extension};
use vtile_platform::{OutputLayout, default_output_dir, expand_input_patterns};

/// Virtual texture tile creator
#[derive(Parser, Debug)]
#[command(name = "vtile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subtexture image files, `*` wildcards allowed in file names
    #[arg(value_name = "SUBTEXTURE_FILES")]
    pub subtexture_files: Vec<String>,

    /// Output directory, a timestamped folder in the working directory by default
    #[arg(short, long, value_name = "DIR")]
    pub output_path: Option<PathBuf>,

    /// Wrapping border added inside each subtexture, in texels
    #[arg(long, value_name = "TEXELS")]
    pub wrap_border_width: Option<u32>,

    /// Atlas width and height in texels, a power of two
    #[arg(long, value_name = "TEXELS")]
    pub atlas_width: Option<u32>,

    /// Image format of the atlas and its mip levels
    #[arg(long, value_name = "EXT")]
    pub atlas_format: Option<String>,

    /// Tile width and height in texels, border included, a power of two
    #[arg(long, value_name = "TEXELS")]
    pub tile_width: Option<u32>,

    /// Tile border width in texels
    #[arg(long, value_name = "TEXELS")]
    pub tile_border_width: Option<u32>,

    /// Image format of the tiles
    #[arg(long, value_name = "EXT")]
    pub tile_format: Option<String>,

    /// JSON file with pipeline settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the pipeline configuration from defaults, config file and flags
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(width) = self.wrap_border_width {
            config.subtexture_border_width = width;
        }
        if let Some(width) = self.atlas_width {
            config.atlas_width = width;
        }
        if let Some(format) = &self.atlas_format {
            config.atlas_format = normalize_extension(format);
        }
        if let Some(width) = self.tile_width {
            config.tile_width = width;
        }
        if let Some(width) = self.tile_border_width {
            config.tile_border_width = width;
        }
        if let Some(format) = &self.tile_format {
            config.tile_format = normalize_extension(format);
        }

        Ok(config)
    }

    /// Output directory of this run
    pub fn output_dir(&self) -> PathBuf {
        self.output_path.clone().unwrap_or_else(default_output_dir)
    }
}

/// Set up logging, info by default and debug with `--verbose`
pub fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_target(false)
        .try_init();
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<RunReport> {
    init_logging(cli.verbose);
    run(&cli)
}

/// Run the tile creator without touching global logger state
pub fn run(cli: &Cli) -> Result<RunReport> {
    let config = cli.pipeline_config()?;
    let layout = OutputLayout::new(cli.output_dir());
    let creator = TileCreator::new(config, layout).context("Invalid configuration")?;

    let inputs = expand_input_patterns(&cli.subtexture_files[..])?;
    log::info!("Found {} subtexture files.", inputs.len());

    let config = creator.config();
    log::debug!("Subtexture border width: {}", config.subtexture_border_width);
    log::debug!("Atlas: {0} * {0} texels, {1}", config.atlas_width, config.atlas_format);
    log::debug!(
        "Tiles: {} texels with {} texel border, {}",
        config.tile_width,
        config.tile_border_width,
        config.tile_format
    );

    let report = creator.run(&inputs)?;
    log::info!(
        "Wrote {} mip levels and {} tiles for {} subtextures to {}",
        report.mip_level_count,
        report.tile_count,
        report.subtexture_count,
        report.output_root.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_cli_parse() {
        let cli = Cli::parse_from(["vtile", "a.png", "textures/*.png"]);
        assert_eq!(cli.subtexture_files, vec!["a.png", "textures/*.png"]);
        assert!(cli.output_path.is_none());
        assert!(!cli.verbose);
        assert_eq!(cli.pipeline_config().unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "vtile",
            "-o",
            "out",
            "--wrap-border-width",
            "4",
            "--atlas-width",
            "2048",
            "--atlas-format",
            ".BMP",
            "--tile-width",
            "64",
            "--tile-border-width",
            "2",
            "--tile-format",
            "tga",
            "-v",
            "a.png",
        ]);
        assert_eq!(cli.output_dir(), PathBuf::from("out"));
        assert!(cli.verbose);

        let config = cli.pipeline_config().unwrap();
        assert_eq!(config.subtexture_border_width, 4);
        assert_eq!(config.atlas_width, 2048);
        assert_eq!(config.atlas_format, "bmp");
        assert_eq!(config.tile_width, 64);
        assert_eq!(config.tile_border_width, 2);
        assert_eq!(config.tile_format, "tga");
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vtile.json");
        std::fs::write(&path, r#"{ "atlas_width": 1024, "tile_width": 64 }"#).unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let cli = Cli::parse_from(["vtile", "-c", &path_arg, "--tile-width", "32", "a.png"]);
        let config = cli.pipeline_config().unwrap();
        assert_eq!(config.atlas_width, 1024);
        assert_eq!(config.tile_width, 32);
        assert_eq!(config.tile_border_width, PipelineConfig::default().tile_border_width);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path_arg = dir.path().join("missing.json").to_string_lossy().to_string();
        let cli = Cli::parse_from(["vtile", "--config", &path_arg, "a.png"]);
        assert!(cli.pipeline_config().is_err());
    }

    #[test]
    fn test_bad_numbers_rejected_by_parser() {
        assert!(Cli::try_parse_from(["vtile", "--atlas-width", "wide", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["vtile", "--tile-width", "-4", "a.png"]).is_err());
    }

    #[test]
    fn test_run_with_wildcard() {
        let inputs = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png"] {
            RgbImage::from_pixel(32, 32, Rgb([90, 160, 40]))
                .save(inputs.path().join(name))
                .unwrap();
        }

        let pattern = inputs.path().join("*.png").to_string_lossy().to_string();
        let root = output.path().join("run");
        let root_arg = root.to_string_lossy().to_string();
        let cli = Cli::parse_from([
            "vtile",
            "-o",
            &root_arg,
            "--wrap-border-width",
            "2",
            "--atlas-width",
            "64",
            "--tile-width",
            "16",
            "--tile-border-width",
            "1",
            &pattern,
        ]);

        let report = run(&cli).unwrap();
        assert_eq!(report.subtexture_count, 2);
        assert_eq!(report.mip_level_count, 3);
        assert_eq!(report.tile_count, 1 + 4 + 16);
        assert_eq!(report.output_root, root);
        assert!(root.join("3b_tiles_xml").join("tile_info.xml").is_file());
    }

    #[test]
    fn test_run_without_matches() {
        let inputs = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let pattern = inputs.path().join("*.png").to_string_lossy().to_string();
        let root = output.path().join("run");
        let root_arg = root.to_string_lossy().to_string();

        let cli = Cli::parse_from(["vtile", "-o", &root_arg, &pattern]);
        assert!(run(&cli).is_err());
        assert!(!root.exists());
    }

    #[test]
    fn test_run_rejects_invalid_config_before_output() {
        let output = tempfile::tempdir().unwrap();
        let root = output.path().join("run");
        let root_arg = root.to_string_lossy().to_string();

        let cli = Cli::parse_from(["vtile", "-o", &root_arg, "--atlas-width", "1000", "a.png"]);
        assert!(run(&cli).is_err());
        assert!(!root.exists());
    }
}
