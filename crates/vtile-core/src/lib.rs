//! # vtile Core
//!
//! Core types shared by every stage of the virtual texture tile creator.
//!
//! This crate provides:
//! - **Configuration**: the immutable [`PipelineConfig`] handed to each stage
//! - **Validation**: explicit [`ConfigError`]s for the power-of-two and border invariants
//! - **Math**: mipID bookkeeping and wrap-around helpers for texel coordinates

pub mod math;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use math::{
    is_power_of_two, mip_id_for_dimensions, mip_level_to_mip_id, number_of_mip_levels_for_dimensions,
    positive_modulo, texel_mip_id_to_tile_mip_id,
};

/// Configuration errors, reported before any work is done
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {name}: {value} is not a power of two")]
    NotPowerOfTwo { name: &'static str, value: u32 },

    #[error("Invalid {name}: must be greater than zero")]
    ZeroWidth { name: &'static str },

    #[error("Tile border width {border} must be less than half the tile width {tile_width}")]
    TileBorderTooWide { border: u32, tile_width: u32 },

    #[error("Tile width {tile_width} exceeds atlas width {atlas_width}")]
    TileWiderThanAtlas { tile_width: u32, atlas_width: u32 },

    #[error("Unsupported image format: {0:?}")]
    UnsupportedFormat(String),

    #[error("Couldn't read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Pipeline configuration, immutable for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Wrapping border added inside each subtexture, in texels
    pub subtexture_border_width: u32,
    /// Atlas width and height in texels
    pub atlas_width: u32,
    /// File extension for the atlas and its mip levels
    pub atlas_format: String,
    /// Tile width and height in texels, border included
    pub tile_width: u32,
    /// Tile border width in texels
    pub tile_border_width: u32,
    /// File extension for tiles
    pub tile_format: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            subtexture_border_width: 8,
            atlas_width: 4096,
            atlas_format: String::from("png"),
            tile_width: 128,
            tile_border_width: 4,
            tile_format: String::from("png"),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let mut config: Self = serde_json::from_str(text)?;
        config.atlas_format = normalize_extension(&config.atlas_format);
        config.tile_format = normalize_extension(&config.tile_format);
        Ok(config)
    }

    /// Check every invariant the pipeline relies on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.atlas_width == 0 {
            return Err(ConfigError::ZeroWidth { name: "atlas width" });
        }
        if self.tile_width == 0 {
            return Err(ConfigError::ZeroWidth { name: "tile width" });
        }
        if !is_power_of_two(self.atlas_width) {
            return Err(ConfigError::NotPowerOfTwo {
                name: "atlas width",
                value: self.atlas_width,
            });
        }
        if !is_power_of_two(self.tile_width) {
            return Err(ConfigError::NotPowerOfTwo {
                name: "tile width",
                value: self.tile_width,
            });
        }
        if self.tile_border_width.saturating_mul(2) >= self.tile_width {
            return Err(ConfigError::TileBorderTooWide {
                border: self.tile_border_width,
                tile_width: self.tile_width,
            });
        }
        if self.tile_width > self.atlas_width {
            return Err(ConfigError::TileWiderThanAtlas {
                tile_width: self.tile_width,
                atlas_width: self.atlas_width,
            });
        }
        if self.atlas_format.is_empty() {
            return Err(ConfigError::UnsupportedFormat(self.atlas_format.clone()));
        }
        if self.tile_format.is_empty() {
            return Err(ConfigError::UnsupportedFormat(self.tile_format.clone()));
        }
        Ok(())
    }

    /// Texels of image content inside one tile, excluding both borders
    pub fn tile_payload_width(&self) -> u32 {
        self.tile_width - 2 * self.tile_border_width
    }

    /// Tiles across the finest mip level
    pub fn atlas_tiles_wide(&self) -> u32 {
        self.atlas_width / self.tile_width
    }

    /// Highest tile mipID, i.e. that of the finest mip level
    pub fn max_tile_mip_id(&self) -> u32 {
        mip_id_for_dimensions(self.atlas_tiles_wide())
    }

    /// Number of mip levels between one tile across and the full atlas
    pub fn mip_level_count(&self) -> u32 {
        number_of_mip_levels_for_dimensions(self.atlas_tiles_wide())
    }
}

/// Normalise a file extension to lowercase without a leading dot
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tile_payload_width(), 120);
        assert_eq!(config.atlas_tiles_wide(), 32);
        assert_eq!(config.max_tile_mip_id(), 5);
        assert_eq!(config.mip_level_count(), 6);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = PipelineConfig {
            atlas_width: 1000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPowerOfTwo { name: "atlas width", value: 1000 })
        ));

        let config = PipelineConfig {
            tile_width: 96,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPowerOfTwo { name: "tile width", .. })
        ));
    }

    #[test]
    fn test_rejects_wide_tile_border() {
        let config = PipelineConfig {
            tile_width: 16,
            tile_border_width: 8,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TileBorderTooWide { border: 8, tile_width: 16 })
        ));

        let config = PipelineConfig {
            tile_width: 16,
            tile_border_width: 7,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_tile_wider_than_atlas() {
        let config = PipelineConfig {
            atlas_width: 64,
            tile_width: 128,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TileWiderThanAtlas { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_width() {
        let config = PipelineConfig {
            atlas_width: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWidth { .. })));
    }

    #[test]
    fn test_json_partial_config() {
        let config = PipelineConfig::from_json_str(
            r#"{ "atlas_width": 512, "tile_format": ".PNG" }"#,
        )
        .unwrap();
        assert_eq!(config.atlas_width, 512);
        assert_eq!(config.tile_format, "png");
        assert_eq!(config.tile_width, 128);
    }

    #[test]
    fn test_json_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vtile.json");
        std::fs::write(&path, r#"{ "tile_width": 256, "tile_border_width": 8 }"#).unwrap();

        let config = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.tile_width, 256);
        assert_eq!(config.tile_border_width, 8);

        let missing = PipelineConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_error_messages() {
        let err = PipelineConfig {
            atlas_width: 1000,
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid atlas width: 1000 is not a power of two");

        let err = ConfigError::TileWiderThanAtlas {
            tile_width: 128,
            atlas_width: 64,
        };
        assert_eq!(err.to_string(), "Tile width 128 exceeds atlas width 64");
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".PNG"), "png");
        assert_eq!(normalize_extension("tga"), "tga");
    }
}
