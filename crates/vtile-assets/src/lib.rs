//! # vtile Assets
//!
//! Offline asset pipeline for software virtual texturing.
//!
//! ## Stages
//! - Subtexture loading ([`SubtextureRegistry`])
//! - Toroidal wrapping borders ([`BorderWrapper`])
//! - Atlas packing ([`AtlasPacker`])
//! - Mip chain generation in tile mipIDs ([`MipChain`])
//! - Bordered tile slicing ([`TileSlicer`])
//! - Placement and tile metadata ([`AtlasDocument`], [`TileInfoDocument`])
//!
//! [`TileCreator`] runs all stages in order and writes the output layout.

pub mod atlas;
pub mod border;
pub mod metadata;
pub mod mipmap;
pub mod pipeline;
pub mod subtexture;
pub mod surface;
pub mod tiles;

pub use atlas::{AtlasPacker, AtlasSurface, BinPacker, BinaryTreePacker};
pub use border::BorderWrapper;
pub use metadata::{AtlasDocument, SpriteRecord, TileInfoDocument};
pub use mipmap::{MipChain, MipLevel};
pub use pipeline::{RunReport, TileCreator};
pub use subtexture::{Subtexture, SubtextureRegistry};
pub use surface::Surface;
pub use tiles::{Tile, TileRegion, TileSlicer};

use std::path::PathBuf;

use thiserror::Error;
use vtile_core::ConfigError;
use vtile_platform::PlatformError;

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Couldn't load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Couldn't save image {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Border of {border} texels doesn't fit subtexture {name} ({width} * {height} texels)")]
    BorderTooWide {
        name: String,
        width: u32,
        height: u32,
        border: u32,
    },

    #[error("Subtexture {0} already has a wrapping border")]
    AlreadyBordered(String),

    #[error("Subtexture {0} is already placed in the atlas")]
    AlreadyPlaced(String),

    #[error("Subtexture {0} has no atlas placement")]
    NotPlaced(String),

    #[error("Couldn't place subtexture {name} ({width} * {height} texels) in a {atlas_width} texel atlas")]
    PlacementFailed {
        name: String,
        width: u32,
        height: u32,
        atlas_width: u32,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
