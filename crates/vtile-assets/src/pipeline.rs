//! Tile Creator Pipeline
//!
//! Runs the stages strictly one after another. Loading, bordering and packing
//! happen in memory before the first file is written, so bad configuration,
//! unreadable inputs and atlas overflow never leave partial output behind.
//! Failures after that point leave already written files in place.

use std::path::PathBuf;

use image::ImageFormat;
use vtile_core::PipelineConfig;
use vtile_platform::{OutputFolder, OutputLayout};

use crate::AssetResult;
use crate::atlas::{AtlasPacker, AtlasSurface};
use crate::border::BorderWrapper;
use crate::metadata::{AtlasDocument, TileInfoDocument};
use crate::mipmap::MipChain;
use crate::subtexture::SubtextureRegistry;
use crate::surface;
use crate::tiles::TileSlicer;

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Output root of the run
    pub output_root: PathBuf,
    /// Subtextures packed into the atlas
    pub subtexture_count: usize,
    /// Levels in the mip chain
    pub mip_level_count: usize,
    /// Tiles written over all levels
    pub tile_count: usize,
}

/// Turns subtextures into an atlas, its mip chain, tiles and metadata
pub struct TileCreator {
    config: PipelineConfig,
    layout: OutputLayout,
    atlas_format: ImageFormat,
    tile_format: ImageFormat,
}

impl TileCreator {
    /// Validate the configuration and set up a run writing into `layout`
    pub fn new(config: PipelineConfig, layout: OutputLayout) -> AssetResult<Self> {
        config.validate()?;
        let atlas_format = surface::format_for_extension(&config.atlas_format)?;
        let tile_format = surface::format_for_extension(&config.tile_format)?;
        Ok(Self {
            config,
            layout,
            atlas_format,
            tile_format,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the given image files and run the whole pipeline
    pub fn run(&self, inputs: &[PathBuf]) -> AssetResult<RunReport> {
        let registry = SubtextureRegistry::load(inputs)?;
        self.process(registry)
    }

    /// Run the pipeline on already loaded subtextures
    pub fn process(&self, mut registry: SubtextureRegistry) -> AssetResult<RunReport> {
        log::info!(
            "Adding {} texel wrapping borders to {} subtextures...",
            self.config.subtexture_border_width,
            registry.len()
        );
        BorderWrapper::new(self.config.subtexture_border_width).apply_all(registry.as_mut_slice())?;

        log::info!("Packing {0} * {0} texel atlas...", self.config.atlas_width);
        let atlas = AtlasPacker::new(&self.config).pack_all(registry.as_mut_slice())?;

        self.layout.create_root()?;
        self.write_bordered_subtextures(&registry)?;
        self.write_atlas(&atlas)?;
        self.write_atlas_document(&registry, &atlas)?;

        let chain = self.build_mip_chain(&atlas)?;
        let tile_count = self.write_tiles(&chain)?;
        self.write_tile_document()?;

        log::info!("Done!");
        Ok(RunReport {
            output_root: self.layout.root().to_path_buf(),
            subtexture_count: registry.len(),
            mip_level_count: chain.len(),
            tile_count,
        })
    }

    fn write_bordered_subtextures(&self, registry: &SubtextureRegistry) -> AssetResult<()> {
        let folder = self.layout.create_folder(OutputFolder::WrappingBorders)?;
        log::info!("Saving subtextures with wrapping borders in {}...", folder.display());

        for subtexture in registry {
            let path = folder.join(subtexture.original_file_name());
            log::info!(" - Saving subtexture {}.", subtexture.original_file_name());
            surface::save_by_extension(subtexture.surface(), &path)?;
        }
        Ok(())
    }

    fn write_atlas(&self, atlas: &AtlasSurface) -> AssetResult<()> {
        let folder = self.layout.create_folder(OutputFolder::Atlas)?;
        let path = folder.join(format!("atlas.{}", self.config.atlas_format));
        log::info!("Saving atlas {}.", path.display());
        surface::save(atlas.surface(), &path, self.atlas_format)
    }

    fn write_atlas_document(
        &self,
        registry: &SubtextureRegistry,
        atlas: &AtlasSurface,
    ) -> AssetResult<()> {
        let folder = self.layout.create_folder(OutputFolder::AtlasXml)?;
        let path = folder.join("atlas.xml");
        let document = AtlasDocument::new(
            registry.as_slice(),
            atlas.width(),
            atlas.height(),
            &self.config.atlas_format,
        )?;
        log::info!("Saving xml document {}.", path.display());
        document.write(&path)
    }

    fn build_mip_chain(&self, atlas: &AtlasSurface) -> AssetResult<MipChain> {
        let folder = self.layout.create_folder(OutputFolder::MipmappedAtlas)?;
        log::info!("Creating atlas mipmaps in {}...", folder.display());

        let chain = MipChain::build(atlas, &self.config)?;
        for level in &chain {
            let file_name = level.file_name(&self.config.atlas_format);
            log::info!(
                " - Saving atlas tile mipID {} to {}.",
                level.tile_mip_id(),
                file_name
            );
            surface::save(level.surface(), &folder.join(file_name), self.atlas_format)?;
        }
        Ok(chain)
    }

    fn write_tiles(&self, chain: &MipChain) -> AssetResult<usize> {
        let folder = self.layout.create_folder(OutputFolder::Tiles)?;
        log::info!("Creating tiles in {}.", folder.display());

        let slicer = TileSlicer::new(&self.config);
        let mut written = 0;
        for level in chain {
            log::info!(
                " - Processing mipmap level with tile mipID {} ({} tiles)",
                level.tile_mip_id(),
                slicer.tile_count(level)
            );
            for tile in slicer.slice_level(level) {
                let path = folder.join(tile.file_name(&self.config.tile_format));
                log::debug!("   Saving {}", path.display());
                surface::save(&tile.surface, &path, self.tile_format)?;
                written += 1;
            }
        }
        Ok(written)
    }

    fn write_tile_document(&self) -> AssetResult<()> {
        let folder = self.layout.create_folder(OutputFolder::TilesXml)?;
        let path = folder.join("tile_info.xml");
        log::info!("Saving xml document {}.", path.display());
        TileInfoDocument::from_config(&self.config).write(&path)
    }
}
