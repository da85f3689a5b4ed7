//! Atlas Mip Chain
//!
//! Mip levels stop at the size of one tile rather than one texel, so the
//! chain has as many levels as the page table will. Levels are indexed by
//! tile mipID: 0 is the coarsest level (one tile across) and every next ID
//! doubles the tiles across.
//!
//! Each level is shrunk a little further than its nominal power-of-two width
//! to leave room for tile borders: a level `n` tiles across holds
//! `n * (tile_width - 2 * tile_border_width)` texels per side. The tile grid
//! stays a power of two, the atlas texels do not.

use vtile_core::{ConfigError, PipelineConfig, is_power_of_two, mip_level_to_mip_id};

use crate::AssetResult;
use crate::atlas::AtlasSurface;
use crate::surface::{self, Surface};

/// One level of the atlas mip chain
#[derive(Debug, Clone)]
pub struct MipLevel {
    tile_mip_id: u32,
    tiles_wide: u32,
    nominal_width: u32,
    surface: Surface,
}

impl MipLevel {
    /// Tile mipID of this level
    pub fn tile_mip_id(&self) -> u32 {
        self.tile_mip_id
    }

    /// Tiles across (and down) this level, `2^tile_mip_id`
    pub fn tiles_wide(&self) -> u32 {
        self.tiles_wide
    }

    /// Power-of-two width before tile border compensation
    pub fn nominal_width(&self) -> u32 {
        self.nominal_width
    }

    /// Width of the level surface in texels
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    /// Height of the level surface in texels
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Get the level texels
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// File name of this level inside the mipmapped atlas folder
    pub fn file_name(&self, extension: &str) -> String {
        format!("atlas_{}.{}", self.tile_mip_id, extension)
    }
}

/// All mip levels of an atlas, coarsest first
#[derive(Debug, Clone, Default)]
pub struct MipChain {
    levels: Vec<MipLevel>,
}

impl MipChain {
    /// Build the chain from the full-resolution atlas.
    ///
    /// Every level is resampled from the full-resolution atlas, never from
    /// the previous level.
    pub fn build(atlas: &AtlasSurface, config: &PipelineConfig) -> AssetResult<Self> {
        config.validate()?;
        let atlas_width = atlas.width();
        if !is_power_of_two(atlas_width) {
            return Err(ConfigError::NotPowerOfTwo {
                name: "atlas surface width",
                value: atlas_width,
            }
            .into());
        }
        if atlas_width < config.tile_width {
            return Err(ConfigError::TileWiderThanAtlas {
                tile_width: config.tile_width,
                atlas_width,
            }
            .into());
        }

        let mut levels = Vec::new();
        let mut current_width = atlas_width;
        while current_width >= config.tile_width {
            let tiles_wide = current_width / config.tile_width;
            let scaled_width = current_width - tiles_wide * 2 * config.tile_border_width;

            log::debug!(
                "Resampling {} texel mip level to {} texels ({} tiles across)",
                current_width,
                scaled_width,
                tiles_wide
            );
            levels.push(MipLevel {
                tile_mip_id: 0,
                tiles_wide,
                nominal_width: current_width,
                surface: surface::resize_bilinear(atlas.surface(), scaled_width, scaled_width),
            });

            current_width /= 2;
        }

        levels.reverse();
        for (tile_mip_id, level) in levels.iter_mut().enumerate() {
            level.tile_mip_id = tile_mip_id as u32;
        }

        Ok(Self { levels })
    }

    /// Levels ordered by tile mipID
    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    /// Get a level by tile mipID
    pub fn level(&self, tile_mip_id: u32) -> Option<&MipLevel> {
        self.levels.get(tile_mip_id as usize)
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check whether the chain has no levels
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Tile mipID of the finest level
    pub fn max_tile_mip_id(&self) -> u32 {
        self.levels.len().saturating_sub(1) as u32
    }

    /// Convert a conventional mip level (0 = full resolution) to a tile mipID
    pub fn tile_mip_id_for_mip_level(&self, mip_level: u32) -> Option<u32> {
        let finest = self.levels.last()?;
        (mip_level <= self.max_tile_mip_id())
            .then(|| mip_level_to_mip_id(mip_level, finest.tiles_wide))
    }

    /// Iterate coarsest first
    pub fn iter(&self) -> std::slice::Iter<'_, MipLevel> {
        self.levels.iter()
    }
}

impl<'a> IntoIterator for &'a MipChain {
    type Item = &'a MipLevel;
    type IntoIter = std::slice::Iter<'a, MipLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssetError;
    use image::{Rgb, RgbImage};

    fn config(atlas_width: u32, tile_width: u32, tile_border_width: u32) -> PipelineConfig {
        PipelineConfig {
            atlas_width,
            tile_width,
            tile_border_width,
            ..Default::default()
        }
    }

    fn atlas(width: u32) -> AtlasSurface {
        AtlasSurface::new(RgbImage::from_fn(width, width, |x, y| {
            Rgb([x as u8, y as u8, 0])
        }))
    }

    #[test]
    fn test_chain_length() {
        let chain = MipChain::build(&atlas(512), &config(512, 128, 4)).unwrap();
        // log2(512) - log2(128) + 1
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.max_tile_mip_id(), 2);

        let chain = MipChain::build(&atlas(256), &config(256, 16, 1)).unwrap();
        assert_eq!(chain.len(), 5);
    }

    #[test]
    fn test_level_widths() {
        let chain = MipChain::build(&atlas(512), &config(512, 128, 4)).unwrap();

        let widths: Vec<u32> = chain.iter().map(|l| l.width()).collect();
        assert_eq!(widths, vec![120, 240, 480]);

        for pair in chain.levels().windows(2) {
            assert_eq!(pair[1].nominal_width(), pair[0].nominal_width() * 2);
            assert_eq!(pair[1].tiles_wide(), pair[0].tiles_wide() * 2);
        }

        for level in &chain {
            assert_eq!(level.tiles_wide(), 1 << level.tile_mip_id());
            assert_eq!(level.width(), level.height());
            assert_eq!(level.width(), level.tiles_wide() * 120);
        }

        let finest = chain.level(2).unwrap();
        assert_eq!(finest.nominal_width(), 512);
        assert_eq!(finest.width(), 512 - 4 * 2 * 4);
    }

    #[test]
    fn test_levels_resampled_from_full_atlas() {
        // High-frequency content so resampling a resampled level gives different texels.
        let atlas = AtlasSurface::new(RgbImage::from_fn(256, 256, |x, y| {
            Rgb([((x ^ y) * 37) as u8, ((x + 3 * y) * 11) as u8, ((x * y) % 251) as u8])
        }));
        let chain = MipChain::build(&atlas, &config(256, 32, 2)).unwrap();
        assert_eq!(chain.len(), 4);

        for level in &chain {
            let expected = surface::resize_bilinear(atlas.surface(), level.width(), level.width());
            assert_eq!(level.surface(), &expected, "tile mipID {}", level.tile_mip_id());
        }

        let coarsest = chain.level(0).unwrap();
        let next = chain.level(1).unwrap();
        let chained = surface::resize_bilinear(next.surface(), coarsest.width(), coarsest.width());
        assert_ne!(coarsest.surface(), &chained);
    }

    #[test]
    fn test_single_tile_atlas() {
        let chain = MipChain::build(&atlas(64), &config(64, 64, 2)).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.level(0).unwrap().width(), 60);
    }

    #[test]
    fn test_tile_mip_id_for_mip_level() {
        let chain = MipChain::build(&atlas(512), &config(512, 128, 4)).unwrap();
        assert_eq!(chain.tile_mip_id_for_mip_level(0), Some(2));
        assert_eq!(chain.tile_mip_id_for_mip_level(2), Some(0));
        assert_eq!(chain.tile_mip_id_for_mip_level(3), None);
    }

    #[test]
    fn test_file_name() {
        let chain = MipChain::build(&atlas(256), &config(256, 128, 4)).unwrap();
        assert_eq!(chain.level(1).unwrap().file_name("png"), "atlas_1.png");
    }

    #[test]
    fn test_rejects_non_power_of_two_atlas() {
        let result = MipChain::build(&atlas(384), &config(512, 128, 4));
        assert!(matches!(
            result,
            Err(AssetError::Config(ConfigError::NotPowerOfTwo { value: 384, .. }))
        ));

        let result = MipChain::build(&atlas(512), &config(512, 96, 4));
        assert!(matches!(result, Err(AssetError::Config(_))));
    }
}
