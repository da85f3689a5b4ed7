//! Tile Slicing
//!
//! Cuts every mip level into `tile_width` square tiles whose borders overlap
//! their neighbours' payloads. Tile coordinates have a lower-left origin like
//! UVs, while surface rows run top to bottom, so the tile Y axis is flipped
//! here and nowhere else.
//!
//! Border texels that would sample outside the level surface keep the clear
//! value. Unlike subtexture borders, atlas edges do not wrap around.

use vtile_core::PipelineConfig;

use crate::mipmap::MipLevel;
use crate::surface::{self, Surface};

/// Where a tile reads from its level surface, and how far it sticks out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    /// Top-left texel of the whole tile in the level surface, may be negative
    pub source_x: i64,
    /// Top-left texel of the whole tile in the level surface, may be negative
    pub source_y: i64,
    /// Texels past the left edge of the surface
    pub past_left: u32,
    /// Texels past the top edge of the surface
    pub past_upper: u32,
    /// Texels past the right edge of the surface
    pub past_right: u32,
    /// Texels past the bottom edge of the surface
    pub past_lower: u32,
    /// Width of the part that lies inside the surface
    pub copy_width: u32,
    /// Height of the part that lies inside the surface
    pub copy_height: u32,
}

impl TileRegion {
    /// Compute the region of tile (`tile_x`, `tile_y`) on a level `tiles_wide` tiles across.
    ///
    /// Returns `None` for tile coordinates outside the level's tile grid.
    pub fn compute(
        config: &PipelineConfig,
        tiles_wide: u32,
        level_width: u32,
        level_height: u32,
        tile_x: u32,
        tile_y: u32,
    ) -> Option<Self> {
        if tile_x >= tiles_wide || tile_y >= tiles_wide {
            return None;
        }
        let tile_width = i64::from(config.tile_width);
        let border = i64::from(config.tile_border_width);
        let payload = i64::from(config.tile_payload_width());

        let source_x = i64::from(tile_x) * payload - border;
        let source_y = i64::from(tiles_wide - 1 - tile_y) * payload - border;

        let past = |overflow: i64| overflow.clamp(0, tile_width) as u32;
        let past_left = past(-source_x);
        let past_upper = past(-source_y);
        let past_right = past(source_x + tile_width - i64::from(level_width));
        let past_lower = past(source_y + tile_width - i64::from(level_height));

        Some(Self {
            source_x,
            source_y,
            past_left,
            past_upper,
            past_right,
            past_lower,
            copy_width: config.tile_width.saturating_sub(past_left + past_right),
            copy_height: config.tile_width.saturating_sub(past_upper + past_lower),
        })
    }
}

/// One bordered tile
#[derive(Debug, Clone)]
pub struct Tile {
    /// Tile mipID of the level the tile was cut from
    pub mip_id: u32,
    /// Column, counted from the left
    pub x: u32,
    /// Row, counted from the bottom
    pub y: u32,
    /// Tile texels
    pub surface: Surface,
}

impl Tile {
    /// File name of this tile inside the tiles folder
    pub fn file_name(&self, extension: &str) -> String {
        format!("tile_mipid_{}_x_{}_y_{}.{}", self.mip_id, self.x, self.y, extension)
    }
}

/// Cuts mip levels into bordered tiles
#[derive(Debug, Clone, Copy)]
pub struct TileSlicer<'a> {
    config: &'a PipelineConfig,
}

impl<'a> TileSlicer<'a> {
    /// Create a slicer for the configured tile geometry
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Number of tiles a level yields
    pub fn tile_count(&self, level: &MipLevel) -> usize {
        let tiles_wide = level.tiles_wide() as usize;
        tiles_wide * tiles_wide
    }

    /// Cut out a single tile, `None` if the coordinates lie outside the level
    pub fn slice_tile(&self, level: &MipLevel, tile_x: u32, tile_y: u32) -> Option<Tile> {
        let region = TileRegion::compute(
            self.config,
            level.tiles_wide(),
            level.width(),
            level.height(),
            tile_x,
            tile_y,
        )?;

        let mut tile_surface = surface::blank(self.config.tile_width, self.config.tile_width);
        surface::clear(&mut tile_surface);

        if region.copy_width > 0 && region.copy_height > 0 {
            surface::blit(
                &mut tile_surface,
                region.past_left,
                region.past_upper,
                level.surface(),
                (region.source_x + i64::from(region.past_left)) as u32,
                (region.source_y + i64::from(region.past_upper)) as u32,
                region.copy_width,
                region.copy_height,
            );
        }

        Some(Tile {
            mip_id: level.tile_mip_id(),
            x: tile_x,
            y: tile_y,
            surface: tile_surface,
        })
    }

    /// Lazily cut every tile of a level, row by row from the bottom
    pub fn slice_level<'b>(&'b self, level: &'b MipLevel) -> impl Iterator<Item = Tile> + 'b {
        let tiles_wide = level.tiles_wide();
        (0..tiles_wide).flat_map(move |tile_y| {
            (0..tiles_wide).filter_map(move |tile_x| self.slice_tile(level, tile_x, tile_y))
        })
    }
}
