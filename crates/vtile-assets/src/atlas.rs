//! Atlas Packing
//!
//! Places bordered subtextures into one square atlas surface. Where each
//! subtexture goes is decided by a [`BinPacker`]; the packer only ever sees
//! rectangle sizes and reports top-left coordinates back.

use vtile_core::PipelineConfig;
use vtile_core::math::UVec2;

use crate::subtexture::Subtexture;
use crate::surface::{self, Surface};
use crate::{AssetError, AssetResult};

/// Rectangle bin packing into a single fixed-size bin
pub trait BinPacker {
    /// Size of the bin
    fn bin_size(&self) -> UVec2;

    /// Reserve a `width` by `height` rectangle that overlaps no earlier one.
    ///
    /// Returns its top-left corner, or `None` if it doesn't fit.
    fn insert(&mut self, width: u32, height: u32) -> Option<UVec2>;
}

#[derive(Debug, Clone, Copy)]
struct PackNode {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    children: Option<(usize, usize)>,
}

impl PackNode {
    fn free(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            children: None,
        }
    }
}

/// Binary tree guillotine packer.
///
/// Every placement takes the top-left corner of a free node and splits the
/// rest of it into two free children, cutting along the shorter leftover axis.
#[derive(Debug, Clone)]
pub struct BinaryTreePacker {
    nodes: Vec<PackNode>,
    size: UVec2,
}

impl BinaryTreePacker {
    /// Create an empty bin
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            nodes: vec![PackNode::free(0, 0, width, height)],
            size: UVec2::new(width, height),
        }
    }

    // Depth-first, left child first. The tree deepens with every placement,
    // so the walk keeps its own stack instead of recursing.
    fn find_free(&self, width: u32, height: u32) -> Option<usize> {
        let mut pending = vec![0];
        while let Some(index) = pending.pop() {
            let node = &self.nodes[index];
            match node.children {
                Some((left, right)) => {
                    pending.push(right);
                    pending.push(left);
                }
                None if width <= node.width && height <= node.height => return Some(index),
                None => {}
            }
        }
        None
    }

    fn split(&mut self, index: usize, width: u32, height: u32) {
        let node = self.nodes[index];

        let rest_width = node.width - width;
        let rest_height = node.height - height;
        let (left, right) = if rest_width <= rest_height {
            (
                PackNode::free(node.x + width, node.y, rest_width, height),
                PackNode::free(node.x, node.y + height, node.width, rest_height),
            )
        } else {
            (
                PackNode::free(node.x, node.y + height, width, rest_height),
                PackNode::free(node.x + width, node.y, rest_width, node.height),
            )
        };

        let left_index = self.nodes.len();
        self.nodes.push(left);
        self.nodes.push(right);

        let used = &mut self.nodes[index];
        used.width = width;
        used.height = height;
        used.children = Some((left_index, left_index + 1));
    }
}

impl BinPacker for BinaryTreePacker {
    fn bin_size(&self) -> UVec2 {
        self.size
    }

    fn insert(&mut self, width: u32, height: u32) -> Option<UVec2> {
        if width == 0 || height == 0 {
            return None;
        }
        let index = self.find_free(width, height)?;
        self.split(index, width, height);
        let node = &self.nodes[index];
        Some(UVec2::new(node.x, node.y))
    }
}

/// The full-resolution atlas, read-only once packing is done
#[derive(Debug, Clone)]
pub struct AtlasSurface {
    surface: Surface,
}

impl AtlasSurface {
    /// Wrap a finished atlas surface
    pub fn new(surface: Surface) -> Self {
        Self { surface }
    }

    /// Atlas width in texels
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    /// Atlas height in texels
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Get the atlas texels
    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}

/// Composites subtextures onto a shared atlas surface in insertion order
pub struct AtlasPacker<P: BinPacker = BinaryTreePacker> {
    packer: P,
    atlas: Surface,
}

impl AtlasPacker<BinaryTreePacker> {
    /// Create a packer for a square atlas of the configured width
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_packer(BinaryTreePacker::new(config.atlas_width, config.atlas_width))
    }
}

impl<P: BinPacker> AtlasPacker<P> {
    /// Create a packer around any bin packing algorithm
    pub fn with_packer(packer: P) -> Self {
        let size = packer.bin_size();
        Self {
            packer,
            atlas: surface::blank(size.x, size.y),
        }
    }

    /// Place one subtexture and copy its surface into the atlas
    pub fn add(&mut self, subtexture: &mut Subtexture) -> AssetResult<UVec2> {
        if subtexture.placement().is_some() {
            return Err(AssetError::AlreadyPlaced(
                subtexture.original_file_name().to_string(),
            ));
        }

        let Some(at) = self.packer.insert(subtexture.width(), subtexture.height()) else {
            return Err(AssetError::PlacementFailed {
                name: subtexture.original_file_name().to_string(),
                width: subtexture.width(),
                height: subtexture.height(),
                atlas_width: self.packer.bin_size().x,
            });
        };

        surface::overlay(&mut self.atlas, subtexture.surface(), at.x, at.y);
        subtexture.assign_placement(at)?;
        Ok(at)
    }

    /// Place every subtexture in order. The first failure aborts packing.
    pub fn pack_all(mut self, subtextures: &mut [Subtexture]) -> AssetResult<AtlasSurface> {
        let coordinate_width = self.packer.bin_size().x.to_string().len();
        let name_width = subtextures
            .iter()
            .map(|s| s.original_file_name().len())
            .max()
            .unwrap_or(0);

        for subtexture in subtextures.iter_mut() {
            let at = self.add(subtexture)?;
            log::info!(
                " - Assigned subtexture {:>name_width$} to coordinates {:>coordinate_width$}, {:>coordinate_width$}.",
                subtexture.original_file_name(),
                at.x,
                at.y,
            );
        }
        Ok(self.finish())
    }

    /// Stop packing and hand over the atlas
    pub fn finish(self) -> AtlasSurface {
        AtlasSurface::new(self.atlas)
    }
}
