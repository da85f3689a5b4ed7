//! Subtextures
//!
//! Input images and the registry that loads them in input order.

use std::path::{Path, PathBuf};

use ahash::AHashSet;
use vtile_core::math::UVec2;

use crate::surface::{self, Surface};
use crate::{AssetError, AssetResult};

/// One input image on its way into the atlas
#[derive(Debug, Clone)]
pub struct Subtexture {
    index: usize,
    original_file_name: String,
    surface: Surface,
    width: u32,
    height: u32,
    border_width: u32,
    placement: Option<UVec2>,
}

impl Subtexture {
    /// Create a subtexture from an in-memory surface
    pub fn new(index: usize, original_file_name: impl Into<String>, surface: Surface) -> Self {
        let (width, height) = surface.dimensions();
        Self {
            index,
            original_file_name: original_file_name.into(),
            surface,
            width,
            height,
            border_width: 0,
            placement: None,
        }
    }

    /// Load a subtexture from an image file
    pub fn load(index: usize, path: &Path) -> AssetResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(index, name, surface::load(path)?))
    }

    /// Position in input order
    pub fn index(&self) -> usize {
        self.index
    }

    /// File name the subtexture was loaded from
    pub fn original_file_name(&self) -> &str {
        &self.original_file_name
    }

    /// Current surface, bordered once the border has been added
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Width in texels, border included
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels, border included
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Wrapping border width, 0 until bordered
    pub fn border_width(&self) -> u32 {
        self.border_width
    }

    /// Top-left texel of the whole subtexture within the atlas
    pub fn placement(&self) -> Option<UVec2> {
        self.placement
    }

    /// Top-left texel of the payload within the atlas
    pub fn payload_placement(&self) -> Option<UVec2> {
        self.placement.map(|p| p + UVec2::splat(self.border_width))
    }

    /// Payload width, border excluded
    pub fn payload_width(&self) -> u32 {
        self.width - 2 * self.border_width
    }

    /// Payload height, border excluded
    pub fn payload_height(&self) -> u32 {
        self.height - 2 * self.border_width
    }

    pub(crate) fn replace_surface(&mut self, surface: Surface, added_border: u32) {
        let (width, height) = surface.dimensions();
        self.surface = surface;
        self.width = width;
        self.height = height;
        self.border_width += added_border;
    }

    pub(crate) fn assign_placement(&mut self, at: UVec2) -> AssetResult<()> {
        if self.placement.is_some() {
            return Err(AssetError::AlreadyPlaced(self.original_file_name.clone()));
        }
        self.placement = Some(at);
        Ok(())
    }
}

/// Subtextures in input order
#[derive(Debug, Default)]
pub struct SubtextureRegistry {
    subtextures: Vec<Subtexture>,
    names: AHashSet<String>,
}

impl SubtextureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every path in order
    pub fn load(paths: &[PathBuf]) -> AssetResult<Self> {
        log::info!("Loading subtextures...");

        let name_width = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().len())
            .max()
            .unwrap_or(0);

        let mut registry = Self::new();
        for path in paths {
            let subtexture = Subtexture::load(registry.len(), path)?;
            log::info!(
                " - Loaded subtexture {:>name_width$}, {:>4} * {:>4} texels.",
                subtexture.original_file_name(),
                subtexture.width(),
                subtexture.height(),
            );
            registry.push(subtexture);
        }
        Ok(registry)
    }

    /// Register an in-memory surface and return its index
    pub fn add(&mut self, original_file_name: impl Into<String>, surface: Surface) -> usize {
        let index = self.len();
        self.push(Subtexture::new(index, original_file_name, surface));
        index
    }

    fn push(&mut self, subtexture: Subtexture) {
        if !self.names.insert(subtexture.original_file_name.clone()) {
            log::warn!(
                "Duplicate subtexture file name {}; its bordered image will overwrite an earlier one",
                subtexture.original_file_name
            );
        }
        self.subtextures.push(subtexture);
    }

    /// Number of registered subtextures
    pub fn len(&self) -> usize {
        self.subtextures.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.subtextures.is_empty()
    }

    /// Get a subtexture by index
    pub fn get(&self, index: usize) -> Option<&Subtexture> {
        self.subtextures.get(index)
    }

    /// Iterate in input order
    pub fn iter(&self) -> std::slice::Iter<'_, Subtexture> {
        self.subtextures.iter()
    }

    /// All subtextures in input order
    pub fn as_slice(&self) -> &[Subtexture] {
        &self.subtextures
    }

    /// Mutable access for the border and packing phases
    pub fn as_mut_slice(&mut self) -> &mut [Subtexture] {
        &mut self.subtextures
    }
}

impl<'a> IntoIterator for &'a SubtextureRegistry {
    type Item = &'a Subtexture;
    type IntoIter = std::slice::Iter<'a, Subtexture>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
