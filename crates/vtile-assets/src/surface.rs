//! Image Surface
//!
//! Primitive image operations the pipeline stages build on. Every operation
//! takes the surface it acts on explicitly. Surfaces are 8-bit RGB with an
//! upper-left origin.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use vtile_core::ConfigError;

use crate::{AssetError, AssetResult};

/// An owned 8-bit RGB image
pub type Surface = RgbImage;

/// Bytes per texel of every surface
pub const BYTES_PER_TEXEL: usize = 3;

/// Value of a cleared texel
pub const CLEAR_TEXEL: Rgb<u8> = Rgb([0, 0, 0]);

/// Allocate a cleared surface
pub fn blank(width: u32, height: u32) -> Surface {
    RgbImage::from_pixel(width, height, CLEAR_TEXEL)
}

/// Reset every texel to [`CLEAR_TEXEL`]
pub fn clear(surface: &mut Surface) {
    for texel in surface.pixels_mut() {
        *texel = CLEAR_TEXEL;
    }
}

/// Bilinear resample to a new size
pub fn resize_bilinear(source: &Surface, width: u32, height: u32) -> Surface {
    imageops::resize(source, width, height, FilterType::Triangle)
}

/// Overwrite `target` with all of `source`, top-left corner at (`x`, `y`)
pub fn overlay(target: &mut Surface, source: &Surface, x: u32, y: u32) {
    imageops::replace(target, source, i64::from(x), i64::from(y));
}

/// Copy a `width` by `height` rectangle from `source` into `target`.
///
/// Both rectangles must lie inside their surfaces.
#[allow(clippy::too_many_arguments)]
pub fn blit(
    target: &mut Surface,
    target_x: u32,
    target_y: u32,
    source: &Surface,
    source_x: u32,
    source_y: u32,
    width: u32,
    height: u32,
) {
    debug_assert!(source_x + width <= source.width() && source_y + height <= source.height());
    debug_assert!(target_x + width <= target.width() && target_y + height <= target.height());

    let row_bytes = width as usize * BYTES_PER_TEXEL;
    let source_stride = source.width() as usize * BYTES_PER_TEXEL;
    let target_stride = target.width() as usize * BYTES_PER_TEXEL;
    let source_bytes = source.as_raw();
    let target_bytes: &mut [u8] = target;

    for row in 0..height as usize {
        let from = (source_y as usize + row) * source_stride + source_x as usize * BYTES_PER_TEXEL;
        let to = (target_y as usize + row) * target_stride + target_x as usize * BYTES_PER_TEXEL;
        target_bytes[to..to + row_bytes].copy_from_slice(&source_bytes[from..from + row_bytes]);
    }
}

/// Resolve a configured file extension to an encodable image format
pub fn format_for_extension(extension: &str) -> Result<ImageFormat, ConfigError> {
    match extension {
        "png" => Ok(ImageFormat::Png),
        "bmp" => Ok(ImageFormat::Bmp),
        "tga" => Ok(ImageFormat::Tga),
        "tif" | "tiff" => Ok(ImageFormat::Tiff),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Decode an image file into an RGB surface
pub fn load(path: &Path) -> AssetResult<Surface> {
    let image = image::open(path).map_err(|source| AssetError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    if image.color().has_alpha() {
        log::warn!(
            "Image {} has an alpha channel; it is composited over black",
            path.display()
        );
    }
    Ok(flatten(&image))
}

/// Convert to RGB, blending any alpha over [`CLEAR_TEXEL`]
pub fn flatten(image: &DynamicImage) -> Surface {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let [cr, cg, cb] = CLEAR_TEXEL.0;
        let blend = |c: u8, clear: u8| {
            ((u16::from(c) * u16::from(a) + u16::from(clear) * u16::from(255 - a) + 127) / 255) as u8
        };
        Rgb([blend(r, cr), blend(g, cg), blend(b, cb)])
    })
}

/// Encode a surface with an explicit format
pub fn save(surface: &Surface, path: &Path, format: ImageFormat) -> AssetResult<()> {
    surface
        .save_with_format(path, format)
        .map_err(|source| AssetError::ImageSave {
            path: path.to_path_buf(),
            source,
        })
}

/// Encode a surface, choosing the format from the path's extension
pub fn save_by_extension(surface: &Surface, path: &Path) -> AssetResult<()> {
    surface.save(path).map_err(|source| AssetError::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}
