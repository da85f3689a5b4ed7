//! Wrapping Borders
//!
//! Shrinks a subtexture's image into its payload region and fills the border
//! around it as if the payload were a torus, so the bordered subtexture tiles
//! seamlessly against copies of itself. Overall dimensions are unchanged.

use rayon::prelude::*;
use vtile_core::positive_modulo;

use crate::subtexture::Subtexture;
use crate::surface::{self, Surface};
use crate::{AssetError, AssetResult};

/// Adds an inset toroidal border of fixed width to subtextures
#[derive(Debug, Clone, Copy)]
pub struct BorderWrapper {
    border_width: u32,
}

impl BorderWrapper {
    /// Create a wrapper for the given border width in texels
    pub fn new(border_width: u32) -> Self {
        Self { border_width }
    }

    /// Border width in texels
    pub fn border_width(&self) -> u32 {
        self.border_width
    }

    /// Check that the border leaves a non-empty payload
    pub fn check(&self, subtexture: &Subtexture) -> AssetResult<()> {
        if subtexture.border_width() != 0 {
            return Err(AssetError::AlreadyBordered(
                subtexture.original_file_name().to_string(),
            ));
        }
        let twice = self.border_width.saturating_mul(2);
        if twice >= subtexture.width() || twice >= subtexture.height() {
            return Err(AssetError::BorderTooWide {
                name: subtexture.original_file_name().to_string(),
                width: subtexture.width(),
                height: subtexture.height(),
                border: self.border_width,
            });
        }
        Ok(())
    }

    /// Replace the subtexture's surface with its bordered version
    pub fn apply(&self, subtexture: &mut Subtexture) -> AssetResult<()> {
        self.check(subtexture)?;
        let bordered = wrap_border(subtexture.surface(), self.border_width);
        subtexture.replace_surface(bordered, self.border_width);
        Ok(())
    }

    /// Border every subtexture. Each one owns its surface, so they run in parallel.
    pub fn apply_all(&self, subtextures: &mut [Subtexture]) -> AssetResult<()> {
        // Validate everything first so a bad input leaves no subtexture half processed.
        for subtexture in subtextures.iter() {
            self.check(subtexture)?;
        }
        subtextures
            .par_iter_mut()
            .try_for_each(|subtexture| self.apply(subtexture))
    }
}

// The centered payload is a bilinear downscale of `source`. Each border
// texel copies the payload texel found by wrapping its payload-relative
// coordinate modulo the payload size. Callers go through `BorderWrapper::check`.
fn wrap_border(source: &Surface, border: u32) -> Surface {
    let (width, height) = source.dimensions();
    debug_assert!(border.saturating_mul(2) < width.min(height));
    let payload_width = width - 2 * border;
    let payload_height = height - 2 * border;

    let payload = surface::resize_bilinear(source, payload_width, payload_height);
    let mut bordered = surface::blank(width, height);
    surface::overlay(&mut bordered, &payload, border, border);

    let (pw, ph) = (i64::from(payload_width), i64::from(payload_height));
    for y in 0..height {
        for x in 0..width {
            let px = i64::from(x) - i64::from(border);
            let py = i64::from(y) - i64::from(border);
            if (0..pw).contains(&px) && (0..ph).contains(&py) {
                continue;
            }

            let wrapped_x = positive_modulo(px, pw) as u32 + border;
            let wrapped_y = positive_modulo(py, ph) as u32 + border;
            let texel = *bordered.get_pixel(wrapped_x, wrapped_y);
            bordered.put_pixel(x, y, texel);
        }
    }

    bordered
}
