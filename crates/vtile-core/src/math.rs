//! Math utilities
//!
//! Re-exports from glam and integer helpers for texel and mip bookkeeping.
//!
//! Two mip numberings are in play. A conventional mip level counts from full
//! resolution (0) downwards. A mipID counts upwards from the one-texel (or
//! one-tile) level, so `2^mipID` equals the level's width in those units.

pub use glam::UVec2;

/// Check whether `number` is a non-zero power of two
pub fn is_power_of_two(number: u32) -> bool {
    number != 0 && number & (number - 1) == 0
}

/// Modulo whose result is always in `[0, n)`, also for negative `i`
pub fn positive_modulo(i: i64, n: i64) -> i64 {
    i.rem_euclid(n)
}

/// mipID of a level with the given width: `floor(log2(dimensions))`
pub fn mip_id_for_dimensions(dimensions: u32) -> u32 {
    if dimensions == 0 {
        return 0;
    }
    dimensions.ilog2()
}

/// Convert a conventional mip level to a mipID. Works in texels and in tiles.
pub fn mip_level_to_mip_id(mip_level: u32, texture_dimensions: u32) -> u32 {
    mip_id_for_dimensions(texture_dimensions) - mip_level
}

/// Convert a texel mipID to a tile mipID for the given tile width
pub fn texel_mip_id_to_tile_mip_id(texel_mip_id: u32, tile_texels_wide: u32) -> u32 {
    texel_mip_id - mip_id_for_dimensions(tile_texels_wide)
}

/// Number of mip levels from `dimensions` down to 1 inclusive
pub fn number_of_mip_levels_for_dimensions(dimensions: u32) -> u32 {
    mip_id_for_dimensions(dimensions) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(512));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(384));
    }

    #[test]
    fn test_positive_modulo() {
        assert_eq!(positive_modulo(-1, 5), 4);
        assert_eq!(positive_modulo(-5, 5), 0);
        assert_eq!(positive_modulo(-6, 5), 4);
        assert_eq!(positive_modulo(7, 5), 2);
    }

    #[test]
    fn test_mip_ids() {
        assert_eq!(mip_id_for_dimensions(1), 0);
        assert_eq!(mip_id_for_dimensions(4), 2);
        assert_eq!(mip_id_for_dimensions(4096), 12);
        assert_eq!(number_of_mip_levels_for_dimensions(4), 3);
    }

    #[test]
    fn test_mip_level_to_mip_id() {
        // Four tiles across: full resolution is tile mipID 2.
        assert_eq!(mip_level_to_mip_id(0, 4), 2);
        assert_eq!(mip_level_to_mip_id(2, 4), 0);
    }

    #[test]
    fn test_texel_to_tile_mip_id() {
        // A 512 texel level with 128 texel tiles is 4 tiles across.
        let texel_mip_id = mip_id_for_dimensions(512);
        assert_eq!(texel_mip_id_to_tile_mip_id(texel_mip_id, 128), 2);
    }
}
