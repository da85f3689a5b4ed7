//! Metadata Documents
//!
//! Two XML documents accompany the images: the atlas document lists where
//! each subtexture's payload sits in the atlas (TexturePacker's sprite sheet
//! layout), the tile document describes the tile geometry for the renderer.

use std::fmt::Write as _;
use std::path::Path;

use vtile_core::PipelineConfig;

use crate::subtexture::Subtexture;
use crate::{AssetError, AssetResult};

const CREATOR_COMMENT: &str = "Created by vtile, the virtual texture tile creator";

const SPRITE_LEGEND: &str = "Format in compliance with TexturePacker by CodeAndWeb GmbH:
n  => name of the sprite
x  => sprite x pos in texture
y  => sprite y pos in texture
w  => sprite width (may be trimmed)
h  => sprite height (may be trimmed)
pX => x pos of the pivot point (relative to sprite width)
pY => y pos of the pivot point (relative to sprite height)
";

const INDENT: &str = "    ";

/// Payload rectangle of one subtexture in atlas texels
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRecord {
    /// Original file name
    pub name: String,
    /// Payload left edge
    pub x: u32,
    /// Payload top edge
    pub y: u32,
    /// Payload width
    pub width: u32,
    /// Payload height
    pub height: u32,
    /// Pivot x relative to the payload width
    pub pivot_x: f32,
    /// Pivot y relative to the payload height
    pub pivot_y: f32,
}

impl SpriteRecord {
    /// Describe a placed subtexture, border stripped
    pub fn from_subtexture(subtexture: &Subtexture) -> AssetResult<Self> {
        let origin = subtexture
            .payload_placement()
            .ok_or_else(|| AssetError::NotPlaced(subtexture.original_file_name().to_string()))?;
        Ok(Self {
            name: subtexture.original_file_name().to_string(),
            x: origin.x,
            y: origin.y,
            width: subtexture.payload_width(),
            height: subtexture.payload_height(),
            pivot_x: 0.5,
            pivot_y: 0.5,
        })
    }
}

/// Atlas placement document
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasDocument {
    /// Atlas image file name
    pub image_path: String,
    /// Atlas width in texels
    pub width: u32,
    /// Atlas height in texels
    pub height: u32,
    /// One record per subtexture, in input order
    pub sprites: Vec<SpriteRecord>,
}

impl AtlasDocument {
    /// Collect placements of packed subtextures
    pub fn new(
        subtextures: &[Subtexture],
        width: u32,
        height: u32,
        extension: &str,
    ) -> AssetResult<Self> {
        let sprites = subtextures
            .iter()
            .map(SpriteRecord::from_subtexture)
            .collect::<AssetResult<Vec<_>>>()?;
        Ok(Self {
            image_path: format!("atlas.{extension}"),
            width,
            height,
            sprites,
        })
    }

    /// Render the XML text
    pub fn to_xml(&self) -> String {
        let mut xml = XmlText::new();
        xml.comment(CREATOR_COMMENT);
        xml.comment(SPRITE_LEGEND);

        let root = [
            ("imagePath", self.image_path.clone()),
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
        ];
        if self.sprites.is_empty() {
            xml.empty_element(0, "TextureAtlas", &root);
            return xml.finish();
        }

        xml.open_element("TextureAtlas", &root);
        for sprite in &self.sprites {
            xml.empty_element(
                1,
                "sprite",
                &[
                    ("n", sprite.name.clone()),
                    ("x", sprite.x.to_string()),
                    ("y", sprite.y.to_string()),
                    ("w", sprite.width.to_string()),
                    ("h", sprite.height.to_string()),
                    ("pX", sprite.pivot_x.to_string()),
                    ("pY", sprite.pivot_y.to_string()),
                ],
            );
        }
        xml.close_element("TextureAtlas");
        xml.finish()
    }

    /// Write the XML document to `path`
    pub fn write(&self, path: &Path) -> AssetResult<()> {
        std::fs::write(path, self.to_xml())?;
        Ok(())
    }
}

/// Tile geometry document, one record for the whole tile set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileInfoDocument {
    /// Tile width and height in texels, border included
    pub dimensions_in_texels: u32,
    /// Tile border width in texels
    pub border_in_texels: u32,
    /// Tile file extension with its leading dot
    pub file_extension: String,
}

impl TileInfoDocument {
    /// Describe the configured tile geometry
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            dimensions_in_texels: config.tile_width,
            border_in_texels: config.tile_border_width,
            file_extension: format!(".{}", config.tile_format),
        }
    }

    /// Render the XML text
    pub fn to_xml(&self) -> String {
        let mut xml = XmlText::new();
        xml.comment(CREATOR_COMMENT);
        xml.empty_element(
            0,
            "tile_info",
            &[
                ("dimensions_in_texels", self.dimensions_in_texels.to_string()),
                ("border_in_texels", self.border_in_texels.to_string()),
                ("file_extension", self.file_extension.clone()),
            ],
        );
        xml.finish()
    }

    /// Write the XML document to `path`
    pub fn write(&self, path: &Path) -> AssetResult<()> {
        std::fs::write(path, self.to_xml())?;
        Ok(())
    }
}

/// Minimal XML text builder for flat documents
struct XmlText {
    out: String,
}

impl XmlText {
    fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"),
        }
    }

    fn comment(&mut self, text: &str) {
        // "--" may not appear inside a comment.
        let _ = writeln!(self.out, "<!--{}-->", text.replace("--", "- -"));
    }

    fn attributes(&mut self, attributes: &[(&str, String)]) {
        for (name, value) in attributes {
            let _ = write!(self.out, " {}=\"{}\"", name, escape_attribute(value));
        }
    }

    fn open_element(&mut self, name: &str, attributes: &[(&str, String)]) {
        let _ = write!(self.out, "<{name}");
        self.attributes(attributes);
        self.out.push_str(">\n");
    }

    fn empty_element(&mut self, depth: usize, name: &str, attributes: &[(&str, String)]) {
        let _ = write!(self.out, "{}<{}", INDENT.repeat(depth), name);
        self.attributes(attributes);
        self.out.push_str(" />\n");
    }

    fn close_element(&mut self, name: &str) {
        let _ = writeln!(self.out, "</{name}>");
    }

    fn finish(self) -> String {
        self.out
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasPacker;
    use crate::border::BorderWrapper;
    use crate::surface;

    fn packed() -> Vec<Subtexture> {
        let config = PipelineConfig {
            atlas_width: 64,
            tile_width: 16,
            tile_border_width: 2,
            ..Default::default()
        };
        let mut subtextures = vec![
            Subtexture::new(0, "a.png", surface::blank(32, 32)),
            Subtexture::new(1, "b&c.png", surface::blank(16, 24)),
        ];
        BorderWrapper::new(4).apply_all(&mut subtextures).unwrap();
        AtlasPacker::new(&config).pack_all(&mut subtextures).unwrap();
        subtextures
    }

    #[test]
    fn test_sprite_records_strip_border() {
        let subtextures = packed();
        let document = AtlasDocument::new(&subtextures, 64, 64, "png").unwrap();

        assert_eq!(document.image_path, "atlas.png");
        assert_eq!(document.sprites.len(), 2);

        for (sprite, subtexture) in document.sprites.iter().zip(&subtextures) {
            let at = subtexture.placement().unwrap();
            assert_eq!(sprite.x, at.x + 4);
            assert_eq!(sprite.y, at.y + 4);
            assert_eq!(sprite.width, subtexture.width() - 8);
            assert_eq!(sprite.height, subtexture.height() - 8);
        }
        assert_eq!((document.sprites[1].width, document.sprites[1].height), (8, 16));
    }

    #[test]
    fn test_unplaced_subtexture_is_an_error() {
        let subtextures = vec![Subtexture::new(0, "loose.png", surface::blank(4, 4))];
        assert!(matches!(
            AtlasDocument::new(&subtextures, 64, 64, "png"),
            Err(AssetError::NotPlaced(_))
        ));
    }

    #[test]
    fn test_atlas_xml() {
        let document = AtlasDocument {
            image_path: String::from("atlas.png"),
            width: 512,
            height: 512,
            sprites: vec![SpriteRecord {
                name: String::from("b&c.png"),
                x: 8,
                y: 264,
                width: 240,
                height: 240,
                pivot_x: 0.5,
                pivot_y: 0.5,
            }],
        };
        let xml = document.to_xml();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<TextureAtlas imagePath=\"atlas.png\" width=\"512\" height=\"512\">\n"));
        assert!(xml.contains(
            "    <sprite n=\"b&amp;c.png\" x=\"8\" y=\"264\" w=\"240\" h=\"240\" pX=\"0.5\" pY=\"0.5\" />\n"
        ));
        assert!(xml.ends_with("</TextureAtlas>\n"));
        assert_eq!(xml.matches("<sprite ").count(), 1);
    }

    #[test]
    fn test_tile_info_xml() {
        let config = PipelineConfig {
            tile_width: 128,
            tile_border_width: 4,
            tile_format: String::from("png"),
            ..Default::default()
        };
        let document = TileInfoDocument::from_config(&config);
        assert_eq!(document.file_extension, ".png");

        let xml = document.to_xml();
        assert!(xml.contains(
            "<tile_info dimensions_in_texels=\"128\" border_in_texels=\"4\" file_extension=\".png\" />"
        ));
        assert_eq!(xml.matches("<tile_info").count(), 1);
    }

    #[test]
    fn test_write_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile_info.xml");
        TileInfoDocument::from_config(&PipelineConfig::default())
            .write(&path)
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("dimensions_in_texels=\"128\""));
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute("a<b>\"c\"'d'&"), "a&lt;b&gt;&quot;c&quot;&apos;d&apos;&amp;");
    }
}
