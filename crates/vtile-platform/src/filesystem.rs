//! File System Layer
//!
//! Input wildcard expansion and the output directory layout of a run.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::{PlatformError, PlatformResult};

/// Subfolders of a run's output directory, in the order the phases fill them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFolder {
    /// Subtextures with their wrapping borders
    WrappingBorders,
    /// The full-resolution atlas
    Atlas,
    /// Subtexture placement document
    AtlasXml,
    /// One atlas image per tile mipID
    MipmappedAtlas,
    /// Bordered tiles of every mip level
    Tiles,
    /// Tile geometry document
    TilesXml,
}

impl OutputFolder {
    /// Directory name below the output root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::WrappingBorders => "1a_wrappingborders",
            Self::Atlas => "1b_atlas",
            Self::AtlasXml => "1c_atlas_xml",
            Self::MipmappedAtlas => "2_mipmapped_atlas",
            Self::Tiles => "3a_tiles",
            Self::TilesXml => "3b_tiles_xml",
        }
    }
}

/// Output directory layout of one run
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Create a layout rooted at `root`. Nothing is created on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a subfolder path
    pub fn folder(&self, folder: OutputFolder) -> PathBuf {
        self.root.join(folder.dir_name())
    }

    /// Resolve a file path inside a subfolder
    pub fn file(&self, folder: OutputFolder, file_name: impl AsRef<Path>) -> PathBuf {
        self.folder(folder).join(file_name)
    }

    /// Create the output root and its parents. Returns whether it had to be created.
    pub fn create_root(&self) -> PlatformResult<bool> {
        if self.root.is_dir() {
            log::info!("Output directory {} exists.", self.root.display());
            return Ok(false);
        }

        log::info!("Creating output directory {}...", self.root.display());
        std::fs::create_dir_all(&self.root).map_err(|source| PlatformError::OutputDirectory {
            path: self.root.display().to_string(),
            source,
        })?;
        Ok(true)
    }

    /// Create a subfolder if missing and return its path
    pub fn create_folder(&self, folder: OutputFolder) -> PlatformResult<PathBuf> {
        let path = self.folder(folder);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Local time stamp used for default output directory names
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d-%H-%M-%S").to_string()
}

/// Default output directory: a time stamped folder in the working directory
pub fn default_output_dir() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    cwd.join(timestamp())
}

/// Build an anchored regex for a file name pattern where `*` matches any run of characters
fn file_name_regex(pattern: &str) -> PlatformResult<Regex> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{escaped}$")).map_err(|err| PlatformError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}

/// Expand subtexture arguments into existing file paths.
///
/// Relative arguments resolve against the working directory. Only the file
/// name may contain `*` wildcards; the parent directory is scanned for
/// regular files whose whole name matches. Matches of one argument are sorted
/// by name, and arguments keep their order.
pub fn expand_input_patterns<S: AsRef<str>>(patterns: &[S]) -> PlatformResult<Vec<PathBuf>> {
    if patterns.is_empty() {
        return Err(PlatformError::NoInputFiles);
    }

    let cwd = std::env::current_dir()?;
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let full = cwd.join(pattern);

        let Some(name) = full.file_name().and_then(|n| n.to_str()) else {
            return Err(PlatformError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: String::from("no file name"),
            });
        };
        let filter = file_name_regex(name)?;
        let parent = full.parent().unwrap_or(&cwd);

        let entries = match std::fs::read_dir(parent) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Couldn't read directory {}: {}", parent.display(), err);
                continue;
            }
        };

        let mut matched = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if file_name.to_str().is_some_and(|n| filter.is_match(n)) {
                matched.push(entry.path());
            }
        }

        if matched.is_empty() {
            log::warn!("No files match {}", pattern);
        }
        matched.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        paths.extend(matched);
    }

    if paths.is_empty() {
        return Err(PlatformError::NoMatches(
            patterns.iter().map(|p| p.as_ref().to_string()).collect(),
        ));
    }

    Ok(paths)
}
