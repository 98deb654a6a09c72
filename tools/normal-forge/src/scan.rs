//! Asset tree discovery
//!
//! Walks an asset root in a stable (file-name sorted) order and yields the
//! diffuse textures worth synthesizing from, or the material files to link.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{MATERIAL_EXTENSION, ScanRules};
use crate::fsutil::lowercase_extension;

/// A diffuse texture found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    pub path: PathBuf,
    /// File name without extension, original case
    pub base_name: String,
    /// Extension as found on disk, original case
    pub extension: String,
}

impl TextureRecord {
    fn from_path(path: &Path) -> Option<Self> {
        Some(Self {
            path: path.to_path_buf(),
            base_name: path.file_stem()?.to_str()?.to_string(),
            extension: path.extension()?.to_str()?.to_string(),
        })
    }

    /// Sibling path `<dir>/<base_name><suffix>.png` for a derived map.
    pub fn derived_path(&self, suffix: &str) -> PathBuf {
        self.path
            .with_file_name(format!("{}{}.png", self.base_name, suffix))
    }
}

/// Enumerates diffuse texture candidates under a root.
///
/// Each call to [`TextureScanner::iter`] starts a fresh walk, so the sequence
/// can be restarted at will.
#[derive(Debug, Clone)]
pub struct TextureScanner {
    root: PathBuf,
    rules: ScanRules,
}

impl TextureScanner {
    pub fn new(root: impl Into<PathBuf>, rules: ScanRules) -> Self {
        Self {
            root: root.into(),
            rules,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> impl Iterator<Item = TextureRecord> + '_ {
        walk_files(&self.root)
            .filter(|path| is_texture_candidate(path, &self.rules))
            .filter_map(|path| TextureRecord::from_path(&path))
    }
}

/// Whether `path` names a diffuse texture under `rules`.
///
/// Extension, suffix and substring checks are all case-insensitive.
pub fn is_texture_candidate(path: &Path, rules: &ScanRules) -> bool {
    let ext = lowercase_extension(path);
    if !rules.extensions.iter().any(|e| *e == ext) {
        return false;
    }

    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let stem = stem.to_lowercase();

    if rules.ignore_suffixes.iter().any(|s| stem.ends_with(s.as_str())) {
        return false;
    }

    // Catches derived maps with nonstandard names, e.g. "brick_Normal_Map"
    !stem.contains(rules.excluded_substring.as_str())
}

/// All `.mtl` files under `root`, in walk order.
pub fn find_material_files(root: &Path) -> Vec<PathBuf> {
    walk_files(root)
        .filter(|path| lowercase_extension(path) == MATERIAL_EXTENSION)
        .collect()
}

fn walk_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}
