//! `.mtl` bump linking
//!
//! For every material whose first `map_Kd` texture has a generated normal
//! map next to it (`<base>_normal.png`, `<base>_normal.jpg` or
//! `<base>_normal_soft.png`), a `map_bump` line is inserted right after the
//! diffuse line. Materials that already reference a bump map are left alone,
//! so running the linker again changes nothing.

mod block;
mod patch;
mod resolve;

pub use block::{BlockKind, Diffuse, MaterialBlock, parse_blocks, render_blocks};
pub use patch::{BlockDecision, Insertion, PatchResult, SkipReason, decide, patch_blocks};
pub use resolve::{NORMAL_CANDIDATE_SUFFIXES, candidate_paths, resolve_normal_reference};

use std::path::{Path, PathBuf};

use crate::config::LinkOptions;
use crate::error::{ForgeError, Result};
use crate::fsutil::{file_exists_exact, write_atomic};

/// Patch material text. Returns `None` when no block changes.
pub fn link_content<F>(content: &str, mtl_dir: &Path, exists: F) -> Option<(String, Vec<Insertion>)>
where
    F: Fn(&Path) -> bool,
{
    let blocks = parse_blocks(content);
    let result = patch_blocks(&blocks, mtl_dir, exists);
    if !result.changed() {
        return None;
    }
    Some((render_blocks(&result.blocks), result.insertions))
}

/// Outcome of linking one material file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    pub path: PathBuf,
    /// Empty when the file was left untouched
    pub insertions: Vec<Insertion>,
    /// Whether new content was written (false on dry runs)
    pub written: bool,
}

impl FileLink {
    pub fn changed(&self) -> bool {
        !self.insertions.is_empty()
    }
}

/// Link one `.mtl` file in place, rewriting it only when a block changed.
pub fn link_material_file(path: &Path, options: &LinkOptions) -> Result<FileLink> {
    let bytes = std::fs::read(path).map_err(|e| ForgeError::file_io(path, e))?;
    let content = String::from_utf8(bytes).map_err(|e| ForgeError::MaterialParse {
        path: path.to_path_buf(),
        reason: format!("not valid UTF-8 ({})", e.utf8_error()),
    })?;

    let mtl_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let Some((patched, insertions)) = link_content(&content, mtl_dir, file_exists_exact) else {
        return Ok(FileLink {
            path: path.to_path_buf(),
            insertions: Vec::new(),
            written: false,
        });
    };

    for insertion in &insertions {
        tracing::debug!(
            "{}: material '{}' -> map_bump {}",
            path.display(),
            insertion.material,
            insertion.reference
        );
    }

    let written = if options.dry_run {
        false
    } else {
        write_atomic(path, patched.as_bytes()).map_err(|e| ForgeError::file_io(path, e))?;
        true
    };

    Ok(FileLink {
        path: path.to_path_buf(),
        insertions,
        written,
    })
}
