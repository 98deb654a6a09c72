//! Filesystem helpers shared by both passes.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Replace `path` with `data` so that readers see either the old or the new
/// content, never a truncated file.
///
/// Writes to a sibling temporary file, syncs it, then renames over the target.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp_path = temp_sibling(path);

    let result = (|| {
        {
            let mut f = fs::File::create(&tmp_path)?;
            f.write_all(data)?;
            f.sync_all()?;
        }

        #[cfg(windows)]
        {
            if path.exists() {
                // Windows rename fails if destination exists.
                fs::remove_file(path)?;
            }
        }

        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Whether a file named exactly like `path`'s last component exists in its
/// directory.
///
/// Compares names byte-for-byte against the directory listing, so the answer
/// is the same on case-insensitive filesystems.
pub fn file_exists_exact(path: &Path) -> bool {
    // Cheap stat first; the listing only settles the exact spelling
    if !path.is_file() {
        return false;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(|e| e.ok())
        .any(|e| e.file_name() == name)
}

/// Lowercased extension of `path`, or an empty string.
pub fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}
