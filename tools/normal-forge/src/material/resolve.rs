//! Normal-map lookup by naming convention
//!
//! Resolution is pure apart from the `exists` check passed in, so tests can
//! describe the filesystem with a closure.

use std::path::{Path, PathBuf};

/// Suffixes tried after the diffuse base name, in priority order.
pub const NORMAL_CANDIDATE_SUFFIXES: &[&str] = &["_normal.png", "_normal.jpg", "_normal_soft.png"];

/// A diffuse reference split into its directory and file parts, with `\`
/// already folded to `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DiffuseParts {
    dir: Option<String>,
    stem: String,
}

impl DiffuseParts {
    fn parse(reference: &str) -> Option<Self> {
        let normalized = reference.replace('\\', "/");
        let (dir, file) = match normalized.rsplit_once('/') {
            Some((dir, file)) => (Some(dir.to_string()), file),
            None => (None, normalized.as_str()),
        };
        let stem = Path::new(file).file_stem()?.to_str()?.to_string();
        Some(Self { dir, stem })
    }
}

/// Absolute candidate paths for `diffuse_ref`, in priority order.
pub fn candidate_paths(mtl_dir: &Path, diffuse_ref: &str) -> Vec<PathBuf> {
    let Some(parts) = DiffuseParts::parse(diffuse_ref) else {
        return Vec::new();
    };
    let dir = match &parts.dir {
        Some(dir) => mtl_dir.join(dir),
        None => mtl_dir.to_path_buf(),
    };
    NORMAL_CANDIDATE_SUFFIXES
        .iter()
        .map(|suffix| dir.join(format!("{}{}", parts.stem, suffix)))
        .collect()
}

/// The `map_bump` argument for the first existing candidate, if any.
///
/// The returned reference keeps the diffuse reference's directory part and
/// uses `/` separators throughout.
pub fn resolve_normal_reference<F>(mtl_dir: &Path, diffuse_ref: &str, exists: F) -> Option<String>
where
    F: Fn(&Path) -> bool,
{
    let parts = DiffuseParts::parse(diffuse_ref)?;
    let found = candidate_paths(mtl_dir, diffuse_ref)
        .into_iter()
        .find(|candidate| exists(candidate))?;
    let file_name = found.file_name()?.to_str()?;

    let reference = match &parts.dir {
        Some(dir) => format!("{}/{}", dir, file_name),
        None => file_name.to_string(),
    };
    Some(reference.replace('\\', "/"))
}
