//! Tree-level passes
//!
//! Files are processed independently on the rayon pool. A failure is logged
//! and recorded in the report; it never stops the rest of the batch.

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{GenerateOptions, LinkOptions};
use crate::error::ForgeError;
use crate::fsutil::file_exists_exact;
use crate::material::{FileLink, link_material_file};
use crate::normal::generate_normal_map;
use crate::scan::{TextureRecord, TextureScanner, find_material_files};

/// A file that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ForgeError,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Normal maps written this run
    pub generated: Vec<PathBuf>,
    /// Outputs that already existed and were not forced
    pub up_to_date: Vec<PathBuf>,
    pub failed: Vec<FileFailure>,
}

#[derive(Debug, Default)]
pub struct LinkReport {
    /// Material files that gained at least one `map_bump` line
    pub updated: Vec<FileLink>,
    pub unchanged: usize,
    pub failed: Vec<FileFailure>,
}

enum GenerateStatus {
    Generated(PathBuf),
    UpToDate(PathBuf),
}

/// Whether synthesis should run for `output`.
pub fn needs_generation(output: &Path, force: bool) -> bool {
    force || !file_exists_exact(output)
}

/// Synthesize normal maps for every diffuse texture under `root`.
pub fn generate_all(root: &Path, options: &GenerateOptions) -> GenerateReport {
    let scanner = TextureScanner::new(root, options.rules.clone());
    let records = unique_outputs(scanner.iter(), &options.output_suffix);
    tracing::info!("Found {} candidate textures under {}", records.len(), root.display());

    let results: Vec<(PathBuf, Result<GenerateStatus, ForgeError>)> = records
        .par_iter()
        .map(|record| (record.path.clone(), generate_one(record, options)))
        .collect();

    let mut report = GenerateReport::default();
    for (path, result) in results {
        match result {
            Ok(GenerateStatus::Generated(output)) => report.generated.push(output),
            Ok(GenerateStatus::UpToDate(output)) => report.up_to_date.push(output),
            Err(error) => {
                tracing::warn!("Error processing {}: {}", path.display(), error);
                report.failed.push(FileFailure { path, error });
            }
        }
    }
    report
}

/// Drop records whose output path is already claimed by an earlier one.
///
/// `a.jpg` and `a.png` both map to `a_normal.png`; the first in scan order
/// wins so no two workers write the same file.
fn unique_outputs(records: impl Iterator<Item = TextureRecord>, suffix: &str) -> Vec<TextureRecord> {
    let mut claimed = HashSet::new();
    records
        .filter(|record| {
            let output = record.derived_path(suffix);
            let first = claimed.insert(output.clone());
            if !first {
                tracing::warn!(
                    "Skipping {}: {} is already produced from another texture",
                    record.path.display(),
                    output.display()
                );
            }
            first
        })
        .collect()
}

fn generate_one(record: &TextureRecord, options: &GenerateOptions) -> Result<GenerateStatus, ForgeError> {
    let output = record.derived_path(&options.output_suffix);

    if !needs_generation(&output, options.force) {
        tracing::debug!("Skipping existing: {}", output.display());
        return Ok(GenerateStatus::UpToDate(output));
    }

    generate_normal_map(&record.path, &output, &options.params)?;
    tracing::info!("Generated: {}", output.display());
    Ok(GenerateStatus::Generated(output))
}

/// Link every `.mtl` file under `root` to existing normal maps.
pub fn link_all(root: &Path, options: &LinkOptions) -> LinkReport {
    let files = find_material_files(root);
    tracing::info!("Found {} .mtl files under {}", files.len(), root.display());

    let results: Vec<(PathBuf, Result<FileLink, ForgeError>)> = files
        .par_iter()
        .map(|path| (path.clone(), link_material_file(path, options)))
        .collect();

    let mut report = LinkReport::default();
    for (path, result) in results {
        match result {
            Ok(link) if link.changed() => {
                if options.dry_run {
                    tracing::info!("Would update: {}", link.path.display());
                } else {
                    tracing::info!("Updated: {}", link.path.display());
                }
                report.updated.push(link);
            }
            Ok(_) => report.unchanged += 1,
            Err(error) => {
                tracing::warn!("Error processing {}: {}", path.display(), error);
                report.failed.push(FileFailure { path, error });
            }
        }
    }
    report
}

/// Run `f` on a dedicated pool of `jobs` threads, or the global pool.
pub fn with_jobs<R, F>(jobs: Option<usize>, f: F) -> Result<R, rayon::ThreadPoolBuildError>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match jobs {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            Ok(pool.install(f))
        }
        None => Ok(f()),
    }
}
