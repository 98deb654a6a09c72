//! Per-block bump insertion
//!
//! Patching never mutates the parsed blocks: each block is mapped to a
//! decision, and a new block list is built from the decisions.

use std::path::Path;

use super::block::{Diffuse, MAP_BUMP, MaterialBlock};
use super::resolve::resolve_normal_reference;

/// Why a block was left as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Preamble,
    /// `newmtl` without a name
    Unnamed,
    HasBump,
    NoDiffuse,
    NoCandidate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockDecision {
    Keep(SkipReason),
    /// Insert `map_bump <reference>` after line `after`
    Insert { after: usize, reference: String },
}

/// One inserted reference, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub material: String,
    pub reference: String,
}

/// Patched blocks plus what changed.
#[derive(Debug, Clone)]
pub struct PatchResult {
    pub blocks: Vec<MaterialBlock>,
    pub insertions: Vec<Insertion>,
}

impl PatchResult {
    pub fn changed(&self) -> bool {
        !self.insertions.is_empty()
    }
}

/// Decide what to do with one block. The bump check wins over everything.
pub fn decide<F>(block: &MaterialBlock, mtl_dir: &Path, exists: F) -> BlockDecision
where
    F: Fn(&Path) -> bool,
{
    let name = match block.name() {
        None => return BlockDecision::Keep(SkipReason::Preamble),
        Some(name) => name,
    };
    if block.has_bump {
        return BlockDecision::Keep(SkipReason::HasBump);
    }
    if name.is_empty() {
        return BlockDecision::Keep(SkipReason::Unnamed);
    }

    let (line, path) = match &block.diffuse {
        Diffuse::Missing => return BlockDecision::Keep(SkipReason::NoDiffuse),
        Diffuse::Found { line, path } => (*line, path),
    };

    match resolve_normal_reference(mtl_dir, path, exists) {
        Some(reference) => BlockDecision::Insert {
            after: line,
            reference,
        },
        None => BlockDecision::Keep(SkipReason::NoCandidate),
    }
}

/// Apply `decide` to every block of a file.
pub fn patch_blocks<F>(blocks: &[MaterialBlock], mtl_dir: &Path, exists: F) -> PatchResult
where
    F: Fn(&Path) -> bool,
{
    let mut insertions = Vec::new();
    let patched = blocks
        .iter()
        .map(|block| match decide(block, mtl_dir, &exists) {
            BlockDecision::Keep(reason) => {
                tracing::trace!("Keeping material {:?}: {:?}", block.name(), reason);
                block.clone()
            }
            BlockDecision::Insert { after, reference } => {
                let patched = insert_after(block, after, &reference);
                insertions.push(Insertion {
                    material: block.name().unwrap_or_default().to_string(),
                    reference,
                });
                patched
            }
        })
        .collect();

    PatchResult {
        blocks: patched,
        insertions,
    }
}

/// Copy of `block` with a `map_bump` line after `after`.
///
/// The new line reuses the anchor line's indentation and terminator. When
/// the anchor is an unterminated last line, it gains a `\n` and the inserted
/// line stays unterminated.
fn insert_after(block: &MaterialBlock, after: usize, reference: &str) -> MaterialBlock {
    let anchor = &block.lines[after];
    let indent: String = anchor.chars().take_while(|c| *c == ' ' || *c == '\t').collect();

    let mut lines = Vec::with_capacity(block.lines.len() + 1);
    lines.extend_from_slice(&block.lines[..after]);

    let terminator = if anchor.ends_with("\r\n") {
        "\r\n"
    } else if anchor.ends_with('\n') {
        "\n"
    } else {
        ""
    };

    if terminator.is_empty() {
        lines.push(format!("{}\n", anchor));
        lines.push(format!("{}{} {}", indent, MAP_BUMP, reference));
    } else {
        lines.push(anchor.clone());
        lines.push(format!("{}{} {}{}", indent, MAP_BUMP, reference, terminator));
    }
    lines.extend_from_slice(&block.lines[after + 1..]);

    MaterialBlock {
        kind: block.kind.clone(),
        lines,
        diffuse: block.diffuse.clone(),
        has_bump: true,
    }
}
