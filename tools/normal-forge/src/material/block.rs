//! Splitting `.mtl` text into material blocks
//!
//! Lines keep their original terminators so joining every block's lines
//! reproduces the input byte-for-byte.

/// Directive opening a new material.
pub const NEWMTL: &str = "newmtl";

/// Directive carrying the diffuse texture.
pub const MAP_KD: &str = "map_Kd";

/// Directive inserted by the linker.
pub const MAP_BUMP: &str = "map_bump";

/// Line prefixes (lowercase) that already reference a bump or normal map.
const BUMP_PREFIXES: &[&str] = &["map_bump", "bump"];

/// Standalone normal-map directive.
const NORM: &str = "norm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Lines before the first `newmtl`; never patched
    Preamble,
    /// A `newmtl` block; the name is empty when the declaration has none
    Material(String),
}

/// Result of looking for the block's first `map_Kd` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diffuse {
    Missing,
    Found { line: usize, path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialBlock {
    pub kind: BlockKind,
    /// Raw lines including their terminators
    pub lines: Vec<String>,
    pub diffuse: Diffuse,
    pub has_bump: bool,
}

impl MaterialBlock {
    fn new(kind: BlockKind, lines: Vec<String>) -> Self {
        let has_bump = lines.iter().any(|l| is_bump_line(l));
        let diffuse = find_diffuse(&lines);
        Self {
            kind,
            lines,
            diffuse,
            has_bump,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Preamble => None,
            BlockKind::Material(name) => Some(name),
        }
    }

    pub fn is_preamble(&self) -> bool {
        self.kind == BlockKind::Preamble
    }
}

/// Parse `content` into blocks. A preamble block exists only when text
/// precedes the first declaration.
pub fn parse_blocks(content: &str) -> Vec<MaterialBlock> {
    let mut blocks = Vec::new();
    let mut kind = BlockKind::Preamble;
    let mut lines: Vec<String> = Vec::new();

    for line in content.split_inclusive('\n') {
        if let Some(name) = declaration_name(line) {
            if !lines.is_empty() {
                blocks.push(MaterialBlock::new(kind, std::mem::take(&mut lines)));
            }
            kind = BlockKind::Material(name.to_string());
        }
        lines.push(line.to_string());
    }

    // A trailing declaration with nothing after it still forms a block
    if !lines.is_empty() {
        blocks.push(MaterialBlock::new(kind, lines));
    }

    blocks
}

/// Join blocks back into file content.
pub fn render_blocks(blocks: &[MaterialBlock]) -> String {
    blocks
        .iter()
        .flat_map(|b| b.lines.iter())
        .map(String::as_str)
        .collect()
}

/// `Some(name)` if `line` is a `newmtl` declaration.
///
/// A bare `newmtl` (or one followed only by whitespace) still opens a block,
/// with an empty name. Such blocks are never patched, and the lines after
/// them are kept out of the previous material.
fn declaration_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix(NEWMTL)?;
    if rest.is_empty() {
        return Some("");
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

fn is_bump_line(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    BUMP_PREFIXES.iter().any(|p| lower.starts_with(p))
        || lower.split_whitespace().next() == Some(NORM)
}

fn find_diffuse(lines: &[String]) -> Diffuse {
    // A bare `map_Kd` has no argument and is not a diffuse reference
    let prefix = format!("{} ", MAP_KD);
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if !trimmed.starts_with(&prefix) {
            continue;
        }
        // First one with an argument wins
        if let Some(path) = trimmed.split_whitespace().nth(1) {
            return Diffuse::Found {
                line: i,
                path: path.to_string(),
            };
        }
    }
    Diffuse::Missing
}
