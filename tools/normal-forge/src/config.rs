//! Presets, scan rules and the optional `normal-forge.toml` config file
//!
//! Resolution order for every setting: CLI flag, then config file, then the
//! built-in default.
//!
//! ```toml
//! root = "public/models"
//!
//! [normals]
//! preset = "soft"
//! strength = 6.0
//! sigma = 1.0
//! ignore_suffixes = ["_mask"]
//!
//! [run]
//! jobs = 4
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ForgeError;

/// Default asset root, relative to the working directory.
pub const DEFAULT_ROOT: &str = "public/models";

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "normal-forge.toml";

/// Diffuse texture extensions accepted by the scanner (compared lowercase).
pub const TEXTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Base-name suffixes marking a texture as an already derived map.
pub const IGNORE_SUFFIXES: &[&str] = &[
    "_normal",
    "_metallic",
    "_roughness",
    "_specular",
    "_emissive",
    "_light",
    "_ao",
    "_height",
];

/// Material file extension walked by the linker.
pub const MATERIAL_EXTENSION: &str = "mtl";

/// Named synthesis presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Standard,
    Soft,
}

impl Preset {
    pub fn params(self) -> SynthesisParams {
        match self {
            Preset::Standard => SynthesisParams {
                strength: 10.0,
                sigma: 2.0,
            },
            Preset::Soft => SynthesisParams {
                strength: 4.0,
                sigma: 1.5,
            },
        }
    }

    /// Suffix appended to the diffuse base name for the generated file.
    pub fn output_suffix(self) -> &'static str {
        match self {
            Preset::Standard => "_normal",
            Preset::Soft => "_normal_soft",
        }
    }
}

/// Gradient strength and high-pass blur radius for one synthesis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub strength: f32,
    pub sigma: f32,
}

impl SynthesisParams {
    pub fn new(strength: f32, sigma: f32) -> Result<Self, ForgeError> {
        let params = Self { strength, sigma };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ForgeError> {
        if !self.strength.is_finite() || self.strength <= 0.0 {
            return Err(ForgeError::Config(format!(
                "strength must be a positive number, got {}",
                self.strength
            )));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(ForgeError::Config(format!(
                "sigma must be a positive number, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Preset::Standard.params()
    }
}

/// Filters applied by the texture scanner.
#[derive(Debug, Clone)]
pub struct ScanRules {
    /// Lowercase extensions without the dot
    pub extensions: Vec<String>,
    /// Lowercase base-name suffixes to skip
    pub ignore_suffixes: Vec<String>,
    /// Lowercase substring that disqualifies a base name anywhere
    pub excluded_substring: String,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            extensions: TEXTURE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            ignore_suffixes: IGNORE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            excluded_substring: "normal".to_string(),
        }
    }
}

impl ScanRules {
    /// Add extra ignore suffixes, normalized to lowercase and deduplicated.
    pub fn with_extra_suffixes<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for suffix in extra {
            let suffix = suffix.as_ref().to_lowercase();
            if !suffix.is_empty() && !self.ignore_suffixes.contains(&suffix) {
                self.ignore_suffixes.push(suffix);
            }
        }
        self
    }
}

/// Options for a synthesis pass.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub params: SynthesisParams,
    pub output_suffix: String,
    /// Regenerate even when the output already exists
    pub force: bool,
    pub rules: ScanRules,
}

impl GenerateOptions {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            params: preset.params(),
            output_suffix: preset.output_suffix().to_string(),
            force: false,
            rules: ScanRules::default(),
        }
    }
}

/// Options for a linking pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions {
    /// Compute patches but leave files untouched
    pub dry_run: bool,
}

/// `normal-forge.toml` contents.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgeConfig {
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub normals: NormalsSection,
    #[serde(default)]
    pub run: RunSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalsSection {
    pub preset: Option<Preset>,
    pub strength: Option<f32>,
    pub sigma: Option<f32>,
    #[serde(default)]
    pub ignore_suffixes: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Worker threads (0 or absent = rayon default)
    pub jobs: Option<usize>,
}

impl ForgeConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Load an explicit config, or the default file when it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let strength = self.normals.strength.unwrap_or(1.0);
        if !strength.is_finite() || strength <= 0.0 {
            anyhow::bail!("normals.strength must be positive, got {}", strength);
        }
        let sigma = self.normals.sigma.unwrap_or(1.0);
        if !sigma.is_finite() || sigma <= 0.0 {
            anyhow::bail!("normals.sigma must be positive, got {}", sigma);
        }
        Ok(())
    }

    pub fn root_or_default(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT))
    }

    /// Build synthesis options, letting explicit CLI values win.
    pub fn generate_options(
        &self,
        preset: Option<Preset>,
        strength: Option<f32>,
        sigma: Option<f32>,
        force: bool,
    ) -> Result<GenerateOptions, ForgeError> {
        let preset = preset.or(self.normals.preset).unwrap_or_default();
        let base = preset.params();
        let params = SynthesisParams::new(
            strength.or(self.normals.strength).unwrap_or(base.strength),
            sigma.or(self.normals.sigma).unwrap_or(base.sigma),
        )?;

        Ok(GenerateOptions {
            params,
            output_suffix: preset.output_suffix().to_string(),
            force,
            rules: ScanRules::default().with_extra_suffixes(&self.normals.ignore_suffixes),
        })
    }

    pub fn jobs(&self, cli_jobs: Option<usize>) -> Option<usize> {
        cli_jobs.or(self.run.jobs).filter(|&n| n > 0)
    }
}
