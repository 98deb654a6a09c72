//! normal-forge library
//!
//! Synthesizes tangent-space normal maps from diffuse textures and links them
//! into `.mtl` material files. The two passes share nothing but the
//! filesystem: the linker finds normal maps purely by naming convention.

pub mod batch;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod material;
pub mod normal;
pub mod scan;

pub use batch::{GenerateReport, LinkReport, generate_all, link_all};
pub use config::{ForgeConfig, GenerateOptions, LinkOptions, Preset, ScanRules, SynthesisParams};
pub use error::ForgeError;
pub use normal::{NormalMap, generate_normal_map, synthesize};
pub use scan::{TextureRecord, TextureScanner};
