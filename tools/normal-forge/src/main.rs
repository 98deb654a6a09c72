//! normal-forge - normal map generation and .mtl bump linking
//!
//! # Commands
//!
//! - `normal-forge generate` - Synthesize `<base>_normal.png` next to every diffuse texture
//! - `normal-forge link` - Add `map_bump` lines to `.mtl` files that lack one
//! - `normal-forge all` - Generate, then link
//!
//! Per-file failures are logged and counted; they never change the exit status.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use normal_forge::batch::with_jobs;
use normal_forge::{ForgeConfig, GenerateOptions, LinkOptions, Preset, generate_all, link_all};

#[derive(Parser)]
#[command(name = "normal-forge")]
#[command(about = "Normal map generation and .mtl bump linking")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./normal-forge.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate normal maps from diffuse textures
    Generate(GenerateArgs),

    /// Link generated normal maps into .mtl files
    Link(LinkArgs),

    /// Generate, then link
    All {
        #[command(flatten)]
        generate: GenerateArgs,

        /// Report .mtl files that would change without writing them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Asset root to scan (default: public/models)
    root: Option<PathBuf>,

    /// Use the soft preset (strength 4, sigma 1.5, `_normal_soft` suffix)
    #[arg(long, conflicts_with = "preset")]
    soft: bool,

    /// Named preset
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Override gradient strength
    #[arg(long)]
    strength: Option<f32>,

    /// Override high-pass blur sigma
    #[arg(long)]
    sigma: Option<f32>,

    /// Overwrite existing normal maps
    #[arg(long)]
    force: bool,

    /// Worker threads
    #[arg(short, long)]
    jobs: Option<usize>,
}

#[derive(Args)]
struct LinkArgs {
    /// Asset root to scan (default: public/models)
    root: Option<PathBuf>,

    /// Report files that would change without writing them
    #[arg(long)]
    dry_run: bool,

    /// Worker threads
    #[arg(short, long)]
    jobs: Option<usize>,
}

impl GenerateArgs {
    fn preset(&self) -> Option<Preset> {
        if self.soft {
            Some(Preset::Soft)
        } else {
            self.preset
        }
    }

    fn options(&self, config: &ForgeConfig) -> Result<GenerateOptions> {
        Ok(config.generate_options(self.preset(), self.strength, self.sigma, self.force)?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let config = ForgeConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => {
            let options = args.options(&config)?;
            let root = args.root.clone().unwrap_or_else(|| config.root_or_default());
            with_jobs(config.jobs(args.jobs), || run_generate(&root, &options))?;
        }

        Commands::Link(args) => {
            let root = args.root.clone().unwrap_or_else(|| config.root_or_default());
            let options = LinkOptions {
                dry_run: args.dry_run,
            };
            with_jobs(config.jobs(args.jobs), || run_link(&root, &options))?;
        }

        Commands::All { generate, dry_run } => {
            let options = generate.options(&config)?;
            let root = generate
                .root
                .clone()
                .unwrap_or_else(|| config.root_or_default());
            let link_options = LinkOptions { dry_run };
            with_jobs(config.jobs(generate.jobs), || {
                run_generate(&root, &options);
                run_link(&root, &link_options);
            })?;
        }
    }

    Ok(())
}

fn run_generate(root: &Path, options: &GenerateOptions) {
    tracing::info!(
        "Scanning {} for textures (strength={}, sigma={}, suffix={})",
        root.display(),
        options.params.strength,
        options.params.sigma,
        options.output_suffix
    );
    let report = generate_all(root, options);
    if !report.failed.is_empty() {
        tracing::warn!("{} textures failed", report.failed.len());
    }
    println!("Finished. Generated {} normal maps.", report.generated.len());
}

fn run_link(root: &Path, options: &LinkOptions) {
    let report = link_all(root, options);
    if !report.failed.is_empty() {
        tracing::warn!("{} .mtl files failed", report.failed.len());
    }
    if options.dry_run {
        println!("Finished. Would update {} .mtl files.", report.updated.len());
    } else {
        println!("Finished. Updated {} .mtl files.", report.updated.len());
    }
}
