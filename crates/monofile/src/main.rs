use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use monofile::{Bundler, Config, ManifestLoader};

/// Merge a multi-package Go program into a single source file
#[derive(Parser, Debug)]
#[command(name = "monofile", version, about, long_about = None)]
struct Cli {
    /// Package paths or `prefix/...` patterns selecting the roots; the
    /// manifest's own roots when empty
    patterns: Vec<String>,

    /// Loader manifest describing the parsed and type-checked packages
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Configuration file applied on top of the user and project configs
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the merged source here instead of standard output
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Package clause of the merged file
    #[arg(long, value_name = "NAME")]
    package_name: Option<String>,

    /// Do not precede inlined packages with a `// package <path>` banner
    #[arg(long)]
    no_annotate: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(manifest) = cli.manifest {
        config.manifest = Some(manifest);
    }
    if let Some(name) = cli.package_name {
        config.package_name = Some(name);
    }
    if cli.no_annotate {
        config.annotate_packages = false;
    }
    config.validate()?;
    debug!("Configuration: {config:?}");

    let loader = ManifestLoader::new(config.manifest_path());
    let bundler = Bundler::new(config);
    let source = bundler
        .bundle_patterns(&loader, &cli.patterns)
        .with_context(|| format!("failed to bundle {}", loader.path().display()))?;

    match cli.output {
        Some(path) => write_output(&path, &source)?,
        None => std::io::stdout()
            .lock()
            .write_all(source.as_bytes())
            .context("failed to write to standard output")?,
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG still takes precedence
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn write_output(path: &Path, source: &str) -> Result<()> {
    std::fs::write(path, source)
        .with_context(|| format!("failed to write output file: {}", path.display()))?;
    info!("Wrote {} bytes to {}", source.len(), path.display());
    Ok(())
}
