use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{ArgAction, Parser};
use extmodgen::{
    code_generator, config::Config, frontend, types::ModuleFlavor, writer::{self, WriteOutcome},
};
use log::{LevelFilter, debug, info};

/// Generate a MicroPython C module skeleton from a Python module
#[derive(Debug, Parser)]
#[command(name = "extmodgen", version, about, long_about = None)]
struct Cli {
    /// Python source describing the module API
    #[arg(value_name = "MODULE.py")]
    module: PathBuf,

    /// Replace existing output files
    #[arg(short = 'f', long = "force-overwrite")]
    force_overwrite: bool,

    /// Directory for the generated files (defaults to the module's directory)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Additional configuration file, applied after the discovered ones
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate a core-port module (`modNAME.c`) instead of a user C module
    #[arg(long)]
    core: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let module_dir = cli
        .module
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut config = Config::load(Some(module_dir), cli.config.as_deref())
        .context("Failed to load configuration")?;
    if cli.core {
        config.external_module = false;
    }
    if cli.force_overwrite {
        config.force = true;
    }
    if cli.output_dir.is_some() {
        config.output_dir = cli.output_dir;
    }
    debug!("Effective configuration: {config:?}");

    let module = frontend::read_module(&cli.module)?;
    let options = config.generator_options(&module.author, chrono::Local::now().year())?;
    let generated = code_generator::generate(&module, &options)
        .with_context(|| format!("Failed to generate module '{}'", module.name))?;

    let output_dir = config.output_dir.as_deref().unwrap_or(module_dir);
    match writer::write_artifacts(&generated, output_dir, config.force)? {
        WriteOutcome::Written { source, symbols } => {
            let kind = match generated.flavor {
                ModuleFlavor::External => "user C module",
                ModuleFlavor::CorePort => "core-port module",
            };
            info!(
                "Generated {kind} '{}': {} and {} ({} symbols)",
                generated.module,
                source.display(),
                symbols.display(),
                generated.symbols.len()
            );
        }
        WriteOutcome::Preexisting(path) => {
            info!("Nothing written because {} is in the way", path.display());
        }
    }
    Ok(())
}
