use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process;

use octa_relabel::config::RelabelConfig;
use octa_relabel::key::Instrument;
use octa_relabel::pipeline::{self, RunReport};
use octa_relabel::raw::OutputFormat;
use octa_relabel::registry::{load_names_file, load_registry_file};

/// Relabel OCTA image exports with their study Image IDs
#[derive(Debug, Parser)]
#[command(name = "octa-relabel", version)]
struct Cli {
    /// Which instrument's exports to relabel
    #[arg(value_enum)]
    instrument: Instrument,

    /// Export folder (defaults to ./AVANTI, ./REVO or ./Spectralis)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Registry workbook
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Spectralis name table workbook
    #[arg(long)]
    names: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for converted Angiovue buffers
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Rename Angiovue .raw files directly instead of converting them
    #[arg(long)]
    no_convert: bool,

    /// Keep Angiovue .png previews
    #[arg(long)]
    keep_previews: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    fn resolve_config(&self) -> Result<RelabelConfig> {
        let mut config = match &self.config {
            Some(path) => RelabelConfig::load(path)?,
            None => RelabelConfig::default(),
        };

        if let Some(root) = &self.root {
            config.set_root(self.instrument, root.clone());
        }
        if let Some(registry) = &self.registry {
            config.registry = registry.clone();
        }
        if let Some(names) = &self.names {
            config.names = names.clone();
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if self.no_convert {
            config.convert_raw = false;
        }
        if self.keep_previews {
            config.delete_previews = false;
        }

        Ok(config)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // clap prints usage and exits on a missing or unknown selector
    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) if report.failures() > 0 => {
            error!("Finished with {} failed files; see the log above", report.failures());
            process::exit(1);
        }
        Ok(_) => info!("Done"),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<RunReport> {
    let config = cli.resolve_config()?;
    let instrument = cli.instrument;
    let root = config.root_for(instrument);
    info!("Instrument: {}", instrument);

    // Without the registry nothing can be matched, so this is fatal
    let with_scans = instrument != Instrument::Angiovue;
    let rows = load_registry_file(&config.registry, &config.columns, with_scans)
        .with_context(|| format!("loading registry {}", config.registry.display()))?;

    let report = match instrument {
        Instrument::Angiovue => {
            pipeline::angiovue::run(root, &rows, &config.angiovue_options())
        }
        Instrument::Revo => pipeline::revo::run(root, &rows),
        Instrument::Spectralis => {
            let names = load_names_file(&config.names)
                .with_context(|| format!("loading name table {}", config.names.display()))?;
            pipeline::spectralis::run(root, &rows, &names)
        }
    }
    .with_context(|| format!("relabeling {}", root.display()))?;

    Ok(report)
}
