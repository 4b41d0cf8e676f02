/// This module governs the command line export of a system description
mod configuration;
mod telemetry;

use crate::export::ExportBuilder;
use crate::system::reader::SystemDescription;
use clap::{ArgEnum, Parser};
use color_eyre::eyre::eyre;
use configuration::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// The TOML system description to export
    file_path: Option<PathBuf>,
    /// Where to write the export, defaults to the results directory of the settings
    #[clap(short, long)]
    output: Option<PathBuf>,
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", level)
    }
}

pub fn run() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = App::parse();
    let settings = Settings::build()?;

    std::fs::create_dir_all(&settings.export.results_directory)?;
    let (subscriber, _guard) =
        telemetry::get_subscriber(cli.log_level, &settings.export.results_directory);
    telemetry::init_subscriber(subscriber)?;

    let path = cli
        .file_path
        .ok_or(eyre!("A file path needs to be passed."))?;
    tracing::info!("Reading the system description from {}", path.display());
    let system = SystemDescription::build(&path)?;

    let mut builder = ExportBuilder::new()
        .with_lattice(&system.lattice)
        .with_configuration(&system.configuration)
        .with_calculation(&system.calculation)
        .with_structural_disorder(&system.structural_disorder)
        .with_safety_factor(settings.export.safety_factor);
    if let Some(modification) = system.modification.as_ref() {
        builder = builder.with_modification(modification);
    }
    if let Some(disorder) = system.disorder.as_ref() {
        builder = builder.with_disorder(disorder);
    }
    let export = builder.build()?;

    let output = cli.output.unwrap_or_else(|| settings.output_path());
    export.write(&output)?;

    let resolved = export.resolved();
    if resolved.is_estimated() {
        tracing::info!(
            "The spectrum was estimated, check the energy scale {:.4} eV against the spectrum of the system",
            resolved.energy_scale()
        );
    }
    Ok(())
}
