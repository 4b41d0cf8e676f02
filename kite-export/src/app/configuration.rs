use crate::constants::SAFETY_FACTOR;
use crate::container::FILE_EXTENSION;
use color_eyre::eyre::eyre;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
/// Settings of the command line application
pub(crate) struct Settings {
    pub(crate) export: ExportSettings,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportSettings {
    /// Directory the export and the log file are written to
    pub(crate) results_directory: PathBuf,
    /// File name used when no output path is given
    pub(crate) file_name: String,
    /// Fraction of `[-1, 1]` an estimated spectrum is mapped onto
    pub(crate) safety_factor: f64,
}

impl Settings {
    pub(crate) fn build() -> color_eyre::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("export.results_directory", "../results")?
            .set_default("export.file_name", default_file_name())?
            .set_default("export.safety_factor", SAFETY_FACTOR)?
            // The shipped defaults, and the overrides for the current run mode
            .add_source(File::with_name("../.config/default").required(false))
            .add_source(File::with_name(&format!("../.config/{}", run_mode)).required(false))
            // e.g. `KITE_EXPORT__SAFETY_FACTOR=0.8`
            .add_source(Environment::with_prefix("KITE").separator("__"))
            .build()?;

        let settings: Self = s
            .try_deserialize()
            .map_err(|e| eyre!(format!("Failed to deserialize the settings: {:?}", e)))?;
        if !(settings.export.safety_factor > 0_f64 && settings.export.safety_factor <= 1_f64) {
            return Err(eyre!(
                "The safety factor must lie in (0, 1], found {}",
                settings.export.safety_factor
            ));
        }
        Ok(settings)
    }

    /// The default location of the export
    pub(crate) fn output_path(&self) -> PathBuf {
        self.export.results_directory.join(&self.export.file_name)
    }
}

/// `config` with the extension of the container format this binary writes
fn default_file_name() -> String {
    format!("config.{}", FILE_EXTENSION)
}
