use color_eyre::eyre::eyre;
use std::path::Path;
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Export progress is printed to the terminal. Every event of the run, including the complex-flag
/// and disorder warnings, is also appended as JSON to `log.log` in the directory holding the default
/// export. `RUST_LOG` overrides `level`.
pub(crate) fn get_subscriber(
    level: super::LogLevel,
    results_directory: &Path,
) -> (
    impl Subscriber + Send + Sync,
    tracing_appender::non_blocking::WorkerGuard,
) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let fmt_layer = tracing_subscriber::fmt::Layer::new()
        .with_writer(console::Term::stdout)
        .without_time();

    let appender = tracing_appender::rolling::never(results_directory, "log.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    (
        Registry::default().with(env_filter).with(fmt_layer).with(
            tracing_subscriber::fmt::Layer::new()
                .with_writer(non_blocking)
                .json(),
        ),
        guard,
    )
}

pub(crate) fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> color_eyre::Result<()> {
    LogTracer::init().map_err(|e| eyre!("Failed to initialise logger: {}", e))?;
    set_global_default(subscriber).map_err(|e| eyre!("Failed to set a subscriber: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::get_subscriber;
    use crate::app::LogLevel;

    #[test]
    fn events_are_logged_as_json_in_the_results_directory() {
        let directory =
            std::env::temp_dir().join(format!("kite-export-telemetry-{}", std::process::id()));
        std::fs::create_dir_all(&directory).unwrap();
        let (subscriber, guard) = get_subscriber(LogLevel::Info, &directory);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Exporting as complex because a magnetic field is applied");
        });
        drop(guard);

        let log = std::fs::read_to_string(directory.join("log.log")).unwrap();
        std::fs::remove_dir_all(&directory).unwrap();
        let line = log
            .lines()
            .find(|line| line.contains("magnetic field"))
            .unwrap();
        assert!(line.starts_with('{'));
        assert!(line.contains("\"level\":\"WARN\""));
    }
}
