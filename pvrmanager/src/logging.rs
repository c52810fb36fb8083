use anyhow::Result;
use pvrconfig::Config;
use tracing_log::LogTracer;
use tracing_subscriber::{Registry, filter::LevelFilter, fmt, layer::SubscriberExt};

/// Level filter configured under `host.logger.min_level`, INFO when the
/// value is missing or not a level name.
pub fn configured_level(config: &Config) -> LevelFilter {
    config
        .get_log_min_level()
        .ok()
        .and_then(|level| level.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO)
}

/// Installs the global tracing subscriber and routes `log` records into it.
///
/// Fails if a global subscriber or logger is already installed.
pub fn init_logging(config: &Config) -> Result<()> {
    let level = configured_level(config);
    let enable_console = config.get_log_enable_console().unwrap_or(true);

    let console = enable_console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    let subscriber = Registry::default().with(level).with(console);

    LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(%level, enable_console, "Logging initialised");
    Ok(())
}
