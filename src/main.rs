mod config;
mod data;
mod engine;
mod monitoring;
mod render;

use anyhow::Result;
use config::{Config, EnvConfig, SourceKind};
use data::source::{RandomSource, ReplaySource, SampleSource};
use engine::scheduler::Scheduler;
use engine::updater::RollingSeriesUpdater;
use monitoring::logger::CsvLogger;
use render::figure::FigureRenderer;
use render::Renderer;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Price dashboard starting...");

    // Load configuration
    let env_config = EnvConfig::load()?;
    tracing::info!("Loading configuration from {}", env_config.config_path);
    let mut config = Config::load_or_default(&env_config.config_path)?;
    config.apply_env(&env_config);
    config.validate()?;

    tracing::info!(
        "Windows: actual={} predicted={}, step {}s, timer {}ms",
        config.series.actual_capacity,
        config.series.predicted_capacity,
        config.series.step_secs,
        config.timer.interval_ms
    );

    let updater = RollingSeriesUpdater::from_config(&config.series)?;

    let source: Box<dyn SampleSource + Send> = match config.source.kind {
        SourceKind::Random => Box::new(RandomSource::new(
            config.source.min,
            config.source.max,
            config.source.rng_seed,
        )),
        SourceKind::Replay => Box::new(ReplaySource::new(
            config.source.values.clone(),
            config.source.cycle,
        )),
    };

    let renderer: Box<dyn Renderer + Send> = match &config.monitoring.figure_path {
        Some(path) => {
            tracing::info!("Writing figures to {}", path);
            Box::new(FigureRenderer::file(config.chart.clone(), path)?)
        }
        None => Box::new(FigureRenderer::stdout(config.chart.clone())),
    };

    let mut scheduler = Scheduler::new(
        updater,
        source,
        Duration::from_millis(config.timer.interval_ms),
    )
    .with_renderer(renderer)
    .with_max_ticks(config.timer.max_ticks);

    if config.monitoring.csv_logging {
        tracing::info!("CSV tick log: {}", config.monitoring.csv_log_path);
        scheduler = scheduler.with_csv_logger(CsvLogger::new(config.monitoring.csv_log_path.clone())?);
    }

    let summary = scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!(
        "Shutting down after {} ticks ({} skipped)",
        summary.ticks,
        summary.skipped
    );

    Ok(())
}
