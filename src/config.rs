use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use crate::data::clock::step_from_secs;
use crate::render::style::ChartStyle;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub series: SeriesConfig,
    pub timer: TimerConfig,
    pub source: SourceConfig,
    pub chart: ChartStyle,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    pub actual_capacity: usize,
    pub predicted_capacity: usize,
    /// Virtual clock step, decoupled from the wall-clock timer interval.
    pub step_secs: f64,
    pub origin: String,
    pub seed: Vec<f64>,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            actual_capacity: 75,
            predicted_capacity: 25,
            step_secs: 0.5,
            origin: "05:00:01".to_string(),
            seed: vec![25.0, 27.0, 30.0, 28.0, 32.0, 35.0, 38.0, 40.0, 42.0, 45.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub interval_ms: u64,
    pub max_ticks: Option<u64>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            max_ticks: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Random,
    Replay,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub min: f64,
    pub max: f64,
    pub rng_seed: Option<u64>,
    /// Values played back when `kind = "replay"`.
    pub values: Vec<f64>,
    pub cycle: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Random,
            min: 10.0,
            max: 50.0,
            rng_seed: None,
            values: Vec::new(),
            cycle: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub csv_logging: bool,
    pub csv_log_path: String,
    /// Where figure documents go; stdout when unset.
    pub figure_path: Option<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            csv_logging: false,
            csv_log_path: "ticks.csv".to_string(),
            figure_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: String,
    pub max_ticks: Option<u64>,
    pub figure_path: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Missing file means defaults; a present but broken file is an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            tracing::warn!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of the file.
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if env.max_ticks.is_some() {
            self.timer.max_ticks = env.max_ticks;
        }
        if env.figure_path.is_some() {
            self.monitoring.figure_path = env.figure_path.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.series.actual_capacity == 0 {
            bail!("series.actual_capacity must be at least 1");
        }
        if self.series.predicted_capacity == 0 {
            bail!("series.predicted_capacity must be at least 1");
        }
        step_from_secs(self.series.step_secs).context("Invalid series.step_secs")?;
        if self.timer.interval_ms == 0 {
            bail!("timer.interval_ms must be at least 1");
        }
        if !self.source.min.is_finite() || !self.source.max.is_finite() {
            bail!("source.min and source.max must be finite");
        }
        if self.source.min > self.source.max {
            bail!(
                "source.min ({}) is greater than source.max ({})",
                self.source.min,
                self.source.max
            );
        }
        if self.source.kind == SourceKind::Replay && self.source.values.is_empty() {
            bail!("source.values must not be empty for a replay source");
        }
        Ok(())
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let max_ticks = match std::env::var("DASHBOARD_MAX_TICKS") {
            Ok(raw) => Some(
                raw.parse()
                    .with_context(|| format!("DASHBOARD_MAX_TICKS is not a number: {}", raw))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            config_path: std::env::var("DASHBOARD_CONFIG")
                .unwrap_or_else(|_| "config.toml".to_string()),
            max_ticks,
            figure_path: std::env::var("DASHBOARD_FIGURE_PATH").ok(),
        })
    }
}
