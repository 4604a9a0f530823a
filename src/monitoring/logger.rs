use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use crate::data::types::TIMESTAMP_FORMAT;
use crate::engine::updater::RollingSeriesUpdater;

const HEADER: &str = "tick,clock,last_actual,actual_len,predicted_len,phase";

pub struct CsvLogger {
    log_path: String,
}

impl CsvLogger {
    pub fn new(log_path: String) -> Result<Self> {
        // Create CSV file with headers if it doesn't exist
        if !std::path::Path::new(&log_path).exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)?;

            writeln!(file, "{}", HEADER)?;
        }

        Ok(Self { log_path })
    }

    /// Log the updater state after a successful tick
    pub fn log_tick(&self, updater: &RollingSeriesUpdater) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.log_path)?;

        let last_str = match updater.actual().back() {
            Some(v) => format!("{:.4}", v),
            None => "".to_string(),
        };

        writeln!(
            file,
            "{},{},{},{},{},{}",
            updater.ticks(),
            updater.clock().now().format(TIMESTAMP_FORMAT),
            last_str,
            updater.actual().len(),
            updater.predicted().len(),
            updater.phase()
        )?;

        Ok(())
    }

    /// Log a free-form event, e.g. a skipped tick
    pub fn log_event(&self, event: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.log_path)?;

        writeln!(
            file,
            "{},EVENT,{},,,",
            Utc::now().to_rfc3339(),
            event.replace(',', ";")
        )?;

        Ok(())
    }
}
