use anyhow::Result;
use chrono::NaiveDateTime;
use crate::config::SeriesConfig;
use crate::data::clock::{ClockError, VirtualClock};
use crate::data::source::{SampleSource, SourceError};
use crate::data::types::{Frame, LabeledSeries, Point, Sample};
use crate::data::window::RollingWindow;
use tracing::{debug, info};

pub const ACTUAL_SERIES_NAME: &str = "Actual Prices";
pub const PREDICTED_SERIES_NAME: &str = "Predicted Prices";

/// Lifecycle of the predicted window. The bulk fill happens inside the single
/// tick that moves it from `Empty` to `Rolling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionPhase {
    Empty,
    Rolling,
}

impl std::fmt::Display for PredictionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictionPhase::Empty => write!(f, "empty"),
            PredictionPhase::Rolling => write!(f, "rolling"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Tick skipped: {0}")]
    Source(#[from] SourceError),

    #[error("Tick skipped: {0}")]
    Clock(#[from] ClockError),
}

/// Owns the actual and predicted windows plus the virtual clock.
#[derive(Debug, Clone)]
pub struct RollingSeriesUpdater {
    actual: RollingWindow<Sample>,
    predicted: RollingWindow<Sample>,
    clock: VirtualClock,
    ticks: u64,
}

impl RollingSeriesUpdater {
    pub fn new(
        actual_capacity: usize,
        predicted_capacity: usize,
        seed: &[Sample],
        clock: VirtualClock,
    ) -> Self {
        Self {
            actual: RollingWindow::with_seed(actual_capacity, seed.iter().copied()),
            predicted: RollingWindow::new(predicted_capacity),
            clock,
            ticks: 0,
        }
    }

    pub fn from_config(config: &SeriesConfig) -> Result<Self> {
        let clock = VirtualClock::from_config(&config.origin, config.step_secs)?;
        let updater = Self::new(
            config.actual_capacity,
            config.predicted_capacity,
            &config.seed,
            clock,
        );

        info!(
            "Series updater initialized: {} seed values, capacity {}/{}, step {}s",
            updater.actual.len(),
            config.actual_capacity,
            config.predicted_capacity,
            config.step_secs
        );
        Ok(updater)
    }

    pub fn actual(&self) -> &RollingWindow<Sample> {
        &self.actual
    }

    pub fn predicted(&self) -> &RollingWindow<Sample> {
        &self.predicted
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn phase(&self) -> PredictionPhase {
        if self.predicted.is_empty() {
            PredictionPhase::Empty
        } else {
            PredictionPhase::Rolling
        }
    }

    /// Run one update cycle.
    ///
    /// Every sample the tick needs is drawn, and every timestamp computed,
    /// before anything is mutated, so a failing source or an exhausted clock
    /// leaves the series and the clock exactly as they were. Timestamps are
    /// labelled from the post-append contents, anchored at the clock value
    /// the tick started with.
    pub fn tick(&mut self, source: &mut dyn SampleSource) -> Result<Frame, UpdateError> {
        let new_actual = draw(source)?;

        // Eviction keeps a full window full.
        let actual_full_after =
            self.actual.is_full() || self.actual.len() + 1 >= self.actual.capacity();
        let new_predicted = if actual_full_after {
            let count = match self.phase() {
                PredictionPhase::Empty => self.predicted.capacity(),
                PredictionPhase::Rolling => 1,
            };
            (0..count)
                .map(|_| draw(source))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        let actual_len = (self.actual.len() + 1).min(self.actual.capacity());
        let predicted_len =
            (self.predicted.len() + new_predicted.len()).min(self.predicted.capacity());
        let anchor = self.clock.now();
        let (actual_stamps, predicted_stamps) = self.stamps(anchor, actual_len, predicted_len)?;

        self.clock.advance()?;
        self.actual.push(new_actual);

        if !new_predicted.is_empty() {
            if self.phase() == PredictionPhase::Empty {
                info!(
                    "Actual window full at tick {}, filling {} predicted values",
                    self.ticks + 1,
                    new_predicted.len()
                );
            }
            // A full predicted window evicts one head per appended value.
            self.predicted.extend(new_predicted);
        }

        self.ticks += 1;
        debug!(
            "Tick {}: actual={} predicted={} last={:.2}",
            self.ticks,
            self.actual.len(),
            self.predicted.len(),
            new_actual
        );

        Ok(self.frame(actual_stamps, predicted_stamps))
    }

    /// Frame for the current contents without advancing anything.
    pub fn snapshot(&self) -> Result<Frame, UpdateError> {
        let (actual_stamps, predicted_stamps) =
            self.stamps(self.clock.now(), self.actual.len(), self.predicted.len())?;
        Ok(self.frame(actual_stamps, predicted_stamps))
    }

    /// Actual stamps start at `anchor`; predicted stamps continue one step
    /// after the last actual one.
    fn stamps(
        &self,
        anchor: NaiveDateTime,
        actual_len: usize,
        predicted_len: usize,
    ) -> Result<(Vec<NaiveDateTime>, Vec<NaiveDateTime>), ClockError> {
        let actual_stamps = self.clock.timestamps_from(anchor, actual_len)?;
        if predicted_len == 0 {
            return Ok((actual_stamps, Vec::new()));
        }

        let last_actual = actual_stamps.last().copied().unwrap_or(anchor);
        let first_predicted = last_actual
            .checked_add_signed(self.clock.step())
            .ok_or(ClockError::Overflow)?;
        let predicted_stamps = self.clock.timestamps_from(first_predicted, predicted_len)?;
        Ok((actual_stamps, predicted_stamps))
    }

    fn frame(&self, actual_stamps: Vec<NaiveDateTime>, predicted_stamps: Vec<NaiveDateTime>) -> Frame {
        Frame {
            tick: self.ticks,
            actual: LabeledSeries::new(ACTUAL_SERIES_NAME, zip_points(actual_stamps, &self.actual)),
            predicted: LabeledSeries::new(
                PREDICTED_SERIES_NAME,
                zip_points(predicted_stamps, &self.predicted),
            ),
        }
    }
}

fn draw(source: &mut dyn SampleSource) -> Result<Sample, SourceError> {
    let value = source.next_sample()?;
    if !value.is_finite() {
        return Err(SourceError::NonFinite(value));
    }
    Ok(value)
}

fn zip_points(stamps: Vec<NaiveDateTime>, values: &RollingWindow<Sample>) -> Vec<Point> {
    stamps
        .into_iter()
        .zip(values.iter())
        .map(|(timestamp, value)| Point {
            timestamp,
            value: *value,
        })
        .collect()
}
