use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use crate::data::source::SampleSource;
use crate::engine::updater::RollingSeriesUpdater;
use crate::monitoring::logger::CsvLogger;
use crate::render::Renderer;

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub skipped: u64,
    pub render_errors: u64,
}

/// Drives `RollingSeriesUpdater::tick` from a periodic timer. Invocations
/// never overlap: each tick runs to completion before the next is awaited.
pub struct Scheduler {
    updater: RollingSeriesUpdater,
    source: Box<dyn SampleSource + Send>,
    renderers: Vec<Box<dyn Renderer + Send>>,
    csv_logger: Option<CsvLogger>,
    interval: Duration,
    max_ticks: Option<u64>,
}

impl Scheduler {
    pub fn new(
        updater: RollingSeriesUpdater,
        source: Box<dyn SampleSource + Send>,
        interval: Duration,
    ) -> Self {
        Self {
            updater,
            source,
            renderers: Vec::new(),
            csv_logger: None,
            interval,
            max_ticks: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer + Send>) -> Self {
        self.renderers.push(renderer);
        self
    }

    pub fn with_csv_logger(mut self, logger: CsvLogger) -> Self {
        self.csv_logger = Some(logger);
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    #[cfg(test)]
    pub fn updater(&self) -> &RollingSeriesUpdater {
        &self.updater
    }

    /// Run until `max_ticks` attempts have been made, or forever.
    #[cfg(test)]
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Like `run`, but also stops as soon as `shutdown` resolves.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        let mut summary = RunSummary::default();
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            "Scheduler started: every {:?} from source '{}'",
            self.interval,
            self.source.name()
        );

        // Initial chart before the first update.
        match self.updater.snapshot() {
            Ok(initial) => {
                for renderer in self.renderers.iter_mut() {
                    if let Err(e) = renderer.render(&initial) {
                        summary.render_errors += 1;
                        error!("Renderer '{}' failed on initial frame: {}", renderer.name(), e);
                    }
                }
            }
            Err(e) => warn!("Initial frame unavailable: {}", e),
        }

        let mut attempts = 0u64;
        loop {
            if let Some(max) = self.max_ticks {
                if attempts >= max {
                    break;
                }
            }

            tokio::select! {
                _ = timer.tick() => {}
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} ticks", self.updater.ticks());
                    break;
                }
            }

            attempts += 1;
            self.step(&mut summary);
        }

        info!(
            "Scheduler stopped: {} ticks, {} skipped, {} render errors",
            summary.ticks, summary.skipped, summary.render_errors
        );
        Ok(summary)
    }

    fn step(&mut self, summary: &mut RunSummary) {
        let frame = match self.updater.tick(self.source.as_mut()) {
            Ok(frame) => frame,
            Err(e) => {
                summary.skipped += 1;
                warn!("{}", e);
                if let Some(logger) = &self.csv_logger {
                    if let Err(log_err) = logger.log_event(&e.to_string()) {
                        warn!("CSV logging failed: {}", log_err);
                    }
                }
                return;
            }
        };
        summary.ticks += 1;
        if frame.predicted.is_empty() {
            debug!(
                "Rendering tick {}: {} actual points, no predictions yet",
                frame.tick,
                frame.actual.len()
            );
        } else {
            debug!(
                "Rendering tick {}: {} actual, {} predicted points",
                frame.tick,
                frame.actual.len(),
                frame.predicted.len()
            );
        }

        if let Some(logger) = &self.csv_logger {
            if let Err(e) = logger.log_tick(&self.updater) {
                warn!("CSV logging failed: {}", e);
            }
        }

        for renderer in self.renderers.iter_mut() {
            if let Err(e) = renderer.render(&frame) {
                summary.render_errors += 1;
                error!("Renderer '{}' failed on tick {}: {}", renderer.name(), frame.tick, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::clock::VirtualClock;
    use crate::data::source::ReplaySource;
    use crate::data::types::Frame;
    use std::sync::{Arc, Mutex};

    struct RecordingRenderer {
        frames: Arc<Mutex<Vec<Frame>>>,
    }

    impl Renderer for RecordingRenderer {
        fn name(&self) -> &str {
            "recording"
        }

        fn render(&mut self, frame: &Frame) -> Result<()> {
            self.frames.lock().unwrap().push(frame.clone());
            Ok(())
        }
    }

    struct BrokenRenderer;

    impl Renderer for BrokenRenderer {
        fn name(&self) -> &str {
            "broken"
        }

        fn render(&mut self, _frame: &Frame) -> Result<()> {
            anyhow::bail!("display gone")
        }
    }

    fn updater() -> RollingSeriesUpdater {
        let clock = VirtualClock::from_config("05:00:01", 0.5).unwrap();
        RollingSeriesUpdater::new(5, 2, &[1.0, 2.0], clock)
    }

    #[tokio::test]
    async fn test_runs_max_ticks_and_renders_each() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let source = ReplaySource::new(vec![3.0, 4.0, 5.0], true);

        let mut scheduler = Scheduler::new(updater(), Box::new(source), Duration::from_millis(1))
            .with_renderer(Box::new(RecordingRenderer {
                frames: frames.clone(),
            }))
            .with_max_ticks(Some(6));

        let summary = scheduler.run().await.unwrap();
        assert_eq!(summary.ticks, 6);
        assert_eq!(summary.skipped, 0);
        assert_eq!(scheduler.updater().ticks(), 6);
        assert_eq!(scheduler.updater().actual().len(), 5);
        assert_eq!(scheduler.updater().predicted().len(), 2);

        // Initial snapshot plus one frame per tick.
        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 7);
        assert_eq!(frames[0].tick, 0);
        assert_eq!(frames[6].tick, 6);
    }

    #[tokio::test]
    async fn test_source_failures_skip_ticks() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let source = ReplaySource::new(vec![3.0, 4.0], false);

        let mut scheduler = Scheduler::new(updater(), Box::new(source), Duration::from_millis(1))
            .with_renderer(Box::new(RecordingRenderer {
                frames: frames.clone(),
            }))
            .with_max_ticks(Some(5));

        let summary = scheduler.run().await.unwrap();
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.skipped, 3);
        assert_eq!(scheduler.updater().actual().to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(frames.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_renderer_errors_do_not_stop_loop() {
        let source = ReplaySource::new(vec![3.0], true);
        let mut scheduler = Scheduler::new(updater(), Box::new(source), Duration::from_millis(1))
            .with_renderer(Box::new(BrokenRenderer))
            .with_max_ticks(Some(3));

        let summary = scheduler.run().await.unwrap();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.render_errors, 4);
    }

    #[tokio::test]
    async fn test_shutdown_stops_unbounded_run() {
        let source = ReplaySource::new(vec![3.0], true);
        let mut scheduler = Scheduler::new(updater(), Box::new(source), Duration::from_millis(1));

        let summary = scheduler
            .run_until(tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap();

        assert!(summary.ticks > 0);
        assert_eq!(summary.ticks, scheduler.updater().ticks());
    }
}
