use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use crate::data::types::Sample;

/// Anything that can produce the next price sample.
pub trait SampleSource {
    fn name(&self) -> &str;

    fn next_sample(&mut self) -> Result<Sample, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Sample source unavailable: {0}")]
    Unavailable(String),

    #[error("Sample source exhausted")]
    Exhausted,

    #[error("Sample source produced a non-finite value: {0}")]
    NonFinite(f64),
}

/// Simulated feed: uniform values in `[min, max]`.
pub struct RandomSource {
    min: f64,
    max: f64,
    rng: StdRng,
}

impl RandomSource {
    pub fn new(min: f64, max: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!("Random price source initialized in [{:.2}, {:.2}]", min, max);

        Self { min, max, rng }
    }
}

impl SampleSource for RandomSource {
    fn name(&self) -> &str {
        "random"
    }

    fn next_sample(&mut self) -> Result<Sample, SourceError> {
        if self.min > self.max {
            return Err(SourceError::Unavailable(format!(
                "empty range [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(self.rng.gen_range(self.min..=self.max))
    }
}

/// Plays back a fixed list of values, optionally wrapping around.
pub struct ReplaySource {
    values: Vec<Sample>,
    position: usize,
    cycle: bool,
}

impl ReplaySource {
    pub fn new(values: Vec<Sample>, cycle: bool) -> Self {
        Self {
            values,
            position: 0,
            cycle,
        }
    }
}

impl SampleSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    fn next_sample(&mut self) -> Result<Sample, SourceError> {
        if self.values.is_empty() {
            return Err(SourceError::Exhausted);
        }

        if self.position >= self.values.len() {
            if !self.cycle {
                return Err(SourceError::Exhausted);
            }
            self.position = 0;
        }

        let value = self.values[self.position];
        self.position += 1;
        Ok(value)
    }
}
