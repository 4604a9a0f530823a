use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One price observation. Unconstrained in sign, but always finite once it
/// has passed through the updater.
pub type Sample = f64;

/// Serialized form of every emitted timestamp. The date is kept so series
/// stay ordered across midnight; axes format ticks separately.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub timestamp: NaiveDateTime,
    pub value: Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries {
    pub name: String,
    pub points: Vec<Point>,
}

impl LabeledSeries {
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn values(&self) -> Vec<Sample> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Output of one update cycle, handed to every renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub actual: LabeledSeries,
    pub predicted: LabeledSeries,
}
