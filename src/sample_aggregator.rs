//! Running speed statistics and the row format handed to the logging sink.

use crate::error::NavError;
use crate::listener::Timestamp;
use serde::{Deserialize, Serialize};

/// Speed samples collected since recording started. Negative readings
/// (the sensor's way of saying "unknown") count as standing still.
#[derive(Debug, Clone, Default)]
pub struct SpeedAggregator {
    count: usize,
    sum: f64,
    last: Option<f64>,
}

impl SpeedAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamps and folds in `raw`, returning the updated mean.
    pub fn record_speed(&mut self, raw: f64) -> f64 {
        let speed = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        self.count += 1;
        self.sum += speed;
        self.last = Some(speed);
        self.sum / self.count as f64
    }

    pub fn average(&self) -> Result<f64, NavError> {
        if self.count == 0 {
            return Err(NavError::NoSamples);
        }
        Ok(self.sum / self.count as f64)
    }

    pub fn latest(&self) -> Option<f64> {
        self.last
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One recorded fix, as the logging sink receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub timestamp: Timestamp,
    pub longitude: f64,
    pub latitude: f64,
    pub speed: f64,
    pub avg_speed: f64,
}

/// Where recorded rows go. Implementations decide the storage format.
pub trait SampleSink {
    fn append_sample(&mut self, row: &SampleRow) -> Result<(), NavError>;
}

/// Keeps rows in memory.
impl SampleSink for Vec<SampleRow> {
    fn append_sample(&mut self, row: &SampleRow) -> Result<(), NavError> {
        self.push(row.clone());
        Ok(())
    }
}

/// Throws rows away, for runs that only care about the audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl SampleSink for DiscardSink {
    fn append_sample(&mut self, _row: &SampleRow) -> Result<(), NavError> {
        Ok(())
    }
}
