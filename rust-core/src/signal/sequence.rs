//! Sample sequence carrying its sample rate
//!
//! The sample rate travels with the samples so that every downstream stage
//! receives the value the sequence was generated with.

use crate::error::{DspError, Result};

/// Fixed-length sequence of samples at a known sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Signal {
    /// Wrap existing samples
    ///
    /// # Arguments
    /// * `samples` - Amplitude values x[n]
    /// * `sample_rate` - Sample rate in Hz (must be > 0)
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DspError::invalid_parameter(
                "sample_rate",
                "sample rate must be positive",
            ));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build a new signal at the same sample rate
    ///
    /// Used for stage outputs (e.g. filtered audio) so the rate is never
    /// re-entered by hand.
    pub fn with_samples(&self, samples: Vec<f64>) -> Self {
        Self {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Nyquist frequency (0.5 × sample rate) in Hz
    pub fn nyquist(&self) -> f64 {
        0.5 * self.sample_rate as f64
    }

    /// Length in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Time of each sample in seconds: t[n] = n / sr
    pub fn time_axis(&self) -> Vec<f64> {
        let sr = self.sample_rate as f64;
        (0..self.samples.len()).map(|n| n as f64 / sr).collect()
    }
}
