//! Time-domain summary statistics

use crate::error::{require_len, Result};
use serde::{Deserialize, Serialize};

/// Root-mean-square level: sqrt((1/N)·Σ x[n]²)
///
/// An empty sequence is rejected rather than dividing by zero.
pub fn rms(samples: &[f64]) -> Result<f64> {
    require_len(samples.len(), 1)?;

    let sum_of_squares: f64 = samples.iter().map(|&x| x * x).sum();
    Ok((sum_of_squares / samples.len() as f64).sqrt())
}

/// RMS level in dB relative to `reference` (full scale = 1.0)
pub fn rms_db(samples: &[f64], reference: f64) -> Result<f64> {
    let level = rms(samples)?;
    Ok(20.0 * (level.max(1e-10) / reference).log10())
}

/// Largest absolute sample value
pub fn peak(samples: &[f64]) -> Result<f64> {
    require_len(samples.len(), 1)?;
    Ok(samples.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs())))
}

/// Before/after RMS pair for a processing stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RmsComparison {
    pub before: f64,
    pub after: f64,
}

impl RmsComparison {
    pub fn measure(before: &[f64], after: &[f64]) -> Result<Self> {
        Ok(Self {
            before: rms(before)?,
            after: rms(after)?,
        })
    }

    /// after / before (1.0 = unchanged)
    pub fn ratio(&self) -> f64 {
        if self.before == 0.0 {
            return if self.after == 0.0 { 1.0 } else { f64::INFINITY };
        }
        self.after / self.before
    }

    /// Level change in dB (negative = attenuation)
    pub fn change_db(&self) -> f64 {
        20.0 * self.ratio().max(1e-10).log10()
    }

    /// Relative deviation |after - before| / before
    pub fn relative_change(&self) -> f64 {
        (self.ratio() - 1.0).abs()
    }
}
