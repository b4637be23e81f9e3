//! Phase spectrum and group delay
//!
//! Group delay τ(f) = -dφ/df / (2π) estimates how long each frequency
//! component is delayed. For a signal (rather than a system) it indicates how
//! reliable the timing estimate is at each frequency; comparing a clean and a
//! processed recording exposes frequency-dependent timing distortion.

use super::fft::fft;
use crate::error::{require_len, DspError, Result};
use crate::filters::savgol::savgol_filter;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Phase of the one-sided spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSpectrum {
    /// Bin frequencies in Hz
    pub frequencies: Vec<f64>,

    /// Phase in radians (NaN where masked)
    pub phase: Vec<f64>,

    /// |X[k]|
    pub magnitude: Vec<f64>,
}

/// Group delay per frequency bin
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDelay {
    /// Bin frequencies in Hz
    pub frequencies: Vec<f64>,

    /// Delay in seconds
    pub delay_secs: Vec<f64>,
}

/// Savitzky-Golay settings applied to the unwrapped phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSmoothing {
    /// Odd window length in bins
    pub window_length: usize,

    pub polyorder: usize,
}

impl Default for PhaseSmoothing {
    fn default() -> Self {
        Self {
            window_length: 101,
            polyorder: 3,
        }
    }
}

/// Remove 2π jumps: whenever consecutive values differ by more than π the
/// remainder is shifted by the multiple of 2π that brings the step into [-π, π).
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first() else {
        return unwrapped;
    };
    unwrapped.push(first);

    let mut correction = 0.0;
    for pair in phase.windows(2) {
        let step = pair[1] - pair[0];
        let mut wrapped = (step + PI).rem_euclid(2.0 * PI) - PI;
        if wrapped == -PI && step > 0.0 {
            wrapped = PI;
        }
        if step.abs() >= PI {
            correction += wrapped - step;
        }
        unwrapped.push(pair[1] + correction);
    }

    unwrapped
}

/// Derivative of `y` with respect to `x`
///
/// Second-order central differences inside, one-sided differences at the ends.
/// Spacing of `x` may be uneven.
pub fn gradient(y: &[f64], x: &[f64]) -> Result<Vec<f64>> {
    if y.len() != x.len() {
        return Err(DspError::invalid_parameter(
            "x",
            format!("coordinate length {} does not match {}", x.len(), y.len()),
        ));
    }
    let n = y.len();
    require_len(n, 2)?;

    let mut grad = vec![0.0; n];
    grad[0] = (y[1] - y[0]) / (x[1] - x[0]);
    grad[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let hd = x[i] - x[i - 1];
        let hs = x[i + 1] - x[i];
        grad[i] = (hd * hd * y[i + 1] + (hs * hs - hd * hd) * y[i] - hs * hs * y[i - 1])
            / (hs * hd * (hd + hs));
    }

    Ok(grad)
}

/// Phase spectrum of a signal
///
/// # Arguments
/// * `signal` - Time-domain signal
/// * `unwrap` - Remove 2π discontinuities
/// * `mask_threshold` - Set phase to NaN where |X[k]| is below this value
pub fn phase_spectrum(
    signal: &Signal,
    unwrap: bool,
    mask_threshold: Option<f64>,
) -> Result<PhaseSpectrum> {
    let spectrum = fft(signal)?;
    let magnitude = spectrum.magnitude();

    let mut phase = spectrum.phase();
    if unwrap {
        phase = unwrap_phase(&phase);
    }

    if let Some(threshold) = mask_threshold {
        for (p, &m) in phase.iter_mut().zip(&magnitude) {
            if m < threshold {
                *p = f64::NAN;
            }
        }
    }

    Ok(PhaseSpectrum {
        frequencies: spectrum.frequencies(),
        phase,
        magnitude,
    })
}

/// Group delay of a signal from its unwrapped phase
///
/// # Arguments
/// * `signal` - Time-domain signal
/// * `smoothing` - Optional Savitzky-Golay smoothing of the phase before
///   differentiation (reduces noise in the derivative)
pub fn group_delay(signal: &Signal, smoothing: Option<PhaseSmoothing>) -> Result<GroupDelay> {
    let spectrum = fft(signal)?;
    let frequencies = spectrum.frequencies();

    let mut phase = unwrap_phase(&spectrum.phase());
    if let Some(smooth) = smoothing {
        phase = savgol_filter(&phase, smooth.window_length, smooth.polyorder)?;
    }

    let delay_secs = gradient(&phase, &frequencies)?
        .into_iter()
        .map(|dphi_df| -dphi_df / (2.0 * PI))
        .collect();

    Ok(GroupDelay {
        frequencies,
        delay_secs,
    })
}
