//! Window functions for spectral analysis
//!
//! Symmetric windows span [0, M-1]; periodic windows are the first M points
//! of an (M+1)-point symmetric window, which is the form used for STFT frames.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    /// Mainlobe width: 8π/M, Sidelobe attenuation: ~44 dB
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    /// Mainlobe width: 8π/M, Sidelobe attenuation: ~53 dB
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    /// Mainlobe width: 12π/M, Sidelobe attenuation: ~74 dB
    Blackman,

    /// Rectangular window (no windowing)
    Rectangular,
}

/// Whether the window is closed (filter design) or periodic (FFT framing)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    Symmetric,
    Periodic,
}

impl WindowType {
    /// Evaluate the window at `n` over a span of `denom` (M-1 or M)
    fn value(&self, n: usize, denom: f64) -> f64 {
        let angle = 2.0 * PI * n as f64 / denom;
        match self {
            WindowType::Hann => 0.5 - 0.5 * angle.cos(),
            WindowType::Hamming => 0.54 - 0.46 * angle.cos(),
            WindowType::Blackman => 0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos(),
            WindowType::Rectangular => 1.0,
        }
    }

    /// Coherent gain: mean of the window coefficients
    pub fn coherent_gain(&self, length: usize) -> f64 {
        if length == 0 {
            return 0.0;
        }
        generate_window(*self, length).iter().sum::<f64>() / length as f64
    }
}

/// Generate symmetric window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    generate_window_with(window_type, length, Symmetry::Symmetric)
}

/// Generate periodic window coefficients (DFT-even)
pub fn generate_periodic_window(window_type: WindowType, length: usize) -> Vec<f64> {
    generate_window_with(window_type, length, Symmetry::Periodic)
}

pub fn generate_window_with(window_type: WindowType, length: usize, symmetry: Symmetry) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }

    let denom = match symmetry {
        Symmetry::Symmetric => (length - 1) as f64,
        Symmetry::Periodic => length as f64,
    };

    (0..length).map(|n| window_type.value(n, denom)).collect()
}
