//! Butterworth low-pass design
//!
//! Analog prototype poles on the unit circle, frequency pre-warping, low-pass
//! scaling to the warped cutoff, then the bilinear transform (fs = 2, so that
//! normalized frequency 1.0 is Nyquist). Coefficients come out in the
//! standard b/a difference-equation form with a[0] = 1.

use crate::error::{DspError, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Digital filter coefficients for
/// a[0]·y[n] = Σ b[k]·x[n-k] - Σ_{k≥1} a[k]·y[n-k]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    /// Numerator (feed-forward) coefficients
    pub b: Vec<f64>,

    /// Denominator (feedback) coefficients
    pub a: Vec<f64>,
}

impl TransferFunction {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Self {
        Self { b, a }
    }

    /// Filter order (highest delay in either polynomial)
    pub fn order(&self) -> usize {
        self.b.len().max(self.a.len()).saturating_sub(1)
    }

    /// Gain at DC: H(e^j0) = Σb / Σa
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }
}

/// Zeros, poles and gain of a digital filter
#[derive(Debug, Clone)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Zpk {
    /// Expand into polynomial coefficients
    pub fn to_transfer_function(&self) -> TransferFunction {
        let b = poly(&self.zeros).iter().map(|c| self.gain * c.re).collect();
        let a = poly(&self.poles).iter().map(|c| c.re).collect();
        TransferFunction { b, a }
    }
}

/// A filter-design provider: given (order, normalized cutoff) return
/// low-pass digital coefficients.
///
/// `normalized_cutoff` is in units of Nyquist and must lie in (0, 1).
pub trait LowpassDesign {
    fn design_lowpass(&self, order: usize, normalized_cutoff: f64) -> Result<TransferFunction>;
}

/// Maximally flat (Butterworth) design
#[derive(Debug, Clone, Copy, Default)]
pub struct Butterworth;

impl LowpassDesign for Butterworth {
    fn design_lowpass(&self, order: usize, normalized_cutoff: f64) -> Result<TransferFunction> {
        let zpk = butterworth_lowpass_zpk(order, normalized_cutoff)?;
        Ok(zpk.to_transfer_function())
    }
}

/// Low-pass filter specification in physical units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowpassSpec {
    /// Filter order (number of poles)
    pub order: usize,

    /// -3 dB cutoff frequency in Hz
    pub cutoff_hz: f64,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl LowpassSpec {
    pub fn new(order: usize, cutoff_hz: f64, sample_rate: u32) -> Self {
        Self {
            order,
            cutoff_hz,
            sample_rate,
        }
    }

    /// Nyquist frequency: 0.5 × sample rate
    pub fn nyquist(&self) -> f64 {
        0.5 * self.sample_rate as f64
    }

    /// Cutoff normalized by Nyquist, validated to lie strictly in (0, 1)
    pub fn normalized_cutoff(&self) -> Result<f64> {
        if self.sample_rate == 0 {
            return Err(DspError::invalid_parameter(
                "sample_rate",
                "sample rate must be positive",
            ));
        }

        let wn = self.cutoff_hz / self.nyquist();
        validate_normalized_cutoff(wn).map_err(|_| {
            DspError::InvalidConfiguration(format!(
                "cutoff {} Hz must lie in (0, {}) Hz (Nyquist for {} Hz)",
                self.cutoff_hz,
                self.nyquist(),
                self.sample_rate
            ))
        })?;
        Ok(wn)
    }

    /// Design with the Butterworth provider
    pub fn design(&self) -> Result<TransferFunction> {
        self.design_with(&Butterworth)
    }

    /// Design with any provider
    pub fn design_with<D: LowpassDesign>(&self, designer: &D) -> Result<TransferFunction> {
        validate_order(self.order)?;
        let wn = self.normalized_cutoff()?;

        debug!(
            order = self.order,
            cutoff_hz = self.cutoff_hz,
            normalized_cutoff = wn,
            "designing low-pass filter"
        );

        designer.design_lowpass(self.order, wn)
    }
}

/// Butterworth low-pass coefficients from physical units
pub fn butter_lowpass(order: usize, cutoff_hz: f64, sample_rate: u32) -> Result<TransferFunction> {
    LowpassSpec::new(order, cutoff_hz, sample_rate).design()
}

fn validate_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(DspError::invalid_parameter(
            "order",
            "filter order must be at least 1",
        ));
    }
    Ok(())
}

fn validate_normalized_cutoff(wn: f64) -> Result<()> {
    if !wn.is_finite() || wn <= 0.0 || wn >= 1.0 {
        return Err(DspError::InvalidConfiguration(format!(
            "normalized cutoff {} must lie strictly in (0, 1)",
            wn
        )));
    }
    Ok(())
}

/// Analog Butterworth prototype poles (cutoff = 1 rad/s)
///
/// s_k = exp(jπ(2k + n + 1) / (2n)), k = 0..n-1, all in the left half-plane
pub fn butterworth_prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order;
    (0..n)
        .map(|k| Complex64::from_polar(1.0, PI * (2 * k + n + 1) as f64 / (2 * n) as f64))
        .collect()
}

/// Digital Butterworth low-pass in zero/pole/gain form
pub fn butterworth_lowpass_zpk(order: usize, normalized_cutoff: f64) -> Result<Zpk> {
    validate_order(order)?;
    validate_normalized_cutoff(normalized_cutoff)?;

    // Pre-warp so the digital -3 dB point lands on the requested cutoff
    let fs = 2.0;
    let warped = 2.0 * fs * (PI * normalized_cutoff / fs).tan();

    // Low-pass to low-pass: scale poles, gain picks up warped^n (no zeros)
    let analog_poles: Vec<Complex64> = butterworth_prototype_poles(order)
        .into_iter()
        .map(|p| p * warped)
        .collect();
    let analog_gain = warped.powi(order as i32);

    // Bilinear transform: z = (2fs + s) / (2fs - s)
    let fs2 = Complex64::new(2.0 * fs, 0.0);
    let poles: Vec<Complex64> = analog_poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();

    // Zeros at infinity map to z = -1
    let zeros = vec![Complex64::new(-1.0, 0.0); order];

    let denom = analog_poles
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, &p| acc * (fs2 - p));
    let gain = analog_gain * (Complex64::new(1.0, 0.0) / denom).re;

    Ok(Zpk { zeros, poles, gain })
}

/// Monic polynomial coefficients from roots, highest power first
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];

    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }

    coeffs
}

/// Calculate frequency response at given frequencies
///
/// # Arguments
/// * `tf` - Filter coefficients
/// * `frequencies` - Normalized frequencies (units of π rad/sample, 1.0 = Nyquist)
///
/// # Returns
/// Complex frequency response H(e^jω) = B(e^jω) / A(e^jω)
pub fn frequency_response(tf: &TransferFunction, frequencies: &[f64]) -> Vec<Complex64> {
    frequencies
        .iter()
        .map(|&omega| {
            let omega_rad = omega * PI;
            evaluate(&tf.b, omega_rad) / evaluate(&tf.a, omega_rad)
        })
        .collect()
}

fn evaluate(coeffs: &[f64], omega_rad: f64) -> Complex64 {
    coeffs
        .iter()
        .enumerate()
        .map(|(k, &c)| c * Complex64::from_polar(1.0, -omega_rad * k as f64))
        .sum()
}

/// Calculate magnitude response in dB
pub fn magnitude_response_db(tf: &TransferFunction, frequencies: &[f64]) -> Vec<f64> {
    frequency_response(tf, frequencies)
        .iter()
        .map(|c| 20.0 * c.norm().max(1e-20).log10())
        .collect()
}
