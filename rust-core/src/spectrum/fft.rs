//! FFT engine and spectrum values
//!
//! One-sided spectra (N/2 + 1 bins, real input) go through `realfft`;
//! two-sided spectra (N bins) go through `rustfft`. Bin k sits at k·sr/N Hz.

use crate::error::{require_len, DspError, Result};
use crate::signal::Signal;
use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Which half of the DFT to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumSides {
    /// Non-negative frequencies only: N/2 + 1 bins
    #[default]
    OneSided,

    /// Full DFT: N bins, bins above N/2 are the negative frequencies
    TwoSided,
}

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum)
    output_buffer: Vec<Complex64>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples, any positive length)
    pub fn new(fft_size: usize) -> Result<Self> {
        if fft_size == 0 {
            return Err(DspError::invalid_parameter(
                "fft_size",
                "FFT size must be positive",
            ));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();

        Ok(Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
        })
    }

    /// Compute the one-sided complex spectrum
    ///
    /// # Arguments
    /// * `signal` - Input signal (zero-padded or truncated to fft_size)
    ///
    /// # Returns
    /// X[k] for k = 0..fft_size/2
    pub fn compute(&mut self, signal: &[f64]) -> Result<&[Complex64]> {
        let copy_len = signal.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&signal[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        self.r2c
            .process(&mut self.input_buffer, &mut self.output_buffer)
            .map_err(|e| DspError::Transform(e.to_string()))?;

        Ok(&self.output_buffer)
    }

    /// Compute FFT and return magnitude spectrum |X[k]|
    pub fn compute_magnitude(&mut self, signal: &[f64]) -> Result<Vec<f64>> {
        Ok(self.compute(signal)?.iter().map(|c| c.norm()).collect())
    }

    /// Compute power spectrum |X[k]|²
    pub fn compute_power(&mut self, signal: &[f64]) -> Result<Vec<f64>> {
        Ok(self.compute(signal)?.iter().map(|c| c.norm_sqr()).collect())
    }

    /// Write the power spectrum into `out` without allocating
    pub fn compute_power_into(&mut self, signal: &[f64], out: &mut [f64]) -> Result<()> {
        let spectrum = self.compute(signal)?;
        for (dst, c) in out.iter_mut().zip(spectrum.iter()) {
            *dst = c.norm_sqr();
        }
        Ok(())
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

/// Frequency-domain view of a signal
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    bins: Vec<Complex64>,
    fft_size: usize,
    sample_rate: u32,
    sides: SpectrumSides,
}

impl Spectrum {
    pub fn bins(&self) -> &[Complex64] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Number of input samples N
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn sides(&self) -> SpectrumSides {
        self.sides
    }

    /// Bin spacing sr / N in Hz
    pub fn bin_width(&self) -> f64 {
        self.sample_rate as f64 / self.fft_size as f64
    }

    /// Frequency of bin k: k·sr/N
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.bin_width()
    }

    /// Frequency axis in Hz
    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.bins.len()).map(|k| self.bin_frequency(k)).collect()
    }

    /// |X[k]|
    pub fn magnitude(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm()).collect()
    }

    /// |X[k]|²
    pub fn power(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Wrapped phase in [-π, π]
    pub fn phase(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.arg()).collect()
    }

    /// Magnitude in dB: 20*log10(|X[k]|/reference)
    pub fn magnitude_db(&self, reference: f64) -> Vec<f64> {
        self.bins
            .iter()
            .map(|c| 20.0 * (c.norm().max(1e-10) / reference).log10())
            .collect()
    }

    /// Bin with the largest magnitude among the non-negative frequencies
    pub fn peak_bin(&self) -> usize {
        let searchable = (self.fft_size / 2 + 1).min(self.bins.len());
        self.bins[..searchable]
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
            .map(|(k, _)| k)
            .unwrap_or(0)
    }

    /// Frequency of [`Spectrum::peak_bin`] in Hz
    pub fn peak_frequency(&self) -> f64 {
        self.bin_frequency(self.peak_bin())
    }
}

/// One-sided DFT of a signal
pub fn fft(signal: &Signal) -> Result<Spectrum> {
    fft_with(signal, SpectrumSides::OneSided)
}

/// DFT of a signal with the chosen convention
///
/// The transform length equals the signal length; no windowing is applied.
pub fn fft_with(signal: &Signal, sides: SpectrumSides) -> Result<Spectrum> {
    let n = signal.len();
    require_len(n, 1)?;

    let bins = match sides {
        SpectrumSides::OneSided => {
            let mut engine = FftEngine::new(n)?;
            engine.compute(signal.samples())?.to_vec()
        }
        SpectrumSides::TwoSided => {
            let mut planner = FftPlanner::<f64>::new();
            let transform = planner.plan_fft_forward(n);
            let mut buffer: Vec<Complex64> = signal
                .samples()
                .iter()
                .map(|&x| Complex64::new(x, 0.0))
                .collect();
            transform.process(&mut buffer);
            buffer
        }
    };

    debug!(fft_size = n, bins = bins.len(), ?sides, "computed spectrum");

    Ok(Spectrum {
        bins,
        fft_size: n,
        sample_rate: signal.sample_rate(),
        sides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{generate_tone, ToneParams};

    #[test]
    fn test_fft_dc_signal() {
        let mut fft = FftEngine::new(1024).unwrap();

        // DC signal (constant), zero-padded
        let signal = vec![1.0; 100];
        let spectrum = fft.compute_magnitude(&signal).unwrap();

        assert!((spectrum[0] - 100.0).abs() < 1e-9);
        assert_eq!(spectrum.len(), fft.num_bins());
    }

    #[test]
    fn test_power_is_squared_magnitude() {
        let mut fft = FftEngine::new(256).unwrap();
        let signal: Vec<f64> = (0..256).map(|n| ((n * 7) % 13) as f64 - 6.0).collect();

        let magnitude = fft.compute_magnitude(&signal).unwrap();
        let power = fft.compute_power(&signal).unwrap();

        assert_eq!(power.len(), 129);
        for (p, m) in power.iter().zip(&magnitude) {
            assert!((p - m * m).abs() < 1e-6 * (1.0 + p));
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(FftEngine::new(0).is_err());
    }

    #[test]
    fn test_tone_peak_at_expected_bin() {
        let params = ToneParams::new(1.0, 440.0, 16000, 1.0);
        let signal = generate_tone(&params).unwrap();
        let spectrum = fft(&signal).unwrap();

        assert_eq!(spectrum.len(), 8001);
        assert_eq!(spectrum.peak_bin(), 440);
        assert!((spectrum.peak_frequency() - 440.0).abs() < 1e-9);

        // Bin-aligned tone: peak = A·N/2, everything else near zero
        let magnitude = spectrum.magnitude();
        assert!((magnitude[440] - 8000.0).abs() < 1e-6);
        for (k, &m) in magnitude.iter().enumerate() {
            if k != 440 {
                assert!(m < 1e-6, "bin {} has magnitude {}", k, m);
            }
        }
    }

    #[test]
    fn test_tone_peak_in_db() {
        let signal = generate_tone(&ToneParams::new(1.0, 440.0, 16000, 1.0)).unwrap();
        let spectrum = fft(&signal).unwrap();

        // Peak magnitude is 8000
        let relative = spectrum.magnitude_db(8000.0);
        assert!(relative[440].abs() < 1e-6);

        let absolute = spectrum.magnitude_db(1.0);
        assert!((absolute[440] - 20.0 * 8000f64.log10()).abs() < 1e-6);
        // Empty bins sit at the 1e-10 floor or just above it
        assert!(absolute[100] < -100.0);
    }

    #[test]
    fn test_two_sided_matches_one_sided() {
        let params = ToneParams::new(0.5, 250.0, 4000, 0.25);
        let signal = generate_tone(&params).unwrap();

        let one = fft_with(&signal, SpectrumSides::OneSided).unwrap();
        let two = fft_with(&signal, SpectrumSides::TwoSided).unwrap();

        assert_eq!(two.len(), signal.len());
        assert_eq!(one.len(), signal.len() / 2 + 1);
        for (a, b) in one.bins().iter().zip(two.bins()) {
            assert!((a - b).norm() < 1e-9);
        }
        assert_eq!(one.peak_bin(), two.peak_bin());
    }

    #[test]
    fn test_frequency_axis() {
        let signal = Signal::new(vec![0.0; 1024], 48000).unwrap();
        let spectrum = fft(&signal).unwrap();
        let freqs = spectrum.frequencies();

        assert_eq!(freqs.len(), 513);
        assert_eq!(freqs[0], 0.0);
        assert!((spectrum.bin_width() - 46.875).abs() < 1e-12);
        assert!((freqs[512] - 24000.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_signal_rejected() {
        let signal = Signal::new(Vec::new(), 16000).unwrap();
        assert!(matches!(fft(&signal), Err(DspError::InsufficientData { .. })));
    }
}
