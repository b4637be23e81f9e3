//! Pure sine tone generator
//!
//! x[n] = A·sin(2π·f·n/sr) for n in [0, round(sr·d))

use super::sequence::Signal;
use crate::error::{DspError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Largest sample count a `Vec<f64>` can address
pub const MAX_TONE_SAMPLES: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Tone generation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneParams {
    /// Peak amplitude A
    pub amplitude: f64,

    /// Tone frequency in Hz
    pub frequency: f64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Duration in seconds
    pub duration: f64,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            amplitude: 0.5,
            frequency: 440.0,
            sample_rate: 16000,
            duration: 1.0,
        }
    }
}

impl ToneParams {
    pub fn new(amplitude: f64, frequency: f64, sample_rate: u32, duration: f64) -> Self {
        Self {
            amplitude,
            frequency,
            sample_rate,
            duration,
        }
    }

    /// Number of samples the tone will contain: round(sr·d)
    pub fn num_samples(&self) -> usize {
        (self.sample_rate as f64 * self.duration).round() as usize
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(DspError::invalid_parameter(
                "sample_rate",
                "sample rate must be positive",
            ));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(DspError::invalid_parameter(
                "duration",
                format!("duration must be positive and finite (got {})", self.duration),
            ));
        }
        let requested = (self.sample_rate as f64 * self.duration).round();
        if requested > MAX_TONE_SAMPLES as f64 {
            return Err(DspError::invalid_parameter(
                "duration",
                format!(
                    "{} s at {} Hz exceeds {} samples",
                    self.duration, self.sample_rate, MAX_TONE_SAMPLES
                ),
            ));
        }
        if self.num_samples() == 0 {
            return Err(DspError::invalid_parameter(
                "duration",
                format!(
                    "{} s at {} Hz is shorter than one sample",
                    self.duration, self.sample_rate
                ),
            ));
        }
        if !self.frequency.is_finite() || self.frequency < 0.0 {
            return Err(DspError::invalid_parameter(
                "frequency",
                format!("frequency must be finite and >= 0 (got {})", self.frequency),
            ));
        }
        if !self.amplitude.is_finite() {
            return Err(DspError::invalid_parameter(
                "amplitude",
                "amplitude must be finite",
            ));
        }
        Ok(())
    }
}

/// Generate a pure sine tone
///
/// # Returns
/// Signal of exactly round(sr·d) samples at `params.sample_rate`
pub fn generate_tone(params: &ToneParams) -> Result<Signal> {
    params.validate()?;

    let sr = params.sample_rate as f64;
    if params.frequency > 0.5 * sr {
        warn!(
            frequency = params.frequency,
            nyquist = 0.5 * sr,
            "tone frequency above Nyquist will alias"
        );
    }

    let n_samples = params.num_samples();
    let omega = 2.0 * PI * params.frequency / sr;
    let samples: Vec<f64> = (0..n_samples)
        .map(|n| params.amplitude * (omega * n as f64).sin())
        .collect();

    debug!(
        n_samples,
        frequency = params.frequency,
        sample_rate = params.sample_rate,
        "generated tone"
    );

    Signal::new(samples, params.sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::metrics::rms;

    #[test]
    fn test_length_is_rounded_product() {
        for &(sr, d) in &[(16000, 1.0), (8000, 0.25), (44100, 0.1), (16000, 0.0001), (1000, 1.0005)] {
            let params = ToneParams::new(1.0, 100.0, sr, d);
            let signal = generate_tone(&params).unwrap();
            assert_eq!(signal.len(), (sr as f64 * d).round() as usize);
        }
    }

    #[test]
    fn test_tone_rms_matches_sinusoid() {
        let params = ToneParams::new(1.0, 440.0, 16000, 1.0);
        let signal = generate_tone(&params).unwrap();

        let value = rms(signal.samples()).unwrap();
        assert!((value - 1.0 / 2f64.sqrt()).abs() < 1e-3, "rms = {}", value);
    }

    #[test]
    fn test_first_samples() {
        // f = sr/4 gives the sequence 0, A, 0, -A
        let params = ToneParams::new(0.5, 4000.0, 16000, 0.001);
        let signal = generate_tone(&params).unwrap();
        let x = signal.samples();

        assert!(x[0].abs() < 1e-12);
        assert!((x[1] - 0.5).abs() < 1e-12);
        assert!(x[2].abs() < 1e-12);
        assert!((x[3] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let params = ToneParams::default();
        assert_eq!(generate_tone(&params).unwrap(), generate_tone(&params).unwrap());
    }

    #[test]
    fn test_invalid_parameters() {
        let cases = [
            (ToneParams::new(1.0, 440.0, 0, 1.0), "sample_rate"),
            (ToneParams::new(1.0, 440.0, 16000, 0.0), "duration"),
            (ToneParams::new(1.0, 440.0, 16000, -1.0), "duration"),
            (ToneParams::new(1.0, 440.0, 16000, f64::NAN), "duration"),
            (ToneParams::new(1.0, -5.0, 16000, 1.0), "frequency"),
            (ToneParams::new(f64::INFINITY, 440.0, 16000, 1.0), "amplitude"),
        ];

        for (params, expected) in cases {
            match generate_tone(&params) {
                Err(DspError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected InvalidParameter({}), got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_unaddressable_duration_is_rejected() {
        let beyond_cap = 2.0 * MAX_TONE_SAMPLES as f64 / 16000.0;

        for duration in [1e300, beyond_cap] {
            let params = ToneParams::new(1.0, 440.0, 16000, duration);
            match generate_tone(&params) {
                Err(DspError::InvalidParameter { name, .. }) => assert_eq!(name, "duration"),
                other => panic!("expected InvalidParameter(duration), got {:?}", other),
            }
        }
    }

    #[test]
    fn test_zero_frequency_is_silence() {
        let params = ToneParams::new(1.0, 0.0, 8000, 0.1);
        let signal = generate_tone(&params).unwrap();
        assert!(signal.samples().iter().all(|&x| x == 0.0));
    }
}
