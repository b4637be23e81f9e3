//! Mel spectrogram
//!
//! Frames the signal (periodic Hann, centred with zero padding by default),
//! takes the power spectrum of each frame, projects it onto a bank of
//! triangular filters spaced evenly on the mel scale, and converts the
//! result to dB relative to the grid maximum.
//!
//! Two mel scales are supported. `Slaney` (the default) is linear below
//! 1 kHz and logarithmic above; `Htk` is 2595·log10(1 + f/700). Filters are
//! area-normalized (each triangle scaled by 2 / bandwidth) in both cases.

use super::fft::FftEngine;
use super::windowing::{apply_coefficients_inplace, frame_signal};
use crate::error::{DspError, Result};
use crate::filters::windows::{generate_periodic_window, WindowType};
use crate::signal::Signal;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;
// ln(6.4) / 27
const LOGSTEP: f64 = 0.068_751_777_420_949_12;

/// Default floor applied before taking logarithms
pub const DEFAULT_AMIN: f64 = 1e-10;

/// Mel scale formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MelScale {
    #[default]
    Slaney,
    Htk,
}

impl MelScale {
    pub fn hz_to_mel(&self, freq: f64) -> f64 {
        match self {
            MelScale::Htk => 2595.0 * (1.0 + freq / 700.0).log10(),
            MelScale::Slaney => {
                if freq < MIN_LOG_HZ {
                    freq / F_SP
                } else {
                    MIN_LOG_MEL + (freq / MIN_LOG_HZ).ln() / LOGSTEP
                }
            }
        }
    }

    pub fn mel_to_hz(&self, mel: f64) -> f64 {
        match self {
            MelScale::Htk => 700.0 * (10f64.powf(mel / 2595.0) - 1.0),
            MelScale::Slaney => {
                if mel < MIN_LOG_MEL {
                    mel * F_SP
                } else {
                    MIN_LOG_HZ * ((mel - MIN_LOG_MEL) * LOGSTEP).exp()
                }
            }
        }
    }
}

/// Mel spectrogram settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelConfig {
    /// Frame length and FFT size in samples
    pub n_fft: usize,

    /// Samples between successive frames
    pub hop_length: usize,

    /// Number of mel bands
    pub n_mels: usize,

    /// Lowest filter edge in Hz
    pub fmin: f64,

    /// Highest filter edge in Hz (None = Nyquist; larger values are clipped)
    pub fmax: Option<f64>,

    /// Centre frames on t·hop by zero-padding n_fft/2 on each side
    pub center: bool,

    pub scale: MelScale,

    /// Analysis window (periodic form)
    pub window: WindowType,
}

impl Default for MelConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            fmin: 0.0,
            fmax: None,
            center: true,
            scale: MelScale::Slaney,
            window: WindowType::Hann,
        }
    }
}

impl MelConfig {
    pub fn with_n_mels(mut self, n_mels: usize) -> Self {
        self.n_mels = n_mels;
        self
    }

    pub fn with_fmax(mut self, fmax: Option<f64>) -> Self {
        self.fmax = fmax;
        self
    }

    pub fn with_frame(mut self, n_fft: usize, hop_length: usize) -> Self {
        self.n_fft = n_fft;
        self.hop_length = hop_length;
        self
    }

    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn with_scale(mut self, scale: MelScale) -> Self {
        self.scale = scale;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.n_fft == 0 {
            return Err(DspError::invalid_parameter("n_fft", "FFT size must be positive"));
        }
        if self.hop_length == 0 {
            return Err(DspError::invalid_parameter(
                "hop_length",
                "hop length must be positive",
            ));
        }
        if self.n_mels == 0 {
            return Err(DspError::invalid_parameter(
                "n_mels",
                "at least one mel band is required",
            ));
        }
        if !self.fmin.is_finite() || self.fmin < 0.0 {
            return Err(DspError::invalid_parameter(
                "fmin",
                format!("fmin must be finite and >= 0 (got {})", self.fmin),
            ));
        }
        Ok(())
    }

    /// Upper band edge for `sample_rate`, clipped to Nyquist
    pub fn resolved_fmax(&self, sample_rate: u32) -> Result<f64> {
        let nyquist = 0.5 * sample_rate as f64;

        let fmax = match self.fmax {
            None => nyquist,
            Some(f) if !f.is_finite() || f <= 0.0 => {
                return Err(DspError::invalid_parameter(
                    "fmax",
                    format!("fmax must be positive and finite (got {})", f),
                ));
            }
            Some(f) if f > nyquist => {
                warn!(fmax = f, nyquist, "fmax above Nyquist, clipping");
                nyquist
            }
            Some(f) => f,
        };

        if fmax <= self.fmin {
            return Err(DspError::InvalidConfiguration(format!(
                "fmin {} Hz must be below fmax {} Hz",
                self.fmin, fmax
            )));
        }

        Ok(fmax)
    }
}

/// `n` frequencies evenly spaced on the mel scale, endpoints included
pub fn mel_frequencies(n: usize, fmin: f64, fmax: f64, scale: MelScale) -> Vec<f64> {
    let mel_min = scale.hz_to_mel(fmin);
    let mel_max = scale.hz_to_mel(fmax);

    match n {
        0 => Vec::new(),
        1 => vec![fmin],
        _ => (0..n)
            .map(|i| {
                let mel = mel_min + (mel_max - mel_min) * i as f64 / (n - 1) as f64;
                scale.mel_to_hz(mel)
            })
            .collect(),
    }
}

/// Triangular mel filter bank
///
/// # Returns
/// Weights of shape (n_mels, n_fft/2 + 1)
pub fn mel_filter_bank(
    sample_rate: u32,
    n_fft: usize,
    n_mels: usize,
    fmin: f64,
    fmax: f64,
    scale: MelScale,
) -> Array2<f64> {
    let n_freqs = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..n_freqs)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    // Band edges: filter m spans edges[m]..edges[m + 2], peaking at edges[m + 1]
    let edges = mel_frequencies(n_mels + 2, fmin, fmax, scale);

    let mut weights = Array2::<f64>::zeros((n_mels, n_freqs));

    for (m, mut row) in weights.axis_iter_mut(Axis(0)).enumerate() {
        let lower_width = edges[m + 1] - edges[m];
        let upper_width = edges[m + 2] - edges[m + 1];
        let enorm = 2.0 / (edges[m + 2] - edges[m]);

        for (w, &freq) in row.iter_mut().zip(&fft_freqs) {
            let rising = (freq - edges[m]) / lower_width;
            let falling = (edges[m + 2] - freq) / upper_width;
            *w = rising.min(falling).max(0.0) * enorm;
        }
    }

    weights
}

/// Mel-band power over time
#[derive(Debug, Clone)]
pub struct MelSpectrogram {
    /// Power grid: (n_mels, n_frames)
    power: Array2<f64>,

    sample_rate: u32,
    hop_length: usize,
    fmin: f64,
    fmax: f64,
    scale: MelScale,
}

impl MelSpectrogram {
    pub fn power(&self) -> &Array2<f64> {
        &self.power
    }

    /// (n_mels, n_frames)
    pub fn shape(&self) -> (usize, usize) {
        self.power.dim()
    }

    pub fn n_mels(&self) -> usize {
        self.power.nrows()
    }

    pub fn n_frames(&self) -> usize {
        self.power.ncols()
    }

    /// Upper band edge actually used (after clipping)
    pub fn fmax(&self) -> f64 {
        self.fmax
    }

    /// Centre frequency of each mel band in Hz
    pub fn band_frequencies(&self) -> Vec<f64> {
        let edges = mel_frequencies(self.n_mels() + 2, self.fmin, self.fmax, self.scale);
        edges[1..edges.len() - 1].to_vec()
    }

    /// Time of each frame in seconds (frame t starts or centres at t·hop)
    pub fn frame_times(&self) -> Vec<f64> {
        let sr = self.sample_rate as f64;
        (0..self.n_frames())
            .map(|t| (t * self.hop_length) as f64 / sr)
            .collect()
    }

    /// Power in dB relative to the grid maximum (max cell = 0 dB)
    pub fn to_db(&self, top_db: Option<f64>) -> Result<Array2<f64>> {
        let reference = self.power.iter().fold(0.0_f64, |acc, &v| acc.max(v));
        power_to_db(&self.power, reference, DEFAULT_AMIN, top_db)
    }
}

/// Convert a power grid to dB: 10·log10(max(S, amin) / max(reference, amin))
///
/// With `top_db`, values are floored at (max dB - top_db).
pub fn power_to_db(
    power: &Array2<f64>,
    reference: f64,
    amin: f64,
    top_db: Option<f64>,
) -> Result<Array2<f64>> {
    if amin.is_nan() || amin <= 0.0 {
        return Err(DspError::invalid_parameter("amin", "amin must be positive"));
    }
    if let Some(top) = top_db {
        if top.is_nan() || top < 0.0 {
            return Err(DspError::invalid_parameter(
                "top_db",
                "top_db must be non-negative",
            ));
        }
    }

    let ref_db = 10.0 * reference.abs().max(amin).log10();
    let mut db = power.mapv(|v| 10.0 * v.max(amin).log10() - ref_db);

    if let Some(top) = top_db {
        let peak = db.iter().fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let floor = peak - top;
        db.mapv_inplace(|v| v.max(floor));
    }

    Ok(db)
}

/// Compute the mel power spectrogram of a signal
pub fn mel_spectrogram(signal: &Signal, config: &MelConfig) -> Result<MelSpectrogram> {
    config.validate()?;
    let fmax = config.resolved_fmax(signal.sample_rate())?;

    let mut frames = frame_signal(signal.samples(), config.n_fft, config.hop_length, config.center)?;
    let window = generate_periodic_window(config.window, config.n_fft);

    let mut engine = FftEngine::new(config.n_fft)?;
    let n_freqs = engine.num_bins();
    let n_frames = frames.nrows();

    // Power spectrogram: (n_freqs, n_frames)
    let mut spectra = Array2::<f64>::zeros((n_freqs, n_frames));
    let mut frame_power = vec![0.0; n_freqs];

    for (t, mut frame) in frames.axis_iter_mut(Axis(0)).enumerate() {
        let frame = frame
            .as_slice_mut()
            .ok_or_else(|| DspError::Transform("non-contiguous frame".to_string()))?;
        apply_coefficients_inplace(frame, &window);
        engine.compute_power_into(frame, &mut frame_power)?;
        for (k, &p) in frame_power.iter().enumerate() {
            spectra[[k, t]] = p;
        }
    }

    let bank = mel_filter_bank(
        signal.sample_rate(),
        config.n_fft,
        config.n_mels,
        config.fmin,
        fmax,
        config.scale,
    );
    let power = bank.dot(&spectra);

    debug!(
        n_mels = config.n_mels,
        n_frames,
        n_fft = config.n_fft,
        hop_length = config.hop_length,
        fmax,
        "computed mel spectrogram"
    );

    Ok(MelSpectrogram {
        power,
        sample_rate: signal.sample_rate(),
        hop_length: config.hop_length,
        fmin: config.fmin,
        fmax,
        scale: config.scale,
    })
}

/// Mel spectrogram in dB relative to its maximum
pub fn mel_spectrogram_db(signal: &Signal, config: &MelConfig, top_db: Option<f64>) -> Result<Array2<f64>> {
    mel_spectrogram(signal, config)?.to_db(top_db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{generate_tone, ToneParams};

    fn tone(freq: f64) -> Signal {
        generate_tone(&ToneParams::new(1.0, freq, 16000, 1.0)).unwrap()
    }

    #[test]
    fn test_slaney_scale_known_values() {
        let scale = MelScale::Slaney;

        // Breakpoint at 1 kHz = 15 mel, linear below
        assert!((scale.hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
        assert!((scale.hz_to_mel(500.0) - 2.0 * scale.hz_to_mel(250.0)).abs() < 1e-9);

        for freq in [100.0, 500.0, 1000.0, 2000.0, 8000.0] {
            assert!((scale.mel_to_hz(scale.hz_to_mel(freq)) - freq).abs() < 1e-6);
        }
    }

    #[test]
    fn test_htk_scale_known_values() {
        let scale = MelScale::Htk;

        // 1000 Hz ≈ 1000 mel on the HTK scale
        assert!((scale.hz_to_mel(1000.0) - 999.985).abs() < 1e-2);
        assert!((scale.mel_to_hz(scale.hz_to_mel(3000.0)) - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn test_filter_bank_shape_and_coverage() {
        let bank = mel_filter_bank(16000, 2048, 128, 0.0, 8000.0, MelScale::Slaney);
        assert_eq!(bank.dim(), (128, 1025));

        for (m, row) in bank.axis_iter(Axis(0)).enumerate() {
            assert!(row.sum() > 0.0, "filter {} is empty", m);
            assert!(row.iter().all(|&w| w >= 0.0));
        }
    }

    #[test]
    fn test_default_shape() {
        let spectrogram = mel_spectrogram(&tone(440.0), &MelConfig::default()).unwrap();

        // Centered framing: 1 + 16000 / 512 frames
        assert_eq!(spectrogram.shape(), (128, 32));
        assert_eq!(spectrogram.frame_times().len(), 32);
        assert_eq!(spectrogram.band_frequencies().len(), 128);
    }

    #[test]
    fn test_uncentered_shape() {
        let config = MelConfig::default().with_center(false).with_n_mels(40);
        let spectrogram = mel_spectrogram(&tone(440.0), &config).unwrap();
        assert_eq!(spectrogram.shape(), (40, 28));
    }

    #[test]
    fn test_htk_odd_frame_shape() {
        let config = MelConfig::default()
            .with_scale(MelScale::Htk)
            .with_frame(1023, 300);
        let spectrogram = mel_spectrogram(&tone(440.0), &config).unwrap();

        // Padded length 16000 + 2·511, so 1 + 15999 / 300 frames
        assert_eq!(spectrogram.shape(), (128, 54));

        let db = spectrogram.to_db(Some(80.0)).unwrap();
        let max = db.iter().fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        assert!(max.abs() < 1e-9);
        assert!(db.iter().all(|&v| v >= -80.0 - 1e-9 && v <= 1e-9));
    }

    #[test]
    fn test_db_bounded_by_reference() {
        let db = mel_spectrogram_db(&tone(440.0), &MelConfig::default(), Some(80.0)).unwrap();

        let max = db.iter().fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let min = db.iter().fold(f64::INFINITY, |acc, &v| acc.min(v));

        assert!(max.abs() < 1e-9);
        assert!(db.iter().all(|&v| v <= 1e-9));
        assert!(min >= -80.0 - 1e-9);
    }

    #[test]
    fn test_tone_energy_in_matching_band() {
        let spectrogram = mel_spectrogram(&tone(440.0), &MelConfig::default()).unwrap();
        let bands = spectrogram.band_frequencies();

        let middle = spectrogram.power().column(16);
        let (peak_band, _) = middle
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .unwrap();

        assert!((bands[peak_band] - 440.0).abs() < 30.0, "peak band at {} Hz", bands[peak_band]);
    }

    #[test]
    fn test_fmax_clipped_to_nyquist() {
        let config = MelConfig::default().with_fmax(Some(20000.0));
        let spectrogram = mel_spectrogram(&tone(440.0), &config).unwrap();
        assert_eq!(spectrogram.fmax(), 8000.0);
    }

    #[test]
    fn test_silence_maps_to_zero_db() {
        let silence = Signal::new(vec![0.0; 4096], 16000).unwrap();
        let db = mel_spectrogram_db(&silence, &MelConfig::default(), None).unwrap();
        assert!(db.iter().all(|&v| v.abs() < 1e-9));
    }

    #[test]
    fn test_frame_longer_than_signal() {
        let short = Signal::new(vec![0.1; 1000], 16000).unwrap();
        let result = mel_spectrogram(&short, &MelConfig::default());
        assert!(matches!(
            result,
            Err(DspError::InsufficientData { required: 2048, available: 1000 })
        ));
    }

    #[test]
    fn test_invalid_band_limits() {
        let config = MelConfig {
            fmin: 4000.0,
            fmax: Some(2000.0),
            ..MelConfig::default()
        };
        assert!(matches!(
            mel_spectrogram(&tone(440.0), &config),
            Err(DspError::InvalidConfiguration(_))
        ));

        let config = MelConfig::default().with_n_mels(0);
        assert!(matches!(
            mel_spectrogram(&tone(440.0), &config),
            Err(DspError::InvalidParameter { name: "n_mels", .. })
        ));
    }

    #[test]
    fn test_power_to_db_reference() {
        let power = Array2::from_shape_vec((1, 3), vec![1.0, 0.1, 0.0]).unwrap();
        let db = power_to_db(&power, 1.0, 1e-10, None).unwrap();

        assert!(db[[0, 0]].abs() < 1e-12);
        assert!((db[[0, 1]] + 10.0).abs() < 1e-9);
        assert!((db[[0, 2]] + 100.0).abs() < 1e-9);

        let clipped = power_to_db(&power, 1.0, 1e-10, Some(20.0)).unwrap();
        assert!((clipped[[0, 2]] + 20.0).abs() < 1e-9);
    }
}
