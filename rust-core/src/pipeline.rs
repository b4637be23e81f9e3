//! Single-pass demonstration pipeline
//!
//! generate tone → RMS → FFT → mel spectrogram → Butterworth low-pass → RMS
//!
//! Every stage takes the sample rate explicitly from the configuration; there
//! is no process-wide state.

use crate::error::{DspError, Result};
use crate::filters::design::{LowpassSpec, TransferFunction};
use crate::filters::iir;
use crate::signal::{generate_tone, rms, RmsComparison, Signal, ToneParams};
use crate::spectrum::fft::{fft_with, Spectrum, SpectrumSides};
use crate::spectrum::mel::{mel_spectrogram, MelConfig, MelScale, MelSpectrogram};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Pipeline parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sample rate in Hz; sets Nyquist and time resolution for every stage
    pub sample_rate: u32,

    /// Tone length in seconds
    pub duration: f64,

    /// Tone peak amplitude
    pub amplitude: f64,

    /// Tone frequency in Hz
    pub frequency: f64,

    /// Mel bands
    pub n_mels: usize,

    /// Upper mel band edge in Hz (None = Nyquist)
    pub fmax: Option<f64>,

    /// Mel frame length / FFT size
    pub n_fft: usize,

    /// Mel hop length
    pub hop_length: usize,

    pub mel_scale: MelScale,

    /// Dynamic range kept by the dB conversion (None = unlimited)
    pub top_db: Option<f64>,

    /// Butterworth order
    pub filter_order: usize,

    /// Butterworth -3 dB cutoff in Hz
    pub cutoff_frequency: f64,

    /// DFT convention for the spectrum stage
    pub spectrum_sides: SpectrumSides,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mel = MelConfig::default();
        Self {
            sample_rate: 16000,
            duration: 1.0,
            amplitude: 0.5,
            frequency: 440.0,
            n_mels: mel.n_mels,
            fmax: mel.fmax,
            n_fft: mel.n_fft,
            hop_length: mel.hop_length,
            mel_scale: mel.scale,
            top_db: Some(80.0),
            filter_order: 4,
            cutoff_frequency: 1000.0,
            spectrum_sides: SpectrumSides::OneSided,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DspError::InvalidConfiguration(format!("bad pipeline config: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DspError::InvalidConfiguration(format!("cannot serialize config: {}", e)))
    }

    pub fn with_tone(mut self, amplitude: f64, frequency: f64) -> Self {
        self.amplitude = amplitude;
        self.frequency = frequency;
        self
    }

    pub fn with_sampling(mut self, sample_rate: u32, duration: f64) -> Self {
        self.sample_rate = sample_rate;
        self.duration = duration;
        self
    }

    pub fn with_filter(mut self, filter_order: usize, cutoff_frequency: f64) -> Self {
        self.filter_order = filter_order;
        self.cutoff_frequency = cutoff_frequency;
        self
    }

    pub fn with_mel(mut self, n_mels: usize, fmax: Option<f64>) -> Self {
        self.n_mels = n_mels;
        self.fmax = fmax;
        self
    }

    pub fn tone_params(&self) -> ToneParams {
        ToneParams::new(self.amplitude, self.frequency, self.sample_rate, self.duration)
    }

    pub fn mel_config(&self) -> MelConfig {
        MelConfig {
            n_fft: self.n_fft,
            hop_length: self.hop_length,
            n_mels: self.n_mels,
            fmax: self.fmax,
            scale: self.mel_scale,
            ..MelConfig::default()
        }
    }

    pub fn lowpass_spec(&self) -> LowpassSpec {
        LowpassSpec::new(self.filter_order, self.cutoff_frequency, self.sample_rate)
    }
}

/// Every stage's output from one run
#[derive(Debug, Clone)]
pub struct PipelineResults {
    /// Generated tone
    pub signal: Signal,

    /// RMS of the generated tone
    pub rms_before: f64,

    /// DFT of the generated tone
    pub spectrum: Spectrum,

    /// Mel power spectrogram
    pub mel: MelSpectrogram,

    /// Mel spectrogram in dB relative to its maximum
    pub mel_db: Array2<f64>,

    /// Designed low-pass coefficients
    pub filter: TransferFunction,

    /// Low-pass filtered tone
    pub filtered: Signal,

    /// RMS of the filtered tone
    pub rms_after: f64,
}

impl PipelineResults {
    pub fn rms_comparison(&self) -> RmsComparison {
        RmsComparison {
            before: self.rms_before,
            after: self.rms_after,
        }
    }
}

/// Offline generate → analyze → filter run
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }

    /// Run every stage once, stopping at the first failure
    pub fn run(&self) -> Result<PipelineResults> {
        let config = &self.config;

        let signal = generate_tone(&config.tone_params())?;
        let rms_before = rms(signal.samples())?;
        debug!(samples = signal.len(), rms = rms_before, "source stage done");

        let spectrum = fft_with(&signal, config.spectrum_sides)?;
        debug!(
            bins = spectrum.len(),
            peak_hz = spectrum.peak_frequency(),
            "spectrum stage done"
        );

        let mel = mel_spectrogram(&signal, &config.mel_config())?;
        let mel_db = mel.to_db(config.top_db)?;

        let filter = config.lowpass_spec().design()?;
        let filtered = iir::apply(&filter, &signal)?;
        let rms_after = rms(filtered.samples())?;

        info!(
            rms_before,
            rms_after,
            cutoff_hz = config.cutoff_frequency,
            order = config.filter_order,
            "pipeline finished"
        );

        Ok(PipelineResults {
            signal,
            rms_before,
            spectrum,
            mel,
            mel_db,
            filter,
            filtered,
            rms_after,
        })
    }
}

/// Run the pipeline once with `config`
pub fn run(config: &PipelineConfig) -> Result<PipelineResults> {
    Pipeline::new(config.clone()).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();

        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.n_mels, 128);
        assert_eq!(config.filter_order, 4);
        assert_eq!(config.lowpass_spec().nyquist(), 8000.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{ "amplitude": 1.0, "cutoff_frequency": 2000.0 }"#).unwrap();

        assert_eq!(config.amplitude, 1.0);
        assert_eq!(config.cutoff_frequency, 2000.0);
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.spectrum_sides, SpectrumSides::OneSided);
    }

    #[test]
    fn test_json_roundtrip_and_errors() {
        let config = PipelineConfig::default().with_mel(64, Some(4000.0));
        let text = config.to_json().unwrap();
        assert_eq!(PipelineConfig::from_json(&text).unwrap(), config);

        assert!(matches!(
            PipelineConfig::from_json("{ \"sample_rate\": \"fast\" }"),
            Err(DspError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_run_passband() {
        let config = PipelineConfig::default().with_tone(1.0, 440.0);
        let results = run(&config).unwrap();

        assert_eq!(results.signal.len(), 16000);
        assert_eq!(results.filtered.len(), 16000);
        assert_eq!(results.spectrum.peak_bin(), 440);
        assert_eq!(results.mel_db.dim(), (128, 32));
        assert!(results.rms_comparison().relative_change() < 0.05);
    }

    #[test]
    fn test_run_stopband() {
        let config = PipelineConfig::default()
            .with_tone(1.0, 4000.0)
            .with_filter(4, 1000.0);
        let results = run(&config).unwrap();

        // Two octaves above cutoff: 4th order gives ~-48 dB
        assert!(results.rms_comparison().change_db() < -30.0);
    }

    #[test]
    fn test_update_config_reruns_with_new_cutoff() {
        let mut pipeline = Pipeline::new(PipelineConfig::default().with_tone(1.0, 2000.0));
        let wide = pipeline.run().unwrap();

        let narrower = pipeline.config().clone().with_filter(4, 4000.0);
        pipeline.update_config(narrower);
        assert_eq!(pipeline.config().cutoff_frequency, 4000.0);

        let passed = pipeline.run().unwrap();
        let expected = run(pipeline.config()).unwrap();

        // 2 kHz is above the default 1 kHz cutoff but inside 4 kHz
        assert!(wide.rms_comparison().change_db() < -20.0);
        assert!(passed.rms_comparison().relative_change() < 0.05);
        assert_eq!(passed.rms_after, expected.rms_after);
    }

    #[test]
    fn test_run_two_sided_spectrum() {
        let mut config = PipelineConfig::default().with_tone(1.0, 440.0);
        config.spectrum_sides = SpectrumSides::TwoSided;
        let results = run(&config).unwrap();

        assert_eq!(results.spectrum.len(), 16000);
        assert_eq!(results.spectrum.sides(), SpectrumSides::TwoSided);
        assert_eq!(results.spectrum.peak_bin(), 440);
        assert_eq!(results.mel_db.dim(), (128, 32));
        assert!(results.mel_db.iter().all(|&v| v <= 1e-9 && v >= -80.0 - 1e-9));
    }

    #[test]
    fn test_run_fails_fast() {
        let config = PipelineConfig::default().with_filter(4, 8000.0);
        assert!(matches!(run(&config), Err(DspError::InvalidConfiguration(_))));

        let config = PipelineConfig::default().with_sampling(16000, 0.05);
        assert!(matches!(run(&config), Err(DspError::InsufficientData { .. })));
    }
}
