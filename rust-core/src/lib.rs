//! DSP Primer - introductory signal processing core
//!
//! Tone generation, RMS, FFT and mel-spectrogram analysis, and Butterworth
//! low-pass filtering as pure functions over in-memory signals, with optional
//! Python bindings for the notebooks.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod error;
pub mod signal;
pub mod filters;
pub mod spectrum;
pub mod pipeline;
#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::{DspError, Result};
pub use signal::{generate_tone, rms, Signal, ToneParams};
pub use filters::{butter_lowpass, lfilter, LowpassSpec, TransferFunction, WindowType};
pub use spectrum::{fft, mel_spectrogram, MelConfig, Spectrum};
pub use pipeline::{Pipeline, PipelineConfig, PipelineResults};
