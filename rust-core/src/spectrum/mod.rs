//! Frequency-domain analysis: FFT, mel spectrogram, phase

pub mod fft;
pub mod windowing;
pub mod mel;
pub mod phase;

pub use fft::{fft, fft_with, FftEngine, Spectrum, SpectrumSides};
pub use windowing::{apply_window, frame_signal};
pub use mel::{mel_spectrogram, mel_spectrogram_db, power_to_db, MelConfig, MelScale, MelSpectrogram};
pub use phase::{group_delay, phase_spectrum, unwrap_phase, GroupDelay, PhaseSmoothing, PhaseSpectrum};
