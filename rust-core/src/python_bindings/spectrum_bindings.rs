//! Python bindings for spectrum analysis

use numpy::{PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::prelude::*;
use crate::signal::Signal;
use crate::spectrum::{self, MelConfig, PhaseSmoothing};

fn to_signal(samples: PyReadonlyArray1<f64>, sr: u32) -> PyResult<Signal> {
    Ok(Signal::new(samples.as_slice()?.to_vec(), sr)?)
}

/// One-sided FFT magnitude
///
/// Returns:
///     Tuple of (frequencies in Hz, |X[k]|)
#[pyfunction]
pub fn fft_magnitude<'py>(
    py: Python<'py>,
    audio: PyReadonlyArray1<f64>,
    sr: u32,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let spectrum = spectrum::fft(&to_signal(audio, sr)?)?;

    Ok((
        PyArray1::from_vec(py, spectrum.frequencies()),
        PyArray1::from_vec(py, spectrum.magnitude()),
    ))
}

/// Mel spectrogram in dB relative to its maximum
///
/// Args:
///     audio: Input samples
///     sr: Sample rate in Hz
///     n_mels: Number of mel bands (default: 128)
///     fmax: Upper band edge in Hz (default: Nyquist)
///     n_fft: Frame length (default: 2048)
///     hop_length: Hop between frames (default: 512)
///     top_db: Dynamic range floor (default: 80)
///
/// Returns:
///     Array of shape (n_mels, n_frames)
#[pyfunction]
#[pyo3(signature = (audio, sr, n_mels=128, fmax=None, n_fft=2048, hop_length=512, top_db=Some(80.0)))]
#[allow(clippy::too_many_arguments)]
pub fn mel_spectrogram_db<'py>(
    py: Python<'py>,
    audio: PyReadonlyArray1<f64>,
    sr: u32,
    n_mels: usize,
    fmax: Option<f64>,
    n_fft: usize,
    hop_length: usize,
    top_db: Option<f64>,
) -> PyResult<&'py PyArray2<f64>> {
    let config = MelConfig::default()
        .with_n_mels(n_mels)
        .with_fmax(fmax)
        .with_frame(n_fft, hop_length);
    let db = spectrum::mel_spectrogram_db(&to_signal(audio, sr)?, &config, top_db)?;

    Ok(PyArray2::from_owned_array(py, db))
}

/// Phase spectrum of a signal
///
/// Args:
///     audio: Input samples
///     sr: Sample rate in Hz
///     unwrap: Remove 2π discontinuities (default: True)
///     mask_threshold: Set phase to NaN where magnitude is below this value
///
/// Returns:
///     Tuple of (frequencies, phase, magnitude)
#[pyfunction]
#[pyo3(signature = (audio, sr, unwrap=true, mask_threshold=None))]
pub fn phase_spectrum<'py>(
    py: Python<'py>,
    audio: PyReadonlyArray1<f64>,
    sr: u32,
    unwrap: bool,
    mask_threshold: Option<f64>,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let result = spectrum::phase_spectrum(&to_signal(audio, sr)?, unwrap, mask_threshold)?;

    Ok((
        PyArray1::from_vec(py, result.frequencies),
        PyArray1::from_vec(py, result.phase),
        PyArray1::from_vec(py, result.magnitude),
    ))
}

/// Group delay of a signal from its phase spectrum
///
/// Args:
///     audio: Input samples
///     sr: Sample rate in Hz
///     smooth_phase: Savitzky-Golay smoothing before differentiation
///     window_length: Smoothing window (odd, default: 101)
///     polyorder: Smoothing polynomial order (default: 3)
///
/// Returns:
///     Tuple of (frequencies, group delay in seconds)
#[pyfunction]
#[pyo3(signature = (audio, sr, smooth_phase=true, window_length=101, polyorder=3))]
pub fn group_delay<'py>(
    py: Python<'py>,
    audio: PyReadonlyArray1<f64>,
    sr: u32,
    smooth_phase: bool,
    window_length: usize,
    polyorder: usize,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let smoothing = smooth_phase.then_some(PhaseSmoothing {
        window_length,
        polyorder,
    });
    let result = spectrum::group_delay(&to_signal(audio, sr)?, smoothing)?;

    Ok((
        PyArray1::from_vec(py, result.frequencies),
        PyArray1::from_vec(py, result.delay_secs),
    ))
}
