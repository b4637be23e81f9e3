//! Python bindings for tone generation and time-domain metrics

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use crate::signal::{self, ToneParams};

/// Create a pure sine wave at a given frequency
///
/// Args:
///     frequency: Tone frequency in Hz
///     duration: Length in seconds
///     sr: Sample rate in Hz (default: 16000)
///     amplitude: Peak amplitude (default: 0.5)
///
/// Returns:
///     Tuple of (time axis, samples) as numpy arrays
#[pyfunction]
#[pyo3(signature = (frequency, duration, sr=16000, amplitude=0.5))]
pub fn generate_tone<'py>(
    py: Python<'py>,
    frequency: f64,
    duration: f64,
    sr: u32,
    amplitude: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let params = ToneParams::new(amplitude, frequency, sr, duration);
    let tone = signal::generate_tone(&params)?;
    let t = tone.time_axis();

    Ok((PyArray1::from_vec(py, t), PyArray1::from_vec(py, tone.into_samples())))
}

/// Root-mean-square level of a signal
#[pyfunction]
pub fn rms(samples: PyReadonlyArray1<f64>) -> PyResult<f64> {
    Ok(signal::rms(samples.as_slice()?)?)
}
