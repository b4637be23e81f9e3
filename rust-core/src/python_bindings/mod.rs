//! PyO3 bindings for Python integration

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use crate::error::DspError;

mod signal_bindings;
mod spectrum_bindings;
mod filter_bindings;
mod pipeline_bindings;

impl From<DspError> for PyErr {
    fn from(err: DspError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Python module definition
#[pymodule]
fn dsp_primer(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(signal_bindings::generate_tone, m)?)?;
    m.add_function(wrap_pyfunction!(signal_bindings::rms, m)?)?;

    m.add_function(wrap_pyfunction!(spectrum_bindings::fft_magnitude, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::mel_spectrogram_db, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::phase_spectrum, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::group_delay, m)?)?;

    m.add_function(wrap_pyfunction!(filter_bindings::butter_lowpass, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::lfilter, m)?)?;

    m.add_class::<filter_bindings::PyIirFilter>()?;
    m.add_class::<pipeline_bindings::PyPipeline>()?;

    Ok(())
}
