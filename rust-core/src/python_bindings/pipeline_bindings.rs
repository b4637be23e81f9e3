//! Python bindings for the demonstration pipeline

use numpy::{PyArray1, PyArray2};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Generate → analyze → filter pipeline exposed to Python
#[pyclass(name = "Pipeline")]
pub struct PyPipeline {
    pipeline: Pipeline,
}

#[pymethods]
impl PyPipeline {
    /// Create a pipeline
    ///
    /// Args:
    ///     sample_rate: Sample rate in Hz (default: 16000)
    ///     duration: Tone length in seconds (default: 1.0)
    ///     amplitude: Tone amplitude (default: 0.5)
    ///     frequency: Tone frequency in Hz (default: 440)
    ///     n_mels: Mel bands (default: 128)
    ///     fmax: Upper mel edge in Hz (default: Nyquist)
    ///     filter_order: Butterworth order (default: 4)
    ///     cutoff_frequency: Low-pass cutoff in Hz (default: 1000)
    #[new]
    #[pyo3(signature = (
        sample_rate=16000,
        duration=1.0,
        amplitude=0.5,
        frequency=440.0,
        n_mels=128,
        fmax=None,
        filter_order=4,
        cutoff_frequency=1000.0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        sample_rate: u32,
        duration: f64,
        amplitude: f64,
        frequency: f64,
        n_mels: usize,
        fmax: Option<f64>,
        filter_order: usize,
        cutoff_frequency: f64,
    ) -> Self {
        let config = PipelineConfig::default()
            .with_sampling(sample_rate, duration)
            .with_tone(amplitude, frequency)
            .with_mel(n_mels, fmax)
            .with_filter(filter_order, cutoff_frequency);

        Self {
            pipeline: Pipeline::new(config),
        }
    }

    /// Create a pipeline from a JSON document; missing keys keep defaults
    #[staticmethod]
    fn from_json(text: &str) -> PyResult<Self> {
        Ok(Self {
            pipeline: Pipeline::new(PipelineConfig::from_json(text)?),
        })
    }

    /// Current configuration as JSON
    fn config_json(&self) -> PyResult<String> {
        Ok(self.pipeline.config().to_json()?)
    }

    /// Run every stage once
    ///
    /// Returns:
    ///     Dictionary with keys: t, signal, rms_before, freqs, magnitude,
    ///     mel_db, b, a, filtered, rms_after
    fn run(&self, py: Python) -> PyResult<PyObject> {
        let results = self.pipeline.run()?;

        let dict = PyDict::new(py);
        dict.set_item("t", PyArray1::from_vec(py, results.signal.time_axis()))?;
        dict.set_item("freqs", PyArray1::from_vec(py, results.spectrum.frequencies()))?;
        dict.set_item("magnitude", PyArray1::from_vec(py, results.spectrum.magnitude()))?;
        dict.set_item("rms_before", results.rms_before)?;
        dict.set_item("rms_after", results.rms_after)?;
        dict.set_item("mel_db", PyArray2::from_owned_array(py, results.mel_db))?;
        dict.set_item("b", PyArray1::from_vec(py, results.filter.b))?;
        dict.set_item("a", PyArray1::from_vec(py, results.filter.a))?;
        dict.set_item("signal", PyArray1::from_vec(py, results.signal.into_samples()))?;
        dict.set_item("filtered", PyArray1::from_vec(py, results.filtered.into_samples()))?;

        Ok(dict.into())
    }
}
