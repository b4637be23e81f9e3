//! Python bindings for Butterworth design and IIR filtering

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use crate::filters::{self, IirFilter, TransferFunction};

/// Design a digital Butterworth low-pass filter
///
/// Args:
///     order: Filter order (>= 1)
///     cutoff: -3 dB cutoff in Hz, strictly between 0 and sr/2
///     sr: Sample rate in Hz
///
/// Returns:
///     Tuple of (b, a) coefficient arrays
#[pyfunction]
pub fn butter_lowpass<'py>(
    py: Python<'py>,
    order: usize,
    cutoff: f64,
    sr: u32,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let tf = filters::butter_lowpass(order, cutoff, sr)?;

    Ok((PyArray1::from_vec(py, tf.b), PyArray1::from_vec(py, tf.a)))
}

/// Apply a rational transfer function from rest
///
/// Args:
///     b: Numerator coefficients
///     a: Denominator coefficients (a[0] must be non-zero)
///     x: Input samples
///
/// Returns:
///     Filtered output, same length as x
#[pyfunction]
pub fn lfilter<'py>(
    py: Python<'py>,
    b: PyReadonlyArray1<f64>,
    a: PyReadonlyArray1<f64>,
    x: PyReadonlyArray1<f64>,
) -> PyResult<&'py PyArray1<f64>> {
    let tf = TransferFunction::new(b.as_slice()?.to_vec(), a.as_slice()?.to_vec());
    let output = filters::lfilter(&tf, x.as_slice()?)?;

    Ok(PyArray1::from_vec(py, output))
}

/// Streaming IIR filter exposed to Python
#[pyclass(name = "IirFilter")]
pub struct PyIirFilter {
    filter: IirFilter,
}

#[pymethods]
impl PyIirFilter {
    /// Create a filter from (b, a) coefficients
    #[new]
    fn new(b: PyReadonlyArray1<f64>, a: PyReadonlyArray1<f64>) -> PyResult<Self> {
        let tf = TransferFunction::new(b.as_slice()?.to_vec(), a.as_slice()?.to_vec());
        Ok(Self {
            filter: IirFilter::new(&tf)?,
        })
    }

    /// Design a Butterworth low-pass filter
    #[staticmethod]
    fn butter_lowpass(order: usize, cutoff: f64, sr: u32) -> PyResult<Self> {
        let tf = filters::butter_lowpass(order, cutoff, sr)?;
        Ok(Self {
            filter: IirFilter::new(&tf)?,
        })
    }

    /// Process a block of samples, carrying state to the next call
    fn process_block<'py>(
        &mut self,
        py: Python<'py>,
        input_signal: PyReadonlyArray1<f64>,
    ) -> PyResult<&'py PyArray1<f64>> {
        let output = self.filter.process_block(input_signal.as_slice()?);
        Ok(PyArray1::from_vec(py, output))
    }

    /// Reset filter state
    fn reset(&mut self) {
        self.filter.reset();
    }

    fn order(&self) -> usize {
        self.filter.order()
    }
}
