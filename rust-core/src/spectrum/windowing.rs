//! Windowing and framing for short-time analysis
//!
//! Applies windows to time-domain segments before the FFT to reduce spectral
//! leakage, and slices a sequence into overlapping frames.

use crate::error::{require_len, DspError, Result};
use crate::filters::windows::{generate_window, WindowType};
use ndarray::Array2;

/// Apply window to signal
///
/// # Arguments
/// * `signal` - Input signal
/// * `window_type` - Type of window to apply
///
/// # Returns
/// Windowed signal
pub fn apply_window(signal: &[f64], window_type: WindowType) -> Vec<f64> {
    let window = generate_window(window_type, signal.len());

    signal
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s * w)
        .collect()
}

/// Multiply `frame` by precomputed coefficients in-place
pub fn apply_coefficients_inplace(frame: &mut [f64], window: &[f64]) {
    for (s, w) in frame.iter_mut().zip(window.iter()) {
        *s *= w;
    }
}

/// Number of frames produced by [`frame_signal`]
///
/// Centered framing pads `frame_length / 2` zeros on each side, so frame t is
/// centred on sample t·hop.
pub fn num_frames(len: usize, frame_length: usize, hop_length: usize, center: bool) -> usize {
    let padded = if center { len + 2 * (frame_length / 2) } else { len };
    if hop_length == 0 || padded < frame_length {
        return 0;
    }
    1 + (padded - frame_length) / hop_length
}

/// Slice a sequence into overlapping frames
///
/// # Arguments
/// * `signal` - Input samples
/// * `frame_length` - Samples per frame
/// * `hop_length` - Samples between frame starts
/// * `center` - Zero-pad `frame_length / 2` on both ends
///
/// # Returns
/// Frames as rows: shape (n_frames, frame_length)
///
/// A frame longer than the sequence itself is reported as insufficient data,
/// whether or not centering would pad it out.
pub fn frame_signal(
    signal: &[f64],
    frame_length: usize,
    hop_length: usize,
    center: bool,
) -> Result<Array2<f64>> {
    if frame_length == 0 {
        return Err(DspError::invalid_parameter(
            "frame_length",
            "frame length must be positive",
        ));
    }
    if hop_length == 0 {
        return Err(DspError::invalid_parameter(
            "hop_length",
            "hop length must be positive",
        ));
    }
    require_len(signal.len(), frame_length)?;

    let pad = if center { frame_length / 2 } else { 0 };
    let mut padded = vec![0.0; signal.len() + 2 * pad];
    padded[pad..pad + signal.len()].copy_from_slice(signal);

    let n_frames = num_frames(signal.len(), frame_length, hop_length, center);
    let frames = Array2::from_shape_fn((n_frames, frame_length), |(t, i)| {
        padded[t * hop_length + i]
    });

    Ok(frames)
}
