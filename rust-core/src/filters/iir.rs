//! IIR filtering with the direct-form difference equation
//!
//! Implemented as Direct Form II Transposed:
//!
//! ```text
//! y[n]   = b[0]*x[n] + z[0]
//! z[i]   = b[i+1]*x[n] - a[i+1]*y[n] + z[i+1]
//! ```
//!
//! which computes the same recurrence as
//! y[n] = Σ b[k]*x[n-k] - Σ_{k≥1} a[k]*y[n-k] with one state slot per order.

use super::design::TransferFunction;
use crate::error::{DspError, Result};
use crate::signal::Signal;

/// IIR filter processor with a fixed-size delay line
pub struct IirFilter {
    /// Numerator coefficients, normalized by a[0] and padded to `len`
    b: Vec<f64>,

    /// Denominator coefficients, normalized by a[0] and padded to `len`
    a: Vec<f64>,

    /// Transposed-form state z[0..len-1]
    state: Vec<f64>,
}

impl IirFilter {
    /// Create a new filter from b/a coefficients
    ///
    /// State starts at zero (cold start).
    pub fn new(tf: &TransferFunction) -> Result<Self> {
        if tf.b.is_empty() || tf.a.is_empty() {
            return Err(DspError::invalid_parameter(
                "coefficients",
                "numerator and denominator must be non-empty",
            ));
        }

        let a0 = tf.a[0];
        if !a0.is_finite() || a0.abs() < 1e-30 {
            return Err(DspError::invalid_parameter(
                "coefficients",
                "leading denominator coefficient cannot be zero",
            ));
        }

        let len = tf.b.len().max(tf.a.len());
        let mut b = vec![0.0; len];
        let mut a = vec![0.0; len];
        for (dst, &src) in b.iter_mut().zip(&tf.b) {
            *dst = src / a0;
        }
        for (dst, &src) in a.iter_mut().zip(&tf.a) {
            *dst = src / a0;
        }

        Ok(Self {
            b,
            a,
            state: vec![0.0; len - 1],
        })
    }

    /// Process single sample
    ///
    /// # Arguments
    /// * `input` - Input sample x[n]
    ///
    /// # Returns
    /// Filtered output sample y[n]
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let order = self.state.len();
        if order == 0 {
            return self.b[0] * input;
        }

        let output = self.b[0] * input + self.state[0];

        for i in 0..order - 1 {
            self.state[i] = self.b[i + 1] * input - self.a[i + 1] * output + self.state[i + 1];
        }
        self.state[order - 1] = self.b[order] * input - self.a[order] * output;

        output
    }

    /// Process a block of samples
    ///
    /// # Returns
    /// Filtered output samples (same length as input)
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Process a block in-place (overwrites input buffer)
    pub fn process_block_inplace(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Reset filter state (clear delay line)
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }

    /// Current delay-line contents
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Filter order
    pub fn order(&self) -> usize {
        self.state.len()
    }
}

/// Filter a sequence from a zero initial state
///
/// Each call starts cold; no state carries over between calls.
pub fn lfilter(tf: &TransferFunction, input: &[f64]) -> Result<Vec<f64>> {
    let mut filter = IirFilter::new(tf)?;
    Ok(filter.process_block(input))
}

/// Filter a signal, keeping its sample rate
pub fn apply(tf: &TransferFunction, signal: &Signal) -> Result<Signal> {
    let filtered = lfilter(tf, signal.samples())?;
    Ok(signal.with_samples(filtered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fir_moving_average() {
        // b only: 3-tap moving average
        let tf = TransferFunction::new(vec![1.0 / 3.0; 3], vec![1.0]);
        let output = lfilter(&tf, &[3.0, 0.0, 0.0, 0.0]).unwrap();

        let expected = [1.0, 1.0, 1.0, 0.0];
        for (y, e) in output.iter().zip(expected) {
            assert!((y - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_first_order_recursion() {
        // y[n] = x[n] + 0.5*y[n-1]  ->  impulse response 0.5^n
        let tf = TransferFunction::new(vec![1.0], vec![1.0, -0.5]);
        let mut impulse = vec![0.0; 6];
        impulse[0] = 1.0;

        let output = lfilter(&tf, &impulse).unwrap();
        for (n, y) in output.iter().enumerate() {
            assert!((y - 0.5f64.powi(n as i32)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_matches_direct_difference_equation() {
        let tf = TransferFunction::new(vec![0.2, 0.3, 0.1], vec![1.0, -0.4, 0.25]);
        let input: Vec<f64> = (0..64).map(|i| (i as f64 * 0.37).sin()).collect();

        let output = lfilter(&tf, &input).unwrap();

        let mut expected = vec![0.0; input.len()];
        for n in 0..input.len() {
            let mut acc = 0.0;
            for (k, &bk) in tf.b.iter().enumerate() {
                if n >= k {
                    acc += bk * input[n - k];
                }
            }
            for (k, &ak) in tf.a.iter().enumerate().skip(1) {
                if n >= k {
                    acc -= ak * expected[n - k];
                }
            }
            expected[n] = acc;
        }

        for (y, e) in output.iter().zip(&expected) {
            assert!((y - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalizes_leading_coefficient() {
        let scaled = TransferFunction::new(vec![2.0, 2.0], vec![2.0, -1.0]);
        let unit = TransferFunction::new(vec![1.0, 1.0], vec![1.0, -0.5]);
        let input = [1.0, -1.0, 0.5, 0.25];

        assert_eq!(lfilter(&scaled, &input).unwrap(), lfilter(&unit, &input).unwrap());
    }

    #[test]
    fn test_output_length_and_cold_start() {
        let tf = TransferFunction::new(vec![0.5, 0.5], vec![1.0, -0.2]);
        let input = vec![1.0; 100];

        let first = lfilter(&tf, &input).unwrap();
        let second = lfilter(&tf, &input).unwrap();

        assert_eq!(first.len(), input.len());
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset() {
        let tf = TransferFunction::new(vec![1.0], vec![1.0, -0.9]);
        let mut filter = IirFilter::new(&tf).unwrap();

        filter.process_block(&[1.0, 1.0, 1.0]);
        assert!(filter.state().iter().any(|&z| z != 0.0));

        filter.reset();
        assert!((filter.process_sample(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_coefficients() {
        assert!(IirFilter::new(&TransferFunction::new(vec![], vec![1.0])).is_err());
        assert!(IirFilter::new(&TransferFunction::new(vec![1.0], vec![0.0, 1.0])).is_err());
    }
}
