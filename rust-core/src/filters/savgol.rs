//! Savitzky-Golay smoothing
//!
//! Each output point is the value at that position of a least-squares
//! polynomial fitted over a sliding window. Interior points use the window
//! centred on them; the first and last `window_length / 2` points are taken
//! from the polynomial fitted to the first and last full window.

use crate::error::{require_len, DspError, Result};
use ndarray::{Array2, Axis};

/// Smooth `x` with a Savitzky-Golay filter
///
/// # Arguments
/// * `x` - Input sequence
/// * `window_length` - Odd window length, at most `x.len()`
/// * `polyorder` - Polynomial order, less than `window_length`
pub fn savgol_filter(x: &[f64], window_length: usize, polyorder: usize) -> Result<Vec<f64>> {
    let hat = fit_matrix(window_length, polyorder)?;
    require_len(x.len(), window_length)?;

    let n = x.len();
    let half = window_length / 2;
    let center_row = hat.index_axis(Axis(0), half);

    let mut y = vec![0.0; n];

    for (i, out) in y.iter_mut().enumerate().take(n - half).skip(half) {
        let window = &x[i - half..=i + half];
        *out = center_row.iter().zip(window).map(|(&h, &v)| h * v).sum();
    }

    // Edges: evaluate the fit of the first/last window at the edge positions
    let head = &x[..window_length];
    for (i, out) in y.iter_mut().enumerate().take(half) {
        *out = hat.row(i).iter().zip(head).map(|(&h, &v)| h * v).sum();
    }

    let tail_start = n - window_length;
    let tail = &x[tail_start..];
    for i in (n - half)..n {
        let row = hat.row(i - tail_start);
        y[i] = row.iter().zip(tail).map(|(&h, &v)| h * v).sum();
    }

    Ok(y)
}

/// Convolution coefficients used for interior points
pub fn savgol_coefficients(window_length: usize, polyorder: usize) -> Result<Vec<f64>> {
    let hat = fit_matrix(window_length, polyorder)?;
    Ok(hat.row(window_length / 2).to_vec())
}

/// Hat matrix H = A (AᵀA)⁻¹ Aᵀ for the window's Vandermonde matrix A
///
/// Row i holds the weights that evaluate the fitted polynomial at window
/// position i.
fn fit_matrix(window_length: usize, polyorder: usize) -> Result<Array2<f64>> {
    if window_length % 2 == 0 {
        return Err(DspError::invalid_parameter(
            "window_length",
            format!("window length must be odd (got {})", window_length),
        ));
    }
    if polyorder >= window_length {
        return Err(DspError::invalid_parameter(
            "polyorder",
            format!(
                "polyorder {} must be less than window length {}",
                polyorder, window_length
            ),
        ));
    }

    let half = window_length / 2;
    // Positions scaled into [-1, 1] to keep AᵀA well conditioned
    let scale = half.max(1) as f64;
    let terms = polyorder + 1;

    let vandermonde = Array2::from_shape_fn((window_length, terms), |(j, k)| {
        ((j as f64 - half as f64) / scale).powi(k as i32)
    });

    let gram = vandermonde.t().dot(&vandermonde);
    let rhs = vandermonde.t().to_owned();
    let weights = solve(gram, rhs)?;

    Ok(vandermonde.dot(&weights))
}

/// Solve M·X = R by Gaussian elimination with partial pivoting
fn solve(mut m: Array2<f64>, mut r: Array2<f64>) -> Result<Array2<f64>> {
    let n = m.nrows();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[[i, col]].abs().total_cmp(&m[[j, col]].abs()))
            .unwrap_or(col);

        if m[[pivot, col]].abs() < 1e-14 {
            return Err(DspError::InvalidConfiguration(
                "singular least-squares system".to_string(),
            ));
        }

        if pivot != col {
            for k in 0..n {
                m.swap([col, k], [pivot, k]);
            }
            for k in 0..r.ncols() {
                r.swap([col, k], [pivot, k]);
            }
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[[row, col]] / m[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[[row, k]] -= factor * m[[col, k]];
            }
            for k in 0..r.ncols() {
                r[[row, k]] -= factor * r[[col, k]];
            }
        }
    }

    for row in 0..n {
        let d = m[[row, row]];
        r.row_mut(row).mapv_inplace(|v| v / d);
    }

    Ok(r)
}
