//! Numerical integration over sampled curves
//!
//! Filter curves arrive with irregular node spacing, so both rules here work
//! on explicit (x, y) samples rather than on a uniform grid.

use thiserror::Error;

/// Errors that can occur during numerical integration
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Insufficient points for integration, need at least 2 points")]
    InsufficientPoints,

    #[error("Abscissa and ordinate lengths differ ({0} vs {1})")]
    LengthMismatch(usize, usize),

    #[error("Points must be in ascending order")]
    NotAscending,
}

fn validate(x: &[f64], y: &[f64]) -> Result<(), IntegrationError> {
    if x.len() != y.len() {
        return Err(IntegrationError::LengthMismatch(x.len(), y.len()));
    }
    if x.len() < 2 {
        return Err(IntegrationError::InsufficientPoints);
    }
    if x.windows(2).any(|w| w[1] <= w[0]) {
        return Err(IntegrationError::NotAscending);
    }
    Ok(())
}

/// Performs composite trapezoidal integration of sampled values.
///
/// # Arguments
///
/// * `x` - The sample abscissae in strictly ascending order
/// * `y` - The sampled function values
///
/// # Returns
///
/// The result of the trapezoidal integration or an error if the input is invalid.
pub fn trap_integrate(x: &[f64], y: &[f64]) -> Result<f64, IntegrationError> {
    validate(x, y)?;
    Ok(trapezoid_unchecked(x, y))
}

/// Performs composite Simpson integration of sampled values with irregular spacing.
///
/// Each pair of adjacent intervals is fit with the parabola through its three
/// nodes. With an odd number of intervals the last one cannot be paired, so the
/// result averages two estimates: Simpson over the leading intervals plus a
/// trapezoid on the final one, and a trapezoid on the first interval plus
/// Simpson over the trailing ones. Two nodes reduce to a single trapezoid.
///
/// # Arguments
///
/// * `x` - The sample abscissae in strictly ascending order
/// * `y` - The sampled function values
///
/// # Returns
///
/// The integral estimate or an error if the input is invalid.
pub fn simpson_integrate(x: &[f64], y: &[f64]) -> Result<f64, IntegrationError> {
    validate(x, y)?;

    let n = x.len();
    if n == 2 {
        return trap_integrate(x, y);
    }
    if n % 2 == 1 {
        return Ok(simpson_unchecked(x, y));
    }

    let head = simpson_unchecked(&x[..n - 1], &y[..n - 1])
        + trapezoid_unchecked(&x[n - 2..], &y[n - 2..]);
    let tail = trapezoid_unchecked(&x[..2], &y[..2]) + simpson_unchecked(&x[1..], &y[1..]);

    Ok((head + tail) / 2.0)
}

/// Integrate the product of two sampled curves sharing the same abscissae
pub fn simpson_integrate_product(
    x: &[f64],
    a: &[f64],
    b: &[f64],
) -> Result<f64, IntegrationError> {
    if a.len() != b.len() {
        return Err(IntegrationError::LengthMismatch(a.len(), b.len()));
    }
    let product: Vec<f64> = a.iter().zip(b).map(|(a, b)| a * b).collect();
    simpson_integrate(x, &product)
}

fn trapezoid_unchecked(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

// Requires an odd number of nodes (even number of intervals).
fn simpson_unchecked(x: &[f64], y: &[f64]) -> f64 {
    let mut sum = 0.0;

    for i in (0..x.len() - 2).step_by(2) {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let span = h0 + h1;

        sum += span / 6.0
            * ((2.0 - h1 / h0) * y[i]
                + span * span / (h0 * h1) * y[i + 1]
                + (2.0 - h0 / h1) * y[i + 2]);
    }

    sum
}
