//! Least-squares estimators.
//!
//! - [`fit_through_origin`]: y = a x, closed form a = Σxy / Σx²
//! - [`error_curve`]: brute-force SSE over a slope grid, to confirm the closed form
//! - [`linear_fit`]: y = a x + b by the normal equations
//!
//! Degenerate inputs (empty samples, zero variance in x) are reported as
//! [`Error::DegenerateFit`] instead of producing NaN or infinite slopes.

use crate::error::{Error, Result};

/// Result of an origin-constrained fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginFit {
    pub slope: f64,
    pub sum_squared_error: f64,
    /// Unit-weight standard error of the slope, √(1/Σx²).
    pub slope_std_error: f64,
}

/// Result of a slope + intercept fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub sum_squared_error: f64,
    /// `None` when y has zero variance.
    pub r_squared: Option<f64>,
}

fn check_samples(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::InvalidParam(format!(
            "x and y lengths differ: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(Error::DegenerateFit("no samples to fit".into()));
    }
    if !x.iter().chain(y.iter()).all(|v| v.is_finite()) {
        return Err(Error::InvalidParam("samples must be finite".into()));
    }
    Ok(())
}

fn check_finite(what: &str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::DegenerateFit(format!(
            "{what} is not finite; x is too close to degenerate"
        )))
    }
}

/// Σ (y - slope x)².
#[inline]
pub fn sum_squared_error(x: &[f64], y: &[f64], slope: f64) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let r = yi - slope * xi;
            r * r
        })
        .sum()
}

/// Fit y = a x by least squares.
pub fn fit_through_origin(x: &[f64], y: &[f64]) -> Result<OriginFit> {
    check_samples(x, y)?;
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    if sxx == 0.0 {
        return Err(Error::DegenerateFit(
            "sum of squared x is zero; slope is undefined".into(),
        ));
    }
    let sxy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let slope = sxy / sxx;
    let sse = sum_squared_error(x, y, slope);
    let slope_std_error = (1.0 / sxx).sqrt();
    check_finite("origin fit", &[slope, sse, slope_std_error])?;
    Ok(OriginFit {
        slope,
        sum_squared_error: sse,
        slope_std_error,
    })
}

/// Fit y = a x + b by ordinary least squares.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    check_samples(x, y)?;
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let sxx: f64 = x.iter().map(|v| (v - mean_x) * (v - mean_x)).sum();
    if sxx == 0.0 {
        return Err(Error::DegenerateFit(
            "x has zero variance; slope is undefined".into(),
        ));
    }
    let sxy: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let predicted: Vec<f64> = x.iter().map(|v| slope * v + intercept).collect();
    let sse: f64 = y
        .iter()
        .zip(predicted.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    check_finite("linear fit", &[slope, intercept, sse])?;
    Ok(LinearFit {
        slope,
        intercept,
        sum_squared_error: sse,
        r_squared: r_squared(y, &predicted),
    })
}

/// Coefficient of determination 1 - SS_res / SS_tot; `None` when SS_tot = 0.
pub fn r_squared(y: &[f64], predicted: &[f64]) -> Option<f64> {
    if y.is_empty() || y.len() != predicted.len() {
        return None;
    }
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let ss_tot: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
    if ss_tot <= 0.0 {
        return None;
    }
    let ss_res: f64 = y
        .iter()
        .zip(predicted.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

/// Candidate slopes for [`error_curve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlopeGrid {
    /// Centered on the analytic slope c with half-span 3|c| (1.0 when c = 0).
    Auto { points: usize },
    /// Explicit inclusive bounds.
    Bounded { min: f64, max: f64, points: usize },
}

impl SlopeGrid {
    /// Grid from optional bounds: bounded only when both are given.
    pub fn from_bounds(min: Option<f64>, max: Option<f64>, points: usize) -> Self {
        match (min, max) {
            (Some(min), Some(max)) => SlopeGrid::Bounded { min, max, points },
            _ => SlopeGrid::Auto { points },
        }
    }

    /// Evaluate the grid into `points` evenly spaced slopes (inclusive ends).
    pub fn resolve(&self, analytic_slope: f64) -> Result<Vec<f64>> {
        let (min, max, points) = match *self {
            SlopeGrid::Auto { points } => {
                let span = if analytic_slope != 0.0 {
                    3.0 * analytic_slope.abs()
                } else {
                    1.0
                };
                (analytic_slope - span, analytic_slope + span, points)
            }
            SlopeGrid::Bounded { min, max, points } => {
                if !(min.is_finite() && max.is_finite() && min < max) {
                    return Err(Error::InvalidParam(format!(
                        "slope grid bounds must be finite with min < max, got [{min}, {max}]"
                    )));
                }
                (min, max, points)
            }
        };
        if points < 2 {
            return Err(Error::InvalidParam(
                "slope grid needs at least 2 points".into(),
            ));
        }
        let step = (max - min) / (points - 1) as f64;
        Ok((0..points).map(|k| min + step * k as f64).collect())
    }
}

/// Sum of squared errors over a slope grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCurve {
    pub slopes: Vec<f64>,
    pub errors: Vec<f64>,
    /// Grid slope with the smallest error.
    pub best_slope: f64,
    pub best_error: f64,
}

/// Evaluate Σ (y - c x)² at every slope c of `grid`.
///
/// The auto grid is centered on the closed-form slope, so the same
/// degenerate-input rules as [`fit_through_origin`] apply.
pub fn error_curve(x: &[f64], y: &[f64], grid: SlopeGrid) -> Result<ErrorCurve> {
    let analytic = fit_through_origin(x, y)?;
    let slopes = grid.resolve(analytic.slope)?;
    let errors: Vec<f64> = slopes
        .iter()
        .map(|&c| sum_squared_error(x, y, c))
        .collect();
    let (best, best_error) = errors
        .iter()
        .copied()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| Error::DegenerateFit("empty slope grid".into()))?;
    Ok(ErrorCurve {
        best_slope: slopes[best],
        best_error,
        slopes,
        errors,
    })
}
