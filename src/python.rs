use crate::core::config::{AnalysisConfig, StaticConfig};
use crate::core::fit::{self, SlopeGrid};
use crate::core::runs::{analyze_diffusion, run_pressure_series, RunFiles, STATIC_FILE};
use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::exceptions::{PyFileNotFoundError, PyValueError};
use pyo3::prelude::*;
use std::path::PathBuf;

fn py_err(e: crate::error::Error) -> PyErr {
    match e {
        crate::error::Error::MissingInput { .. } => PyFileNotFoundError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn as_vec(arr: &PyReadonlyArray1<'_, f64>) -> Vec<f64> {
    arr.as_array().iter().copied().collect()
}

/// Read `static.txt` from a run folder; `dynamic.txt` need not exist.
///
/// Returns: (N, L, R, M, V, T)
#[pyfunction]
fn read_static(folder: PathBuf) -> PyResult<(usize, f64, f64, f64, f64, f64)> {
    let StaticConfig {
        particle_count,
        chamber_side,
        particle_radius,
        particle_mass,
        initial_speed,
        temperature,
    } = StaticConfig::read(folder.join(STATIC_FILE)).map_err(py_err)?;
    Ok((
        particle_count,
        chamber_side,
        particle_radius,
        particle_mass,
        initial_speed,
        temperature,
    ))
}

/// MSD(t) of a run and its diffusion coefficient (releases the GIL while parsing).
///
/// Parameters
/// - tmin: start of the fitted window, relative to the first frame
/// - dim: dimensionality in MSD ≈ 2 d D t
/// - through_origin: fit MSD = a t (True) or MSD = a t + b (False)
///
/// Returns: (times, msd, D, sse)
#[pyfunction]
#[pyo3(signature = (folder, tmin=40.0, dim=2, through_origin=true))]
fn msd<'py>(
    py: Python<'py>,
    folder: PathBuf,
    tmin: f64,
    dim: usize,
    through_origin: bool,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, f64, f64)> {
    let mut cfg = AnalysisConfig::default();
    cfg.diffusion.tmin = tmin;
    cfg.diffusion.dim = dim;
    cfg.diffusion.through_origin = through_origin;
    let run = py
        .detach(|| RunFiles::locate(&folder).and_then(|files| analyze_diffusion(&files, &cfg)))
        .map_err(py_err)?;
    Ok((
        run.times.into_pyarray(py),
        run.msd.into_pyarray(py),
        run.estimate.coefficient,
        run.estimate.sum_squared_error,
    ))
}

/// Per-chamber pressure series of a run as an (M, 3) array of [t, P_left, P_right].
#[pyfunction]
#[pyo3(signature = (folder, bin_width=1.0))]
fn pressure_series<'py>(
    py: Python<'py>,
    folder: PathBuf,
    bin_width: f64,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let mut cfg = AnalysisConfig::default();
    cfg.pressure.bin_width = bin_width;
    let (_, series) = py
        .detach(|| RunFiles::locate(&folder).and_then(|files| run_pressure_series(&files, &cfg)))
        .map_err(py_err)?;
    let mut arr = Array2::<f64>::zeros((series.len(), 3));
    for (i, s) in series.samples.iter().enumerate() {
        arr[[i, 0]] = s.bin_midpoint_time;
        arr[[i, 1]] = s.pressure_left;
        arr[[i, 2]] = s.pressure_right;
    }
    Ok(arr.into_pyarray(py))
}

/// Least squares through the origin.
///
/// Returns: (slope, sse, slope_std_error)
#[pyfunction]
fn fit_through_origin(x: PyReadonlyArray1<'_, f64>, y: PyReadonlyArray1<'_, f64>) -> PyResult<(f64, f64, f64)> {
    let fit = fit::fit_through_origin(&as_vec(&x), &as_vec(&y)).map_err(py_err)?;
    Ok((fit.slope, fit.sum_squared_error, fit.slope_std_error))
}

/// SSE of y = c x over a slope grid; auto-spanned unless both bounds are given.
///
/// Returns: (slopes, errors, best_slope, best_error)
#[pyfunction]
#[pyo3(signature = (x, y, cmin=None, cmax=None, num=400))]
fn error_curve<'py>(
    py: Python<'py>,
    x: PyReadonlyArray1<'py, f64>,
    y: PyReadonlyArray1<'py, f64>,
    cmin: Option<f64>,
    cmax: Option<f64>,
    num: usize,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, f64, f64)> {
    let curve = fit::error_curve(&as_vec(&x), &as_vec(&y), SlopeGrid::from_bounds(cmin, cmax, num))
        .map_err(py_err)?;
    Ok((
        curve.slopes.into_pyarray(py),
        curve.errors.into_pyarray(py),
        curve.best_slope,
        curve.best_error,
    ))
}

/// The gastrace Python module entry point.
#[pymodule]
fn gastrace(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(read_static, m)?)?;
    m.add_function(wrap_pyfunction!(msd, m)?)?;
    m.add_function(wrap_pyfunction!(pressure_series, m)?)?;
    m.add_function(wrap_pyfunction!(fit_through_origin, m)?)?;
    m.add_function(wrap_pyfunction!(error_curve, m)?)?;
    Ok(())
}
