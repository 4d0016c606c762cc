//! # gastrace
//!
//! Post-processing of two-chamber hard-disk simulation output. A run is a
//! static parameter record (`static.txt`) and a trajectory/event log
//! (`dynamic.txt`); from them this crate derives:
//!
//! - mean-squared displacement and a diffusion coefficient
//! - per-chamber wall pressure time series from recorded wall collisions
//! - the origin-constrained fit of steady pressure against inverse area
//!   across runs of different channel heights
//!
//! ```no_run
//! use gastrace::core::{analyze_runs, pressure_area_regression, AnalysisConfig, SlopeGrid};
//!
//! let cfg = AnalysisConfig::default();
//! let runs = analyze_runs(&["sim_L003", "sim_L005", "sim_L007"], &cfg)?;
//! let reg = pressure_area_regression(&runs, SlopeGrid::Auto { points: 400 })?;
//! println!("c* = {:.6e} ± {:.6e}", reg.fit.slope, reg.fit.slope_std_error);
//! # Ok::<(), gastrace::error::Error>(())
//! ```

pub mod core;
pub mod error;

// Python bindings for the plotting scripts
#[cfg(feature = "python")]
mod python;
