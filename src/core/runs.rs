//! Run folders and cross-run aggregation.
//!
//! A run folder holds `static.txt` and `dynamic.txt`. Runs are independent,
//! so [`analyze_runs`] processes them in parallel and sorts afterwards.

use crate::core::config::{AnalysisConfig, Enclosure, StaticConfig};
use crate::core::fit::{error_curve, fit_through_origin, r_squared, ErrorCurve, OriginFit, SlopeGrid};
use crate::core::msd::{compute_msd, estimate_diffusion, relative_times, DiffusionEstimate, FitMode};
use crate::core::pressure::{pressure_series, steady_stats, wall_lengths, PressureSeries, SteadyStats};
use crate::core::trajectory::{read_collision_events, read_frames};
use crate::core::walls::WallClassifier;
use crate::error::{Error, Result};
use log::{debug, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const STATIC_FILE: &str = "static.txt";
pub const DYNAMIC_FILE: &str = "dynamic.txt";

/// Resolved input files of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFiles {
    pub folder: PathBuf,
    pub static_path: PathBuf,
    pub dynamic_path: PathBuf,
}

impl RunFiles {
    /// Resolve both files, failing before any parsing if either is absent.
    pub fn locate<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let folder = folder.as_ref().to_path_buf();
        let static_path = folder.join(STATIC_FILE);
        let dynamic_path = folder.join(DYNAMIC_FILE);
        for path in [&static_path, &dynamic_path] {
            if !path.is_file() {
                return Err(Error::MissingInput { path: path.clone() });
            }
        }
        Ok(Self {
            folder,
            static_path,
            dynamic_path,
        })
    }

    pub fn read_static(&self) -> Result<StaticConfig> {
        StaticConfig::read(&self.static_path)
    }

    pub fn read_dynamic(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.dynamic_path)?)
    }
}

/// Total area of chamber plus channel: E² + E L.
pub fn enclosure_area(enclosure: &Enclosure, chamber_side: f64) -> f64 {
    let e = enclosure.half_width;
    e * e + e * chamber_side
}

/// MSD series and diffusion estimate of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionRun {
    pub config: StaticConfig,
    pub times: Vec<f64>,
    pub msd: Vec<f64>,
    pub estimate: DiffusionEstimate,
}

pub fn analyze_diffusion(files: &RunFiles, cfg: &AnalysisConfig) -> Result<DiffusionRun> {
    let config = files.read_static()?;
    let frames = read_frames(&files.read_dynamic()?, config.particle_count)?;
    let times = relative_times(&frames);
    let msd = compute_msd(&frames)?;
    let mode = if cfg.diffusion.through_origin {
        FitMode::ThroughOrigin
    } else {
        FitMode::WithIntercept
    };
    let estimate = estimate_diffusion(&times, &msd, cfg.diffusion.tmin, cfg.diffusion.dim, mode)?;
    Ok(DiffusionRun {
        config,
        times,
        msd,
        estimate,
    })
}

/// Full per-bin pressure series of one run (final bin included).
pub fn run_pressure_series(files: &RunFiles, cfg: &AnalysisConfig) -> Result<(StaticConfig, PressureSeries)> {
    let config = files.read_static()?;
    let events = read_collision_events(&files.read_dynamic()?, config.particle_count)?;
    let classifier = WallClassifier::for_run(&cfg.enclosure, &config)?;
    let lengths = wall_lengths(&cfg.enclosure, config.chamber_side)?;
    let series = pressure_series(&events, &classifier, lengths, cfg.pressure.bin_width)?;
    debug!(
        "{}: {} events -> {} pressure bins",
        files.folder.display(),
        events.len(),
        series.len()
    );
    Ok((config, series))
}

/// Steady-state pressure of one run, keyed by its geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub chamber_side: f64,
    pub area: f64,
    pub inverse_area: f64,
    pub stats: SteadyStats,
}

impl RunSummary {
    /// Mean pressure times area, constant for an ideal gas.
    pub fn pressure_area_product(&self) -> f64 {
        self.stats.mean * self.area
    }
}

/// Steady-state statistics of one run; the final partial bin is discarded.
pub fn analyze_run<P: AsRef<Path>>(folder: P, cfg: &AnalysisConfig) -> Result<RunSummary> {
    let files = RunFiles::locate(folder)?;
    let (config, series) = run_pressure_series(&files, cfg)?;
    let stats = steady_stats(&series.without_last_bin(), cfg.pressure.steady_window())?;
    let area = enclosure_area(&cfg.enclosure, config.chamber_side);
    Ok(RunSummary {
        chamber_side: config.chamber_side,
        area,
        inverse_area: 1.0 / area,
        stats,
    })
}

/// Analyze independent runs in parallel; results sorted by chamber_side.
///
/// Every folder is checked for its input files before any run is parsed.
pub fn analyze_runs<P: AsRef<Path>>(folders: &[P], cfg: &AnalysisConfig) -> Result<Vec<RunSummary>> {
    let files = folders
        .iter()
        .map(RunFiles::locate)
        .collect::<Result<Vec<_>>>()?;
    let mut runs = files
        .par_iter()
        .map(|f| analyze_run(&f.folder, cfg))
        .collect::<Result<Vec<_>>>()?;
    runs.sort_by(|a, b| a.chamber_side.total_cmp(&b.chamber_side));
    info!("analyzed {} runs", runs.len());
    Ok(runs)
}

/// Origin fit of mean steady pressure against inverse area.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaRegression {
    pub fit: OriginFit,
    pub curve: ErrorCurve,
    /// |grid minimum - analytic slope|.
    pub grid_delta_abs: f64,
    /// `grid_delta_abs` relative to |analytic slope| (or to 1 when it is 0).
    pub grid_delta_rel: f64,
    pub r_squared: Option<f64>,
}

pub fn pressure_area_regression(runs: &[RunSummary], grid: SlopeGrid) -> Result<AreaRegression> {
    let x: Vec<f64> = runs.iter().map(|r| r.inverse_area).collect();
    let y: Vec<f64> = runs.iter().map(|r| r.stats.mean).collect();
    let fit = fit_through_origin(&x, &y)?;
    let curve = error_curve(&x, &y, grid)?;
    let grid_delta_abs = (curve.best_slope - fit.slope).abs();
    let scale = if fit.slope != 0.0 { fit.slope.abs() } else { 1.0 };
    let predicted: Vec<f64> = x.iter().map(|v| fit.slope * v).collect();
    info!(
        "P vs 1/A over {} runs: c = {:.6e} ± {:.6e}",
        runs.len(),
        fit.slope,
        fit.slope_std_error
    );
    Ok(AreaRegression {
        fit,
        grid_delta_abs,
        grid_delta_rel: grid_delta_abs / scale,
        r_squared: r_squared(&y, &predicted),
        curve,
    })
}
