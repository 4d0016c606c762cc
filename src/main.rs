use gastrace::core::config::AnalysisConfig;
use gastrace::core::fit::SlopeGrid;
use gastrace::core::runs::{analyze_diffusion, analyze_runs, pressure_area_regression, run_pressure_series, RunFiles};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Observables from two-chamber hard-disk runs", long_about = None)]
struct Cli {
    /// YAML analysis configuration; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// MSD(t) and diffusion coefficient of one run
    Msd {
        folder: PathBuf,
        /// Start of the fitted window [s]
        #[arg(long)]
        tmin: Option<f64>,
        /// Dimensionality in MSD ≈ 2 d D t
        #[arg(long)]
        dim: Option<usize>,
        /// Fit MSD = a t + b instead of MSD = a t
        #[arg(long)]
        intercept: bool,
    },
    /// Per-chamber pressure series of one run
    Pressure {
        folder: PathBuf,
        #[arg(long)]
        bin_width: Option<f64>,
        /// Output table (default: <folder>/pressures.csv)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Steady pressure against inverse area across runs
    Regression {
        #[arg(required = true)]
        folders: Vec<PathBuf>,
        /// Bins before this time are transient [s]
        #[arg(long, conflicts_with = "steady_frac")]
        tmin: Option<f64>,
        /// Skip this leading fraction of each run's time span instead of using --tmin
        #[arg(long)]
        steady_frac: Option<f64>,
        #[arg(long)]
        cmin: Option<f64>,
        #[arg(long)]
        cmax: Option<f64>,
        #[arg(long)]
        ngrid: Option<usize>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::from_yaml_path(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn run_msd(folder: &Path, cfg: &AnalysisConfig) -> Result<()> {
    let files = RunFiles::locate(folder)?;
    let run = analyze_diffusion(&files, cfg)
        .with_context(|| format!("diffusion analysis of {}", folder.display()))?;
    let est = run.estimate;
    println!("# t\tMSD");
    for (t, m) in run.times.iter().zip(run.msd.iter()) {
        println!("{t:.6}\t{m:.8e}");
    }
    println!("# fit over {} samples with t >= {}", est.samples, cfg.diffusion.tmin);
    println!("# slope = {:.6e}, intercept = {:.6e}", est.slope, est.intercept);
    println!("# D = {:.6e} m^2/s, E = {:.6e}", est.coefficient, est.sum_squared_error);
    if let Some(r2) = est.r_squared {
        println!("# R^2 = {r2:.6}");
    }
    Ok(())
}

fn run_pressure(folder: &Path, csv: Option<PathBuf>, cfg: &AnalysisConfig) -> Result<()> {
    let files = RunFiles::locate(folder)?;
    let (config, series) = run_pressure_series(&files, cfg)
        .with_context(|| format!("pressure analysis of {}", folder.display()))?;
    let out = csv.unwrap_or_else(|| folder.join("pressures.csv"));
    series
        .save_csv(&out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "L = {:.3} m: {} bins of {} s written to {}",
        config.chamber_side,
        series.len(),
        cfg.pressure.bin_width,
        out.display()
    );
    Ok(())
}

fn run_regression(folders: &[PathBuf], cfg: &AnalysisConfig) -> Result<()> {
    let runs = analyze_runs(folders, cfg)?;
    println!("L [m]   A [m^2]     1/A [1/m^2]   P_avg         P_std         P_left        P_right       (P·A)");
    for r in &runs {
        println!(
            "{:0.3}  {:0.6}  {:<12.3}  {:.6e}  {:.6e}  {:.6e}  {:.6e}  {:.6e}",
            r.chamber_side,
            r.area,
            r.inverse_area,
            r.stats.mean,
            r.stats.std,
            r.stats.mean_left,
            r.stats.mean_right,
            r.pressure_area_product()
        );
    }

    let rc = cfg.regression;
    let reg = pressure_area_regression(&runs, SlopeGrid::from_bounds(rc.grid_min, rc.grid_max, rc.grid_points))?;
    println!("c* = {:.6e} ± {:.6e}", reg.fit.slope, reg.fit.slope_std_error);
    println!(
        "grid minimum c = {:.6e} (|Δ| = {:.3e}, rel {:.3e}), E = {:.6e}",
        reg.curve.best_slope, reg.grid_delta_abs, reg.grid_delta_rel, reg.curve.best_error
    );
    match reg.r_squared {
        Some(r2) => println!("R^2 = {r2:.6}"),
        None => println!("R^2 undefined (constant mean pressure)"),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Msd {
            folder,
            tmin,
            dim,
            intercept,
        } => {
            if let Some(t) = tmin {
                cfg.diffusion.tmin = t;
            }
            if let Some(d) = dim {
                cfg.diffusion.dim = d;
            }
            if intercept {
                cfg.diffusion.through_origin = false;
            }
            run_msd(&folder, &cfg)
        }
        Command::Pressure {
            folder,
            bin_width,
            csv,
        } => {
            if let Some(w) = bin_width {
                cfg.pressure.bin_width = w;
            }
            run_pressure(&folder, csv, &cfg)
        }
        Command::Regression {
            folders,
            tmin,
            steady_frac,
            cmin,
            cmax,
            ngrid,
        } => {
            if let Some(t) = tmin {
                cfg.pressure.steady_tmin = t;
                cfg.pressure.steady_frac = None;
            }
            if steady_frac.is_some() {
                cfg.pressure.steady_frac = steady_frac;
            }
            cfg.regression.grid_min = cmin.or(cfg.regression.grid_min);
            cfg.regression.grid_max = cmax.or(cfg.regression.grid_max);
            if let Some(n) = ngrid {
                cfg.regression.grid_points = n;
            }
            run_regression(&folders, &cfg)
        }
    }
}
