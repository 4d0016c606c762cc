//! Run parameters and analysis configuration.
//!
//! Two kinds of configuration live here:
//!
//! - [`StaticConfig`]: the six scalars written once per simulation run (`static.txt`)
//! - [`AnalysisConfig`]: tunables of the post-processing itself, with defaults,
//!   optionally loaded from YAML
//!
//! # YAML format
//!
//! Every key is optional; missing keys take the defaults shown.
//!
//! ```yaml
//! enclosure:
//!   half_width: 0.09       # side of the left chamber, width of the channel [m]
//!   tolerance: 2.0e-5      # wall-contact tolerance [m]
//! pressure:
//!   bin_width: 1.0         # time-bin width [s]
//!   steady_tmin: 60.0      # bins before this time are transient [s]
//!   steady_frac: null      # if set, skip this leading fraction of the span instead
//! diffusion:
//!   tmin: 40.0             # equilibration time before the MSD fit [s]
//!   dim: 2
//!   through_origin: true
//! regression:
//!   grid_min: null         # slope grid bounds; auto-span when either is null
//!   grid_max: null
//!   grid_points: 400
//! ```

use crate::core::pressure::SteadyWindow;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Scalar simulation parameters, one per line in the static record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticConfig {
    pub particle_count: usize,
    /// Channel opening height L [m].
    pub chamber_side: f64,
    pub particle_radius: f64,
    pub particle_mass: f64,
    pub initial_speed: f64,
    pub temperature: f64,
}

impl StaticConfig {
    /// Parse the six-line static record.
    ///
    /// Blank lines are not skipped: the record is positional and line `k`
    /// always holds field `k`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();

        let raw = next_field(&mut lines, "particle_count", 1)?;
        let particle_count = raw.parse::<usize>().map_err(|_| {
            Error::format(1, format!("expected integer particle_count, read {raw:?}"))
        })?;

        let mut reals = [0.0_f64; 5];
        let names = [
            "chamber_side",
            "particle_radius",
            "particle_mass",
            "initial_speed",
            "temperature",
        ];
        for (k, (slot, name)) in reals.iter_mut().zip(names).enumerate() {
            let lineno = k + 2;
            let raw = next_field(&mut lines, name, lineno)?;
            *slot = raw
                .parse::<f64>()
                .map_err(|_| Error::format(lineno, format!("expected real {name}, read {raw:?}")))?;
        }

        let cfg = Self {
            particle_count,
            chamber_side: reals[0],
            particle_radius: reals[1],
            particle_mass: reals[2],
            initial_speed: reals[3],
            temperature: reals[4],
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a static record from disk.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let mut text = String::new();
        BufReader::new(File::open(path)?).read_to_string(&mut text)?;
        Self::parse(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(Error::InvalidParam("particle_count must be > 0".into()));
        }
        if !self.chamber_side.is_finite() || self.chamber_side <= 0.0 {
            return Err(Error::InvalidParam(
                "chamber_side must be finite and > 0".into(),
            ));
        }
        if !self.particle_radius.is_finite() || self.particle_radius < 0.0 {
            return Err(Error::InvalidParam(
                "particle_radius must be finite and >= 0".into(),
            ));
        }
        if !self.particle_mass.is_finite() || self.particle_mass <= 0.0 {
            return Err(Error::InvalidParam(
                "particle_mass must be finite and > 0".into(),
            ));
        }
        if !self.initial_speed.is_finite() || !self.temperature.is_finite() {
            return Err(Error::InvalidParam(
                "initial_speed and temperature must be finite".into(),
            ));
        }
        Ok(())
    }
}

fn next_field<'a>(lines: &mut std::str::Lines<'a>, field: &str, lineno: usize) -> Result<&'a str> {
    lines
        .next()
        .map(str::trim)
        .ok_or_else(|| Error::format(lineno, format!("missing {field}")))
}

/// Fixed geometry of the two-chamber enclosure.
///
/// The left chamber is a square of side `half_width`; the channel spans
/// `[half_width, 2 * half_width]` in x and is vertically centered on the
/// chamber with the run's `chamber_side` as its height.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Enclosure {
    pub half_width: f64,
    /// Distance within which a center counts as touching a wall.
    pub tolerance: f64,
}

impl Default for Enclosure {
    fn default() -> Self {
        Self {
            half_width: 0.09,
            tolerance: 2e-5,
        }
    }
}

impl Enclosure {
    pub fn validate(&self) -> Result<()> {
        if !self.half_width.is_finite() || self.half_width <= 0.0 {
            return Err(Error::InvalidParam(
                "enclosure half_width must be finite and > 0".into(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidParam(
                "enclosure tolerance must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PressureConfig {
    pub bin_width: f64,
    pub steady_tmin: f64,
    /// Takes precedence over `steady_tmin` when set.
    pub steady_frac: Option<f64>,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            bin_width: 1.0,
            steady_tmin: 60.0,
            steady_frac: None,
        }
    }
}

impl PressureConfig {
    pub fn steady_window(&self) -> SteadyWindow {
        match self.steady_frac {
            Some(frac) => SteadyWindow::AfterFraction(frac),
            None => SteadyWindow::FromTime(self.steady_tmin),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct DiffusionConfig {
    pub tmin: f64,
    pub dim: usize,
    /// Fit MSD = a t (true) or MSD = a t + b (false).
    pub through_origin: bool,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            tmin: 40.0,
            dim: 2,
            through_origin: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RegressionConfig {
    pub grid_min: Option<f64>,
    pub grid_max: Option<f64>,
    pub grid_points: usize,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            grid_min: None,
            grid_max: None,
            grid_points: 400,
        }
    }
}

/// Top-level analysis configuration.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub enclosure: Enclosure,
    pub pressure: PressureConfig,
    pub diffusion: DiffusionConfig,
    pub regression: RegressionConfig,
}

impl AnalysisConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: AnalysisConfig = serde_yaml::from_str(text)?;
        cfg.enclosure.validate()?;
        Ok(cfg)
    }

    /// Load from a YAML file; a missing file is an error, not a silent default.
    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let reader = BufReader::new(File::open(path)?);
        let cfg: AnalysisConfig = serde_yaml::from_reader(reader)?;
        cfg.enclosure.validate()?;
        Ok(cfg)
    }
}
