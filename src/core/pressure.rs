//! Impulse-to-pressure binning and steady-state statistics.
//!
//! Wall impulses are summed per chamber into uniform time bins over
//! `[t_min, t_max)` of the event set, then divided by `bin_width * wall_length`.
//! Bins are half-open: an event on an interior boundary belongs to the bin
//! that starts there, and an event at exactly `t_max` past the last edge is
//! dropped.

use crate::core::config::Enclosure;
use crate::core::event::CollisionEvent;
use crate::core::walls::{Chamber, WallClassifier};
use crate::error::{Error, Result};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Effective wall perimeter of each chamber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallLengths {
    pub left: f64,
    pub right: f64,
}

/// Wall lengths for a channel of height `chamber_side`:
/// left = 4E - L (square minus the doorway), right = 2E + L.
pub fn wall_lengths(enclosure: &Enclosure, chamber_side: f64) -> Result<WallLengths> {
    let e = enclosure.half_width;
    let lengths = WallLengths {
        left: 4.0 * e - chamber_side,
        right: 2.0 * e + chamber_side,
    };
    if !(lengths.left > 0.0 && lengths.right > 0.0) {
        return Err(Error::InvalidParam(format!(
            "non-positive wall length for chamber_side {chamber_side}: {lengths:?}"
        )));
    }
    Ok(lengths)
}

/// Average pressure of both chambers over one bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureSample {
    pub bin_midpoint_time: f64,
    pub pressure_left: f64,
    pub pressure_right: f64,
}

impl PressureSample {
    /// Chamber-averaged pressure (P_left + P_right) / 2.
    #[inline]
    pub fn mean(&self) -> f64 {
        0.5 * (self.pressure_left + self.pressure_right)
    }
}

/// Per-bin impulse totals before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseBins {
    pub t_min: f64,
    pub bin_width: f64,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl ImpulseBins {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Sum of all binned impulses of both chambers.
    pub fn total(&self) -> f64 {
        self.left.iter().chain(self.right.iter()).sum()
    }
}

/// Upper bound on the number of bins a single series may allocate.
pub const MAX_BINS: usize = 10_000_000;

/// Accumulate each event's wall impulses into bins of `bin_width`.
///
/// A window without any wall hit is degenerate and an error, not an
/// all-zero series. So is a `bin_width` needing more than [`MAX_BINS`] bins.
pub fn bin_impulses(
    events: &[CollisionEvent],
    classifier: &WallClassifier,
    bin_width: f64,
) -> Result<ImpulseBins> {
    if !bin_width.is_finite() || bin_width <= 0.0 {
        return Err(Error::InvalidParam(
            "bin_width must be finite and > 0".into(),
        ));
    }
    let (Some(t_min), Some(t_max)) = (
        events.iter().map(|e| e.time).min(),
        events.iter().map(|e| e.time).max(),
    ) else {
        return Err(Error::DegenerateFit("no wall collision events".into()));
    };
    let (t0, t1) = (t_min.into_inner(), t_max.into_inner());

    let ratio = ((t1 - t0) / bin_width).ceil();
    if !ratio.is_finite() || ratio > MAX_BINS as f64 {
        return Err(Error::InvalidParam(format!(
            "bin_width {bin_width} over a span of {} gives more than {MAX_BINS} bins",
            t1 - t0
        )));
    }
    let nbins = (ratio as usize).max(1);
    let mut left = vec![0.0_f64; nbins];
    let mut right = vec![0.0_f64; nbins];

    let mut dropped = 0usize;
    let mut hits = 0usize;
    for ev in events {
        let b = ((ev.time_f64() - t0) / bin_width).floor();
        if b < 0.0 || b >= nbins as f64 {
            dropped += 1;
            continue;
        }
        let b = b as usize;
        for hit in classifier.classify(&ev.state) {
            hits += 1;
            match hit.chamber {
                Chamber::Left => left[b] += hit.impulse,
                Chamber::Right => right[b] += hit.impulse,
            }
        }
    }
    if hits == 0 {
        return Err(Error::DegenerateFit(format!(
            "no wall collision events among {} recorded collisions",
            events.len()
        )));
    }
    debug!(
        "binned {} wall hits from {} events into {} bins of width {} ({} past the last edge)",
        hits,
        events.len(),
        nbins,
        bin_width,
        dropped
    );

    Ok(ImpulseBins {
        t_min: t0,
        bin_width,
        left,
        right,
    })
}

/// Time series of per-chamber pressure, one sample per bin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PressureSeries {
    pub samples: Vec<PressureSample>,
}

impl PressureSeries {
    /// Normalise binned impulses by bin width and wall length.
    pub fn from_bins(bins: &ImpulseBins, lengths: WallLengths) -> Self {
        let w = bins.bin_width;
        let samples = bins
            .left
            .iter()
            .zip(bins.right.iter())
            .enumerate()
            .map(|(k, (&il, &ir))| PressureSample {
                bin_midpoint_time: bins.t_min + (k as f64 + 0.5) * w,
                pressure_left: il / (w * lengths.left),
                pressure_right: ir / (w * lengths.right),
            })
            .collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop the final bin, which may cover a partial interval.
    pub fn without_last_bin(mut self) -> Self {
        self.samples.pop();
        self
    }

    /// Write the series as a `t,pressure_left,pressure_right` table.
    pub fn write_csv<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "t,pressure_left,pressure_right")?;
        for s in &self.samples {
            writeln!(
                out,
                "{:.6},{:.8e},{:.8e}",
                s.bin_midpoint_time, s.pressure_left, s.pressure_right
            )?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.write_csv(BufWriter::new(File::create(path)?))?;
        info!("wrote {} pressure samples to {}", self.len(), path.display());
        Ok(())
    }
}

/// Classify, bin and normalise in one step.
pub fn pressure_series(
    events: &[CollisionEvent],
    classifier: &WallClassifier,
    lengths: WallLengths,
    bin_width: f64,
) -> Result<PressureSeries> {
    let bins = bin_impulses(events, classifier, bin_width)?;
    Ok(PressureSeries::from_bins(&bins, lengths))
}

/// Which bins count as steady state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteadyWindow {
    /// Bins with midpoint time >= the given time.
    FromTime(f64),
    /// Skip the leading fraction of the series' time span, in [0, 1]:
    /// bins with midpoint >= t0 + frac (t1 - t0) are kept.
    AfterFraction(f64),
}

/// Mean and sample standard deviation of the steady-state pressures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteadyStats {
    pub mean: f64,
    pub std: f64,
    pub mean_left: f64,
    pub std_left: f64,
    pub mean_right: f64,
    pub std_right: f64,
    pub samples: usize,
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Steady-state statistics over the bins selected by `window`.
pub fn steady_stats(series: &PressureSeries, window: SteadyWindow) -> Result<SteadyStats> {
    let (Some(first), Some(last)) = (series.samples.first(), series.samples.last()) else {
        return Err(Error::DegenerateFit("empty pressure series".into()));
    };
    let cut = match window {
        SteadyWindow::FromTime(t) => t,
        SteadyWindow::AfterFraction(frac) => {
            if !(0.0..=1.0).contains(&frac) {
                return Err(Error::InvalidParam(format!(
                    "steady fraction must be in [0, 1], got {frac}"
                )));
            }
            let (t0, t1) = (first.bin_midpoint_time, last.bin_midpoint_time);
            t0 + frac * (t1 - t0)
        }
    };

    let selected: Vec<&PressureSample> = series
        .samples
        .iter()
        .filter(|s| s.bin_midpoint_time >= cut)
        .collect();
    if selected.is_empty() {
        return Err(Error::DegenerateFit(format!(
            "steady window {window:?} selects no bins (last bin at t = {})",
            last.bin_midpoint_time
        )));
    }

    let both: Vec<f64> = selected.iter().map(|s| s.mean()).collect();
    let left: Vec<f64> = selected.iter().map(|s| s.pressure_left).collect();
    let right: Vec<f64> = selected.iter().map(|s| s.pressure_right).collect();
    let (mean, std) = mean_std(&both);
    let (mean_left, std_left) = mean_std(&left);
    let (mean_right, std_right) = mean_std(&right);
    Ok(SteadyStats {
        mean,
        std,
        mean_left,
        std_left,
        mean_right,
        std_right,
        samples: selected.len(),
    })
}
