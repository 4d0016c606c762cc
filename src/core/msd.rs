use crate::core::fit::{fit_through_origin, linear_fit, r_squared};
use crate::core::trajectory::Frame;
use crate::error::{Error, Result};
use log::info;

/// MSD(f) = mean over particles of |r_i(f) - r_i(0)|², one value per frame.
pub fn compute_msd(frames: &[Frame]) -> Result<Vec<f64>> {
    let Some(reference) = frames.first() else {
        return Err(Error::DegenerateFit("no frames to compute MSD".into()));
    };
    let n = reference.particles.len();
    if n == 0 {
        return Err(Error::DegenerateFit("frames contain no particles".into()));
    }
    frames
        .iter()
        .map(|frame| {
            if frame.particles.len() != n {
                return Err(Error::InvalidParam(format!(
                    "frame {} has {} particles, expected {n}",
                    frame.index,
                    frame.particles.len()
                )));
            }
            let total: f64 = frame
                .particles
                .iter()
                .zip(reference.particles.iter())
                .map(|(p, p0)| p.squared_displacement(p0))
                .sum();
            Ok(total / n as f64)
        })
        .collect()
}

/// Frame times shifted so the first frame is at t = 0.
pub fn relative_times(frames: &[Frame]) -> Vec<f64> {
    let t0 = frames.first().map_or(0.0, |f| f.time);
    frames.iter().map(|f| f.time - t0).collect()
}

/// Model fitted to MSD(t).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// MSD = a t
    ThroughOrigin,
    /// MSD = a t + b
    WithIntercept,
}

/// Diffusion coefficient from the linear regime of MSD(t).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionEstimate {
    pub slope: f64,
    /// Zero for [`FitMode::ThroughOrigin`].
    pub intercept: f64,
    /// D = slope / (2 dim).
    pub coefficient: f64,
    pub sum_squared_error: f64,
    pub r_squared: Option<f64>,
    /// Number of (t, MSD) samples with t >= tmin.
    pub samples: usize,
}

/// Fit MSD(t) for t >= `tmin` and convert the slope to D via MSD ≈ 2 d D t.
pub fn estimate_diffusion(
    times: &[f64],
    msd: &[f64],
    tmin: f64,
    dim: usize,
    mode: FitMode,
) -> Result<DiffusionEstimate> {
    if dim == 0 {
        return Err(Error::InvalidParam("dim must be >= 1".into()));
    }
    if times.len() != msd.len() {
        return Err(Error::InvalidParam(format!(
            "times and msd lengths differ: {} vs {}",
            times.len(),
            msd.len()
        )));
    }
    let (t, y): (Vec<f64>, Vec<f64>) = times
        .iter()
        .zip(msd.iter())
        .filter(|&(&t, _)| t >= tmin)
        .map(|(&t, &m)| (t, m))
        .unzip();
    if t.is_empty() {
        let t_max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        return Err(Error::DegenerateFit(format!(
            "no samples with t >= {tmin} (latest t = {t_max:.3})"
        )));
    }

    let (slope, intercept, sse, r2) = match mode {
        FitMode::ThroughOrigin => {
            let fit = fit_through_origin(&t, &y)?;
            let predicted: Vec<f64> = t.iter().map(|v| fit.slope * v).collect();
            (fit.slope, 0.0, fit.sum_squared_error, r_squared(&y, &predicted))
        }
        FitMode::WithIntercept => {
            let fit = linear_fit(&t, &y)?;
            (fit.slope, fit.intercept, fit.sum_squared_error, fit.r_squared)
        }
    };
    let coefficient = slope / (2.0 * dim as f64);
    info!(
        "diffusion fit over {} samples: slope = {slope:.6e}, D = {coefficient:.6e}, SSE = {sse:.6e}",
        t.len()
    );
    Ok(DiffusionEstimate {
        slope,
        intercept,
        coefficient,
        sum_squared_error: sse,
        r_squared: r2,
        samples: t.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::ParticleState;

    fn frame(index: usize, time: f64, positions: &[[f64; 2]]) -> Frame {
        Frame {
            index,
            time,
            particles: positions
                .iter()
                .map(|&r| ParticleState::new(r, [0.0, 0.0]))
                .collect(),
            collided: Vec::new(),
        }
    }

    #[test]
    fn msd_of_one_mover_and_one_resting() -> Result<()> {
        let frames = vec![
            frame(0, 0.0, &[[0.0, 0.0], [5.0, 5.0]]),
            frame(1, 1.0, &[[1.0, 1.0], [5.0, 5.0]]),
            frame(2, 2.0, &[[2.0, 2.0], [5.0, 5.0]]),
        ];
        let msd = compute_msd(&frames)?;
        assert_eq!(msd, vec![0.0, 1.0, 4.0]);
        Ok(())
    }

    #[test]
    fn relative_times_start_at_zero() {
        let frames = vec![frame(0, 10.0, &[[0.0, 0.0]]), frame(1, 12.5, &[[0.0, 0.0]])];
        assert_eq!(relative_times(&frames), vec![0.0, 2.5]);
    }

    #[test]
    fn diffusion_through_origin() -> Result<()> {
        let est = estimate_diffusion(&[0.0, 1.0, 2.0], &[0.0, 2.0, 4.0], 1.0, 2, FitMode::ThroughOrigin)?;
        assert_eq!(est.samples, 2);
        assert!((est.slope - 2.0).abs() < 1e-12);
        assert!((est.coefficient - 0.5).abs() < 1e-12);
        assert_eq!(est.intercept, 0.0);
        Ok(())
    }

    #[test]
    fn diffusion_with_intercept() -> Result<()> {
        let t = [40.0, 50.0, 60.0, 70.0];
        let msd: Vec<f64> = t.iter().map(|v| 0.004 * v + 0.1).collect();
        let est = estimate_diffusion(&t, &msd, 40.0, 2, FitMode::WithIntercept)?;
        assert!((est.slope - 0.004).abs() < 1e-12);
        assert!((est.intercept - 0.1).abs() < 1e-9);
        assert!((est.coefficient - 0.001).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn empty_window_is_degenerate() {
        let err = estimate_diffusion(&[0.0, 1.0], &[0.0, 1.0], 40.0, 2, FitMode::ThroughOrigin).unwrap_err();
        assert!(matches!(err, Error::DegenerateFit(_)));
    }

    #[test]
    fn empty_frames_are_degenerate() {
        assert!(matches!(compute_msd(&[]), Err(Error::DegenerateFit(_))));
    }
}
