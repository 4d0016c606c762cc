/// Fixed spatial dimension of the recorded simulations (2D disks).
pub const DIM: usize = 2;

/// Recorded state of one disk at one instant.
///
/// Fields:
/// - `r`: position [x, y]
/// - `v`: velocity [vx, vy]
///
/// Values are taken verbatim from the trajectory file; no unit conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
}

impl ParticleState {
    pub fn new(r: [f64; DIM], v: [f64; DIM]) -> Self {
        Self { r, v }
    }

    /// Squared distance between this position and `origin`.
    #[inline]
    pub fn squared_displacement(&self, origin: &ParticleState) -> f64 {
        self.r
            .iter()
            .zip(origin.r.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_displacement_computed() {
        let origin = ParticleState::new([1.0, 1.0], [0.0, 0.0]);
        let later = ParticleState::new([4.0, 5.0], [0.0, 0.0]);
        assert!((later.squared_displacement(&origin) - 25.0).abs() < 1e-12);
        assert_eq!(origin.squared_displacement(&origin), 0.0);
    }
}
