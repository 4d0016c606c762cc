use crate::core::particle::ParticleState;
use crate::error::{Error, Result};
use ordered_float::NotNan;

/// A recorded collision of one particle, read from a frame whose header lists it.
///
/// - `time`: frame time (finite, non-NaN).
/// - `particle`: zero-based particle index in `[0, N)`.
/// - `state`: position and velocity as written in that frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub time: NotNan<f64>,
    pub particle: usize,
    pub state: ParticleState,
}

impl CollisionEvent {
    /// Create a new event, validating that time and state are finite.
    pub fn new(time: f64, particle: usize, state: ParticleState) -> Result<Self> {
        if !time.is_finite() {
            return Err(Error::InvalidParam("event time must be finite".into()));
        }
        let time = NotNan::new(time)
            .map_err(|_| Error::InvalidParam("event time cannot be NaN".into()))?;
        if !state.r.iter().chain(state.v.iter()).all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("event state must be finite".into()));
        }
        Ok(Self {
            time,
            particle,
            state,
        })
    }

    /// Returns the raw f64 event time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_rest() -> ParticleState {
        ParticleState::new([0.01, 0.02], [0.0, 0.0])
    }

    #[test]
    fn new_event_rejects_nan_time() {
        let err = CollisionEvent::new(f64::NAN, 0, at_rest()).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn new_event_rejects_nan_state() {
        let state = ParticleState::new([0.01, f64::NAN], [0.0, 0.0]);
        let err = CollisionEvent::new(1.0, 0, state).unwrap_err();
        assert!(err.to_string().contains("state"));
    }

    #[test]
    fn state_is_preserved_bit_exact() -> Result<()> {
        let state = ParticleState::new([0.1 + 0.2, 1e-300], [-3.5, 7.25e12]);
        let ev = CollisionEvent::new(2.5, 3, state)?;
        assert_eq!(ev.state, state);
        assert_eq!(ev.time_f64(), 2.5);
        Ok(())
    }
}
