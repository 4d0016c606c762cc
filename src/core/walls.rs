use crate::core::config::{Enclosure, StaticConfig};
use crate::core::particle::ParticleState;
use crate::error::{Error, Result};

/// Orientation of a struck wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Normal along y; impulse from |vy|.
    Horizontal,
    /// Normal along x; impulse from |vx|.
    Vertical,
}

/// Region whose wall perimeter receives the impulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chamber {
    /// Square chamber, x in [0, E].
    Left,
    /// Channel, x in [E, 2E].
    Right,
}

/// One wall contact derived from a recorded collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub orientation: Orientation,
    pub chamber: Chamber,
    /// Momentum transferred to the wall: 2 m |v_normal|.
    pub impulse: f64,
}

/// Maps a recorded collision state to the wall segments it touches.
///
/// Wall offsets are precomputed from the enclosure and the run's channel
/// height `L` and disk radius `R`. Contact means the center is within
/// `tolerance` of the offset and the normal velocity points back into the
/// region (the state is recorded just after the reflection).
#[derive(Debug, Clone, Copy)]
pub struct WallClassifier {
    half_width: f64,
    tolerance: f64,
    radius: f64,
    mass: f64,
    /// Channel floor y.
    channel_floor: f64,
    /// Channel ceiling y.
    channel_ceiling: f64,
}

impl WallClassifier {
    pub fn new(enclosure: &Enclosure, chamber_side: f64, radius: f64, mass: f64) -> Result<Self> {
        enclosure.validate()?;
        if !chamber_side.is_finite() || chamber_side <= 0.0 || chamber_side > enclosure.half_width {
            return Err(Error::InvalidParam(format!(
                "chamber_side must be in (0, {}], got {chamber_side}",
                enclosure.half_width
            )));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidParam("radius must be finite and >= 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        let channel_floor = (enclosure.half_width - chamber_side) / 2.0;
        Ok(Self {
            half_width: enclosure.half_width,
            tolerance: enclosure.tolerance,
            radius,
            mass,
            channel_floor,
            channel_ceiling: channel_floor + chamber_side,
        })
    }

    pub fn for_run(enclosure: &Enclosure, run: &StaticConfig) -> Result<Self> {
        Self::new(
            enclosure,
            run.chamber_side,
            run.particle_radius,
            run.particle_mass,
        )
    }

    #[inline]
    fn touches(&self, coord: f64, offset: f64) -> bool {
        (coord - offset).abs() <= self.tolerance
    }

    fn hit(&self, orientation: Orientation, chamber: Chamber, state: &ParticleState) -> WallHit {
        let normal = match orientation {
            Orientation::Vertical => state.v[0],
            Orientation::Horizontal => state.v[1],
        };
        WallHit {
            orientation,
            chamber,
            impulse: 2.0 * self.mass * normal.abs(),
        }
    }

    /// Classify one state; returns zero, one or two hits (corners yield two).
    pub fn classify(&self, state: &ParticleState) -> Vec<WallHit> {
        let [x, y] = state.r;
        let [vx, vy] = state.v;
        let (e, r, eps) = (self.half_width, self.radius, self.tolerance);
        let mut hits = Vec::with_capacity(2);

        // Outer left wall of the chamber.
        if self.touches(x, r) && vx > 0.0 {
            hits.push(self.hit(Orientation::Vertical, Chamber::Left, state));
        }
        // Partition between chamber and channel, outside the doorway span.
        if self.touches(x, e - r)
            && vx < 0.0
            && (y <= self.channel_floor - r + eps || y >= self.channel_ceiling + r - eps)
        {
            hits.push(self.hit(Orientation::Vertical, Chamber::Left, state));
        }
        // End wall of the channel.
        if self.touches(x, 2.0 * e - r) && vx < 0.0 {
            hits.push(self.hit(Orientation::Vertical, Chamber::Right, state));
        }

        if x < e {
            if (self.touches(y, r) && vy > 0.0) || (self.touches(y, e - r) && vy < 0.0) {
                hits.push(self.hit(Orientation::Horizontal, Chamber::Left, state));
            }
        } else if (self.touches(y, self.channel_floor + r) && vy > 0.0)
            || (self.touches(y, self.channel_ceiling - r) && vy < 0.0)
        {
            hits.push(self.hit(Orientation::Horizontal, Chamber::Right, state));
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E: f64 = 0.09;
    const L: f64 = 0.03;
    const R: f64 = 0.0015;
    const M: f64 = 2.0;

    fn classifier() -> Result<WallClassifier> {
        WallClassifier::new(&Enclosure::default(), L, R, M)
    }

    fn state(x: f64, y: f64, vx: f64, vy: f64) -> ParticleState {
        ParticleState::new([x, y], [vx, vy])
    }

    #[test]
    fn outer_left_wall_single_vertical_hit() -> Result<()> {
        let c = classifier()?;
        for y in [0.02, 0.045, 0.07] {
            let hits = c.classify(&state(R, y, 1.0, 0.3));
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].orientation, Orientation::Vertical);
            assert_eq!(hits[0].chamber, Chamber::Left);
            assert!((hits[0].impulse - 2.0 * M * 1.0).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn approaching_wall_is_not_a_hit() -> Result<()> {
        let c = classifier()?;
        assert!(c.classify(&state(R, 0.045, -1.0, 0.0)).is_empty());
        Ok(())
    }

    #[test]
    fn corner_yields_two_hits() -> Result<()> {
        let c = classifier()?;
        let hits = c.classify(&state(R, R, 0.5, 0.25));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].orientation, Orientation::Vertical);
        assert_eq!(hits[1].orientation, Orientation::Horizontal);
        assert!(hits.iter().all(|h| h.chamber == Chamber::Left));
        assert!((hits[0].impulse - 2.0 * M * 0.5).abs() < 1e-12);
        assert!((hits[1].impulse - 2.0 * M * 0.25).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn partition_only_outside_doorway() -> Result<()> {
        let c = classifier()?;
        // Doorway spans y in [0.03, 0.06].
        let below = c.classify(&state(E - R, 0.01, -1.0, 0.0));
        assert_eq!(below.len(), 1);
        assert_eq!(below[0].chamber, Chamber::Left);
        let above = c.classify(&state(E - R, 0.08, -1.0, 0.0));
        assert_eq!(above.len(), 1);
        assert!(c.classify(&state(E - R, 0.045, -1.0, 0.0)).is_empty());
        Ok(())
    }

    #[test]
    fn channel_walls_belong_to_right_chamber() -> Result<()> {
        let c = classifier()?;
        let end = c.classify(&state(2.0 * E - R, 0.045, -0.7, 0.0));
        assert_eq!(end.len(), 1);
        assert_eq!(end[0].orientation, Orientation::Vertical);
        assert_eq!(end[0].chamber, Chamber::Right);

        let floor = c.classify(&state(0.12, 0.03 + R, 0.1, 0.4));
        assert_eq!(floor.len(), 1);
        assert_eq!(floor[0].orientation, Orientation::Horizontal);
        assert_eq!(floor[0].chamber, Chamber::Right);
        assert!((floor[0].impulse - 2.0 * M * 0.4).abs() < 1e-12);

        let ceiling = c.classify(&state(0.12, 0.06 - R, 0.1, -0.4));
        assert_eq!(ceiling.len(), 1);
        Ok(())
    }

    #[test]
    fn chamber_ceiling_hit() -> Result<()> {
        let c = classifier()?;
        let hits = c.classify(&state(0.05, E - R + 1e-5, 0.0, -2.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].orientation, Orientation::Horizontal);
        assert_eq!(hits[0].chamber, Chamber::Left);
        Ok(())
    }

    #[test]
    fn interior_point_has_no_hits() -> Result<()> {
        let c = classifier()?;
        assert!(c.classify(&state(0.05, 0.05, 1.0, 1.0)).is_empty());
        Ok(())
    }

    #[test]
    fn alternate_geometry_via_enclosure() -> Result<()> {
        let enclosure = Enclosure {
            half_width: 1.0,
            tolerance: 1e-3,
        };
        let c = WallClassifier::new(&enclosure, 0.5, 0.1, 1.0)?;
        let hits = c.classify(&state(1.9, 0.5, -3.0, 0.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chamber, Chamber::Right);
        Ok(())
    }

    #[test]
    fn channel_taller_than_chamber_rejected() {
        let err = WallClassifier::new(&Enclosure::default(), 0.2, R, M).unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
    }
}
