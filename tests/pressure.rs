use gastrace::core::pressure::{bin_impulses, wall_lengths};
use gastrace::core::{CollisionEvent, Enclosure, ParticleState, WallClassifier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const L: f64 = 0.03;
const R: f64 = 0.0015;

/// A recorded state just after rebounding from one of the five wall families.
fn wall_state(rng: &mut StdRng) -> ParticleState {
    let e = Enclosure::default().half_width;
    let floor = (e - L) / 2.0;
    let v = rng.random_range(0.001..0.05);
    match rng.random_range(0..5) {
        0 => ParticleState::new([R, rng.random_range(0.01..0.08)], [v, 0.01]),
        1 => ParticleState::new([e - R, rng.random_range(0.0..floor - R)], [-v, 0.01]),
        2 => ParticleState::new([2.0 * e - R, floor + L / 2.0], [-v, -0.01]),
        3 => ParticleState::new([rng.random_range(0.01..0.08), R], [0.01, v]),
        _ => ParticleState::new([rng.random_range(e + 0.01..2.0 * e - 0.01), floor + L - R], [0.01, -v]),
    }
}

fn random_events(seed: u64, count: usize, t_steps: u32, dt: f64) -> gastrace::error::Result<Vec<CollisionEvent>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut events = Vec::with_capacity(count + 2);
    // Pin both ends of the time span.
    events.push(CollisionEvent::new(0.0, 0, wall_state(&mut rng))?);
    events.push(CollisionEvent::new(t_steps as f64 * dt, 0, wall_state(&mut rng))?);
    for i in 0..count {
        let t = rng.random_range(0..=t_steps) as f64 * dt;
        events.push(CollisionEvent::new(t, i % 7, wall_state(&mut rng))?);
    }
    Ok(events)
}

fn total_impulse<'a>(events: impl Iterator<Item = &'a CollisionEvent>, c: &WallClassifier) -> f64 {
    events
        .flat_map(|ev| c.classify(&ev.state))
        .map(|h| h.impulse)
        .sum()
}

#[test]
fn every_generated_state_hits_a_wall() -> gastrace::error::Result<()> {
    let c = WallClassifier::new(&Enclosure::default(), L, R, 1.0)?;
    for ev in random_events(7, 500, 100, 0.1)? {
        assert!(!c.classify(&ev.state).is_empty(), "{:?}", ev.state);
    }
    Ok(())
}

/// With a bin width that does not divide the span, nothing is dropped.
#[test]
fn binning_conserves_impulse() -> gastrace::error::Result<()> {
    let c = WallClassifier::new(&Enclosure::default(), L, R, 1.0)?;
    let events = random_events(2024, 1000, 200, 0.05)?;
    let span = 200.0 * 0.05;
    let bins = bin_impulses(&events, &c, span / 10.5)?;
    assert_eq!(bins.len(), 11);
    let expected = total_impulse(events.iter(), &c);
    assert!((bins.total() - expected).abs() <= 1e-9 * expected);
    Ok(())
}

/// When the width divides the span, only events at t_max fall past the last edge.
#[test]
fn dividing_width_drops_only_final_instant() -> gastrace::error::Result<()> {
    let c = WallClassifier::new(&Enclosure::default(), L, R, 1.0)?;
    let events = random_events(5, 600, 40, 0.25)?;
    let bins = bin_impulses(&events, &c, 0.5)?;
    assert_eq!(bins.len(), 20);
    let expected = total_impulse(events.iter().filter(|e| e.time_f64() < 10.0), &c);
    assert!((bins.total() - expected).abs() <= 1e-9 * expected);
    Ok(())
}

/// Merging adjacent pairs of bins equals binning at twice the width.
#[test]
fn doubling_width_merges_pairs() -> gastrace::error::Result<()> {
    let c = WallClassifier::new(&Enclosure::default(), L, R, 1.0)?;
    let events = random_events(11, 800, 40, 0.25)?;
    let fine = bin_impulses(&events, &c, 0.5)?;
    let coarse = bin_impulses(&events, &c, 1.0)?;
    assert_eq!(coarse.len() * 2, fine.len());
    for (k, (&l, &r)) in coarse.left.iter().zip(coarse.right.iter()).enumerate() {
        let fl = fine.left[2 * k] + fine.left[2 * k + 1];
        let fr = fine.right[2 * k] + fine.right[2 * k + 1];
        assert!((l - fl).abs() < 1e-12, "left bin {k}: {l} vs {fl}");
        assert!((r - fr).abs() < 1e-12, "right bin {k}: {r} vs {fr}");
    }
    Ok(())
}

#[test]
fn chamber_side_beyond_enclosure_is_rejected() {
    let err = WallClassifier::new(&Enclosure::default(), 0.1, R, 1.0).unwrap_err();
    assert!(matches!(err, gastrace::error::Error::InvalidParam(_)));
    assert!(wall_lengths(&Enclosure::default(), 0.4).is_err());
}
