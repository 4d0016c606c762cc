use gastrace::core::{read_collision_events, read_frames, ParticleState};
use gastrace::error::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write;

fn random_state(rng: &mut StdRng) -> ParticleState {
    ParticleState::new(
        [rng.random_range(0.0..0.18), rng.random_range(0.0..0.09)],
        [rng.random_range(-0.05..0.05), rng.random_range(-0.05..0.05)],
    )
}

/// Render frames the way the simulator does; `with_ids` selects the 5-column layout.
fn render(frames: &[(f64, Vec<usize>, Vec<ParticleState>)], with_ids: bool) -> String {
    let mut out = String::new();
    for (t, ids, states) in frames {
        write!(out, "{t}").unwrap();
        for id in ids {
            write!(out, " {id}").unwrap();
        }
        out.push('\n');
        for (i, s) in states.iter().enumerate() {
            if with_ids {
                write!(out, "{} ", i + 1).unwrap();
            }
            writeln!(out, "{} {} {} {}", s.r[0], s.r[1], s.v[0], s.v[1]).unwrap();
        }
    }
    out
}

fn random_run(seed: u64, n: usize, nframes: usize) -> Vec<(f64, Vec<usize>, Vec<ParticleState>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t = 0.0;
    (0..nframes)
        .map(|_| {
            t += rng.random_range(0.0..0.5);
            let ids: Vec<usize> = (0..rng.random_range(0..3usize))
                .map(|_| rng.random_range(1..=n))
                .collect();
            let states = (0..n).map(|_| random_state(&mut rng)).collect();
            (t, ids, states)
        })
        .collect()
}

/// Values written with shortest round-trip formatting are read back bit-exact.
#[test]
fn random_trajectory_round_trips() -> gastrace::error::Result<()> {
    let n = 12;
    let run = random_run(1234, n, 40);
    for with_ids in [false, true] {
        let frames = read_frames(&render(&run, with_ids), n)?;
        assert_eq!(frames.len(), run.len());
        for (frame, (t, ids, states)) in frames.iter().zip(run.iter()) {
            assert_eq!(frame.time.to_bits(), t.to_bits());
            assert_eq!(&frame.particles, states);
            let expected: Vec<usize> = ids.iter().map(|id| id - 1).collect();
            assert_eq!(frame.collided, expected);
        }
    }
    Ok(())
}

#[test]
fn sparse_view_matches_headers() -> gastrace::error::Result<()> {
    let n = 5;
    let run = random_run(99, n, 25);
    let events = read_collision_events(&render(&run, false), n)?;
    let expected: usize = run.iter().map(|(_, ids, _)| ids.len()).sum();
    assert_eq!(events.len(), expected);

    let mut k = 0;
    for (t, ids, states) in &run {
        for id in ids {
            let ev = &events[k];
            assert_eq!(ev.time_f64(), *t);
            assert_eq!(ev.particle, id - 1);
            assert_eq!(ev.state, states[id - 1]);
            k += 1;
        }
    }
    Ok(())
}

#[test]
fn header_ids_out_of_range_are_ignored() -> gastrace::error::Result<()> {
    let text = "0.5 0 2 3 x\n0 0 1 1\n1 1 2 2\n";
    let frames = read_frames(text, 2)?;
    assert_eq!(frames[0].collided, vec![1]);
    assert_eq!(read_collision_events(text, 2)?.len(), 1);
    Ok(())
}

#[test]
fn truncated_frame_reports_line() {
    let text = "0.0\n0 0 1 1\n0 0 1 1\n1.0 1\n0 0 1 1\n";
    match read_frames(text, 2) {
        Err(Error::Format { line, message }) => {
            assert_eq!(line, 6);
            assert!(message.contains("end of input"), "{message}");
        }
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn decreasing_time_is_rejected() {
    let text = "1.0\n0 0 1 1\n0.5\n0 0 1 1\n";
    assert!(matches!(read_frames(text, 1), Err(Error::Format { line: 3, .. })));
}
