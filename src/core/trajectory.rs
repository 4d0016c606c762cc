//! # Trajectory/event file reader
//!
//! A trajectory file is a sequence of frames. Each frame is a header line
//! followed by exactly `N` particle lines:
//!
//! ```text
//! <time> [<id1> <id2> ...]
//! <x> <y> <vx> <vy>          (or: <id> <x> <y> <vx> <vy>)
//! ...
//! ```
//!
//! IDs on the header are one-based and mark the particles that collided at
//! that instant. The same file yields two views:
//!
//! - a dense view ([`read_frames`]): every frame with all particle states
//! - a sparse view ([`read_collision_events`]): one [`CollisionEvent`] per
//!   valid header ID per frame
//!
//! Values are taken verbatim; the reader performs no unit conversion.

use crate::core::event::CollisionEvent;
use crate::core::particle::ParticleState;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::iter::Enumerate;
use std::str::Lines;

/// One particle line, resolved once by its token count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleLine {
    /// `x y vx vy`
    PositionVelocity(ParticleState),
    /// `id x y vx vy`; the id column is informational only.
    IdPositionVelocity { id: u64, state: ParticleState },
}

impl ParticleLine {
    /// Parse a particle line; `lineno` is one-based and used in errors.
    pub fn parse(line: &str, lineno: usize) -> Result<Self> {
        let toks: Vec<&str> = line.split_whitespace().collect();
        match toks.as_slice() {
            [x, y, vx, vy] => Ok(ParticleLine::PositionVelocity(parse_state(
                [x, y, vx, vy],
                lineno,
                line,
            )?)),
            [id, x, y, vx, vy] => {
                let id = id.parse::<u64>().map_err(|_| {
                    Error::format(lineno, format!("expected integer particle id, read {line:?}"))
                })?;
                Ok(ParticleLine::IdPositionVelocity {
                    id,
                    state: parse_state([x, y, vx, vy], lineno, line)?,
                })
            }
            _ => Err(Error::format(
                lineno,
                format!(
                    "expected 4 or 5 numbers per particle, read {} tokens: {line:?}",
                    toks.len()
                ),
            )),
        }
    }

    #[inline]
    pub fn state(&self) -> ParticleState {
        match *self {
            ParticleLine::PositionVelocity(state) => state,
            ParticleLine::IdPositionVelocity { state, .. } => state,
        }
    }
}

fn parse_state(toks: [&&str; 4], lineno: usize, line: &str) -> Result<ParticleState> {
    let mut vals = [0.0_f64; 4];
    for (slot, tok) in vals.iter_mut().zip(toks) {
        *slot = tok
            .parse::<f64>()
            .map_err(|_| Error::format(lineno, format!("expected real number, read {line:?}")))?;
    }
    Ok(ParticleState::new([vals[0], vals[1]], [vals[2], vals[3]]))
}

/// Parsed frame header: time plus zero-based indices of the particles that collided.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameHeader {
    pub time: f64,
    pub collided: Vec<usize>,
}

impl FrameHeader {
    /// Parse a header line for a system of `particle_count` particles.
    ///
    /// Tokens after the time that are not integers, and IDs outside
    /// `[1, particle_count]`, are skipped.
    pub fn parse(line: &str, lineno: usize, particle_count: usize) -> Result<Self> {
        let mut toks = line.split_whitespace();
        let time = toks
            .next()
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|t| t.is_finite())
            .ok_or_else(|| {
                Error::format(lineno, format!("expected time at start of header, read {line:?}"))
            })?;

        let mut collided = Vec::new();
        for tok in toks {
            match tok.parse::<i64>() {
                Ok(id) if id >= 1 && (id as u64) <= particle_count as u64 => {
                    collided.push((id - 1) as usize);
                }
                Ok(id) => warn!("line {lineno}: skipping particle id {id} outside [1, {particle_count}]"),
                Err(_) => warn!("line {lineno}: skipping non-integer header token {tok:?}"),
            }
        }
        Ok(Self { time, collided })
    }
}

/// One snapshot: time, every particle's state, and the particles that collided.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Zero-based position of this frame in the file.
    pub index: usize,
    pub time: f64,
    pub particles: Vec<ParticleState>,
    /// Zero-based indices listed on the header (empty for a plain snapshot).
    pub collided: Vec<usize>,
}

impl Frame {
    pub fn positions(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.particles.iter().map(|p| p.r)
    }

    pub fn velocities(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.particles.iter().map(|p| p.v)
    }

    /// True when the header listed at least one valid colliding particle.
    pub fn is_event_frame(&self) -> bool {
        !self.collided.is_empty()
    }

    /// One event per listed particle, in header order.
    pub fn collision_events(&self) -> Result<Vec<CollisionEvent>> {
        self.collided
            .iter()
            .map(|&i| CollisionEvent::new(self.time, i, self.particles[i]))
            .collect()
    }
}

/// Sequential frame reader over the full text of a trajectory file.
///
/// Implements `Iterator<Item = Result<Frame>>`; iteration stops after the
/// first error.
pub struct FrameReader<'a> {
    lines: Enumerate<Lines<'a>>,
    particle_count: usize,
    frames_read: usize,
    last_time: Option<f64>,
    failed: bool,
}

impl<'a> FrameReader<'a> {
    pub fn new(text: &'a str, particle_count: usize) -> Result<Self> {
        if particle_count == 0 {
            return Err(Error::InvalidParam("particle_count must be > 0".into()));
        }
        Ok(Self {
            lines: text.lines().enumerate(),
            particle_count,
            frames_read: 0,
            last_time: None,
            failed: false,
        })
    }

    /// Number of frames successfully read so far.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Read the next frame, or `None` at a clean end of input.
    pub fn read_next(&mut self) -> Result<Option<Frame>> {
        let (lineno, head) = loop {
            match self.lines.next() {
                None => return Ok(None),
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((idx, line)) => break (idx + 1, line),
            }
        };

        let header = FrameHeader::parse(head, lineno, self.particle_count)?;
        if let Some(prev) = self.last_time {
            if header.time < prev {
                return Err(Error::format(
                    lineno,
                    format!("frame time {} is earlier than previous frame time {prev}", header.time),
                ));
            }
        }

        let mut particles = Vec::with_capacity(self.particle_count);
        let mut last_lineno = lineno;
        for p in 0..self.particle_count {
            let (idx, line) = self.lines.next().ok_or_else(|| {
                Error::format(
                    last_lineno + 1,
                    format!(
                        "unexpected end of input reading particle {p} of frame {} (expected {} particle lines)",
                        self.frames_read, self.particle_count
                    ),
                )
            })?;
            last_lineno = idx + 1;
            particles.push(ParticleLine::parse(line, last_lineno)?.state());
        }

        let frame = Frame {
            index: self.frames_read,
            time: header.time,
            particles,
            collided: header.collided,
        };
        self.frames_read += 1;
        self.last_time = Some(frame.time);
        Ok(Some(frame))
    }
}

impl Iterator for FrameReader<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_next() {
            Ok(frame) => frame.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Dense view: every frame of the file. An input without frames is an error.
pub fn read_frames(text: &str, particle_count: usize) -> Result<Vec<Frame>> {
    let frames = FrameReader::new(text, particle_count)?.collect::<Result<Vec<_>>>()?;
    if frames.is_empty() {
        return Err(Error::format(
            text.lines().count().max(1),
            "end of input: trajectory contains no frames",
        ));
    }
    debug!("read {} frames of {} particles", frames.len(), particle_count);
    Ok(frames)
}

/// Sparse view: one event per valid header ID per frame, in file order.
pub fn read_collision_events(text: &str, particle_count: usize) -> Result<Vec<CollisionEvent>> {
    let mut reader = FrameReader::new(text, particle_count)?;
    let mut events = Vec::new();
    while let Some(frame) = reader.read_next()? {
        if frame.is_event_frame() {
            events.extend(frame.collision_events()?);
        }
    }
    debug!(
        "read {} collision events from {} frames",
        events.len(),
        reader.frames_read()
    );
    Ok(events)
}
