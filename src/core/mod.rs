//! Trajectory parsing and observable estimation for two-chamber hard-disk runs.
//!
//! Leaves first: particle state and static parameters, the frame reader,
//! the wall classifier, the impulse binner and the least-squares estimators.
//! `runs` ties them together per run folder.

pub mod config;
pub mod event;
pub mod fit;
pub mod msd;
pub mod particle;
pub mod pressure;
pub mod runs;
pub mod trajectory;
pub mod walls;

pub use config::{AnalysisConfig, Enclosure, StaticConfig};
pub use event::CollisionEvent;
pub use fit::{error_curve, fit_through_origin, linear_fit, ErrorCurve, LinearFit, OriginFit, SlopeGrid};
pub use msd::{compute_msd, estimate_diffusion, DiffusionEstimate, FitMode};
pub use particle::ParticleState;
pub use pressure::{PressureSample, PressureSeries, SteadyStats, SteadyWindow};
pub use runs::{analyze_run, analyze_runs, pressure_area_regression, RunFiles, RunSummary};
pub use trajectory::{read_collision_events, read_frames, Frame, FrameReader, ParticleLine};
pub use walls::{Chamber, Orientation, WallClassifier, WallHit};
