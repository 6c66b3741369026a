//! Deterministic simulation module
//!
//! Everything the field simulator computes lives here. This module must be
//! pure and deterministic:
//! - Time only comes in through frame timestamps handed over by the host
//! - No randomness
//! - Stable iteration order (artifacts in seed order, variables by name)
//! - No rendering or platform dependencies

pub mod action;
pub mod collision;
pub mod field;
pub mod parser;
pub mod physics;
pub mod scheduler;
pub mod state;

pub use action::{Action, first_error};
pub use collision::{blocking_obstacle, clamp_to_field, is_blocked};
pub use field::{GOALS, Goal, OBSTACLES, Obstacle, ObstacleKind, initial_artifacts};
pub use parser::{ARTIFACT_COLOR_VAR, Parser, Variables, parse};
pub use physics::{PhysicsUpdate, step};
pub use scheduler::{Completion, FrameOutcome, FrameRequest, Phase, RunError, Scheduler};
pub use state::{Artifact, ArtifactColor, SimState, StateOverrides, Value};
