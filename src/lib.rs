//! Field Sim - pseudo-Java robot interpreter and field simulator
//!
//! Core modules:
//! - `sim`: Deterministic simulation (parser, physics, run loop)
//! - `simulator`: View model bridging the run loop to hosts
//! - `challenges`: Challenge catalog with final-state validators
//! - `lessons`: Lesson exercises checked by pattern over source text
//! - `settings`: Host configuration
//! - `platform`: Browser host (wasm32 only)

pub mod challenges;
pub mod lessons;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod simulator;

pub use challenges::{Challenge, Difficulty, Validation};
pub use lessons::{CheckReport, Exercise, LessonError};
pub use settings::{Settings, SettingsError};
pub use simulator::Simulator;

use glam::DVec2;

/// Field and physics constants
pub mod consts {
    /// Side length of the square field (pixels)
    pub const FIELD_SIZE: f64 = 340.0;
    /// Field tiles are a 6x6 grid
    pub const TILE_SIZE: f64 = FIELD_SIZE / 6.0;

    /// Robot start pose
    pub const START_X: f64 = FIELD_SIZE / 2.0;
    pub const START_Y: f64 = FIELD_SIZE - 40.0;

    /// Forward speed (pixels per ms at full power)
    pub const DRIVE_SPEED: f64 = 0.08;
    /// Pivot rate (degrees per ms at full power)
    pub const TURN_RATE: f64 = 0.12;

    /// Obstacles are inflated by this much before the collision test
    pub const OBSTACLE_CLEARANCE: f64 = 15.0;
    /// Robot center can't get closer than this to a field edge
    pub const WALL_MARGIN: f64 = 20.0;

    /// Distance from robot center to the intake mouth
    pub const PICKUP_REACH: f64 = 20.0;
    /// Artifacts strictly closer than this to the intake mouth get picked up
    pub const CAPTURE_RADIUS: f64 = 22.0;
    /// Reverse intake power needed to spit out a held artifact
    pub const RELEASE_DEADBAND: f64 = 0.1;

    /// Largest elapsed time fed to physics in one frame (ms)
    pub const MAX_FRAME_MS: f64 = 32.0;
    /// How long the shooting flag stays up after a shot (real-time ms)
    pub const SHOT_FLASH_MS: f64 = 500.0;
}

/// Unit vector the robot faces for a heading in degrees.
///
/// Heading 0 points toward the top of the field (negative y), and positive
/// headings turn clockwise on screen.
#[inline]
pub fn heading_vector(rotation_deg: f64) -> DVec2 {
    let rad = rotation_deg.to_radians();
    DVec2::new(rad.sin(), -rad.cos())
}
