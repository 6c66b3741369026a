//! Kinematic step for the robot
//!
//! Drive power is a single coupled value: positive drives forward along the
//! heading, negative pivots in place. The two never mix within a step.

use glam::DVec2;

use super::collision::{clamp_to_field, is_blocked};
use super::state::{Artifact, ArtifactColor, SimState};
use crate::consts::*;
use crate::heading_vector;

/// Fields a physics step may change
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsUpdate {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub held_artifact: Option<ArtifactColor>,
    pub artifacts: Vec<Artifact>,
}

impl PhysicsUpdate {
    pub fn apply(self, state: &mut SimState) {
        state.x = self.x;
        state.y = self.y;
        state.rotation = self.rotation;
        state.held_artifact = self.held_artifact;
        state.artifacts = self.artifacts;
    }
}

/// Advance the robot by `elapsed_ms`.
///
/// Callers cap `elapsed_ms` per frame (see `MAX_FRAME_MS`); this function
/// uses whatever it is given.
pub fn step(state: &SimState, elapsed_ms: f64) -> PhysicsUpdate {
    let power = state.left_power;
    let heading = heading_vector(state.rotation);
    let mut pos = state.pos();
    let mut rotation = state.rotation;

    let mut travel = DVec2::ZERO;
    if power > 0.0 {
        travel = heading * power * DRIVE_SPEED * elapsed_ms;
    } else if power < 0.0 {
        rotation += power.abs() * TURN_RATE * elapsed_ms;
    }

    // All-or-nothing: a blocked candidate keeps the old position
    let candidate = pos + travel;
    if !is_blocked(candidate) {
        pos = candidate;
    }

    let mut held = state.held_artifact;
    let mut artifacts = state.artifacts.clone();

    if state.intake_power > 0.0 && held.is_none() {
        let mouth = pos + heading * PICKUP_REACH;
        if let Some(artifact) = artifacts
            .iter_mut()
            .find(|a| !a.collected && a.pos().distance(mouth) < CAPTURE_RADIUS)
        {
            artifact.collected = true;
            held = Some(artifact.color);
        }
    } else if state.intake_power < -RELEASE_DEADBAND && held.is_some() {
        // Spit it out; the artifact entity stays collected where it was
        held = None;
    }

    let pos = clamp_to_field(pos);

    PhysicsUpdate {
        x: pos.x,
        y: pos.y,
        rotation,
        held_artifact: held,
        artifacts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::StateOverrides;

    fn state_with(overrides: StateOverrides) -> SimState {
        SimState::with_overrides(&overrides)
    }

    #[test]
    fn test_forward_moves_up_field() {
        let state = state_with(StateOverrides {
            left_power: Some(0.5),
            ..Default::default()
        });
        let update = step(&state, 16.0);
        assert!((update.y - (START_Y - 0.5 * DRIVE_SPEED * 16.0)).abs() < 1e-9);
        assert!((update.x - START_X).abs() < 1e-9);
        assert_eq!(update.rotation, 0.0);
    }

    #[test]
    fn test_negative_power_pivots_without_moving() {
        let state = state_with(StateOverrides {
            left_power: Some(-0.3),
            ..Default::default()
        });
        let update = step(&state, 10.0);
        assert!((update.rotation - 0.3 * TURN_RATE * 10.0).abs() < 1e-9);
        assert_eq!(update.x, START_X);
        assert_eq!(update.y, START_Y);
    }

    #[test]
    fn test_blocked_move_holds_position() {
        // Just below the center obstacle's inflated edge (y = 215)
        let state = state_with(StateOverrides {
            y: Some(216.0),
            left_power: Some(1.0),
            ..Default::default()
        });
        let update = step(&state, 32.0);
        assert_eq!(update.y, 216.0);
        assert_eq!(update.x, START_X);
    }

    #[test]
    fn test_position_clamped_to_margin() {
        let state = state_with(StateOverrides {
            x: Some(30.0),
            y: Some(21.0),
            left_power: Some(1.0),
            ..Default::default()
        });
        let update = step(&state, 32.0);
        assert_eq!(update.y, WALL_MARGIN);
    }

    #[test]
    fn test_intake_picks_first_artifact_in_reach() {
        // From the start pose the intake mouth sits 14.67 px from artifact 6
        let state = state_with(StateOverrides {
            intake_power: Some(1.0),
            ..Default::default()
        });
        let update = step(&state, 16.0);
        assert_eq!(update.held_artifact, Some(ArtifactColor::Green));
        let collected: Vec<u32> = update
            .artifacts
            .iter()
            .filter(|a| a.collected)
            .map(|a| a.id)
            .collect();
        assert_eq!(collected, vec![6]);
    }

    #[test]
    fn test_intake_takes_one_at_a_time() {
        let mut state = state_with(StateOverrides {
            intake_power: Some(1.0),
            held_artifact: Some(Some(ArtifactColor::Purple)),
            ..Default::default()
        });
        let update = step(&state, 16.0);
        assert_eq!(update.held_artifact, Some(ArtifactColor::Purple));
        assert!(update.artifacts.iter().all(|a| !a.collected));

        state.held_artifact = None;
        let update = step(&state, 16.0);
        assert_eq!(update.artifacts.iter().filter(|a| a.collected).count(), 1);
    }

    #[test]
    fn test_reverse_intake_drops_but_keeps_collected() {
        let mut state = state_with(StateOverrides {
            intake_power: Some(1.0),
            ..Default::default()
        });
        step(&state, 16.0).apply(&mut state);
        assert!(state.held_artifact.is_some());

        // Inside the deadband nothing happens
        state.intake_power = -0.1;
        step(&state, 16.0).apply(&mut state);
        assert!(state.held_artifact.is_some());

        state.intake_power = -1.0;
        step(&state, 16.0).apply(&mut state);
        assert_eq!(state.held_artifact, None);
        assert!(state.artifacts.iter().any(|a| a.id == 6 && a.collected));
    }

    #[test]
    fn test_capture_radius_is_strict() {
        // Heading 0 puts the intake mouth at (100, 80)
        let lone = |y: f64| StateOverrides {
            x: Some(100.0),
            y: Some(100.0),
            intake_power: Some(1.0),
            artifacts: Some(vec![Artifact {
                id: 1,
                x: 100.0,
                y,
                color: ArtifactColor::Purple,
                collected: false,
            }]),
            ..Default::default()
        };

        let update = step(&state_with(lone(80.0 - CAPTURE_RADIUS)), 16.0);
        assert_eq!(update.held_artifact, None);
        assert!(!update.artifacts[0].collected);

        let update = step(&state_with(lone(80.0 - CAPTURE_RADIUS + 0.5)), 16.0);
        assert_eq!(update.held_artifact, Some(ArtifactColor::Purple));
        assert!(update.artifacts[0].collected);
    }

    #[test]
    fn test_out_of_reach_artifacts_ignored() {
        let state = state_with(StateOverrides {
            x: Some(60.0),
            y: Some(300.0),
            intake_power: Some(1.0),
            ..Default::default()
        });
        let update = step(&state, 16.0);
        assert_eq!(update.held_artifact, None);
        assert!(update.artifacts.iter().all(|a| !a.collected));
    }
}
