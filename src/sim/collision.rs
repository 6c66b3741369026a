//! Collision checks against static field geometry
//!
//! The robot is treated as a point. Obstacles are grown by a fixed clearance
//! instead of sweeping the robot footprint, and a blocked move is rejected
//! outright (no sliding along edges).

use glam::DVec2;

use super::field::{OBSTACLES, Obstacle};
use crate::consts::*;

/// First obstacle whose inflated rectangle contains `point`
pub fn blocking_obstacle(point: DVec2) -> Option<&'static Obstacle> {
    OBSTACLES
        .iter()
        .find(|obs| obs.inflated_contains(point, OBSTACLE_CLEARANCE))
}

/// True if the robot center may not occupy `point`
pub fn is_blocked(point: DVec2) -> bool {
    blocking_obstacle(point).is_some()
}

/// Clamp a position so the robot stays `WALL_MARGIN` away from every edge
pub fn clamp_to_field(pos: DVec2) -> DVec2 {
    pos.clamp(
        DVec2::splat(WALL_MARGIN),
        DVec2::splat(FIELD_SIZE - WALL_MARGIN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field::ObstacleKind;

    #[test]
    fn test_center_obstacle_blocks_with_clearance() {
        // Center block spans 140..200; clearance extends it to 125..215
        let hit = blocking_obstacle(DVec2::new(170.0, 214.0));
        assert_eq!(hit.map(|o| o.kind), Some(ObstacleKind::CenterObstacle));
        assert!(!is_blocked(DVec2::new(170.0, 215.0)));
        assert!(!is_blocked(DVec2::new(170.0, 300.0)));
    }

    #[test]
    fn test_ramp_blocks() {
        let hit = blocking_obstacle(DVec2::new(40.0, 170.0));
        assert_eq!(hit.map(|o| o.kind), Some(ObstacleKind::Ramp));
        let hit = blocking_obstacle(DVec2::new(300.0, 160.0));
        assert_eq!(hit.map(|o| o.kind), Some(ObstacleKind::Ramp));
    }

    #[test]
    fn test_clamp_to_field() {
        assert_eq!(clamp_to_field(DVec2::new(-5.0, 400.0)), DVec2::new(20.0, 320.0));
        assert_eq!(clamp_to_field(DVec2::new(100.0, 100.0)), DVec2::new(100.0, 100.0));
    }
}
