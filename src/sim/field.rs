//! Static field geometry
//!
//! Goals, obstacles and the artifact seed table. Shared and read-only across
//! every simulation instance.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::{Artifact, ArtifactColor};
use crate::consts::*;

/// Obstacle types on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObstacleKind {
    /// Raised ramp along a side wall
    Ramp,
    /// The block in the middle of the field
    CenterObstacle,
}

/// Axis-aligned obstacle rectangle (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub kind: ObstacleKind,
}

impl Obstacle {
    /// True if `point` lies strictly inside this rectangle grown by `margin`
    /// on every side.
    pub fn inflated_contains(&self, point: DVec2, margin: f64) -> bool {
        point.x > self.x - margin
            && point.x < self.x + self.w + margin
            && point.y > self.y - margin
            && point.y < self.y + self.h + margin
    }
}

/// A scoring goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Goal {
    pub x: f64,
    pub y: f64,
    pub color: ArtifactColor,
    pub label: &'static str,
}

pub const GOALS: [Goal; 2] = [
    Goal {
        x: 25.0,
        y: 25.0,
        color: ArtifactColor::Purple,
        label: "GOAL A",
    },
    Goal {
        x: FIELD_SIZE - 25.0,
        y: 25.0,
        color: ArtifactColor::Green,
        label: "GOAL B",
    },
];

pub const OBSTACLES: [Obstacle; 3] = [
    Obstacle {
        x: FIELD_SIZE / 2.0 - 30.0,
        y: FIELD_SIZE / 2.0 - 30.0,
        w: 60.0,
        h: 60.0,
        kind: ObstacleKind::CenterObstacle,
    },
    Obstacle {
        x: 0.0,
        y: FIELD_SIZE / 2.0 - 5.0,
        w: 80.0,
        h: 10.0,
        kind: ObstacleKind::Ramp,
    },
    Obstacle {
        x: FIELD_SIZE - 80.0,
        y: FIELD_SIZE / 2.0 - 5.0,
        w: 80.0,
        h: 10.0,
        kind: ObstacleKind::Ramp,
    },
];

/// Spike marks on each alliance side plus one neutral artifact at each end
const ARTIFACT_SEEDS: [(u32, f64, f64, ArtifactColor); 6] = [
    (1, TILE_SIZE * 1.5, TILE_SIZE * 1.5, ArtifactColor::Purple),
    (2, TILE_SIZE * 1.5, TILE_SIZE * 4.5, ArtifactColor::Purple),
    (3, TILE_SIZE * 4.5, TILE_SIZE * 1.5, ArtifactColor::Green),
    (4, TILE_SIZE * 4.5, TILE_SIZE * 4.5, ArtifactColor::Green),
    (5, FIELD_SIZE / 2.0, TILE_SIZE * 0.8, ArtifactColor::Purple),
    (6, FIELD_SIZE / 2.0, FIELD_SIZE - TILE_SIZE * 0.8, ArtifactColor::Green),
];

/// Fresh, uncollected artifacts in seed order
pub fn initial_artifacts() -> Vec<Artifact> {
    ARTIFACT_SEEDS
        .iter()
        .map(|&(id, x, y, color)| Artifact {
            id,
            x,
            y,
            color,
            collected: false,
        })
        .collect()
}
