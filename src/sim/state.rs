//! Simulation state and core types
//!
//! Everything a renderer or a challenge validator reads lives here. Field
//! names serialize in camelCase and are part of the validator contract.

use std::collections::BTreeMap;
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::field::initial_artifacts;
use crate::consts::*;

/// Artifact colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactColor {
    Purple,
    Green,
}

impl ArtifactColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactColor::Purple => "purple",
            ArtifactColor::Green => "green",
        }
    }
}

/// A collectible field object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub color: ArtifactColor,
    pub collected: bool,
}

impl Artifact {
    pub fn pos(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// A value held in the interpreter's variable table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// Numeric reading of the value. Text is read like a leading-float
    /// literal; NaN when nothing numeric is there.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Text(s) => super::parser::parse_float_prefix(s).unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.is_nan() => f.write_str("NaN"),
            Value::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // -0 prints as 0
            Value::Number(n) if *n == 0.0 => f.write_str("0"),
            // Very large and very small magnitudes switch to exponent form
            Value::Number(n) if n.abs() >= 1e21 || n.abs() < 1e-6 => {
                let exp = format!("{n:e}");
                match exp.split_once('e') {
                    Some((mantissa, power)) if !power.starts_with('-') => {
                        write!(f, "{mantissa}e+{power}")
                    }
                    _ => f.write_str(&exp),
                }
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Mutable simulation snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimState {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees (unbounded, positive is clockwise)
    pub rotation: f64,
    pub left_power: f64,
    pub right_power: f64,
    pub intake_power: f64,
    pub spindexer_position: f64,
    pub is_shooting: bool,
    pub held_artifact: Option<ArtifactColor>,
    pub artifacts: Vec<Artifact>,
    /// Telemetry lines, `"key: value"`
    pub logs: Vec<String>,
    pub variables: BTreeMap<String, Value>,
    pub error: Option<String>,
    pub is_running: bool,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            x: START_X,
            y: START_Y,
            rotation: 0.0,
            left_power: 0.0,
            right_power: 0.0,
            intake_power: 0.0,
            spindexer_position: 0.0,
            is_shooting: false,
            held_artifact: None,
            artifacts: initial_artifacts(),
            logs: Vec::new(),
            variables: BTreeMap::new(),
            error: None,
            is_running: false,
        }
    }
}

impl SimState {
    /// Base template with `overrides` merged on top
    pub fn with_overrides(overrides: &StateOverrides) -> Self {
        let mut state = Self::default();
        overrides.apply(&mut state);
        state
    }

    pub fn pos(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Optional replacements for base template fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateOverrides {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub left_power: Option<f64>,
    pub right_power: Option<f64>,
    pub intake_power: Option<f64>,
    pub spindexer_position: Option<f64>,
    pub is_shooting: Option<bool>,
    pub held_artifact: Option<Option<ArtifactColor>>,
    pub artifacts: Option<Vec<Artifact>>,
    pub logs: Option<Vec<String>>,
    pub variables: Option<BTreeMap<String, Value>>,
    pub error: Option<Option<String>>,
    pub is_running: Option<bool>,
}

impl StateOverrides {
    pub fn apply(&self, state: &mut SimState) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field {
                    state.$field = v.clone();
                })*
            };
        }
        take!(
            x,
            y,
            rotation,
            left_power,
            right_power,
            intake_power,
            spindexer_position,
            is_shooting,
            held_artifact,
            artifacts,
            logs,
            variables,
            error,
            is_running
        );
    }
}
