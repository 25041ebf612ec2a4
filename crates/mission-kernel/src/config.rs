//! Configuration types for the mission.
//!
//! Every section falls back to its defaults, so a config file only needs
//! the values it overrides. Loaded from JSON at runtime.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::messages::{HIGH_PRIORITY_THRESHOLD, MEDIUM_PRIORITY_THRESHOLD};
use crate::world::Point;

/// Top-level mission configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub scout: ScoutConfig,
    pub analyst: AnalystConfig,
    pub executor: ExecutorConfig,
    pub termination: TerminationConfig,
}

impl MissionConfig {
    /// Parse a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid mission config")
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mission config {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

/// Scout exploration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub start: Point,
    pub sensor_range: f64,
    /// Side length of the visited-cell grid
    pub grid_cell_size: f64,
    /// Cardinal move length
    pub step: f64,
    /// Per-axis diagonal move length
    pub diagonal_step: f64,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            start: Point::new(20.0, 20.0),
            sensor_range: 15.0,
            grid_cell_size: 10.0,
            step: 10.0,
            diagonal_step: 7.0,
        }
    }
}

/// Analyst scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalystConfig {
    /// Point distances are penalised from (the executor's base)
    pub reference_point: Point,
    /// Distance units per point of penalty
    pub distance_divisor: f64,
    /// Cap on the distance penalty
    pub max_distance_penalty: f64,
    /// Scores strictly above this are HIGH
    pub high_threshold: f64,
    /// Scores strictly above this are MEDIUM
    pub medium_threshold: f64,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            reference_point: Point::new(50.0, 50.0),
            distance_divisor: 10.0,
            max_distance_penalty: 5.0,
            high_threshold: HIGH_PRIORITY_THRESHOLD,
            medium_threshold: MEDIUM_PRIORITY_THRESHOLD,
        }
    }
}

/// Executor routing and collection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub start: Point,
    /// Maximum distance per cycle
    pub speed: f64,
    /// Targets closer than this are collectable
    pub collection_radius: f64,
    /// Maximum samples per mission
    pub carrying_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            start: Point::new(50.0, 50.0),
            speed: 5.0,
            collection_radius: 3.0,
            carrying_capacity: 15,
        }
    }
}

/// When the mission stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationConfig {
    /// Stop as soon as this many targets are collected
    pub collected_goal: usize,
    /// Hard cap on cycles
    pub max_cycles: usize,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            collected_goal: 10,
            max_cycles: 40,
        }
    }
}
