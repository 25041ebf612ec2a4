//! Lunar Mission: seeded runs of the three-agent exploration mission.
//!
//! This crate wraps the coordination core with:
//! - Reproducible terrain generation
//! - A mission runner with optional cycle pacing
//! - JSON results and batch statistics
//! - Text rendering of the final surface state

pub mod experiment;
pub mod generator;
pub mod render;
pub mod results;

pub use experiment::{MissionRun, MissionRunner, MissionRunnerConfig};
pub use generator::{TerrainConfig, TerrainGenerator, TerrainPreset};
pub use render::{render_summary, MapRenderer};
pub use results::{BatchResults, BatchSummary, CollectedSample, CycleMetrics, MissionResult};
