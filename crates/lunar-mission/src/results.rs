//! Results collection and output for lunar missions.
//!
//! Captures metrics like:
//! - Cycles to completion and why the mission stopped
//! - Discoveries, collections and messages per cycle
//! - Value of the samples brought back

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mission_kernel::{
    Category, Composition, CycleReport, MissionStats, Point, Target, TargetId, TerminationReason,
    World,
};

/// Value multiplier per composition.
pub fn composition_multiplier(composition: Composition) -> f64 {
    match composition {
        Composition::Ice => 5.0,
        Composition::Anorthosite => 2.0,
        Composition::Basalt | Composition::Regolith | Composition::Unknown => 1.0,
    }
}

/// A sample returned by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedSample {
    pub target_id: TargetId,
    pub position: Point,
    pub category: Category,
    pub composition: Composition,
    pub size: f64,
    /// size × composition multiplier
    pub value: f64,
}

impl CollectedSample {
    pub fn from_target(target: &Target) -> Self {
        Self {
            target_id: target.id,
            position: target.position,
            category: target.category,
            composition: target.composition,
            size: target.size,
            value: target.size * composition_multiplier(target.composition),
        }
    }
}

/// Samples collected in `world`, in collection order.
pub fn collected_samples(world: &dyn World) -> Vec<CollectedSample> {
    world
        .collected_targets()
        .iter()
        .filter_map(|id| world.target(*id))
        .map(CollectedSample::from_target)
        .collect()
}

/// Total value of the samples.
pub fn mission_value(samples: &[CollectedSample]) -> f64 {
    samples.iter().map(|s| s.value).sum()
}

/// Metrics for a single cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleMetrics {
    pub cycle: usize,
    pub discovered: usize,
    pub collected: usize,
    pub newly_discovered: usize,
    pub newly_collected: usize,
    pub decisions: usize,
    pub messages_sent: usize,
    pub distance_traveled: f64,
    pub duration_ms: u64,
}

impl CycleMetrics {
    pub fn from_report(report: &CycleReport, duration_ms: u64) -> Self {
        Self {
            cycle: report.cycle,
            discovered: report.stats.targets_discovered,
            collected: report.stats.targets_collected,
            newly_discovered: report.newly_discovered,
            newly_collected: report.newly_collected,
            decisions: report.stats.decisions_made,
            messages_sent: report.messages_sent,
            distance_traveled: report.stats.distance_traveled,
            duration_ms,
        }
    }
}

/// Results from a single mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionResult {
    /// Terrain seed
    pub seed: u64,
    /// Terrain preset name
    pub terrain: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Total cycles executed
    pub total_cycles: usize,
    pub termination: TerminationReason,
    /// Whether the collected-target goal was reached
    pub objective_met: bool,
    pub stats: MissionStats,
    pub total_targets: usize,
    pub samples: Vec<CollectedSample>,
    pub mission_value: f64,
    pub total_messages: usize,
    pub cycle_metrics: Vec<CycleMetrics>,
}

/// Summary statistics across trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub trials: usize,
    pub success_rate: f64,
    /// Standard error of success rate: sqrt(p(1-p)/n)
    pub success_rate_se: f64,
    /// 95% confidence interval for success rate: (lower, upper)
    pub success_rate_ci: (f64, f64),
    pub avg_cycles: f64,
    pub avg_collected: f64,
    pub avg_value: f64,
    pub min_cycles: usize,
    pub max_cycles: usize,
}

/// Aggregate results from a batch of seeded missions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResults {
    pub results: Vec<MissionResult>,
    pub summary: Option<BatchSummary>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: MissionResult) {
        self.results.push(result);
    }

    /// Compute summary statistics. Leaves `summary` empty when there are no results.
    pub fn compute_summary(&mut self) {
        let trials = self.results.len();
        if trials == 0 {
            self.summary = None;
            return;
        }
        let n = trials as f64;

        let successes = self.results.iter().filter(|r| r.objective_met).count();
        let success_rate = successes as f64 / n;
        let success_rate_se = if trials > 1 {
            (success_rate * (1.0 - success_rate) / n).sqrt()
        } else {
            0.0
        };
        let z = 1.96;
        let success_rate_ci = (
            (success_rate - z * success_rate_se).max(0.0),
            (success_rate + z * success_rate_se).min(1.0),
        );

        let avg_cycles = self.results.iter().map(|r| r.total_cycles as f64).sum::<f64>() / n;
        let avg_collected = self
            .results
            .iter()
            .map(|r| r.stats.targets_collected as f64)
            .sum::<f64>()
            / n;
        let avg_value = self.results.iter().map(|r| r.mission_value).sum::<f64>() / n;
        let min_cycles = self.results.iter().map(|r| r.total_cycles).min().unwrap_or(0);
        let max_cycles = self.results.iter().map(|r| r.total_cycles).max().unwrap_or(0);

        self.summary = Some(BatchSummary {
            trials,
            success_rate,
            success_rate_se,
            success_rate_ci,
            avg_cycles,
            avg_collected,
            avg_value,
            min_cycles,
            max_cycles,
        });
    }

    /// Save results to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read results from {}", path.display()))?;
        let results = serde_json::from_str(&json)?;
        Ok(results)
    }
}

impl MissionResult {
    /// Save a single mission result to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write result to {}", path.display()))?;
        Ok(())
    }
}
