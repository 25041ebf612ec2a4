//! Mission runner.
//!
//! Orchestrates the mission lifecycle:
//! 1. Generate terrain
//! 2. Deploy the agents and the coordinator
//! 3. Run the cycle loop until the objective is met or the cycle cap
//! 4. Collect metrics and results

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use mission_kernel::{
    Analyst, Executor, LunarEnvironment, MissionConfig, MissionCoordinator, MissionSnapshot,
    MissionState, Role, Roster, Scout, TerminationReason, World,
};

use crate::generator::{TerrainGenerator, TerrainPreset};
use crate::results::{collected_samples, mission_value, BatchResults, CycleMetrics, MissionResult};

/// Configuration for the mission runner.
#[derive(Debug, Clone)]
pub struct MissionRunnerConfig {
    pub mission: MissionConfig,
    pub terrain: TerrainPreset,
    /// Pause between cycles, for watching a run live
    pub cycle_delay: Duration,
}

impl Default for MissionRunnerConfig {
    fn default() -> Self {
        Self {
            mission: MissionConfig::default(),
            terrain: TerrainPreset::Standard,
            cycle_delay: Duration::ZERO,
        }
    }
}

/// A finished mission: its result record plus the final state for rendering.
#[derive(Debug, Clone)]
pub struct MissionRun {
    pub result: MissionResult,
    pub snapshot: MissionSnapshot,
}

/// Runs seeded missions.
pub struct MissionRunner {
    config: MissionRunnerConfig,
}

impl MissionRunner {
    pub fn new(config: MissionRunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MissionRunnerConfig {
        &self.config
    }

    /// Deploy the standard three-agent roster.
    pub fn build_roster(&self, seed: u64) -> Result<Roster> {
        let mission = &self.config.mission;
        let scout_id = Role::Scout.default_id();
        let analyst_id = Role::Analyst.default_id();
        let executor_id = Role::Executor.default_id();

        Roster::new(
            Box::new(Scout::new(scout_id, analyst_id.clone(), mission.scout.clone(), seed)),
            Box::new(Analyst::new(analyst_id, executor_id.clone(), mission.analyst.clone())),
            Box::new(Executor::new(executor_id, mission.executor.clone())),
        )
    }

    /// Build a coordinator over freshly generated terrain.
    pub fn build(&self, seed: u64) -> Result<MissionCoordinator> {
        let environment = TerrainGenerator::new(self.config.terrain.config()).generate(seed)?;
        self.build_with(environment, seed)
    }

    /// Build a coordinator over the given terrain.
    pub fn build_with(
        &self,
        environment: LunarEnvironment,
        seed: u64,
    ) -> Result<MissionCoordinator> {
        let roster = self.build_roster(seed)?;
        Ok(MissionCoordinator::new(
            Box::new(environment),
            roster,
            self.config.mission.termination.clone(),
        ))
    }

    /// Run a mission on terrain generated from `seed`.
    pub async fn run(&self, seed: u64) -> Result<MissionRun> {
        let coordinator = self.build(seed)?;
        Ok(self.drive(coordinator, seed).await)
    }

    /// Run a mission on the given terrain.
    pub async fn run_on(&self, environment: LunarEnvironment, seed: u64) -> Result<MissionRun> {
        let coordinator = self.build_with(environment, seed)?;
        Ok(self.drive(coordinator, seed).await)
    }

    async fn drive(&self, mut coordinator: MissionCoordinator, seed: u64) -> MissionRun {
        let max_cycles = self.config.mission.termination.max_cycles;
        let started_at = Utc::now();
        let mut cycle_metrics = Vec::new();

        info!(
            seed,
            terrain = self.config.terrain.name(),
            targets = coordinator.world().targets().len(),
            obstacles = coordinator.world().obstacles().len(),
            max_cycles,
            "Starting mission"
        );

        while coordinator.is_active() && coordinator.cycle() < max_cycles {
            let cycle_start = Instant::now();
            let Some(report) = coordinator.step() else {
                break;
            };
            cycle_metrics.push(CycleMetrics::from_report(
                &report,
                cycle_start.elapsed().as_millis() as u64,
            ));

            if coordinator.state() == MissionState::Running && !self.config.cycle_delay.is_zero() {
                tokio::time::sleep(self.config.cycle_delay).await;
            }
        }

        let outcome = coordinator.conclude();
        let samples = collected_samples(coordinator.world());
        let value = mission_value(&samples);

        info!(
            cycles = outcome.cycles,
            reason = ?outcome.reason,
            discovered = outcome.stats.targets_discovered,
            collected = outcome.stats.targets_collected,
            decisions = outcome.stats.decisions_made,
            value = format!("{:.1}", value),
            "Mission complete"
        );

        let result = MissionResult {
            seed,
            terrain: self.config.terrain.name().to_string(),
            started_at,
            ended_at: Utc::now(),
            total_cycles: outcome.cycles,
            termination: outcome.reason,
            objective_met: outcome.reason == TerminationReason::ObjectiveMet,
            stats: outcome.stats,
            total_targets: coordinator.world().targets().len(),
            samples,
            mission_value: value,
            total_messages: coordinator.bus().total_sent(),
            cycle_metrics,
        };

        MissionRun {
            result,
            snapshot: coordinator.snapshot(),
        }
    }

    /// Run `trials` missions with seeds `base_seed..base_seed + trials`.
    pub async fn run_batch(&self, trials: usize, base_seed: u64) -> Result<BatchResults> {
        let mut batch = BatchResults::new();
        for trial in 0..trials {
            let seed = base_seed + trial as u64;
            debug!(trial, seed, "Batch trial");
            let run = self.run(seed).await?;
            batch.add(run.result);
        }
        batch.compute_summary();
        Ok(batch)
    }
}
