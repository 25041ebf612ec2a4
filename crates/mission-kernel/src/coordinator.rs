//! MissionCoordinator: drives the fixed-cadence cycle loop.
//!
//! Each cycle:
//! 1. For each role in [`DEPLOYMENT_ORDER`]: `process_messages`, then `act`
//! 2. Recompute statistics from the world and agent telemetry
//! 3. Stop if the collected-target goal is met
//!
//! No agent acts twice or is skipped within a cycle, and each turn runs to
//! completion before the next begins.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{Agent, Role, TurnContext, DEPLOYMENT_ORDER};
use crate::bus::MessageBus;
use crate::config::TerminationConfig;
use crate::messages::AgentId;
use crate::world::{Obstacle, Point, Target, World};

/// One agent per role, visited in [`DEPLOYMENT_ORDER`].
pub struct Roster {
    scout: Box<dyn Agent>,
    analyst: Box<dyn Agent>,
    executor: Box<dyn Agent>,
}

impl Roster {
    /// Assemble a roster, rejecting agents placed in the wrong slot, agents
    /// sharing an identity, and agents using the reserved broadcast name.
    pub fn new(
        scout: Box<dyn Agent>,
        analyst: Box<dyn Agent>,
        executor: Box<dyn Agent>,
    ) -> Result<Self> {
        for (slot, agent) in [
            (Role::Scout, &scout),
            (Role::Analyst, &analyst),
            (Role::Executor, &executor),
        ] {
            if agent.role() != slot {
                bail!(
                    "Agent {} has role {} but was placed in the {} slot",
                    agent.id(),
                    agent.role(),
                    slot
                );
            }
            if agent.id().is_broadcast() {
                bail!("Agent id {} is reserved for broadcasts", agent.id());
            }
        }
        if scout.id() == analyst.id()
            || scout.id() == executor.id()
            || analyst.id() == executor.id()
        {
            bail!("Agent identities must be distinct");
        }

        Ok(Self {
            scout,
            analyst,
            executor,
        })
    }

    pub fn get(&self, role: Role) -> &dyn Agent {
        match role {
            Role::Scout => self.scout.as_ref(),
            Role::Analyst => self.analyst.as_ref(),
            Role::Executor => self.executor.as_ref(),
        }
    }

    fn get_mut(&mut self, role: Role) -> &mut dyn Agent {
        match role {
            Role::Scout => self.scout.as_mut(),
            Role::Analyst => self.analyst.as_mut(),
            Role::Executor => self.executor.as_mut(),
        }
    }

    /// Agents in deployment order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Agent> + '_ {
        DEPLOYMENT_ORDER.iter().map(move |role| self.get(*role))
    }
}

/// Aggregate mission statistics, derived each cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionStats {
    pub targets_discovered: usize,
    pub targets_collected: usize,
    pub decisions_made: usize,
    pub distance_traveled: f64,
}

/// Why a mission stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The collected-target goal was reached
    ObjectiveMet,
    /// The cycle cap ran out first
    CycleCap,
}

/// Lifecycle of the mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionState {
    Running,
    Terminated(TerminationReason),
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: usize,
    /// Statistics after the cycle
    pub stats: MissionStats,
    pub newly_discovered: usize,
    pub newly_collected: usize,
    /// Messages sent during the cycle
    pub messages_sent: usize,
}

/// Final outcome of [`MissionCoordinator::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionOutcome {
    pub cycles: usize,
    pub reason: TerminationReason,
    pub stats: MissionStats,
}

/// What a renderer may know about an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub role: Role,
    pub position: Option<Point>,
    pub sensor_range: Option<f64>,
}

/// Read-only copy of mission state for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSnapshot {
    pub cycle: usize,
    pub width: f64,
    pub height: f64,
    pub targets: Vec<Target>,
    pub obstacles: Vec<Obstacle>,
    pub agents: Vec<AgentView>,
    pub stats: MissionStats,
}

/// Owns the world, the bus and the roster, and advances them one cycle at a time.
pub struct MissionCoordinator {
    world: Box<dyn World>,
    bus: MessageBus,
    roster: Roster,
    termination: TerminationConfig,
    cycle: usize,
    state: MissionState,
    stats: MissionStats,
}

impl MissionCoordinator {
    /// Create a coordinator and open an inbox for every agent.
    pub fn new(world: Box<dyn World>, roster: Roster, termination: TerminationConfig) -> Self {
        let mut bus = MessageBus::new();
        for agent in roster.iter() {
            bus.register(agent.id());
        }

        let mut coordinator = Self {
            world,
            bus,
            roster,
            termination,
            cycle: 0,
            state: MissionState::Running,
            stats: MissionStats::default(),
        };
        coordinator.stats = coordinator.compute_stats();
        coordinator
    }

    pub fn world(&self) -> &dyn World {
        self.world.as_ref()
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Mutable bus access, for injecting operator messages between cycles.
    pub fn bus_mut(&mut self) -> &mut MessageBus {
        &mut self.bus
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == MissionState::Running
    }

    pub fn stats(&self) -> MissionStats {
        self.stats
    }

    /// Run one cycle. Returns `None` once the mission has terminated.
    pub fn step(&mut self) -> Option<CycleReport> {
        if !self.is_active() {
            return None;
        }

        self.cycle += 1;
        let sent_before = self.bus.total_sent();
        let before = self.stats;
        debug!(cycle = self.cycle, "Cycle start");

        for role in DEPLOYMENT_ORDER {
            let agent = self.roster.get_mut(role);
            let mut ctx = TurnContext {
                world: self.world.as_mut(),
                bus: &mut self.bus,
                cycle: self.cycle,
            };
            agent.process_messages(&mut ctx);
            agent.act(&mut ctx);
        }

        self.stats = self.compute_stats();
        let report = CycleReport {
            cycle: self.cycle,
            stats: self.stats,
            newly_discovered: self.stats.targets_discovered - before.targets_discovered,
            newly_collected: self.stats.targets_collected - before.targets_collected,
            messages_sent: self.bus.total_sent() - sent_before,
        };

        info!(
            cycle = self.cycle,
            discovered = self.stats.targets_discovered,
            collected = self.stats.targets_collected,
            messages = report.messages_sent,
            "Cycle complete"
        );

        if self.objective_met() {
            self.state = MissionState::Terminated(TerminationReason::ObjectiveMet);
            info!(
                cycle = self.cycle,
                collected = self.stats.targets_collected,
                "MISSION OBJECTIVES ACHIEVED"
            );
        }

        Some(report)
    }

    /// Run until the objective is met or `max_cycles` cycles have run in total.
    pub fn run(&mut self, max_cycles: usize) -> MissionOutcome {
        while self.is_active() && self.cycle < max_cycles {
            self.step();
        }
        self.conclude()
    }

    /// Stop the mission if it is still running and report the outcome.
    pub fn conclude(&mut self) -> MissionOutcome {
        if self.is_active() {
            self.state = MissionState::Terminated(TerminationReason::CycleCap);
            info!(cycle = self.cycle, "Cycle cap reached");
        }
        let reason = match self.state {
            MissionState::Terminated(reason) => reason,
            MissionState::Running => TerminationReason::CycleCap,
        };
        MissionOutcome {
            cycles: self.cycle,
            reason,
            stats: self.stats,
        }
    }

    /// Read-only view of the world and agent capabilities.
    pub fn snapshot(&self) -> MissionSnapshot {
        let agents = self
            .roster
            .iter()
            .map(|agent| AgentView {
                id: agent.id().clone(),
                role: agent.role(),
                position: agent.as_positioned().map(|p| p.position()),
                sensor_range: agent.as_sensing().map(|s| s.sensor_range()),
            })
            .collect();

        MissionSnapshot {
            cycle: self.cycle,
            width: self.world.width(),
            height: self.world.height(),
            targets: self.world.targets().to_vec(),
            obstacles: self.world.obstacles().to_vec(),
            agents,
            stats: self.stats,
        }
    }

    fn objective_met(&self) -> bool {
        self.world.collected_targets().len() >= self.termination.collected_goal
    }

    fn compute_stats(&self) -> MissionStats {
        let (decisions_made, distance_traveled) = self
            .roster
            .iter()
            .map(|agent| agent.telemetry())
            .fold((0, 0.0), |(decisions, distance), t| {
                (decisions + t.decisions, distance + t.distance_traveled)
            });

        MissionStats {
            targets_discovered: self.world.discovered_targets().len(),
            targets_collected: self.world.collected_targets().len(),
            decisions_made,
            distance_traveled,
        }
    }
}
