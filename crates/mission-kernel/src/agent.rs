//! Agent trait, roles and the capability interfaces read by presentation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bus::MessageBus;
use crate::messages::AgentId;
use crate::world::{Point, World};

/// The three fixed roles of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Scout,
    Analyst,
    Executor,
}

impl Role {
    /// Conventional bus identity for an agent of this role.
    pub fn default_id(&self) -> AgentId {
        match self {
            Self::Scout => AgentId::from("Scout-1"),
            Self::Analyst => AgentId::from("Analyst"),
            Self::Executor => AgentId::from("Executor-1"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scout => "scout",
            Self::Analyst => "analyst",
            Self::Executor => "executor",
        })
    }
}

/// Order in which agents take their turn within a cycle.
///
/// Same-cycle delivery depends on it: a discovery made by the Scout is read
/// by the Analyst in the same cycle, and a recommendation sent by the
/// Analyst is read by the Executor in the same cycle.
pub const DEPLOYMENT_ORDER: [Role; 3] = [Role::Scout, Role::Analyst, Role::Executor];

/// Agents that occupy a position on the surface.
pub trait HasPosition {
    fn position(&self) -> Point;
}

/// Agents that sense their surroundings within a fixed radius.
pub trait HasSensorRange {
    fn sensor_range(&self) -> f64;
}

/// Everything an agent may touch during its turn.
pub struct TurnContext<'a> {
    pub world: &'a mut dyn World,
    pub bus: &'a mut MessageBus,
    /// 1-based cycle number
    pub cycle: usize,
}

/// Counters an agent reports for mission statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTelemetry {
    /// Evaluations produced
    pub decisions: usize,
    /// Total distance moved
    pub distance_traveled: f64,
}

/// A mission agent.
///
/// Each cycle the coordinator calls `process_messages` and then `act`, both
/// to completion, before the next agent's turn.
pub trait Agent: Send {
    fn id(&self) -> &AgentId;

    fn role(&self) -> Role;

    /// Drain this agent's mailbox and update local state.
    fn process_messages(&mut self, ctx: &mut TurnContext<'_>);

    /// Take one action.
    fn act(&mut self, ctx: &mut TurnContext<'_>);

    fn telemetry(&self) -> AgentTelemetry {
        AgentTelemetry::default()
    }

    fn as_positioned(&self) -> Option<&dyn HasPosition> {
        None
    }

    fn as_sensing(&self) -> Option<&dyn HasSensorRange> {
        None
    }
}
