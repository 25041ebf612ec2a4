//! Mission Kernel: Turn-Based Coordination of Heterogeneous Surface Agents
//!
//! A Scout explores and discovers targets, an Analyst scores them, and an
//! Executor travels to and collects the recommended ones. Agents never call
//! each other: they share a mutable world and exchange typed messages over a
//! store-and-forward bus, taking serialized turns in a fixed order each cycle.

pub mod agent;
pub mod agents;
pub mod bus;
pub mod config;
pub mod coordinator;
pub mod environment;
pub mod messages;
pub mod world;

pub use agent::{
    Agent, AgentTelemetry, HasPosition, HasSensorRange, Role, TurnContext, DEPLOYMENT_ORDER,
};
pub use agents::{Analyst, Executor, Scout};
pub use bus::MessageBus;
pub use config::{AnalystConfig, ExecutorConfig, MissionConfig, ScoutConfig, TerminationConfig};
pub use coordinator::{
    AgentView, CycleReport, MissionCoordinator, MissionOutcome, MissionSnapshot, MissionState,
    MissionStats, Roster, TerminationReason,
};
pub use environment::LunarEnvironment;
pub use messages::{AgentId, Message, MessageType, Payload, Priority, Recipient};
pub use world::{Category, Composition, Obstacle, Point, Target, TargetId, World};
