//! Message types exchanged over the [`MessageBus`](crate::bus::MessageBus).
//!
//! Each payload variant fixes its message type, so a message can never carry
//! a payload that does not match its tag.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::world::{Category, Composition, Point, TargetId};

/// Reserved recipient name for broadcast messages.
pub const BROADCAST: &str = "ALL";

/// Score above which an evaluation is HIGH priority.
pub const HIGH_PRIORITY_THRESHOLD: f64 = 15.0;

/// Score above which an evaluation is MEDIUM priority.
pub const MEDIUM_PRIORITY_THRESHOLD: f64 = 8.0;

/// Identity of an agent on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the reserved broadcast name.
    pub fn is_broadcast(&self) -> bool {
        self.0 == BROADCAST
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Addressee of a message: one agent, or every agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    Agent(AgentId),
    All,
}

impl Recipient {
    /// Whether a message with this recipient is deliverable to `agent`.
    pub fn includes(&self, agent: &AgentId) -> bool {
        match self {
            Self::Agent(id) => id == agent,
            Self::All => true,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent(id) => write!(f, "{}", id),
            Self::All => f.write_str(BROADCAST),
        }
    }
}

impl From<AgentId> for Recipient {
    fn from(id: AgentId) -> Self {
        if id.is_broadcast() {
            Self::All
        } else {
            Self::Agent(id)
        }
    }
}

/// Message type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    TargetDiscovered,
    CollectTarget,
    TargetCollected,
    RequestExploration,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetDiscovered => "TARGET_DISCOVERED",
            Self::CollectTarget => "COLLECT_TARGET",
            Self::TargetCollected => "TARGET_COLLECTED",
            Self::RequestExploration => "REQUEST_EXPLORATION",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scout → Analyst: a newly discovered target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub target_id: TargetId,
    pub location: Point,
    pub category: Category,
    pub size: f64,
    pub composition: Composition,
}

/// Priority tier of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Tier for `score` under the standard thresholds (15 and 8).
    pub fn from_score(score: f64) -> Self {
        Self::classify(score, HIGH_PRIORITY_THRESHOLD, MEDIUM_PRIORITY_THRESHOLD)
    }

    /// Tier for `score`: HIGH above `high`, MEDIUM above `medium`, else LOW.
    pub fn classify(score: f64, high: f64, medium: f64) -> Self {
        if score > high {
            Self::High
        } else if score > medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Whether evaluations of this tier are forwarded for collection.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::High | Self::Medium)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        })
    }
}

/// Analyst → Executor: a scored target. Also the Executor's queue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub target_id: TargetId,
    pub location: Point,
    pub score: f64,
    pub priority: Priority,
}

/// Executor → all: a target was collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionNotice {
    pub target_id: TargetId,
    pub location: Point,
}

/// Request that an area be explored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationRequest {
    pub center: Point,
    pub radius: f64,
}

/// Typed message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Payload {
    TargetDiscovered(DiscoveryReport),
    CollectTarget(Evaluation),
    TargetCollected(CollectionNotice),
    RequestExploration(ExplorationRequest),
}

impl Payload {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::TargetDiscovered(_) => MessageType::TargetDiscovered,
            Self::CollectTarget(_) => MessageType::CollectTarget,
            Self::TargetCollected(_) => MessageType::TargetCollected,
            Self::RequestExploration(_) => MessageType::RequestExploration,
        }
    }
}

/// A message as stored by the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Position in global send order; delivery is FIFO by this value.
    pub sequence: u64,
    pub sender: AgentId,
    pub recipient: Recipient,
    pub payload: Payload,
    /// Creation time, for history display only.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} -> {}] {}",
            self.sender,
            self.recipient,
            self.message_type()
        )
    }
}
