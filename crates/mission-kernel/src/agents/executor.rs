//! Executor: priority-queue routing and sample collection.
//!
//! Recommendations are kept in a queue sorted by descending score. The
//! executor pursues the head of the queue until it is collected or
//! released, stepping straight toward it and sidestepping perpendicular to
//! its heading when the direct step lands in an obstacle.

use tracing::{debug, info, trace, warn};

use crate::agent::{Agent, AgentTelemetry, HasPosition, Role, TurnContext};
use crate::config::ExecutorConfig;
use crate::messages::{AgentId, CollectionNotice, Evaluation, Payload};
use crate::world::{Point, World};

pub struct Executor {
    id: AgentId,
    position: Point,
    config: ExecutorConfig,
    /// Descending by score; equal scores in arrival order
    queue: Vec<Evaluation>,
    current: Option<Evaluation>,
    collected: usize,
    distance_traveled: f64,
}

impl Executor {
    /// Create an executor at `config.start`.
    pub fn new(id: AgentId, config: ExecutorConfig) -> Self {
        Self {
            id,
            position: config.start,
            config,
            queue: Vec::new(),
            current: None,
            collected: 0,
            distance_traveled: 0.0,
        }
    }

    /// Insert before the first entry with a strictly lower score.
    pub fn enqueue(&mut self, evaluation: Evaluation) {
        let index = self
            .queue
            .iter()
            .position(|queued| queued.score < evaluation.score)
            .unwrap_or(self.queue.len());
        self.queue.insert(index, evaluation);
    }

    pub fn queue(&self) -> &[Evaluation] {
        &self.queue
    }

    pub fn current_target(&self) -> Option<&Evaluation> {
        self.current.as_ref()
    }

    pub fn collected_count(&self) -> usize {
        self.collected
    }

    pub fn carrying_capacity(&self) -> usize {
        self.config.carrying_capacity
    }

    pub fn is_full(&self) -> bool {
        self.collected >= self.config.carrying_capacity
    }

    /// Attempt collection of the current target and release it either way.
    fn collect(&mut self, target: Evaluation, ctx: &mut TurnContext<'_>) {
        if ctx.world.collect_target(target.target_id) {
            self.collected += 1;
            info!(
                executor = %self.id,
                target_id = target.target_id,
                collected = self.collected,
                capacity = self.config.carrying_capacity,
                "COLLECTED target"
            );
            ctx.bus.broadcast(
                &self.id,
                Payload::TargetCollected(CollectionNotice {
                    target_id: target.target_id,
                    location: target.location,
                }),
            );
        } else {
            warn!(
                executor = %self.id,
                target_id = target.target_id,
                "Collection failed, releasing target"
            );
        }
        self.current = None;
    }

    /// Move one step toward `goal`, sidestepping obstacles.
    ///
    /// Tries the direct step, then the step rotated -90° and +90°. Holds
    /// position when all three are blocked or `goal` is already reached.
    fn step_toward(&mut self, world: &dyn World, goal: Point, distance: f64) {
        if distance <= f64::EPSILON {
            return;
        }
        let step = self.config.speed.min(distance);
        let dx = (goal.x - self.position.x) / distance * step;
        let dy = (goal.y - self.position.y) / distance * step;

        let candidates = [
            self.position.offset(dx, dy),
            self.position.offset(dy, -dx),
            self.position.offset(-dy, dx),
        ];

        match candidates.iter().position(|p| world.is_obstacle_free(*p)) {
            Some(index) => {
                let next = candidates[index];
                self.distance_traveled += self.position.distance_to(next);
                self.position = next;
                if index == 0 {
                    debug!(
                        executor = %self.id,
                        position = %self.position,
                        remaining = format!("{:.1}", distance),
                        "Moving"
                    );
                } else {
                    debug!(executor = %self.id, position = %self.position, "Avoiding obstacle");
                }
            }
            None => debug!(executor = %self.id, position = %self.position, "Path blocked, holding"),
        }
    }
}

impl Agent for Executor {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn role(&self) -> Role {
        Role::Executor
    }

    fn process_messages(&mut self, ctx: &mut TurnContext<'_>) {
        for message in ctx.bus.retrieve(&self.id) {
            match message.payload {
                Payload::CollectTarget(evaluation) => self.enqueue(evaluation),
                other => trace!(
                    executor = %self.id,
                    message_type = %other.message_type(),
                    "Ignoring message"
                ),
            }
        }
    }

    fn act(&mut self, ctx: &mut TurnContext<'_>) {
        if self.is_full() {
            debug!(
                executor = %self.id,
                capacity = self.config.carrying_capacity,
                "At carrying capacity"
            );
            return;
        }

        if self.current.is_none() && !self.queue.is_empty() {
            let next = self.queue.remove(0);
            info!(
                executor = %self.id,
                target_id = next.target_id,
                location = %next.location,
                "New collection mission"
            );
            self.current = Some(next);
        }

        let Some(target) = self.current.clone() else {
            return;
        };

        let distance = self.position.distance_to(target.location);
        if distance < self.config.collection_radius {
            self.collect(target, ctx);
        } else {
            self.step_toward(&*ctx.world, target.location, distance);
        }
    }

    fn telemetry(&self) -> AgentTelemetry {
        AgentTelemetry {
            decisions: 0,
            distance_traveled: self.distance_traveled,
        }
    }

    fn as_positioned(&self) -> Option<&dyn HasPosition> {
        Some(self)
    }
}

impl HasPosition for Executor {
    fn position(&self) -> Point {
        self.position
    }
}
