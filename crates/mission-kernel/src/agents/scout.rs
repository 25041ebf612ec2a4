//! Scout: frontier exploration and target discovery.
//!
//! Each turn the scout marks its grid cell visited, discovers every
//! undiscovered target inside its sensor radius, then hops to a neighbouring
//! position, preferring cells it has not visited yet.

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::agent::{Agent, AgentTelemetry, HasPosition, HasSensorRange, Role, TurnContext};
use crate::config::ScoutConfig;
use crate::messages::{AgentId, DiscoveryReport, Payload};
use crate::world::{Point, World};

/// Grid cell key: `(floor(x / cell), floor(y / cell))`.
pub type GridCell = (i64, i64);

/// Move preference: lower is better.
const UNVISITED: u8 = 0;
const VISITED: u8 = 1;

pub struct Scout {
    id: AgentId,
    /// Where discoveries are reported
    analyst: AgentId,
    position: Point,
    config: ScoutConfig,
    visited: HashSet<GridCell>,
    /// Tie-breaker between equally good moves
    rng: ChaCha8Rng,
    distance_traveled: f64,
}

impl Scout {
    /// Create a scout at `config.start`, reporting to `analyst`.
    pub fn new(id: AgentId, analyst: AgentId, config: ScoutConfig, seed: u64) -> Self {
        Self {
            id,
            analyst,
            position: config.start,
            config,
            visited: HashSet::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            distance_traveled: 0.0,
        }
    }

    pub fn cell_of(&self, point: Point) -> GridCell {
        let size = self.config.grid_cell_size;
        ((point.x / size).floor() as i64, (point.y / size).floor() as i64)
    }

    pub fn visited_cells(&self) -> &HashSet<GridCell> {
        &self.visited
    }

    /// The eight candidate hops: four cardinal, four diagonal.
    fn offsets(&self) -> [(f64, f64); 8] {
        let s = self.config.step;
        let d = self.config.diagonal_step;
        [
            (s, 0.0),
            (-s, 0.0),
            (0.0, s),
            (0.0, -s),
            (d, d),
            (-d, d),
            (d, -d),
            (-d, -d),
        ]
    }

    /// In-bounds, obstacle-free hops with their preference.
    fn candidate_moves(&self, world: &dyn World) -> Vec<(Point, u8)> {
        self.offsets()
            .iter()
            .map(|(dx, dy)| self.position.offset(*dx, *dy))
            .filter(|p| world.in_bounds(*p) && world.is_obstacle_free(*p))
            .map(|p| {
                let preference = if self.visited.contains(&self.cell_of(p)) {
                    VISITED
                } else {
                    UNVISITED
                };
                (p, preference)
            })
            .collect()
    }

    /// Pick the next hop: best preference, ties broken uniformly at random.
    ///
    /// Returns `None` when every hop is out of bounds or blocked.
    pub fn next_position(&mut self, world: &dyn World) -> Option<Point> {
        let candidates = self.candidate_moves(world);
        let best = candidates.iter().map(|(_, preference)| *preference).min()?;
        let frontier: Vec<Point> = candidates
            .into_iter()
            .filter(|(_, preference)| *preference == best)
            .map(|(p, _)| p)
            .collect();
        frontier.choose(&mut self.rng).copied()
    }

    /// Discover and report every undiscovered target in range.
    fn scan(&mut self, ctx: &mut TurnContext<'_>) -> usize {
        let mut reported = 0;
        for target in ctx
            .world
            .nearby_targets(self.position, self.config.sensor_range)
        {
            if target.discovered {
                continue;
            }
            if ctx.world.discover_target(target.id).is_none() {
                continue;
            }

            info!(
                scout = %self.id,
                target_id = target.id,
                category = %target.category,
                position = %target.position,
                "DISCOVERED target"
            );

            ctx.bus.send(
                &self.id,
                self.analyst.clone(),
                Payload::TargetDiscovered(DiscoveryReport {
                    target_id: target.id,
                    location: target.position,
                    category: target.category,
                    size: target.size,
                    composition: target.composition,
                }),
            );
            reported += 1;
        }
        reported
    }
}

impl Agent for Scout {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn role(&self) -> Role {
        Role::Scout
    }

    fn process_messages(&mut self, ctx: &mut TurnContext<'_>) {
        for message in ctx.bus.retrieve(&self.id) {
            match &message.payload {
                Payload::RequestExploration(request) => {
                    info!(
                        scout = %self.id,
                        from = %message.sender,
                        center = %request.center,
                        radius = request.radius,
                        "Received exploration request"
                    );
                }
                _ => trace!(scout = %self.id, message = %message, "Ignoring message"),
            }
        }
    }

    fn act(&mut self, ctx: &mut TurnContext<'_>) {
        let cell = self.cell_of(self.position);
        self.visited.insert(cell);

        self.scan(ctx);

        match self.next_position(&*ctx.world) {
            Some(next) => {
                self.distance_traveled += self.position.distance_to(next);
                self.position = next;
                debug!(scout = %self.id, position = %self.position, "Moving");
            }
            None => debug!(scout = %self.id, position = %self.position, "No open move, holding"),
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

    fn as_sensing(&self) -> Option<&dyn HasSensorRange> {
        Some(self)
    }
}

impl HasPosition for Scout {
    fn position(&self) -> Point {
        self.position
    }
}

impl HasSensorRange for Scout {
    fn sensor_range(&self) -> f64 {
        self.config.sensor_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MessageBus;
    use crate::environment::LunarEnvironment;
    use crate::messages::{ExplorationRequest, MessageType};
    use crate::world::{Category, Composition, Obstacle, Target};

    fn scout_at(start: Point, seed: u64) -> Scout {
        let config = ScoutConfig {
            start,
            ..ScoutConfig::default()
        };
        Scout::new(AgentId::from("Scout-1"), AgentId::from("Analyst"), config, seed)
    }

    fn open_terrain(targets: Vec<Target>) -> LunarEnvironment {
        LunarEnvironment::new(100.0, 100.0, targets, Vec::new())
    }

    fn turn(scout: &mut Scout, world: &mut LunarEnvironment, bus: &mut MessageBus, cycle: usize) {
        let mut ctx = TurnContext {
            world,
            bus,
            cycle,
        };
        scout.process_messages(&mut ctx);
        scout.act(&mut ctx);
    }

    fn discoveries(bus: &MessageBus) -> Vec<usize> {
        bus.history(None)
            .iter()
            .filter_map(|m| match &m.payload {
                Payload::TargetDiscovered(report) => Some(report.target_id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_discovers_targets_in_range_exactly_once() {
        let mut world = open_terrain(vec![
            Target::new(0, Point::new(25.0, 25.0), Category::Rock, Composition::Basalt, 4.0),
            Target::new(1, Point::new(90.0, 90.0), Category::Crater, Composition::Ice, 6.0),
        ]);
        let mut bus = MessageBus::new();
        let mut scout = scout_at(Point::new(20.0, 20.0), 7);

        turn(&mut scout, &mut world, &mut bus, 1);
        assert_eq!(discoveries(&bus), vec![0]);
        assert!(world.target(0).unwrap().discovered);
        assert!(!world.target(1).unwrap().discovered);

        for cycle in 2..6 {
            turn(&mut scout, &mut world, &mut bus, cycle);
        }
        let reported = discoveries(&bus);
        assert_eq!(reported.iter().filter(|id| **id == 0).count(), 1);
    }

    #[test]
    fn test_discovery_report_goes_to_analyst() {
        let mut world = open_terrain(vec![Target::new(
            0,
            Point::new(55.0, 55.0),
            Category::Anomaly,
            Composition::Ice,
            8.0,
        )]);
        let mut bus = MessageBus::new();
        let mut scout = scout_at(Point::new(50.0, 50.0), 1);

        turn(&mut scout, &mut world, &mut bus, 1);

        let inbox = bus.retrieve(&AgentId::from("Analyst"));
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message_type(), MessageType::TargetDiscovered);
        let Payload::TargetDiscovered(report) = &inbox[0].payload else {
            panic!("expected discovery report");
        };
        assert_eq!(report.location, Point::new(55.0, 55.0));
        assert_eq!(report.composition, Composition::Ice);
        assert_eq!(report.category, Category::Anomaly);
        assert_eq!(report.size, 8.0);
    }

    #[test]
    fn test_prefers_unvisited_cells() {
        let mut world = open_terrain(Vec::new());
        let mut bus = MessageBus::new();

        for seed in 0..20 {
            let mut scout = scout_at(Point::new(50.0, 50.0), seed);
            turn(&mut scout, &mut world, &mut bus, 1);
            // (57, 57) stays in the start cell, which is now visited
            assert_ne!(scout.cell_of(scout.position()), (5, 5));
        }
    }

    #[test]
    fn test_ties_are_broken_at_random_among_best_cells() {
        let world = open_terrain(Vec::new());
        let start = Point::new(50.0, 50.0);
        let mut chosen: Vec<Point> = Vec::new();

        for seed in 0..64 {
            let mut scout = scout_at(start, seed);
            // Start cell and the cell east of it are already explored
            scout.visited.insert((5, 5));
            scout.visited.insert((6, 5));
            let hops: Vec<Point> = scout
                .offsets()
                .iter()
                .map(|(dx, dy)| start.offset(*dx, *dy))
                .collect();

            let next = scout.next_position(&world).unwrap();
            assert!(hops.contains(&next));
            assert!(!scout.visited_cells().contains(&scout.cell_of(next)));
            if !chosen.contains(&next) {
                chosen.push(next);
            }
        }

        // Six hops tie on unvisited cells; (60, 50) and (57, 57) never win
        assert!(chosen.len() > 1);
        assert!(!chosen.contains(&Point::new(60.0, 50.0)));
        assert!(!chosen.contains(&Point::new(57.0, 57.0)));
    }

    #[test]
    fn test_exploration_request_is_only_logged() {
        let mut world = open_terrain(vec![Target::new(
            0,
            Point::new(55.0, 55.0),
            Category::Rock,
            Composition::Basalt,
            4.0,
        )]);
        let mut bus = MessageBus::new();
        let mut scout = scout_at(Point::new(50.0, 50.0), 11);
        bus.send(
            &AgentId::from("Mission-Control"),
            scout.id().clone(),
            Payload::RequestExploration(ExplorationRequest {
                center: Point::new(10.0, 90.0),
                radius: 20.0,
            }),
        );

        let mut ctx = TurnContext {
            world: &mut world,
            bus: &mut bus,
            cycle: 1,
        };
        scout.process_messages(&mut ctx);

        assert_eq!(scout.position(), Point::new(50.0, 50.0));
        assert!(scout.visited_cells().is_empty());
        assert_eq!(scout.telemetry().distance_traveled, 0.0);
        assert!(!world.target(0).unwrap().discovered);
        assert_eq!(bus.pending_count(scout.id()), 0);
        assert!(discoveries(&bus).is_empty());
        assert_eq!(bus.total_sent(), 1);
    }

    #[test]
    fn test_moves_stay_in_bounds() {
        let mut world = open_terrain(Vec::new());
        let mut bus = MessageBus::new();
        let mut scout = scout_at(Point::new(0.0, 0.0), 3);

        turn(&mut scout, &mut world, &mut bus, 1);

        let allowed = [Point::new(10.0, 0.0), Point::new(0.0, 10.0), Point::new(7.0, 7.0)];
        assert!(allowed.contains(&scout.position()));
    }

    #[test]
    fn test_holds_position_when_surrounded() {
        let obstacles = vec![Obstacle::new(Point::new(50.0, 50.0), 20.0)];
        let mut world = LunarEnvironment::new(100.0, 100.0, Vec::new(), obstacles);
        let mut bus = MessageBus::new();
        let mut scout = scout_at(Point::new(50.0, 50.0), 5);

        turn(&mut scout, &mut world, &mut bus, 1);

        assert_eq!(scout.position(), Point::new(50.0, 50.0));
        assert_eq!(scout.telemetry().distance_traveled, 0.0);
        assert!(scout.visited_cells().contains(&(5, 5)));
    }

    #[test]
    fn test_same_seed_same_route() {
        let mut bus = MessageBus::new();
        let mut a = scout_at(Point::new(20.0, 20.0), 42);
        let mut b = scout_at(Point::new(20.0, 20.0), 42);
        let mut world_a = open_terrain(Vec::new());
        let mut world_b = open_terrain(Vec::new());

        for cycle in 1..15 {
            turn(&mut a, &mut world_a, &mut bus, cycle);
            turn(&mut b, &mut world_b, &mut bus, cycle);
            assert_eq!(a.position(), b.position());
        }
    }

    #[test]
    fn test_exposes_position_and_sensor_capabilities() {
        let scout = scout_at(Point::new(20.0, 20.0), 0);
        let agent: &dyn Agent = &scout;
        assert_eq!(agent.as_positioned().unwrap().position(), Point::new(20.0, 20.0));
        assert_eq!(agent.as_sensing().unwrap().sensor_range(), 15.0);
    }
}
