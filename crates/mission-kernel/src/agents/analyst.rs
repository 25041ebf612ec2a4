//! Analyst: multi-criteria target scoring.
//!
//! Score = size + composition bonus + category bonus − distance penalty,
//! floored at zero. The distance penalty is measured from the reference
//! point (the executor's base) and capped.

use tracing::{debug, info, trace};

use crate::agent::{Agent, AgentTelemetry, Role, TurnContext};
use crate::config::AnalystConfig;
use crate::messages::{AgentId, DiscoveryReport, Evaluation, Payload, Priority};
use crate::world::{Category, Composition};

/// Rarity bonus per composition.
pub fn composition_score(composition: Composition) -> f64 {
    match composition {
        Composition::Ice => 10.0,
        Composition::Anorthosite => 7.0,
        Composition::Basalt => 4.0,
        Composition::Regolith => 2.0,
        Composition::Unknown => 3.0,
    }
}

/// Scientific-interest bonus per category.
pub fn category_score(category: Category) -> f64 {
    match category {
        Category::Anomaly => 8.0,
        Category::Crater => 5.0,
        Category::Rock => 3.0,
        Category::Unknown => 3.0,
    }
}

/// Score a discovery report. Never negative.
pub fn score_target(report: &DiscoveryReport, config: &AnalystConfig) -> f64 {
    let distance = report.location.distance_to(config.reference_point);
    let distance_penalty = (distance / config.distance_divisor).min(config.max_distance_penalty);

    let score = report.size
        + composition_score(report.composition)
        + category_score(report.category)
        - distance_penalty;
    score.max(0.0)
}

pub struct Analyst {
    id: AgentId,
    /// Where recommendations are sent
    executor: AgentId,
    config: AnalystConfig,
    pending: Vec<DiscoveryReport>,
    evaluations: Vec<Evaluation>,
}

impl Analyst {
    pub fn new(id: AgentId, executor: AgentId, config: AnalystConfig) -> Self {
        Self {
            id,
            executor,
            config,
            pending: Vec::new(),
            evaluations: Vec::new(),
        }
    }

    /// Reports waiting for this cycle's evaluation.
    pub fn pending(&self) -> &[DiscoveryReport] {
        &self.pending
    }

    /// Every evaluation ever produced, including LOW ones.
    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    pub fn evaluate(&self, report: &DiscoveryReport) -> Evaluation {
        let score = score_target(report, &self.config);
        Evaluation {
            target_id: report.target_id,
            location: report.location,
            score,
            priority: Priority::classify(
                score,
                self.config.high_threshold,
                self.config.medium_threshold,
            ),
        }
    }
}

impl Agent for Analyst {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn role(&self) -> Role {
        Role::Analyst
    }

    fn process_messages(&mut self, ctx: &mut TurnContext<'_>) {
        for message in ctx.bus.retrieve(&self.id) {
            match message.payload {
                Payload::TargetDiscovered(report) => self.pending.push(report),
                other => trace!(
                    analyst = %self.id,
                    message_type = %other.message_type(),
                    "Ignoring message"
                ),
            }
        }
    }

    fn act(&mut self, ctx: &mut TurnContext<'_>) {
        if self.pending.is_empty() {
            return;
        }

        // LOW evaluations are not retried
        let batch = std::mem::take(&mut self.pending);
        for report in &batch {
            let evaluation = self.evaluate(report);

            info!(
                analyst = %self.id,
                target_id = evaluation.target_id,
                score = format!("{:.1}", evaluation.score),
                priority = %evaluation.priority,
                "Evaluated target"
            );

            if evaluation.priority.is_actionable() {
                ctx.bus.send(
                    &self.id,
                    self.executor.clone(),
                    Payload::CollectTarget(evaluation.clone()),
                );
            } else {
                debug!(target_id = evaluation.target_id, "Below collection threshold");
            }
            self.evaluations.push(evaluation);
        }
    }

    fn telemetry(&self) -> AgentTelemetry {
        AgentTelemetry {
            decisions: self.evaluations.len(),
            distance_traveled: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MessageBus;
    use crate::environment::LunarEnvironment;
    use crate::world::Point;

    fn report(
        target_id: usize,
        location: Point,
        category: Category,
        composition: Composition,
        size: f64,
    ) -> DiscoveryReport {
        DiscoveryReport {
            target_id,
            location,
            category,
            size,
            composition,
        }
    }

    fn analyst() -> Analyst {
        Analyst::new(
            AgentId::from("Analyst"),
            AgentId::from("Executor-1"),
            AnalystConfig::default(),
        )
    }

    fn run_turn(analyst: &mut Analyst, bus: &mut MessageBus) {
        let mut world = LunarEnvironment::new(100.0, 100.0, Vec::new(), Vec::new());
        let mut ctx = TurnContext {
            world: &mut world,
            bus,
            cycle: 1,
        };
        analyst.process_messages(&mut ctx);
        analyst.act(&mut ctx);
    }

    #[test]
    fn test_scores_ice_anomaly_near_base() {
        let r = report(0, Point::new(55.0, 55.0), Category::Anomaly, Composition::Ice, 8.0);
        let score = score_target(&r, &AnalystConfig::default());
        // 8 + 10 + 8 - 7.07 / 10
        assert!((score - 25.293).abs() < 0.01);
        assert_eq!(Priority::from_score(score), Priority::High);
    }

    #[test]
    fn test_distance_penalty_is_capped() {
        let config = AnalystConfig::default();
        let far = report(0, Point::new(200.0, 200.0), Category::Rock, Composition::Basalt, 5.0);
        assert!((score_target(&far, &config) - (5.0 + 4.0 + 3.0 - 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_score_never_negative() {
        let config = AnalystConfig {
            max_distance_penalty: 100.0,
            ..AnalystConfig::default()
        };
        let r = report(0, Point::new(1000.0, 1000.0), Category::Rock, Composition::Regolith, 1.0);
        assert_eq!(score_target(&r, &config), 0.0);
    }

    #[test]
    fn test_score_is_monotone() {
        let config = AnalystConfig::default();
        let base = report(0, Point::new(60.0, 50.0), Category::Rock, Composition::Regolith, 2.0);
        let base_score = score_target(&base, &config);

        let bigger = DiscoveryReport { size: 6.0, ..base.clone() };
        assert!(score_target(&bigger, &config) >= base_score);

        let icier = DiscoveryReport { composition: Composition::Ice, ..base.clone() };
        assert!(score_target(&icier, &config) >= base_score);

        let odder = DiscoveryReport { category: Category::Anomaly, ..base.clone() };
        assert!(score_target(&odder, &config) >= base_score);

        let farther = DiscoveryReport { location: Point::new(80.0, 50.0), ..base };
        assert!(score_target(&farther, &config) <= base_score);
    }

    #[test]
    fn test_unknown_labels_use_default_bonus() {
        assert_eq!(composition_score(Composition::Unknown), 3.0);
        assert_eq!(category_score(Category::Unknown), 3.0);
    }

    #[test]
    fn test_forwards_only_high_and_medium() {
        let mut bus = MessageBus::new();
        let scout = AgentId::from("Scout-1");
        let analyst_id = AgentId::from("Analyst");
        let executor_id = AgentId::from("Executor-1");
        let at_base = Point::new(50.0, 50.0);

        // 8 + 10 + 8 = 26 -> HIGH
        let high = report(0, at_base, Category::Anomaly, Composition::Ice, 8.0);
        // 1 + 4 + 5 = 10 -> MEDIUM
        let medium = report(1, at_base, Category::Crater, Composition::Basalt, 1.0);
        // 1 + 2 + 3 = 6 -> LOW
        let low = report(2, at_base, Category::Rock, Composition::Regolith, 1.0);
        for discovery in [high, medium, low] {
            bus.send(&scout, analyst_id.clone(), Payload::TargetDiscovered(discovery));
        }

        let mut analyst = analyst();
        run_turn(&mut analyst, &mut bus);

        assert_eq!(analyst.evaluations().len(), 3);
        assert!(analyst.pending().is_empty());
        assert_eq!(analyst.evaluations()[2].priority, Priority::Low);

        let forwarded: Vec<_> = bus
            .retrieve(&executor_id)
            .into_iter()
            .filter_map(|m| match m.payload {
                Payload::CollectTarget(evaluation) => Some(evaluation),
                _ => None,
            })
            .collect();
        assert_eq!(forwarded.len(), 2);
        assert_eq!(forwarded[0].target_id, 0);
        assert_eq!(forwarded[0].priority, Priority::High);
        assert_eq!(forwarded[1].target_id, 1);
        assert_eq!(forwarded[1].priority, Priority::Medium);
        assert_eq!(analyst.telemetry().decisions, 3);
    }

    #[test]
    fn test_duplicate_reports_are_evaluated_twice() {
        let mut bus = MessageBus::new();
        let scout = AgentId::from("Scout-1");
        let analyst_id = AgentId::from("Analyst");
        let r = report(4, Point::new(50.0, 50.0), Category::Crater, Composition::Ice, 5.0);

        bus.send(&scout, analyst_id.clone(), Payload::TargetDiscovered(r.clone()));
        bus.send(&scout, analyst_id, Payload::TargetDiscovered(r));

        let mut analyst = analyst();
        run_turn(&mut analyst, &mut bus);

        assert_eq!(analyst.evaluations().len(), 2);
        assert_eq!(bus.retrieve(&AgentId::from("Executor-1")).len(), 2);
    }

    #[test]
    fn test_buffer_cleared_after_each_cycle() {
        let mut bus = MessageBus::new();
        let scout = AgentId::from("Scout-1");
        let r = report(0, Point::new(50.0, 50.0), Category::Rock, Composition::Regolith, 1.0);
        bus.send(&scout, AgentId::from("Analyst"), Payload::TargetDiscovered(r));

        let mut analyst = analyst();
        run_turn(&mut analyst, &mut bus);
        run_turn(&mut analyst, &mut bus);

        assert_eq!(analyst.evaluations().len(), 1);
        assert!(analyst.pending().is_empty());
    }
}
