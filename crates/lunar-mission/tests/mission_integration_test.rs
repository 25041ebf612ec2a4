//! Integration tests for the full mission pipeline.
//!
//! Tests the full flow of:
//! - Scout discovery -> Analyst evaluation -> Executor collection
//! - Collection broadcasts reaching every agent
//! - Termination on the cycle cap and on the collected-target goal

use std::time::Duration;

use lunar_mission::experiment::{MissionRunner, MissionRunnerConfig};
use mission_kernel::{
    AgentId, Category, Composition, LunarEnvironment, MessageType, MissionState, Payload, Point,
    Priority, Recipient, Role, Target, TerminationConfig, TerminationReason, World,
    DEPLOYMENT_ORDER,
};

/// Runner whose scout and executor both start at the centre of the map.
fn centred_runner(termination: TerminationConfig) -> MissionRunner {
    let mut config = MissionRunnerConfig::default();
    config.mission.scout.start = Point::new(50.0, 50.0);
    config.mission.termination = termination;
    MissionRunner::new(config)
}

fn ice_anomaly(id: usize, position: Point, size: f64) -> Target {
    Target::new(id, position, Category::Anomaly, Composition::Ice, size)
}

#[test]
fn test_ice_anomaly_is_discovered_scored_and_collected() {
    let environment = LunarEnvironment::new(
        100.0,
        100.0,
        vec![ice_anomaly(0, Point::new(55.0, 55.0), 8.0)],
        Vec::new(),
    );
    let runner = centred_runner(TerminationConfig::default());
    let mut coordinator = runner.build_with(environment, 5).unwrap();

    // Cycle 1: discovered, evaluated and dispatched in the same cycle
    let report = coordinator.step().unwrap();
    assert_eq!(report.newly_discovered, 1);
    assert_eq!(report.stats.decisions_made, 1);

    let history = coordinator.bus().history(None);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].message_type(), MessageType::TargetDiscovered);
    assert_eq!(history[0].recipient, Recipient::Agent(Role::Analyst.default_id()));
    let Payload::CollectTarget(evaluation) = &history[1].payload else {
        panic!("expected a collection recommendation");
    };
    assert!((evaluation.score - 25.3).abs() < 0.05);
    assert_eq!(evaluation.priority, Priority::High);
    assert_eq!(history[1].recipient, Recipient::Agent(Role::Executor.default_id()));

    // Cycle 2: the executor, now within the collection radius, collects
    let report = coordinator.step().unwrap();
    assert_eq!(report.newly_collected, 1);
    assert_eq!(coordinator.world().collected_targets(), &[0]);
    assert!(coordinator.world().target(0).unwrap().collected);

    let collected_notices = coordinator
        .bus()
        .history(None)
        .iter()
        .filter(|m| m.message_type() == MessageType::TargetCollected)
        .count();
    assert_eq!(collected_notices, 1);

    // Nothing more happens to the target afterwards
    for _ in 0..5 {
        coordinator.step();
    }
    assert_eq!(coordinator.world().collected_targets(), &[0]);
    assert_eq!(coordinator.stats().targets_collected, 1);
}

#[test]
fn test_collection_broadcast_reaches_every_agent() {
    let environment = LunarEnvironment::new(
        100.0,
        100.0,
        vec![ice_anomaly(0, Point::new(55.0, 55.0), 8.0)],
        Vec::new(),
    );
    let runner = centred_runner(TerminationConfig::default());
    let mut coordinator = runner.build_with(environment, 5).unwrap();

    coordinator.step();
    coordinator.step();

    let broadcast = coordinator.bus().history(Some(1))[0].clone();
    assert_eq!(broadcast.recipient, Recipient::All);
    assert_eq!(broadcast.sender, Role::Executor.default_id());
    for role in DEPLOYMENT_ORDER {
        assert_eq!(coordinator.bus().pending_count(&role.default_id()), 1);
    }

    // Each agent drains it on its next turn, exactly once
    coordinator.step();
    for role in DEPLOYMENT_ORDER {
        assert_eq!(coordinator.bus().pending_count(&role.default_id()), 0);
    }
    let observer = AgentId::from("Observer");
    assert_eq!(coordinator.bus_mut().retrieve(&observer).len(), 1);
}

#[test]
fn test_mission_stops_on_first_cycle_reaching_goal() {
    let targets = (0..12)
        .map(|id| ice_anomaly(id, Point::new(50.0 + id as f64 * 0.1, 50.0), 5.0))
        .collect();
    let environment = LunarEnvironment::new(100.0, 100.0, targets, Vec::new());
    let runner = centred_runner(TerminationConfig::default());
    let mut coordinator = runner.build_with(environment, 9).unwrap();

    let outcome = coordinator.run(40);

    // One collection per cycle, goal of 10
    assert_eq!(outcome.cycles, 10);
    assert_eq!(outcome.reason, TerminationReason::ObjectiveMet);
    assert_eq!(outcome.stats.targets_collected, 10);
    assert_eq!(outcome.stats.targets_discovered, 12);
    assert!(coordinator.step().is_none());
}

#[test]
fn test_mission_stops_at_cycle_cap() {
    let environment = LunarEnvironment::new(100.0, 100.0, Vec::new(), Vec::new());
    let runner = centred_runner(TerminationConfig::default());
    let mut coordinator = runner.build_with(environment, 1).unwrap();

    let outcome = coordinator.run(40);

    assert_eq!(outcome.cycles, 40);
    assert_eq!(outcome.reason, TerminationReason::CycleCap);
    assert_eq!(
        coordinator.state(),
        MissionState::Terminated(TerminationReason::CycleCap)
    );
    assert!(coordinator.stats().distance_traveled > 0.0);
}

#[test]
fn test_collected_never_exceeds_capacity() {
    let targets = (0..6)
        .map(|id| ice_anomaly(id, Point::new(50.0, 50.0 + id as f64 * 0.2), 5.0))
        .collect();
    let environment = LunarEnvironment::new(100.0, 100.0, targets, Vec::new());

    let mut config = MissionRunnerConfig::default();
    config.mission.scout.start = Point::new(50.0, 50.0);
    config.mission.executor.carrying_capacity = 3;
    let runner = MissionRunner::new(config);
    let mut coordinator = runner.build_with(environment, 2).unwrap();

    let outcome = coordinator.run(40);

    assert_eq!(outcome.stats.targets_collected, 3);
    assert_eq!(outcome.reason, TerminationReason::CycleCap);
}

#[tokio::test]
async fn test_paced_run_produces_result_and_snapshot() {
    let mut config = MissionRunnerConfig::default();
    config.mission.termination.max_cycles = 3;
    config.cycle_delay = Duration::from_millis(1);
    let runner = MissionRunner::new(config);

    let run = runner.run(77).await.unwrap();

    assert_eq!(run.result.total_cycles, 3);
    assert_eq!(run.result.cycle_metrics.len(), 3);
    assert_eq!(run.result.total_targets, 20);
    assert_eq!(run.snapshot.targets.len(), 20);
    assert_eq!(run.snapshot.agents.len(), 3);
    assert_eq!(
        run.result.stats.targets_collected,
        run.snapshot.targets.iter().filter(|t| t.collected).count()
    );
}
