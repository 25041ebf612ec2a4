//! Text rendering of mission state and results.
//!
//! Rendering reads only a [`MissionSnapshot`]: agents appear on the map only
//! if they expose a position, and sensor footprints only if they expose a
//! sensor range.

use std::fmt::Write;

use mission_kernel::{MissionSnapshot, Point, Role};

use crate::results::MissionResult;

const OBSTACLE: char = '#';
const SENSOR: char = '.';
const EMPTY: char = ' ';
const UNDISCOVERED: char = '?';
const DISCOVERED: char = 'o';
const COLLECTED: char = '*';

/// ASCII map of a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct MapRenderer {
    pub columns: usize,
    pub rows: usize,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self {
            columns: 50,
            rows: 25,
        }
    }
}

impl MapRenderer {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    fn cell_size(&self, snapshot: &MissionSnapshot) -> (f64, f64) {
        (
            snapshot.width / self.columns as f64,
            snapshot.height / self.rows as f64,
        )
    }

    /// Grid cell holding `point`. Row 0 is the top (highest y).
    fn cell_of(&self, snapshot: &MissionSnapshot, point: Point) -> Option<(usize, usize)> {
        let (cell_w, cell_h) = self.cell_size(snapshot);
        if point.x < 0.0 || point.y < 0.0 || point.x > snapshot.width || point.y > snapshot.height {
            return None;
        }
        let column = ((point.x / cell_w) as usize).min(self.columns - 1);
        let row_from_bottom = ((point.y / cell_h) as usize).min(self.rows - 1);
        Some((self.rows - 1 - row_from_bottom, column))
    }

    fn cell_center(&self, snapshot: &MissionSnapshot, row: usize, column: usize) -> Point {
        let (cell_w, cell_h) = self.cell_size(snapshot);
        let row_from_bottom = self.rows - 1 - row;
        Point::new(
            (column as f64 + 0.5) * cell_w,
            (row_from_bottom as f64 + 0.5) * cell_h,
        )
    }

    pub fn render(&self, snapshot: &MissionSnapshot) -> String {
        let mut grid = vec![vec![EMPTY; self.columns]; self.rows];

        let footprints: Vec<(Point, f64)> = snapshot
            .agents
            .iter()
            .filter_map(|agent| Some((agent.position?, agent.sensor_range?)))
            .collect();

        for (row, line) in grid.iter_mut().enumerate() {
            for (column, cell) in line.iter_mut().enumerate() {
                let center = self.cell_center(snapshot, row, column);
                if snapshot.obstacles.iter().any(|o| o.blocks(center)) {
                    *cell = OBSTACLE;
                } else if footprints
                    .iter()
                    .any(|(position, range)| position.distance_to(center) <= *range)
                {
                    *cell = SENSOR;
                }
            }
        }

        for target in &snapshot.targets {
            let glyph = if target.collected {
                COLLECTED
            } else if target.discovered {
                DISCOVERED
            } else {
                UNDISCOVERED
            };
            if let Some((row, column)) = self.cell_of(snapshot, target.position) {
                grid[row][column] = glyph;
            }
        }

        for agent in &snapshot.agents {
            let Some(position) = agent.position else {
                continue;
            };
            if let Some((row, column)) = self.cell_of(snapshot, position) {
                grid[row][column] = agent_glyph(agent.role);
            }
        }

        let border = format!("+{}+", "-".repeat(self.columns));
        let mut out = String::new();
        let _ = writeln!(out, "{}", border);
        for line in grid {
            let _ = writeln!(out, "|{}|", line.into_iter().collect::<String>());
        }
        let _ = writeln!(out, "{}", border);
        let _ = writeln!(
            out,
            "{} scout  {} executor  {} undiscovered  {} discovered  {} collected  \
             {} obstacle  {} sensor",
            agent_glyph(Role::Scout),
            agent_glyph(Role::Executor),
            UNDISCOVERED,
            DISCOVERED,
            COLLECTED,
            OBSTACLE,
            SENSOR
        );
        out
    }
}

fn agent_glyph(role: Role) -> char {
    match role {
        Role::Scout => 'S',
        Role::Analyst => 'A',
        Role::Executor => 'E',
    }
}

/// Human-readable mission summary.
pub fn render_summary(result: &MissionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "MISSION SUMMARY (seed {}, {} terrain)", result.seed, result.terrain);
    let _ = writeln!(
        out,
        "  Cycles:            {} ({:?})",
        result.total_cycles, result.termination
    );
    let _ = writeln!(
        out,
        "  Targets discovered: {}/{}",
        result.stats.targets_discovered, result.total_targets
    );
    let _ = writeln!(out, "  Targets collected:  {}", result.stats.targets_collected);
    let _ = writeln!(out, "  Decisions made:     {}", result.stats.decisions_made);
    let _ = writeln!(out, "  Distance traveled:  {:.1}", result.stats.distance_traveled);
    let _ = writeln!(out, "  Messages sent:      {}", result.total_messages);
    let _ = writeln!(out, "  Mission value:      {:.1}", result.mission_value);

    if !result.samples.is_empty() {
        let _ = writeln!(out, "  Collected samples:");
        for sample in &result.samples {
            let _ = writeln!(
                out,
                "    - {} ({}) at {} - value {:.1}",
                sample.category, sample.composition, sample.position, sample.value
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_kernel::{
        AgentId, AgentView, Category, Composition, MissionStats, Obstacle, Target,
    };

    fn snapshot() -> MissionSnapshot {
        let mut collected =
            Target::new(1, Point::new(95.0, 95.0), Category::Crater, Composition::Ice, 3.0);
        collected.discovered = true;
        collected.collected = true;

        MissionSnapshot {
            cycle: 3,
            width: 100.0,
            height: 100.0,
            targets: vec![
                Target::new(0, Point::new(5.0, 5.0), Category::Rock, Composition::Basalt, 2.0),
                collected,
            ],
            obstacles: vec![Obstacle::new(Point::new(55.0, 95.0), 6.0)],
            agents: vec![
                AgentView {
                    id: AgentId::from("Scout-1"),
                    role: Role::Scout,
                    position: Some(Point::new(20.0, 20.0)),
                    sensor_range: Some(15.0),
                },
                AgentView {
                    id: AgentId::from("Analyst"),
                    role: Role::Analyst,
                    position: None,
                    sensor_range: None,
                },
                AgentView {
                    id: AgentId::from("Executor-1"),
                    role: Role::Executor,
                    position: Some(Point::new(50.0, 50.0)),
                    sensor_range: None,
                },
            ],
            stats: MissionStats::default(),
        }
    }

    #[test]
    fn test_map_places_targets_agents_and_obstacles() {
        let renderer = MapRenderer::new(10, 10);
        let map = renderer.render(&snapshot());
        let lines: Vec<&str> = map.lines().collect();

        // Border, 10 rows, border, legend
        assert_eq!(lines.len(), 13);
        let row = |r: usize| lines[r + 1].chars().skip(1).take(10).collect::<Vec<char>>();

        assert_eq!(row(9)[0], UNDISCOVERED);
        assert_eq!(row(0)[9], COLLECTED);
        assert_eq!(row(7)[2], 'S');
        assert_eq!(row(4)[5], 'E');
        assert_eq!(row(0)[5], OBSTACLE);
        assert!(!map.contains('A'));
    }

    #[test]
    fn test_sensor_footprint_only_from_sensing_agents() {
        let renderer = MapRenderer::new(10, 10);
        let map = renderer.render(&snapshot());
        let lines: Vec<&str> = map.lines().collect();
        let row = |r: usize| lines[r + 1].chars().skip(1).take(10).collect::<Vec<char>>();

        // Cell (15, 15) is inside the scout's range
        assert_eq!(row(8)[1], SENSOR);
        // Cell (45, 55) next to the executor is not
        assert_eq!(row(4)[4], EMPTY);
    }
}
