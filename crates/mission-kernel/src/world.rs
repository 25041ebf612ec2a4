//! World model: the spatial state the agents observe and mutate.
//!
//! The coordination core consumes the environment only through the
//! [`World`] trait. Agents query proximity and obstacles, and mutate
//! target status through exactly two entry points: `discover_target` and
//! `collect_target`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a target, unique within one environment.
pub type TargetId = usize;

/// A position on the lunar surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// This point shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Geological category of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Rock,
    Crater,
    Anomaly,
    /// Any category this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl Category {
    /// Categories placed by terrain generation.
    pub const KNOWN: [Category; 3] = [Category::Rock, Category::Crater, Category::Anomaly];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Crater => "crater",
            Self::Anomaly => "anomaly",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mineral composition of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composition {
    Basalt,
    Anorthosite,
    Regolith,
    Ice,
    /// Any composition this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl Composition {
    /// Compositions placed by terrain generation.
    pub const KNOWN: [Composition; 4] = [
        Composition::Basalt,
        Composition::Anorthosite,
        Composition::Regolith,
        Composition::Ice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Basalt => "basalt",
            Self::Anorthosite => "anorthosite",
            Self::Regolith => "regolith",
            Self::Ice => "ice",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A discoverable, collectable point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub position: Point,
    pub category: Category,
    pub composition: Composition,
    /// Sample size, 1.0 to 10.0
    pub size: f64,
    pub discovered: bool,
    pub collected: bool,
}

impl Target {
    /// Create an undiscovered, uncollected target.
    pub fn new(
        id: TargetId,
        position: Point,
        category: Category,
        composition: Composition,
        size: f64,
    ) -> Self {
        Self {
            id,
            position,
            category,
            composition,
            size,
            discovered: false,
            collected: false,
        }
    }
}

/// A circular no-go zone. Immutable once generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Point,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(position: Point, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Whether `point` lies strictly inside this obstacle.
    pub fn blocks(&self, point: Point) -> bool {
        self.position.distance_to(point) < self.radius
    }
}

/// The environment surface consumed by agents and the coordinator.
///
/// Invalid target ids are not faults: `discover_target` returns `None` and
/// `collect_target` returns `false`, and callers treat that as "nothing
/// happened".
pub trait World: Send + Sync {
    fn width(&self) -> f64;

    fn height(&self) -> f64;

    fn targets(&self) -> &[Target];

    fn obstacles(&self) -> &[Obstacle];

    /// Ids of discovered targets, in discovery order, without duplicates.
    fn discovered_targets(&self) -> &[TargetId];

    /// Ids of collected targets, in collection order, without duplicates.
    fn collected_targets(&self) -> &[TargetId];

    /// Mark a target as discovered and return its current state.
    fn discover_target(&mut self, id: TargetId) -> Option<Target>;

    /// Collect a target.
    ///
    /// Returns `true` only for the first successful collection of a valid id.
    fn collect_target(&mut self, id: TargetId) -> bool;

    /// Whether `point` lies outside every obstacle.
    fn is_obstacle_free(&self, point: Point) -> bool {
        self.obstacles().iter().all(|obstacle| !obstacle.blocks(point))
    }

    /// All targets whose centre lies within `radius` of `point`, discovered or not.
    fn nearby_targets(&self, point: Point, radius: f64) -> Vec<Target> {
        self.targets()
            .iter()
            .filter(|target| target.position.distance_to(point) <= radius)
            .cloned()
            .collect()
    }

    /// Whether `point` lies within `[0, width) x [0, height)`.
    fn in_bounds(&self, point: Point) -> bool {
        (0.0..self.width()).contains(&point.x) && (0.0..self.height()).contains(&point.y)
    }

    fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets().iter().find(|target| target.id == id)
    }
}
