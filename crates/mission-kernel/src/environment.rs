//! In-memory lunar surface implementing [`World`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::world::{Obstacle, Target, TargetId, World};

/// The lunar surface: a bounded rectangle holding targets and obstacles.
///
/// Status changes only through `discover_target` and `collect_target`.
/// Collecting a target that was never discovered records the discovery as
/// well, so a collected target is always discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LunarEnvironment {
    width: f64,
    height: f64,
    targets: Vec<Target>,
    obstacles: Vec<Obstacle>,
    discovered_targets: Vec<TargetId>,
    collected_targets: Vec<TargetId>,
}

impl LunarEnvironment {
    /// Create an environment from pre-placed targets and obstacles.
    ///
    /// Status flags already set on `targets` are carried into the
    /// discovered/collected lists.
    pub fn new(width: f64, height: f64, targets: Vec<Target>, obstacles: Vec<Obstacle>) -> Self {
        let discovered_targets = targets
            .iter()
            .filter(|t| t.discovered || t.collected)
            .map(|t| t.id)
            .collect();
        let collected_targets = targets.iter().filter(|t| t.collected).map(|t| t.id).collect();
        let mut targets = targets;
        for target in targets.iter_mut().filter(|t| t.collected) {
            target.discovered = true;
        }

        Self {
            width,
            height,
            targets,
            obstacles,
            discovered_targets,
            collected_targets,
        }
    }

    fn target_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.targets.iter_mut().find(|target| target.id == id)
    }
}

impl World for LunarEnvironment {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn targets(&self) -> &[Target] {
        &self.targets
    }

    fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    fn discovered_targets(&self) -> &[TargetId] {
        &self.discovered_targets
    }

    fn collected_targets(&self) -> &[TargetId] {
        &self.collected_targets
    }

    fn discover_target(&mut self, id: TargetId) -> Option<Target> {
        let Some(target) = self.target_mut(id) else {
            trace!(target_id = id, "discover: unknown target id");
            return None;
        };
        target.discovered = true;
        let snapshot = target.clone();

        if !self.discovered_targets.contains(&id) {
            self.discovered_targets.push(id);
            debug!(target_id = id, "Target discovered");
        }
        Some(snapshot)
    }

    fn collect_target(&mut self, id: TargetId) -> bool {
        let Some(target) = self.target_mut(id) else {
            trace!(target_id = id, "collect: unknown target id");
            return false;
        };
        if target.collected {
            trace!(target_id = id, "collect: already collected");
            return false;
        }
        target.collected = true;
        target.discovered = true;

        if !self.discovered_targets.contains(&id) {
            self.discovered_targets.push(id);
        }
        self.collected_targets.push(id);
        debug!(target_id = id, "Target collected");
        true
    }
}
