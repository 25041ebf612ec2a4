//! Lunar terrain generator with reproducible seeds.
//!
//! Targets are placed on integer coordinates away from the edges; obstacles
//! may sit anywhere, including on top of targets.

use anyhow::{bail, Result};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mission_kernel::{Category, Composition, LunarEnvironment, Obstacle, Point, Target};

/// Configuration for terrain generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    pub width: f64,
    pub height: f64,
    pub num_targets: usize,
    pub num_obstacles: usize,
    /// Minimum distance between a target and the map edge
    pub target_margin: i64,
    /// Target size range, `[min, max)`
    pub size_range: (f64, f64),
    /// Obstacle radius range, `[min, max)`
    pub obstacle_radius_range: (f64, f64),
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            num_targets: 20,
            num_obstacles: 15,
            target_margin: 10,
            size_range: (1.0, 10.0),
            obstacle_radius_range: (3.0, 8.0),
        }
    }
}

/// Terrain presets for runs and batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainPreset {
    /// 10 targets, 5 obstacles
    Sparse,
    /// 20 targets, 15 obstacles
    Standard,
    /// 20 targets, 30 obstacles
    Rugged,
}

impl TerrainPreset {
    pub fn config(self) -> TerrainConfig {
        match self {
            TerrainPreset::Sparse => TerrainConfig {
                num_targets: 10,
                num_obstacles: 5,
                ..TerrainConfig::default()
            },
            TerrainPreset::Standard => TerrainConfig::default(),
            TerrainPreset::Rugged => TerrainConfig {
                num_obstacles: 30,
                ..TerrainConfig::default()
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TerrainPreset::Sparse => "sparse",
            TerrainPreset::Standard => "standard",
            TerrainPreset::Rugged => "rugged",
        }
    }
}

/// Seeded terrain generator.
pub struct TerrainGenerator {
    config: TerrainConfig,
}

impl TerrainGenerator {
    pub fn new(config: TerrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Generate a fresh environment. The same seed always yields the same terrain.
    pub fn generate(&self, seed: u64) -> Result<LunarEnvironment> {
        let config = &self.config;
        let max_x = config.width as i64 - config.target_margin;
        let max_y = config.height as i64 - config.target_margin;
        if config.target_margin > max_x || config.target_margin > max_y {
            bail!(
                "Terrain {}x{} is too small for a target margin of {}",
                config.width,
                config.height,
                config.target_margin
            );
        }
        if config.size_range.0 >= config.size_range.1
            || config.obstacle_radius_range.0 >= config.obstacle_radius_range.1
        {
            bail!("Size and radius ranges must be non-empty");
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let targets: Vec<Target> = (0..config.num_targets)
            .map(|id| {
                let position = Point::new(
                    rng.random_range(config.target_margin..=max_x) as f64,
                    rng.random_range(config.target_margin..=max_y) as f64,
                );
                let category = *Category::KNOWN.choose(&mut rng).unwrap_or(&Category::Rock);
                let size = rng.random_range(config.size_range.0..config.size_range.1);
                let composition = *Composition::KNOWN
                    .choose(&mut rng)
                    .unwrap_or(&Composition::Regolith);
                Target::new(id, position, category, composition, size)
            })
            .collect();

        let obstacles: Vec<Obstacle> = (0..config.num_obstacles)
            .map(|_| {
                let position = Point::new(
                    rng.random_range(0..=config.width as i64) as f64,
                    rng.random_range(0..=config.height as i64) as f64,
                );
                let (min_radius, max_radius) = config.obstacle_radius_range;
                let radius = rng.random_range(min_radius..max_radius);
                Obstacle::new(position, radius)
            })
            .collect();

        debug!(
            seed,
            targets = targets.len(),
            obstacles = obstacles.len(),
            "Generated terrain"
        );

        Ok(LunarEnvironment::new(
            config.width,
            config.height,
            targets,
            obstacles,
        ))
    }
}
