//! Lunar Mission CLI.
//!
//! Commands:
//! - run: Run a single mission and print the map and summary
//! - batch: Run seeded missions and save aggregate results
//! - generate: Generate and display terrain

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lunar_mission::experiment::{MissionRunner, MissionRunnerConfig};
use lunar_mission::generator::{TerrainGenerator, TerrainPreset};
use lunar_mission::render::{render_summary, MapRenderer};
use mission_kernel::{MissionConfig, World};

/// Generate a timestamped output path from the given path.
/// e.g., "batch.json" -> "batch-20260108-010530.json"
fn timestamped_path(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("batch");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("json");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}-{}.{}", stem, timestamp, ext))
}

#[derive(Parser)]
#[command(name = "lunar-mission")]
#[command(version)]
#[command(about = "Autonomous lunar exploration with scout, analyst and executor agents")]
struct Cli {
    /// Mission configuration file (JSON). Missing fields use defaults.
    #[arg(long, env = "LUNAR_MISSION_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Terrain preset: sparse, standard, rugged
    #[arg(long, default_value = "standard", global = true)]
    terrain: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single mission
    Run {
        /// Terrain seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum cycles (overrides the config file)
        #[arg(long)]
        max_cycles: Option<usize>,

        /// Pause between cycles in milliseconds
        #[arg(long, default_value = "0")]
        delay_ms: u64,

        /// Write the mission result to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip the final map
        #[arg(long)]
        no_map: bool,
    },

    /// Run a batch of seeded missions
    Batch {
        /// Number of missions
        #[arg(long, default_value = "10")]
        trials: usize,

        /// Seed of the first mission; later missions count up from it
        #[arg(long, default_value = "0")]
        base_seed: u64,

        /// Maximum cycles (overrides the config file)
        #[arg(long)]
        max_cycles: Option<usize>,

        /// Output file for results
        #[arg(long, default_value = "batch.json")]
        output: PathBuf,
    },

    /// Generate and display terrain
    Generate {
        /// Terrain seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let preset = parse_preset(&cli.terrain)?;
    let mission = match &cli.config {
        Some(path) => MissionConfig::load(path)?,
        None => MissionConfig::default(),
    };

    match cli.command {
        Commands::Run {
            seed,
            max_cycles,
            delay_ms,
            output,
            no_map,
        } => {
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let mut config = MissionRunnerConfig {
                mission,
                terrain: preset,
                cycle_delay: Duration::from_millis(delay_ms),
            };
            if let Some(max_cycles) = max_cycles {
                config.mission.termination.max_cycles = max_cycles;
            }

            let runner = MissionRunner::new(config);
            let run = runner.run(seed).await?;

            if !no_map {
                println!("\n=== Final Surface (cycle {}) ===", run.snapshot.cycle);
                print!("{}", MapRenderer::default().render(&run.snapshot));
            }
            println!();
            print!("{}", render_summary(&run.result));

            if let Some(path) = output {
                run.result.save(&path)?;
                println!("\nResult saved to: {}", path.display());
            }
        }

        Commands::Batch {
            trials,
            base_seed,
            max_cycles,
            output,
        } => {
            info!(trials, base_seed, terrain = preset.name(), "Starting batch");

            let mut config = MissionRunnerConfig {
                mission,
                terrain: preset,
                ..Default::default()
            };
            if let Some(max_cycles) = max_cycles {
                config.mission.termination.max_cycles = max_cycles;
            }

            let runner = MissionRunner::new(config);
            let results = runner.run_batch(trials, base_seed).await?;

            let output_path = timestamped_path(&output);
            results.save(&output_path)?;

            println!("\n=== Batch Complete ===");
            println!("Results saved to: {}", output_path.display());
            if let Some(summary) = &results.summary {
                println!("\nSummary:");
                println!(
                    "  success_rate={:.1}% (95% CI {:.1}%-{:.1}%)",
                    summary.success_rate * 100.0,
                    summary.success_rate_ci.0 * 100.0,
                    summary.success_rate_ci.1 * 100.0
                );
                println!("  avg_cycles={:.1}", summary.avg_cycles);
                println!("  avg_collected={:.1}", summary.avg_collected);
                println!("  avg_value={:.1}", summary.avg_value);
            }
        }

        Commands::Generate { seed } => {
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let runner = MissionRunner::new(MissionRunnerConfig {
                mission,
                terrain: preset,
                ..Default::default()
            });
            let environment = TerrainGenerator::new(preset.config()).generate(seed)?;

            println!("Seed: {}", seed);
            println!(
                "Terrain: {} ({}x{})",
                preset.name(),
                environment.width(),
                environment.height()
            );
            println!("\nTargets:");
            for target in environment.targets() {
                println!(
                    "  #{:<3} {:<8} {:<12} size {:>4.1} at {}",
                    target.id, target.category, target.composition, target.size, target.position
                );
            }
            println!("Obstacles: {}", environment.obstacles().len());

            let coordinator = runner.build_with(environment, seed)?;
            print!("{}", MapRenderer::default().render(&coordinator.snapshot()));
        }
    }

    Ok(())
}

fn parse_preset(s: &str) -> Result<TerrainPreset> {
    match s.to_lowercase().as_str() {
        "sparse" => Ok(TerrainPreset::Sparse),
        "standard" | "std" => Ok(TerrainPreset::Standard),
        "rugged" => Ok(TerrainPreset::Rugged),
        _ => anyhow::bail!("Unknown terrain: {}. Valid: sparse, standard, rugged", s),
    }
}
