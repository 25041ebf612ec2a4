//! The three mission agents.
//!
//! ```text
//! Scout ── TARGET_DISCOVERED ──► Analyst ── COLLECT_TARGET ──► Executor
//!                                                                 │
//!                                        ALL ◄── TARGET_COLLECTED ┘
//! ```
//!
//! Every agent owns its state outright; the only shared state is the world,
//! mutated through `discover_target` (Scout) and `collect_target` (Executor).

mod analyst;
mod executor;
mod scout;

pub use analyst::{category_score, composition_score, score_target, Analyst};
pub use executor::Executor;
pub use scout::{GridCell, Scout};
