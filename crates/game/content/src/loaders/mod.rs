//! Content loaders for reading game data from files.
//!
//! Each loader turns one RON/TOML file into the game-core type that consumes
//! it. [`ContentFactory`] knows the data directory layout.

pub mod config;
pub mod factory;
pub mod map;
pub mod scenario;
pub mod units;

pub use config::ConfigLoader;
pub use factory::{ContentFactory, MatchContent};
pub use map::MapLoader;
pub use scenario::{
    ScenarioLoader, ScenarioSpec, ScheduleEntry, ScheduleTrigger, ScheduledAction, SeatSpec,
    UnitSpec,
};
pub use units::UnitLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
