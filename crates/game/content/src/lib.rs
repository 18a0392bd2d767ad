//! Data-driven content definitions and loaders.
//!
//! This crate reads static match content from RON/TOML data files:
//! - Unit type catalogs (RON)
//! - Map layouts and tile triggers (RON)
//! - Scenarios: seats, starting units and scheduled system intents (RON)
//! - Game configuration (TOML)
//!
//! Content is consumed through the game-core oracles and never appears in
//! game state except through the units a scenario places.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, LoadResult, MapLoader, MatchContent, ScenarioLoader,
    ScenarioSpec, ScheduleEntry, ScheduleTrigger, ScheduledAction, SeatSpec, UnitLoader,
    UnitSpec,
};
