//! Tacticus raid planning engine
//!
//! Resolves upgrade recipes into farmable materials, finds the campaign
//! nodes that drop them, estimates the days and energy each deficit costs,
//! schedules daily raids under an energy budget, and splits onslaught
//! tokens across tracks.

pub mod db;
pub mod error;
pub mod estimate;
pub mod filters;
pub mod goals;
pub mod import;
pub mod locations;
pub mod models;
pub mod onslaught;
pub mod player;
pub mod raids;
pub mod recipes;
pub mod report;
pub mod sample;

pub use error::{LimitStage, PlannerError, Result};
pub use estimate::{EstimatedUpgrades, Planner, UpgradeEstimate};
pub use onslaught::{BattleKey, HsePlan, OnslaughtPlanner};
pub use player::{PlannerSettings, PlayerState};
