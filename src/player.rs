//! Player snapshot and planner settings
//!
//! Everything here is read from the player's JSON file and never written
//! back; the planner treats it as an immutable snapshot.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::goals::Goal;
use crate::models::{Alliance, CampaignType, Rarity, shard_material_id};
use crate::recipes::Inventory;

/// Iteration ceiling used by the estimator and the scheduler
pub const DEFAULT_ITERATION_LIMIT: usize = 1000;
/// Maximum number of least-time refinement passes
pub const DEFAULT_REFINEMENT_PASSES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FarmStrategy {
    #[default]
    LeastEnergy,
    LeastTime,
    Custom,
}

/// Optional location filters; an empty dimension accepts everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RaidFilters {
    pub enemies_min_count: Option<u32>,
    pub enemies_max_count: Option<u32>,
    pub enemies_types: Vec<String>,
    pub slots_count: Vec<u8>,
    pub upgrades_rarity: Vec<Rarity>,
    pub campaign_types: Vec<CampaignType>,
    pub allies_alliance: Vec<Alliance>,
    pub allies_factions: Vec<String>,
    pub enemies_alliance: Vec<Alliance>,
    pub enemies_factions: Vec<String>,
}

impl RaidFilters {
    pub fn is_empty(&self) -> bool {
        self.enemies_min_count.is_none()
            && self.enemies_max_count.is_none()
            && self.enemies_types.is_empty()
            && self.slots_count.is_empty()
            && self.upgrades_rarity.is_empty()
            && self.campaign_types.is_empty()
            && self.allies_alliance.is_empty()
            && self.allies_factions.is_empty()
            && self.enemies_alliance.is_empty()
            && self.enemies_factions.is_empty()
    }
}

/// Raids already performed today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedLocation {
    pub location_id: String,
    pub material: String,
    pub raids_count: u32,
    pub energy_spent: u32,
    #[serde(default)]
    pub farmed_items: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerSettings {
    pub daily_energy: u32,
    pub strategy: FarmStrategy,
    /// Campaign types farmed per material rarity under the custom strategy
    pub custom_campaign_types: BTreeMap<Rarity, Vec<CampaignType>>,
    pub filters: RaidFilters,
    pub selected_campaign_event: Option<String>,
    pub use_priority_order: bool,
    pub iteration_limit: usize,
    pub refinement_pass_limit: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            daily_energy: 288,
            strategy: FarmStrategy::default(),
            custom_campaign_types: BTreeMap::new(),
            filters: RaidFilters::default(),
            selected_campaign_event: None,
            use_priority_order: false,
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            refinement_pass_limit: DEFAULT_REFINEMENT_PASSES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub rank: u8,
    #[serde(default)]
    pub stars: u8,
    #[serde(default)]
    pub shards: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub inventory: HashMap<String, u32>,
    /// Campaign id -> highest node cleared
    pub campaign_progress: HashMap<String, u32>,
    pub roster: Vec<RosterEntry>,
    pub goals: Vec<Goal>,
    pub completed_locations: Vec<CompletedLocation>,
    pub settings: PlannerSettings,
}

impl PlayerState {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Inventory with roster shards folded in under their shard material ids.
    /// The larger of the two counts wins when both are present.
    pub fn working_inventory(&self) -> Inventory {
        let mut inventory = self.inventory.clone();
        for entry in &self.roster {
            if entry.shards > 0 {
                let count = inventory.entry(shard_material_id(&entry.id)).or_default();
                *count = (*count).max(entry.shards);
            }
        }
        inventory
    }

    pub fn roster_entry(&self, unit_id: &str) -> Option<&RosterEntry> {
        self.roster.iter().find(|r| r.id == unit_id)
    }
}
