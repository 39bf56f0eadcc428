//! Player goals and their expansion into top-level requirements

use std::collections::BTreeMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::models::{Rarity, StaticData, shard_material_id};
use crate::player::PlayerState;

pub const RANK_NAMES: [&str; 20] = [
    "Locked",
    "Stone I",
    "Stone II",
    "Stone III",
    "Iron I",
    "Iron II",
    "Iron III",
    "Bronze I",
    "Bronze II",
    "Bronze III",
    "Silver I",
    "Silver II",
    "Silver III",
    "Gold I",
    "Gold II",
    "Gold III",
    "Diamond I",
    "Diamond II",
    "Diamond III",
    "Adamantine I",
];

pub const MAX_RANK: u8 = 19;

/// Shards needed to go from `stars` to `stars + 1`, indexed by `stars`
pub const STAR_SHARD_COSTS: [u32; 14] =
    [10, 15, 15, 15, 20, 30, 40, 50, 65, 85, 100, 100, 125, 150];

pub fn rank_name(rank: u8) -> &'static str {
    RANK_NAMES.get(rank as usize).copied().unwrap_or("Unknown")
}

pub fn unlock_shards(rarity: Rarity) -> u32 {
    match rarity {
        Rarity::Common => 40,
        Rarity::Uncommon => 80,
        Rarity::Rare => 130,
        Rarity::Epic => 250,
        Rarity::Legendary | Rarity::Mythic => 500,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Goal {
    UpgradeRank {
        goal_id: String,
        unit_id: String,
        #[serde(default)]
        priority: u32,
        rank_start: u8,
        rank_end: u8,
        #[serde(default)]
        rank_point5: bool,
        #[serde(default)]
        applied_upgrades: Vec<String>,
    },
    Ascend {
        goal_id: String,
        unit_id: String,
        #[serde(default)]
        priority: u32,
        stars_start: u8,
        stars_end: u8,
    },
    Unlock {
        goal_id: String,
        unit_id: String,
        #[serde(default)]
        priority: u32,
    },
    MowAbilities {
        goal_id: String,
        unit_id: String,
        #[serde(default)]
        priority: u32,
        primary_start: u32,
        primary_end: u32,
        secondary_start: u32,
        secondary_end: u32,
    },
    CharacterAbilities {
        goal_id: String,
        unit_id: String,
        #[serde(default)]
        priority: u32,
        active_start: u32,
        active_end: u32,
        passive_start: u32,
        passive_end: u32,
    },
}

impl Goal {
    pub fn goal_id(&self) -> &str {
        match self {
            Goal::UpgradeRank { goal_id, .. }
            | Goal::Ascend { goal_id, .. }
            | Goal::Unlock { goal_id, .. }
            | Goal::MowAbilities { goal_id, .. }
            | Goal::CharacterAbilities { goal_id, .. } => goal_id,
        }
    }

    pub fn unit_id(&self) -> &str {
        match self {
            Goal::UpgradeRank { unit_id, .. }
            | Goal::Ascend { unit_id, .. }
            | Goal::Unlock { unit_id, .. }
            | Goal::MowAbilities { unit_id, .. }
            | Goal::CharacterAbilities { unit_id, .. } => unit_id,
        }
    }

    pub fn priority(&self) -> u32 {
        match self {
            Goal::UpgradeRank { priority, .. }
            | Goal::Ascend { priority, .. }
            | Goal::Unlock { priority, .. }
            | Goal::MowAbilities { priority, .. }
            | Goal::CharacterAbilities { priority, .. } => *priority,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Goal::UpgradeRank { .. } => "rank",
            Goal::Ascend { .. } => "ascend",
            Goal::Unlock { .. } => "unlock",
            Goal::MowAbilities { .. } => "mow abilities",
            Goal::CharacterAbilities { .. } => "abilities",
        }
    }
}

/// Costs that are not farmed in campaign raids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceCost {
    pub gold: u64,
    pub badges: BTreeMap<Rarity, u32>,
    pub components: u32,
    pub salvage: u32,
}

impl ResourceCost {
    pub fn add(&mut self, other: &ResourceCost) {
        self.gold += other.gold;
        for (rarity, count) in &other.badges {
            *self.badges.entry(*rarity).or_default() += count;
        }
        self.components += other.components;
        self.salvage += other.salvage;
    }

    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.badges.is_empty() && self.components == 0 && self.salvage == 0
    }
}

/// What a single goal asks for before recipe expansion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalRequirements {
    pub goal_id: String,
    pub unit_id: String,
    /// Top-level upgrades, one entry per requirement
    pub upgrades: Vec<(String, u32)>,
    /// Shard material and count, bypassing recipes
    pub shards: Option<(String, u32)>,
    pub cost: ResourceCost,
}

fn invalid(goal: &Goal, reason: impl Into<String>) -> PlannerError {
    PlannerError::InvalidGoal {
        goal_id: goal.goal_id().to_string(),
        reason: reason.into(),
    }
}

/// Expand a goal into its upgrade, shard and resource requirements
pub fn expand_goal(
    data: &StaticData,
    player: &PlayerState,
    goal: &Goal,
) -> Result<GoalRequirements> {
    let unit = data
        .units
        .get(goal.unit_id())
        .ok_or_else(|| PlannerError::UnknownUnit(goal.unit_id().to_string()))?;

    let mut requirements = GoalRequirements {
        goal_id: goal.goal_id().to_string(),
        unit_id: unit.id.clone(),
        ..Default::default()
    };

    match goal {
        Goal::UpgradeRank {
            rank_start,
            rank_end,
            rank_point5,
            applied_upgrades,
            ..
        } => {
            if rank_start > rank_end {
                return Err(invalid(goal, format!("rank {} is above {}", rank_start, rank_end)));
            }
            if *rank_end > MAX_RANK {
                return Err(invalid(goal, format!("rank {} does not exist", rank_end)));
            }
            let Some(ranks) = data.rank_upgrades.get(&unit.id) else {
                warn!("No rank upgrades known for {}", unit.id);
                return Ok(requirements);
            };

            for rank in *rank_start..*rank_end {
                let upgrades = ranks.get(&rank).map(Vec::as_slice).unwrap_or(&[]);
                for upgrade in upgrades {
                    if rank == *rank_start && applied_upgrades.contains(upgrade) {
                        continue;
                    }
                    requirements.upgrades.push((upgrade.clone(), 1));
                }
            }
            if *rank_point5 {
                if let Some(upgrades) = ranks.get(rank_end) {
                    for upgrade in upgrades.iter().take(3) {
                        requirements.upgrades.push((upgrade.clone(), 1));
                    }
                }
            }
        }

        Goal::Ascend {
            stars_start,
            stars_end,
            ..
        } => {
            if stars_start > stars_end {
                return Err(invalid(goal, format!("stars {} are above {}", stars_start, stars_end)));
            }
            if *stars_end as usize > STAR_SHARD_COSTS.len() {
                return Err(invalid(goal, format!("{} stars do not exist", stars_end)));
            }
            let shards: u32 = STAR_SHARD_COSTS[*stars_start as usize..*stars_end as usize]
                .iter()
                .sum();
            requirements.shards = Some((shard_material_id(&unit.id), shards));
        }

        Goal::Unlock { .. } => {
            if player.roster_entry(&unit.id).is_some_and(|r| r.unlocked) {
                info!("{} is already unlocked", unit.name);
                return Ok(requirements);
            }
            requirements.shards = Some((shard_material_id(&unit.id), unlock_shards(unit.rarity)));
        }

        Goal::CharacterAbilities {
            active_start,
            active_end,
            passive_start,
            passive_end,
            ..
        } => {
            if active_start > active_end || passive_start > passive_end {
                return Err(invalid(goal, "ability start level is above end level"));
            }
            for (start, end) in [(*active_start, *active_end), (*passive_start, *passive_end)] {
                for level in data
                    .ability_levels
                    .iter()
                    .filter(|l| l.level > start && l.level <= end)
                {
                    requirements.cost.gold += level.gold as u64;
                    *requirements
                        .cost
                        .badges
                        .entry(level.badge_rarity)
                        .or_default() += level.badges;
                }
            }
        }

        Goal::MowAbilities {
            primary_start,
            primary_end,
            secondary_start,
            secondary_end,
            ..
        } => {
            if !unit.is_mow {
                return Err(invalid(goal, format!("{} is not a machine of war", unit.name)));
            }
            if primary_start > primary_end || secondary_start > secondary_end {
                return Err(invalid(goal, "ability start level is above end level"));
            }
            let levels = data.mow_levels.get(&unit.id).map(Vec::as_slice).unwrap_or(&[]);
            if levels.is_empty() {
                warn!("No machine of war levels known for {}", unit.id);
            }

            for level in levels {
                let primary = level.level > *primary_start && level.level <= *primary_end;
                let secondary = level.level > *secondary_start && level.level <= *secondary_end;
                for (active, upgrades) in [
                    (primary, &level.primary_upgrades),
                    (secondary, &level.secondary_upgrades),
                ] {
                    if !active {
                        continue;
                    }
                    requirements.cost.gold += level.gold as u64;
                    requirements.cost.components += level.components;
                    requirements.cost.salvage += level.salvage;
                    *requirements
                        .cost
                        .badges
                        .entry(level.badge_rarity)
                        .or_default() += level.badges;
                    requirements
                        .upgrades
                        .extend(upgrades.iter().map(|u| (u.clone(), 1)));
                }
            }
        }
    }

    Ok(requirements)
}
