//! Campaign location index
//!
//! Derives, for every battle node and every material it can drop, the drop
//! rate and the energy needed per item, and groups the results by material
//! and by campaign.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::models::{Alliance, BattleDef, CampaignDef, CampaignType};

/// A battle node as a farming source for one material
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: String,
    pub material: String,
    pub campaign: String,
    pub campaign_type: CampaignType,
    pub campaign_event: Option<String>,
    pub node_number: u32,
    pub energy_cost: u32,
    pub daily_battle_count: u32,
    pub drop_rate: f64,
    pub energy_per_item: f64,
    pub items_per_day: f64,
    pub slots: Option<u8>,
    pub enemies_total: Option<u32>,
    pub enemies_factions: Vec<String>,
    pub enemies_alliances: Vec<Alliance>,
    pub enemies_types: Vec<String>,
    pub ally_faction: Option<String>,
    pub ally_alliance: Option<Alliance>,

    // Per planning session
    pub is_unlocked: bool,
    pub is_pass_filter: bool,
    pub is_completed: bool,
    pub is_started: bool,
    pub is_suggested: bool,
}

impl Location {
    /// Energy spent when every daily attempt is used
    pub fn daily_energy(&self) -> u32 {
        self.daily_battle_count * self.energy_cost
    }

    /// Expected items from one attempt
    pub fn items_per_raid(&self) -> f64 {
        self.energy_cost as f64 / self.energy_per_item
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Chance per attempt that a battle yields `material`
pub fn drop_rate(battle: &BattleDef, material: &str) -> f64 {
    let guaranteed = battle
        .rewards
        .guaranteed
        .iter()
        .filter(|r| r.id == material)
        .count() as f64;
    let potential: f64 = battle
        .rewards
        .potential
        .iter()
        .filter(|r| r.id == material)
        .map(|r| r.effective_rate)
        .sum();

    let rate = round_to(guaranteed + potential, 3);
    if rate.is_nan() { 0.0 } else { rate }
}

/// Average energy spent per item; zero when the item never drops
pub fn energy_per_item(energy_cost: u32, drop_rate: f64) -> f64 {
    let epi = round_to(1.0 / (drop_rate / energy_cost as f64), 2);
    if epi.is_finite() { epi } else { 0.0 }
}

/// Build the farming location for one (battle, material) pair, or None when
/// the node cannot be raided for it.
pub fn location_for(
    battle: &BattleDef,
    campaign: Option<&CampaignDef>,
    material: &str,
) -> Option<Location> {
    if battle.energy_cost == 0 {
        return None;
    }
    let drop_rate = drop_rate(battle, material);
    let energy_per_item = energy_per_item(battle.energy_cost, drop_rate);
    if drop_rate <= 0.0 || energy_per_item <= 0.0 {
        return None;
    }

    Some(Location {
        id: battle.id.clone(),
        material: material.to_string(),
        campaign: battle.campaign.clone(),
        campaign_type: battle.campaign_type,
        campaign_event: campaign.and_then(|c| c.event.clone()),
        node_number: battle.node_number,
        energy_cost: battle.energy_cost,
        daily_battle_count: battle.daily_battle_count,
        drop_rate,
        energy_per_item,
        items_per_day: battle.daily_battle_count as f64 * battle.energy_cost as f64
            / energy_per_item,
        slots: battle.slots,
        enemies_total: battle.enemies_total,
        enemies_factions: battle.enemies_factions.clone(),
        enemies_alliances: battle.enemies_alliances.clone(),
        enemies_types: battle.enemies_types.clone(),
        ally_faction: campaign.map(|c| c.ally_faction.clone()),
        ally_alliance: campaign.map(|c| c.ally_alliance),
        is_unlocked: false,
        is_pass_filter: false,
        is_completed: false,
        is_started: false,
        is_suggested: false,
    })
}

/// Farming locations grouped by material and by campaign
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    by_material: HashMap<String, Vec<Location>>,
    by_campaign: BTreeMap<String, Vec<String>>,
}

impl LocationIndex {
    pub fn build(battles: &[BattleDef], campaigns: &HashMap<String, CampaignDef>) -> Self {
        let mut index = LocationIndex::default();

        for battle in battles {
            if battle.energy_cost == 0 {
                debug!("Skipping non-raidable node {}", battle.id);
                continue;
            }
            let campaign = campaigns.get(&battle.campaign);

            let mut materials: Vec<&str> = battle
                .rewards
                .guaranteed
                .iter()
                .map(|r| r.id.as_str())
                .chain(battle.rewards.potential.iter().map(|r| r.id.as_str()))
                .collect();
            materials.sort_unstable();
            materials.dedup();

            for material in materials {
                if let Some(location) = location_for(battle, campaign, material) {
                    index
                        .by_material
                        .entry(material.to_string())
                        .or_default()
                        .push(location);
                }
            }

            let ids = index.by_campaign.entry(battle.campaign.clone()).or_default();
            if !ids.contains(&battle.id) {
                ids.push(battle.id.clone());
            }
        }

        for locations in index.by_material.values_mut() {
            locations.sort_by(|a, b| {
                a.energy_per_item
                    .total_cmp(&b.energy_per_item)
                    .then(b.node_number.cmp(&a.node_number))
                    .then(a.id.cmp(&b.id))
            });
        }

        index
    }

    /// Locations dropping `material`, most efficient first
    pub fn for_material(&self, material: &str) -> &[Location] {
        self.by_material.get(material).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Battle ids per campaign
    pub fn campaigns(&self) -> &BTreeMap<String, Vec<String>> {
        &self.by_campaign
    }

    pub fn material_count(&self) -> usize {
        self.by_material.len()
    }
}
