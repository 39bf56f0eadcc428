//! Daily raid scheduling
//!
//! Spreads a fixed daily energy budget over the suggested locations of every
//! unfinished material, hardest material first, producing one plan per day
//! until every material's energy is spent.

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::{LimitStage, PlannerError, Result};
use crate::estimate::UpgradeEstimate;
use crate::locations::Location;
use crate::models::{CampaignType, Rarity};
use crate::player::{CompletedLocation, PlannerSettings};

/// At or below this daily budget nothing is scheduled
pub const MIN_DAILY_ENERGY: u32 = 10;
/// No raid costs less than this
pub const MIN_RAID_ENERGY: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RaidLocation {
    pub location_id: String,
    pub campaign: String,
    pub campaign_type: CampaignType,
    pub node_number: u32,
    pub raids_count: u32,
    pub energy_spent: u32,
    pub farmed_items: f64,
    pub is_completed: bool, // already raided before planning
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRaid {
    pub material: String,
    pub label: String,
    pub rarity: Rarity,
    pub locations: Vec<RaidLocation>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaidPlanDay {
    pub raids: Vec<MaterialRaid>,
    pub energy_total: u32,
    pub raids_total: u32,
}

impl RaidPlanDay {
    fn push(&mut self, material: &str, label: &str, rarity: Rarity, raid: RaidLocation) {
        self.energy_total += raid.energy_spent;
        self.raids_total += raid.raids_count;

        if let Some(entry) = self.raids.iter_mut().find(|r| r.material == material) {
            entry.locations.push(raid);
        } else {
            self.raids.push(MaterialRaid {
                material: material.to_string(),
                label: label.to_string(),
                rarity,
                locations: vec![raid],
            });
        }
    }

    /// Raids scheduled for `material` on this day
    pub fn raids_for(&self, material: &str) -> u32 {
        self.raids
            .iter()
            .filter(|r| r.material == material)
            .flat_map(|r| &r.locations)
            .filter(|l| !l.is_completed)
            .map(|l| l.raids_count)
            .sum()
    }

    /// Energy scheduled for `material` on this day
    pub fn energy_for(&self, material: &str) -> u32 {
        self.raids
            .iter()
            .filter(|r| r.material == material)
            .flat_map(|r| &r.locations)
            .filter(|l| !l.is_completed)
            .map(|l| l.energy_spent)
            .sum()
    }
}

struct MaterialWork<'a> {
    estimate: &'a UpgradeEstimate,
    energy_left: u32,
    locations: Vec<&'a Location>,
}

impl MaterialWork<'_> {
    fn can_progress(&self) -> bool {
        self.locations
            .iter()
            .map(|l| l.energy_cost)
            .min()
            .is_some_and(|cheapest| self.energy_left >= cheapest)
    }
}

fn active_ids(active: &[MaterialWork]) -> String {
    active
        .iter()
        .map(|w| w.estimate.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the day-by-day raid plan for `estimates`, in the order given.
///
/// Raids in `completed` are attached to the first day and their energy taken
/// from its budget. Fails when the plan needs more days than
/// `settings.iteration_limit`, or when a day passes with no raid that fits.
pub fn generate_daily_raids(
    settings: &PlannerSettings,
    completed: &[CompletedLocation],
    estimates: &[UpgradeEstimate],
) -> Result<Vec<RaidPlanDay>> {
    match schedule_daily_raids(settings, completed, estimates) {
        (days, None) => Ok(days),
        (_, Some(err)) => Err(err),
    }
}

/// Like [`generate_daily_raids`] but keeps the days planned before a limit was hit
pub(crate) fn schedule_daily_raids(
    settings: &PlannerSettings,
    completed: &[CompletedLocation],
    estimates: &[UpgradeEstimate],
) -> (Vec<RaidPlanDay>, Option<PlannerError>) {
    let mut days = Vec::new();
    if settings.daily_energy <= MIN_DAILY_ENERGY {
        return (days, None);
    }

    let mut active: Vec<MaterialWork> = estimates
        .iter()
        .filter(|e| !e.is_finished && !e.is_blocked && e.energy_left > 0)
        .map(|e| MaterialWork {
            estimate: e,
            energy_left: e.energy_left,
            locations: e.locations.iter().filter(|l| l.is_suggested).collect(),
        })
        .filter(MaterialWork::can_progress)
        .collect();

    let mut day_index = 0;
    while !active.is_empty() {
        if day_index >= settings.iteration_limit {
            let subject = active_ids(&active);
            warn!("Raid schedule stopped after {} days with {} unfinished", day_index, subject);
            let err = PlannerError::IterationLimit {
                stage: LimitStage::Schedule,
                subject,
                limit: settings.iteration_limit,
            };
            return (days, Some(err));
        }

        let mut day = RaidPlanDay::default();
        let mut energy_left = settings.daily_energy;
        let mut attempts_used: HashMap<&str, u32> = HashMap::new();

        if day_index == 0 {
            for raid in completed {
                let (label, rarity) = estimates
                    .iter()
                    .find(|e| e.id == raid.material)
                    .map(|e| (e.label.as_str(), e.rarity))
                    .unwrap_or((raid.material.as_str(), Rarity::Common));
                let location = estimates
                    .iter()
                    .flat_map(|e| &e.locations)
                    .find(|l| l.id == raid.location_id);

                day.push(
                    &raid.material,
                    label,
                    rarity,
                    RaidLocation {
                        location_id: raid.location_id.clone(),
                        campaign: location.map(|l| l.campaign.clone()).unwrap_or_default(),
                        campaign_type: location
                            .map(|l| l.campaign_type)
                            .unwrap_or(CampaignType::Normal),
                        node_number: location.map(|l| l.node_number).unwrap_or(0),
                        raids_count: raid.raids_count,
                        energy_spent: raid.energy_spent,
                        farmed_items: raid.farmed_items,
                        is_completed: true,
                    },
                );
                energy_left = energy_left.saturating_sub(raid.energy_spent);
                *attempts_used.entry(raid.location_id.as_str()).or_default() += raid.raids_count;
            }
        }

        let mut scheduled = false;
        'materials: for work in active.iter_mut() {
            for location in &work.locations {
                if energy_left < MIN_RAID_ENERGY {
                    break 'materials;
                }
                if work.energy_left == 0 {
                    break;
                }

                let used = attempts_used.get(location.id.as_str()).copied().unwrap_or(0);
                let attempts_left = location.daily_battle_count.saturating_sub(used);
                if attempts_left == 0 {
                    continue;
                }

                let full_energy = attempts_left * location.energy_cost;
                let raids = if full_energy <= energy_left && full_energy <= work.energy_left {
                    attempts_left
                } else {
                    (energy_left.min(work.energy_left) / location.energy_cost).min(attempts_left)
                };
                if raids == 0 {
                    continue;
                }

                let energy_spent = raids * location.energy_cost;
                day.push(
                    &work.estimate.id,
                    &work.estimate.label,
                    work.estimate.rarity,
                    RaidLocation {
                        location_id: location.id.clone(),
                        campaign: location.campaign.clone(),
                        campaign_type: location.campaign_type,
                        node_number: location.node_number,
                        raids_count: raids,
                        energy_spent,
                        farmed_items: raids as f64 * location.items_per_raid(),
                        is_completed: false,
                    },
                );
                energy_left -= energy_spent;
                work.energy_left -= energy_spent;
                *attempts_used.entry(location.id.as_str()).or_default() += raids;
                scheduled = true;
            }
        }

        if !day.raids.is_empty() {
            debug!(
                "Day {}: {} energy over {} raids",
                days.len() + 1,
                day.energy_total,
                day.raids_total
            );
            days.push(day);
        }
        if !scheduled && day_index > 0 {
            let err = PlannerError::ScheduleStalled {
                subject: active_ids(&active),
                daily_energy: settings.daily_energy,
            };
            warn!("{}", err);
            return (days, Some(err));
        }

        active.retain(MaterialWork::can_progress);
        day_index += 1;
    }

    (days, None)
}
