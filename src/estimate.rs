//! Upgrade estimation
//!
//! Turns goals into per-material demand, estimates how many days, raids and
//! how much energy each material's deficit costs at its suggested locations,
//! and assembles the full plan handed to the UI layer.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::error::{LimitStage, PlannerError, Result};
use crate::filters::{is_event_eligible, populate_locations_data, sort_locations};
use crate::goals::{Goal, GoalRequirements, ResourceCost, expand_goal};
use crate::locations::{Location, LocationIndex};
use crate::models::{Rarity, StaticData};
use crate::player::{FarmStrategy, PlannerSettings, PlayerState};
use crate::raids::{RaidPlanDay, schedule_daily_raids};
use crate::recipes::{Inventory, expand_to_base_materials};

/// Remaining deficits below this are treated as closed
const EPSILON: f64 = 1e-6;

/// Demand for one base material across every active goal
#[derive(Debug, Clone, Default)]
pub struct CombinedUpgrade {
    pub id: String,
    pub label: String,
    pub rarity: Rarity,
    pub required_count: u32,
    pub acquired_count: u32,
    pub count_by_goal_id: BTreeMap<String, u32>,
    pub related_characters: Vec<String>,
    pub related_goals: Vec<String>,
    pub locations: Vec<Location>,
    /// Position of the first goal needing this material
    pub goal_order: usize,
}

impl CombinedUpgrade {
    fn add_demand(&mut self, goal_id: &str, unit_id: &str, count: u32) {
        self.required_count += count;
        *self.count_by_goal_id.entry(goal_id.to_string()).or_default() += count;
        if !self.related_goals.iter().any(|g| g == goal_id) {
            self.related_goals.push(goal_id.to_string());
        }
        if !self.related_characters.iter().any(|c| c == unit_id) {
            self.related_characters.push(unit_id.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpgradeEstimate {
    pub id: String,
    pub label: String,
    pub rarity: Rarity,
    pub required_count: u32,
    pub acquired_count: u32,
    pub days_total: u32,
    pub raids_total: u32,
    pub energy_total: u32,
    /// Energy not yet consumed by a scheduling pass
    pub energy_left: u32,
    pub is_blocked: bool,
    pub is_finished: bool,
    pub locations: Vec<Location>,
    pub related_goals: Vec<String>,
    pub related_characters: Vec<String>,
    pub goal_order: usize,
}

impl UpgradeEstimate {
    pub fn left_count(&self) -> u32 {
        self.required_count.saturating_sub(self.acquired_count)
    }

    pub fn is_in_progress(&self) -> bool {
        !self.is_blocked && !self.is_finished
    }

    pub fn suggested_locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(|l| l.is_suggested)
    }
}

#[derive(Debug, Default)]
struct FarmTotals {
    days: u32,
    raids: u32,
    energy: u32,
}

/// Day-by-day farming at the given locations, in order, until `left` items
/// are covered. Errs with the partial totals when `limit` days pass first.
fn simulate_farming(
    locations: &[&Location],
    left: u32,
    limit: usize,
) -> std::result::Result<FarmTotals, FarmTotals> {
    let mut totals = FarmTotals::default();
    let mut left = left as f64;

    while left > EPSILON {
        if totals.days as usize >= limit {
            return Err(totals);
        }
        for location in locations {
            if location.items_per_day <= left {
                left -= location.items_per_day;
                totals.energy += location.daily_energy();
                totals.raids += location.daily_battle_count;
            } else {
                let needed_energy = left * location.energy_per_item;
                let battles =
                    (needed_energy / location.energy_cost as f64 - EPSILON).ceil().max(1.0) as u32;
                totals.energy += battles * location.energy_cost;
                totals.raids += battles;
                left = 0.0;
                break;
            }
        }
        totals.days += 1;
    }

    Ok(totals)
}

fn estimate_with_limit(
    upgrade: &CombinedUpgrade,
    required_count: u32,
    acquired_count: u32,
    limit: usize,
) -> (UpgradeEstimate, Option<PlannerError>) {
    let mut estimate = UpgradeEstimate {
        id: upgrade.id.clone(),
        label: upgrade.label.clone(),
        rarity: upgrade.rarity,
        required_count,
        acquired_count,
        locations: upgrade.locations.clone(),
        related_goals: upgrade.related_goals.clone(),
        related_characters: upgrade.related_characters.clone(),
        goal_order: upgrade.goal_order,
        ..Default::default()
    };

    let left_count = estimate.left_count();
    if left_count == 0 {
        estimate.is_finished = true;
        return (estimate, None);
    }

    let suggested: Vec<&Location> = upgrade.locations.iter().filter(|l| l.is_suggested).collect();
    if suggested.is_empty() {
        estimate.is_blocked = true;
        return (estimate, None);
    }

    let (totals, issue) = match simulate_farming(&suggested, left_count, limit) {
        Ok(totals) => (totals, None),
        Err(partial) => {
            warn!(
                "Estimate for {} gave up after {} days with {} items still missing",
                upgrade.id, partial.days, left_count
            );
            let err = PlannerError::IterationLimit {
                stage: LimitStage::Estimate,
                subject: upgrade.id.clone(),
                limit,
            };
            (partial, Some(err))
        }
    };

    estimate.days_total = totals.days;
    estimate.raids_total = totals.raids;
    estimate.energy_total = totals.energy;
    estimate.energy_left = totals.energy;
    (estimate, issue)
}

/// Estimate the farming cost of `required_count - acquired_count` items of
/// one material at its suggested locations.
pub fn get_upgrade_estimate(
    upgrade: &CombinedUpgrade,
    required_count: u32,
    acquired_count: u32,
    limit: usize,
) -> Result<UpgradeEstimate> {
    match estimate_with_limit(upgrade, required_count, acquired_count, limit) {
        (estimate, None) => Ok(estimate),
        (_, Some(err)) => Err(err),
    }
}

/// Hardest first: most days, then most energy
pub fn sort_estimates(estimates: &mut [UpgradeEstimate]) {
    estimates.sort_by(|a, b| {
        b.days_total
            .cmp(&a.days_total)
            .then(b.energy_total.cmp(&a.energy_total))
            .then(a.id.cmp(&b.id))
    });
}

/// Per-goal slice of a priority-ordered plan
#[derive(Debug, Clone, Default)]
pub struct GoalEstimate {
    pub goal_id: String,
    pub unit_id: String,
    pub kind: &'static str,
    pub materials: Vec<UpgradeEstimate>,
    pub days_total: u32,
    pub energy_total: u32,
    pub cost: ResourceCost,
}

/// Everything the planner produces for one player snapshot
#[derive(Debug, Default)]
pub struct EstimatedUpgrades {
    pub materials: Vec<UpgradeEstimate>,
    pub in_progress: Vec<String>,
    pub blocked: Vec<String>,
    pub finished: Vec<String>,
    pub by_goal: Vec<GoalEstimate>,
    pub raid_days: Vec<RaidPlanDay>,
    pub energy_total: u32,
    pub raids_total: u32,
    pub days_total: usize,
    pub resource_costs: ResourceCost,
    pub issues: Vec<PlannerError>,
}

/// Planning service built once over a set of static tables
#[derive(Debug, Clone)]
pub struct Planner {
    data: StaticData,
    index: LocationIndex,
}

impl Planner {
    pub fn new(mut data: StaticData) -> Self {
        data.add_shard_materials();
        let index = LocationIndex::build(&data.battles, &data.campaigns);
        info!(
            "Indexed {} farmable materials across {} campaigns",
            index.material_count(),
            index.campaigns().len()
        );
        Self { data, index }
    }

    pub fn data(&self) -> &StaticData {
        &self.data
    }

    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    /// Goals in planning order: ascending priority, ties keep list order
    pub fn ordered_goals(goals: &[Goal]) -> Vec<&Goal> {
        let mut ordered: Vec<&Goal> = goals.iter().collect();
        ordered.sort_by_key(|g| g.priority());
        ordered
    }

    fn expand_goals(
        &self,
        player: &PlayerState,
        issues: &mut Vec<PlannerError>,
    ) -> Vec<GoalRequirements> {
        let mut requirements = Vec::new();
        for goal in Self::ordered_goals(&player.goals) {
            match expand_goal(&self.data, player, goal) {
                Ok(req) => requirements.push(req),
                Err(err) => {
                    warn!("Skipping goal {}: {}", goal.goal_id(), err);
                    issues.push(err);
                }
            }
        }
        requirements
    }

    /// Base materials a goal needs, consuming crafted stock from `inventory`
    fn base_materials(
        &self,
        req: &GoalRequirements,
        inventory: &mut Inventory,
    ) -> BTreeMap<String, u32> {
        let mut base = expand_to_base_materials(&self.data.materials, &req.upgrades, inventory);
        if let Some((shards, count)) = &req.shards {
            if *count > 0 {
                *base.entry(shards.clone()).or_default() += count;
            }
        }
        base
    }

    fn new_upgrade(&self, id: &str, goal_order: usize) -> CombinedUpgrade {
        let (label, rarity) = match self.data.materials.get(id) {
            Some(def) => (def.label.clone(), def.rarity),
            None => {
                warn!("No material data for '{}'", id);
                (id.to_string(), Rarity::Common)
            }
        };
        let locations = self.index.for_material(id).to_vec();
        if locations.is_empty() {
            debug!("{} cannot be farmed in any campaign", id);
        }

        CombinedUpgrade {
            id: id.to_string(),
            label,
            rarity,
            locations,
            goal_order,
            ..Default::default()
        }
    }

    /// Sum every goal's base demand into one entry per material
    pub fn combine_upgrades(
        &self,
        requirements: &[GoalRequirements],
        inventory: &mut Inventory,
    ) -> Vec<CombinedUpgrade> {
        let mut combined: BTreeMap<String, CombinedUpgrade> = BTreeMap::new();

        for (order, req) in requirements.iter().enumerate() {
            for (id, count) in self.base_materials(req, inventory) {
                combined
                    .entry(id.clone())
                    .or_insert_with(|| self.new_upgrade(&id, order))
                    .add_demand(&req.goal_id, &req.unit_id, count);
            }
        }

        combined
            .into_values()
            .map(|mut upgrade| {
                upgrade.acquired_count = inventory.get(&upgrade.id).copied().unwrap_or(0);
                upgrade
            })
            .collect()
    }

    fn estimate_all(
        &self,
        upgrades: &[CombinedUpgrade],
        settings: &PlannerSettings,
        issues: &mut Vec<PlannerError>,
    ) -> Vec<UpgradeEstimate> {
        upgrades
            .iter()
            .map(|u| {
                let (estimate, issue) = estimate_with_limit(
                    u,
                    u.required_count,
                    u.acquired_count,
                    settings.iteration_limit,
                );
                issues.extend(issue);
                estimate
            })
            .collect()
    }

    /// Least-time refinement: give materials that take more than twice the
    /// mean number of days one more suggested location, then re-estimate.
    fn refine_least_time(
        &self,
        upgrades: &mut [CombinedUpgrade],
        settings: &PlannerSettings,
        issues: &mut Vec<PlannerError>,
    ) -> Vec<UpgradeEstimate> {
        let mut estimates = self.estimate_all(upgrades, settings, &mut Vec::new());

        for pass in 0..=settings.refinement_pass_limit {
            if !estimates.iter().any(UpgradeEstimate::is_in_progress) {
                break;
            }
            // finished and blocked materials count as zero days
            let mean = estimates.iter().map(|e| e.days_total as f64).sum::<f64>()
                / estimates.len() as f64;
            let slow: Vec<String> = estimates
                .iter()
                .filter(|e| e.is_in_progress() && e.days_total as f64 > 2.0 * mean)
                .map(|e| e.id.clone())
                .collect();

            let at_cap = pass == settings.refinement_pass_limit;
            let mut promoted = Vec::new();
            for upgrade in upgrades.iter_mut().filter(|u| slow.contains(&u.id)) {
                let candidate = upgrade
                    .locations
                    .iter_mut()
                    .filter(|l| {
                        l.is_unlocked
                            && l.is_pass_filter
                            && !l.is_suggested
                            && is_event_eligible(l, settings)
                    })
                    .min_by(|a, b| a.energy_per_item.total_cmp(&b.energy_per_item));
                let Some(location) = candidate else {
                    continue;
                };
                if !at_cap {
                    location.is_suggested = true;
                    sort_locations(&mut upgrade.locations);
                }
                promoted.push(upgrade.id.clone());
            }

            if promoted.is_empty() {
                break;
            }
            if at_cap {
                let err = PlannerError::IterationLimit {
                    stage: LimitStage::Refinement,
                    subject: promoted.join(", "),
                    limit: settings.refinement_pass_limit,
                };
                warn!("{}", err);
                issues.push(err);
                break;
            }
            debug!("Refinement pass {} promoted locations for {:?}", pass + 1, promoted);
            estimates = self.estimate_all(upgrades, settings, &mut Vec::new());
        }

        self.estimate_all(upgrades, settings, issues)
    }

    fn estimate_upgrades(
        &self,
        upgrades: &mut [CombinedUpgrade],
        settings: &PlannerSettings,
        issues: &mut Vec<PlannerError>,
    ) -> Vec<UpgradeEstimate> {
        if settings.strategy == FarmStrategy::LeastTime {
            self.refine_least_time(upgrades, settings, issues)
        } else {
            self.estimate_all(upgrades, settings, issues)
        }
    }

    /// Run the full pipeline over an immutable player snapshot
    pub fn plan(&self, player: &PlayerState) -> EstimatedUpgrades {
        let settings = &player.settings;
        let mut result = EstimatedUpgrades::default();
        let mut inventory = player.working_inventory();

        let requirements = self.expand_goals(player, &mut result.issues);
        for req in &requirements {
            result.resource_costs.add(&req.cost);
        }

        let mut materials = if settings.use_priority_order {
            self.plan_by_priority(player, &requirements, &mut inventory, &mut result)
        } else {
            let mut upgrades = self.combine_upgrades(&requirements, &mut inventory);
            populate_locations_data(&mut upgrades, player);
            let mut estimates = self.estimate_upgrades(&mut upgrades, settings, &mut result.issues);
            sort_estimates(&mut estimates);
            estimates
        };

        let (raid_days, issue) =
            schedule_daily_raids(settings, &player.completed_locations, &materials);
        result.issues.extend(issue);

        for estimate in &mut materials {
            let scheduled: u32 = raid_days.iter().map(|d| d.energy_for(&estimate.id)).sum();
            estimate.energy_left = estimate.energy_total.saturating_sub(scheduled);
        }

        for estimate in &materials {
            let bucket = if estimate.is_finished {
                &mut result.finished
            } else if estimate.is_blocked {
                &mut result.blocked
            } else {
                &mut result.in_progress
            };
            bucket.push(estimate.id.clone());
        }

        result.energy_total = materials.iter().map(|e| e.energy_total).sum();
        result.raids_total = materials.iter().map(|e| e.raids_total).sum();
        result.days_total = raid_days.len();
        result.raid_days = raid_days;
        result.materials = materials;

        info!(
            "Planned {} materials over {} days ({} energy, {} blocked)",
            result.materials.len(),
            result.days_total,
            result.energy_total,
            result.blocked.len()
        );
        result
    }

    /// Goals claim inventory one after another; returns the combined
    /// estimates in goal order, hardest first within a goal.
    fn plan_by_priority(
        &self,
        player: &PlayerState,
        requirements: &[GoalRequirements],
        inventory: &mut Inventory,
        result: &mut EstimatedUpgrades,
    ) -> Vec<UpgradeEstimate> {
        let settings = &player.settings;
        let goals = Self::ordered_goals(&player.goals);
        let mut combined: BTreeMap<String, CombinedUpgrade> = BTreeMap::new();

        for (order, req) in requirements.iter().enumerate() {
            let mut upgrades = Vec::new();
            for (id, count) in self.base_materials(req, inventory) {
                let stock = inventory.entry(id.clone()).or_default();
                let acquired = (*stock).min(count);
                *stock -= acquired;

                let mut upgrade = self.new_upgrade(&id, order);
                upgrade.add_demand(&req.goal_id, &req.unit_id, count);
                upgrade.acquired_count = acquired;
                upgrades.push(upgrade);

                let total = combined
                    .entry(id.clone())
                    .or_insert_with(|| self.new_upgrade(&id, order));
                total.add_demand(&req.goal_id, &req.unit_id, count);
                total.acquired_count += acquired;
            }

            populate_locations_data(&mut upgrades, player);
            // the combined pass below reports limits for the same materials
            let mut materials = self.estimate_upgrades(&mut upgrades, settings, &mut Vec::new());
            sort_estimates(&mut materials);

            let kind = goals
                .iter()
                .find(|g| g.goal_id() == req.goal_id)
                .map(|g| g.kind())
                .unwrap_or("goal");
            result.by_goal.push(GoalEstimate {
                goal_id: req.goal_id.clone(),
                unit_id: req.unit_id.clone(),
                kind,
                days_total: materials.iter().map(|m| m.days_total).max().unwrap_or(0),
                energy_total: materials.iter().map(|m| m.energy_total).sum(),
                cost: req.cost.clone(),
                materials,
            });
        }

        let mut upgrades: Vec<CombinedUpgrade> = combined.into_values().collect();
        populate_locations_data(&mut upgrades, player);
        let mut estimates = self.estimate_upgrades(&mut upgrades, settings, &mut result.issues);
        sort_estimates(&mut estimates);
        estimates.sort_by_key(|e| e.goal_order);
        estimates
    }
}
