//! Location filtering and farming suggestions
//!
//! Annotates each material's candidate locations with unlock, filter and
//! completion state for one planning session, then marks the locations the
//! selected strategy wants farmed.

use std::collections::HashMap;

use log::debug;

use crate::estimate::CombinedUpgrade;
use crate::locations::Location;
use crate::models::{CampaignType, Rarity};
use crate::player::{FarmStrategy, PlannerSettings, PlayerState, RaidFilters};

/// Whether `location` satisfies every configured filter dimension
pub fn passes_filters(location: &Location, rarity: Rarity, filters: &RaidFilters) -> bool {
    if filters.is_empty() {
        return true;
    }

    let intersects = |wanted: &[String], present: &[String]| {
        wanted.is_empty() || wanted.iter().any(|w| present.contains(w))
    };

    if let Some(min) = filters.enemies_min_count {
        if !location.enemies_total.is_some_and(|total| total >= min) {
            return false;
        }
    }
    if let Some(max) = filters.enemies_max_count {
        if !location.enemies_total.is_some_and(|total| total <= max) {
            return false;
        }
    }
    if !intersects(&filters.enemies_types, &location.enemies_types) {
        return false;
    }
    if !filters.slots_count.is_empty()
        && !location.slots.is_some_and(|s| filters.slots_count.contains(&s))
    {
        return false;
    }
    if !filters.upgrades_rarity.is_empty() && !filters.upgrades_rarity.contains(&rarity) {
        return false;
    }
    if !filters.campaign_types.is_empty()
        && !filters.campaign_types.contains(&location.campaign_type)
    {
        return false;
    }
    if !filters.allies_alliance.is_empty()
        && !location
            .ally_alliance
            .is_some_and(|a| filters.allies_alliance.contains(&a))
    {
        return false;
    }
    if !filters.allies_factions.is_empty()
        && !location
            .ally_faction
            .as_ref()
            .is_some_and(|f| filters.allies_factions.contains(f))
    {
        return false;
    }
    if !filters.enemies_alliance.is_empty()
        && !filters
            .enemies_alliance
            .iter()
            .any(|a| location.enemies_alliances.contains(a))
    {
        return false;
    }
    intersects(&filters.enemies_factions, &location.enemies_factions)
}

/// Apply the custom-strategy tier dependencies in a single pass: Extremis
/// needs Mirror, Elite needs Extremis. Nothing is added back.
pub fn effective_campaign_types(allowed: &[CampaignType]) -> Vec<CampaignType> {
    let mut types = allowed.to_vec();
    if types.contains(&CampaignType::Extremis) && !types.contains(&CampaignType::Mirror) {
        types.retain(|t| *t != CampaignType::Extremis);
    }
    if types.contains(&CampaignType::Elite) && !types.contains(&CampaignType::Extremis) {
        types.retain(|t| *t != CampaignType::Elite);
    }
    types
}

/// Campaign-event nodes only count while their event is the selected one
pub fn is_event_eligible(location: &Location, settings: &PlannerSettings) -> bool {
    match &location.campaign_event {
        None => true,
        Some(event) => settings.selected_campaign_event.as_ref() == Some(event),
    }
}

/// Annotate and order every upgrade's locations for this session
pub fn populate_locations_data(upgrades: &mut [CombinedUpgrade], player: &PlayerState) {
    let settings = &player.settings;

    let mut raids_today: HashMap<&str, u32> = HashMap::new();
    for completed in &player.completed_locations {
        *raids_today.entry(completed.location_id.as_str()).or_default() += completed.raids_count;
    }

    for upgrade in upgrades.iter_mut() {
        let rarity = upgrade.rarity;
        for location in upgrade.locations.iter_mut() {
            let progress = player
                .campaign_progress
                .get(&location.campaign)
                .copied()
                .unwrap_or(0);
            location.is_unlocked = location.node_number <= progress;
            location.is_pass_filter = passes_filters(location, rarity, &settings.filters);

            let done = raids_today.get(location.id.as_str()).copied();
            location.is_completed = done.is_some_and(|d| d >= location.daily_battle_count);
            location.is_started = done.is_some_and(|d| d < location.daily_battle_count);

            location.is_suggested = location.is_unlocked
                && location.is_pass_filter
                && is_event_eligible(location, settings);
        }

        match settings.strategy {
            FarmStrategy::LeastEnergy | FarmStrategy::LeastTime => {
                keep_most_efficient(&mut upgrade.locations);
            }
            FarmStrategy::Custom => {
                let allowed = settings
                    .custom_campaign_types
                    .get(&rarity)
                    .map(|types| effective_campaign_types(types))
                    .unwrap_or_default();
                for location in upgrade.locations.iter_mut() {
                    location.is_suggested &= allowed.contains(&location.campaign_type);
                }
            }
        }

        sort_locations(&mut upgrade.locations);
        debug!(
            "{}: {} of {} locations suggested",
            upgrade.id,
            upgrade.locations.iter().filter(|l| l.is_suggested).count(),
            upgrade.locations.len()
        );
    }
}

fn keep_most_efficient(locations: &mut [Location]) {
    let min = locations
        .iter()
        .filter(|l| l.is_suggested)
        .map(|l| l.energy_per_item)
        .min_by(f64::total_cmp);
    if let Some(min) = min {
        for location in locations.iter_mut() {
            location.is_suggested &= location.energy_per_item == min;
        }
    }
}

/// Suggested first, then cheapest energy per item, then deepest node
pub fn sort_locations(locations: &mut [Location]) {
    locations.sort_by(|a, b| {
        b.is_suggested
            .cmp(&a.is_suggested)
            .then(a.energy_per_item.total_cmp(&b.energy_per_item))
            .then(b.node_number.cmp(&a.node_number))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Alliance;
    use crate::player::CompletedLocation;

    fn location(id: &str, campaign_type: CampaignType, node: u32, epi: f64) -> Location {
        Location {
            id: id.to_string(),
            material: "ore".to_string(),
            campaign: "Indomitus".to_string(),
            campaign_type,
            campaign_event: None,
            node_number: node,
            energy_cost: 6,
            daily_battle_count: 3,
            drop_rate: 6.0 / epi,
            energy_per_item: epi,
            items_per_day: 18.0 / epi,
            slots: Some(5),
            enemies_total: Some(8),
            enemies_factions: vec!["Necrons".to_string()],
            enemies_alliances: vec![Alliance::Xenos],
            enemies_types: vec!["Warrior".to_string()],
            ally_faction: Some("Ultramarines".to_string()),
            ally_alliance: Some(Alliance::Imperial),
            is_unlocked: false,
            is_pass_filter: false,
            is_completed: false,
            is_started: false,
            is_suggested: false,
        }
    }

    fn upgrade(locations: Vec<Location>) -> CombinedUpgrade {
        CombinedUpgrade {
            id: "ore".to_string(),
            label: "Ore".to_string(),
            rarity: Rarity::Rare,
            locations,
            ..Default::default()
        }
    }

    fn player(progress: u32) -> PlayerState {
        let mut player = PlayerState::default();
        player.campaign_progress.insert("Indomitus".to_string(), progress);
        player
    }

    #[test]
    fn empty_filters_pass_everything() {
        let filters = RaidFilters::default();
        for ct in [CampaignType::Normal, CampaignType::Elite, CampaignType::Standard] {
            let mut l = location("x", ct, 1, 10.0);
            l.slots = None;
            l.enemies_total = None;
            l.ally_alliance = None;
            assert!(passes_filters(&l, Rarity::Common, &filters));
        }
    }

    #[test]
    fn each_filter_dimension_can_reject() {
        let l = location("x", CampaignType::Normal, 1, 10.0);
        let cases = [
            RaidFilters { enemies_min_count: Some(9), ..Default::default() },
            RaidFilters { enemies_max_count: Some(7), ..Default::default() },
            RaidFilters { enemies_types: vec!["Vehicle".to_string()], ..Default::default() },
            RaidFilters { slots_count: vec![3, 4], ..Default::default() },
            RaidFilters { upgrades_rarity: vec![Rarity::Epic], ..Default::default() },
            RaidFilters { campaign_types: vec![CampaignType::Elite], ..Default::default() },
            RaidFilters { allies_alliance: vec![Alliance::Chaos], ..Default::default() },
            RaidFilters { allies_factions: vec!["Necrons".to_string()], ..Default::default() },
            RaidFilters { enemies_alliance: vec![Alliance::Imperial], ..Default::default() },
            RaidFilters { enemies_factions: vec!["Orks".to_string()], ..Default::default() },
        ];
        for filters in cases {
            assert!(!passes_filters(&l, Rarity::Rare, &filters), "{:?}", filters);
        }

        let matching = RaidFilters {
            enemies_min_count: Some(8),
            slots_count: vec![5],
            enemies_factions: vec!["Orks".to_string(), "Necrons".to_string()],
            ..Default::default()
        };
        assert!(passes_filters(&l, Rarity::Rare, &matching));
    }

    #[test]
    fn cascade_drops_tiers_missing_their_dependency() {
        use CampaignType::*;
        assert_eq!(effective_campaign_types(&[Elite]), Vec::<CampaignType>::new());
        assert_eq!(effective_campaign_types(&[Elite, Extremis]), Vec::<CampaignType>::new());
        assert_eq!(
            effective_campaign_types(&[Elite, Extremis, Mirror]),
            vec![Elite, Extremis, Mirror]
        );
        assert_eq!(effective_campaign_types(&[Normal, Elite]), vec![Normal]);
    }

    #[test]
    fn least_energy_keeps_only_cheapest_unlocked() {
        let mut upgrades = vec![upgrade(vec![
            location("a", CampaignType::Normal, 3, 20.0),
            location("b", CampaignType::Normal, 9, 10.0),
            location("c", CampaignType::Normal, 5, 15.0),
        ])];
        populate_locations_data(&mut upgrades, &player(6));

        let suggested: Vec<_> = upgrades[0]
            .locations
            .iter()
            .filter(|l| l.is_suggested)
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(suggested, vec!["c"]);
        assert!(!upgrades[0].locations.iter().find(|l| l.id == "b").unwrap().is_unlocked);
        assert_eq!(upgrades[0].locations[0].id, "c");
    }

    #[test]
    fn least_energy_keeps_ties() {
        let mut upgrades = vec![upgrade(vec![
            location("a", CampaignType::Normal, 3, 15.0),
            location("b", CampaignType::Mirror, 4, 15.0),
        ])];
        populate_locations_data(&mut upgrades, &player(10));
        assert!(upgrades[0].locations.iter().all(|l| l.is_suggested));
        assert_eq!(upgrades[0].locations[0].id, "b");
    }

    #[test]
    fn custom_strategy_uses_rarity_allowlist() {
        let mut p = player(10);
        p.settings.strategy = FarmStrategy::Custom;
        p.settings
            .custom_campaign_types
            .insert(Rarity::Rare, vec![CampaignType::Normal, CampaignType::Elite]);

        let mut upgrades = vec![upgrade(vec![
            location("a", CampaignType::Normal, 3, 20.0),
            location("b", CampaignType::Elite, 4, 10.0),
            location("c", CampaignType::Mirror, 5, 12.0),
        ])];
        populate_locations_data(&mut upgrades, &p);

        let suggested: Vec<_> = upgrades[0]
            .locations
            .iter()
            .filter(|l| l.is_suggested)
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(suggested, vec!["a"]);
    }

    #[test]
    fn custom_strategy_without_allowlist_suggests_nothing() {
        let mut p = player(10);
        p.settings.strategy = FarmStrategy::Custom;
        let mut upgrades = vec![upgrade(vec![location("a", CampaignType::Normal, 3, 20.0)])];
        populate_locations_data(&mut upgrades, &p);
        assert!(!upgrades[0].locations[0].is_suggested);
    }

    #[test]
    fn event_nodes_need_the_selected_event() {
        let mut event_location = location("e", CampaignType::Standard, 2, 5.0);
        event_location.campaign_event = Some("Mechanicus".to_string());
        let normal = location("a", CampaignType::Normal, 3, 20.0);
        let mut upgrades = vec![upgrade(vec![event_location.clone(), normal.clone()])];
        populate_locations_data(&mut upgrades, &player(10));
        assert_eq!(upgrades[0].locations[0].id, "a");
        assert!(upgrades[0].locations[0].is_suggested);

        let mut p = player(10);
        p.settings.selected_campaign_event = Some("Mechanicus".to_string());
        let mut upgrades = vec![upgrade(vec![event_location, normal])];
        populate_locations_data(&mut upgrades, &p);
        assert_eq!(upgrades[0].locations[0].id, "e");
        assert!(!upgrades[0].locations[1].is_suggested);
    }

    #[test]
    fn completed_raids_mark_started_and_completed() {
        let mut p = player(10);
        p.completed_locations = vec![
            CompletedLocation {
                location_id: "a".to_string(),
                material: "ore".to_string(),
                raids_count: 3,
                energy_spent: 18,
                farmed_items: 1.0,
            },
            CompletedLocation {
                location_id: "b".to_string(),
                material: "ore".to_string(),
                raids_count: 1,
                energy_spent: 6,
                farmed_items: 0.0,
            },
        ];
        let mut upgrades = vec![upgrade(vec![
            location("a", CampaignType::Normal, 3, 20.0),
            location("b", CampaignType::Normal, 4, 20.0),
            location("c", CampaignType::Normal, 5, 20.0),
        ])];
        populate_locations_data(&mut upgrades, &p);

        let get = |id: &str| upgrades[0].locations.iter().find(|l| l.id == id).unwrap();
        assert!(get("a").is_completed && !get("a").is_started);
        assert!(get("b").is_started && !get("b").is_completed);
        assert!(!get("c").is_started && !get("c").is_completed);
    }
}
