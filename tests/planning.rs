use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use raid_planner::goals::Goal;
use raid_planner::models::{CampaignType, Rarity};
use raid_planner::player::{FarmStrategy, RosterEntry};
use raid_planner::sample::sample_static_data;
use raid_planner::{
    EstimatedUpgrades, LimitStage, Planner, PlannerError, PlayerState, UpgradeEstimate,
};

const PROGRESS: [(&str, u32); 5] = [
    ("Indomitus", 6),
    ("Indomitus Mirror", 4),
    ("Indomitus Elite", 3),
    ("Fall of Cadia", 4),
    ("Adeptus Mechanicus", 3),
];

fn planner() -> Planner {
    Planner::new(sample_static_data())
}

fn player(goals: Vec<Goal>) -> PlayerState {
    let mut player = PlayerState::default();
    for (campaign, node) in PROGRESS {
        player.campaign_progress.insert(campaign.to_string(), node);
    }
    player.goals = goals;
    player
}

fn rank(goal_id: &str, unit_id: &str, priority: u32, rank_start: u8, rank_end: u8) -> Goal {
    Goal::UpgradeRank {
        goal_id: goal_id.to_string(),
        unit_id: unit_id.to_string(),
        priority,
        rank_start,
        rank_end,
        rank_point5: false,
        applied_upgrades: vec![],
    }
}

fn ascend(goal_id: &str, unit_id: &str, priority: u32, stars_start: u8, stars_end: u8) -> Goal {
    Goal::Ascend {
        goal_id: goal_id.to_string(),
        unit_id: unit_id.to_string(),
        priority,
        stars_start,
        stars_end,
    }
}

fn unlock(goal_id: &str, unit_id: &str, priority: u32) -> Goal {
    Goal::Unlock {
        goal_id: goal_id.to_string(),
        unit_id: unit_id.to_string(),
        priority,
    }
}

fn material<'a>(plan: &'a EstimatedUpgrades, id: &str) -> &'a UpgradeEstimate {
    plan.materials
        .iter()
        .find(|m| m.id == id)
        .unwrap_or_else(|| panic!("{} missing from plan", id))
}

fn scheduled_energy(plan: &EstimatedUpgrades, id: &str) -> u32 {
    plan.raid_days.iter().map(|d| d.energy_for(id)).sum()
}

#[test]
fn rank_goal_expands_to_base_materials() {
    let plan = planner().plan(&player(vec![rank("g", "calgar", 1, 1, 2)]));

    let required: Vec<(&str, u32)> = {
        let mut r: Vec<_> = plan
            .materials
            .iter()
            .map(|m| (m.id.as_str(), m.required_count))
            .collect();
        r.sort();
        r
    };
    // field_medkit resolves to two stim packs and a servo skull
    assert_eq!(
        required,
        vec![
            ("bolt_shells", 1),
            ("flak_plating", 1),
            ("plasma_coil", 1),
            ("servo_skull", 2),
            ("stim_pack", 3)
        ]
    );
    assert_eq!(plan.in_progress.len(), 5);
    assert!(plan.issues.is_empty());
}

#[test]
fn planning_twice_gives_the_same_plan() {
    let planner = planner();
    let mut p = player(vec![rank("g", "calgar", 1, 1, 5), ascend("a", "ragnar", 2, 0, 3)]);
    p.settings.strategy = FarmStrategy::LeastTime;

    let first = planner.plan(&p);
    let second = planner.plan(&p);
    assert_eq!(first.materials, second.materials);
    assert_eq!(first.raid_days, second.raid_days);
    assert_eq!(first.energy_total, second.energy_total);
}

#[test]
fn planning_leaves_the_snapshot_untouched() {
    let mut p = player(vec![rank("g", "calgar", 1, 1, 4)]);
    p.inventory.insert("field_medkit".to_string(), 2);
    p.inventory.insert("stim_pack".to_string(), 5);
    let before = p.clone();

    planner().plan(&p);
    assert_eq!(p, before);
}

#[test]
fn full_inventory_finishes_every_material() {
    let mut p = player(vec![rank("g", "calgar", 1, 1, 2)]);
    for id in ["stim_pack", "bolt_shells", "flak_plating", "servo_skull", "plasma_coil"] {
        p.inventory.insert(id.to_string(), 50);
    }
    let plan = planner().plan(&p);

    assert_eq!(plan.finished.len(), 5);
    assert!(plan.in_progress.is_empty());
    assert!(plan.raid_days.is_empty());
    assert_eq!(plan.energy_total, 0);
}

#[test]
fn locked_campaigns_block_every_material() {
    let mut p = player(vec![rank("g", "calgar", 1, 1, 2)]);
    p.campaign_progress.clear();
    let plan = planner().plan(&p);

    assert_eq!(plan.blocked.len(), 5);
    assert!(plan.raid_days.is_empty());
    assert!(plan.materials.iter().all(|m| m.suggested_locations().count() == 0));
}

#[test]
fn selected_event_unlocks_cheaper_nodes() {
    let planner = planner();
    let mut p = player(vec![rank("g", "calgar", 1, 1, 2)]);

    let plain = planner.plan(&p);
    let servo = material(&plain, "servo_skull");
    let ids: Vec<_> = servo.suggested_locations().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["IM02"]);

    p.settings.selected_campaign_event = Some("AdMech".to_string());
    let event = planner.plan(&p);
    let servo = material(&event, "servo_skull");
    let ids: Vec<_> = servo.suggested_locations().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["AM01"]);
}

#[test]
fn custom_strategy_follows_the_rarity_allowlist() {
    let planner = planner();
    let mut p = player(vec![rank("g", "calgar", 1, 1, 2)]);
    p.settings.strategy = FarmStrategy::Custom;
    p.settings
        .custom_campaign_types
        .insert(Rarity::Common, vec![CampaignType::Normal]);

    let plan = planner.plan(&p);
    let stim = material(&plan, "stim_pack");
    assert!(stim.suggested_locations().all(|l| l.campaign_type == CampaignType::Normal));
    assert_eq!(stim.suggested_locations().count(), 3);
    // no allowlist for uncommon materials
    assert!(material(&plan, "servo_skull").is_blocked);
}

#[test]
fn least_time_adds_locations_for_slow_materials() {
    let planner = planner();
    let mut p = player(vec![rank("g", "calgar", 1, 1, 6)]);
    p.inventory.insert("bolt_shells".to_string(), 20);
    p.inventory.insert("plasma_coil".to_string(), 8);

    let energy = planner.plan(&p);
    let slow = material(&energy, "adamantium_plate");
    assert_eq!(slow.suggested_locations().count(), 1);
    assert_eq!(slow.days_total, 15);

    p.settings.strategy = FarmStrategy::LeastTime;
    let time = planner.plan(&p);
    let fast = material(&time, "adamantium_plate");
    assert!(fast.suggested_locations().count() > 1);
    assert!(fast.days_total < slow.days_total);
    assert_eq!(fast.required_count, slow.required_count);
}

#[test]
fn priority_order_hands_inventory_to_the_first_goal() {
    let mut p = player(vec![unlock("b", "ragnar", 2), ascend("a", "ragnar", 1, 0, 2)]);
    p.roster.push(RosterEntry {
        id: "ragnar".to_string(),
        unlocked: false,
        rank: 0,
        stars: 0,
        shards: 30,
    });
    p.settings.use_priority_order = true;
    let plan = planner().plan(&p);

    assert_eq!(plan.by_goal.len(), 2);
    let first = &plan.by_goal[0];
    assert_eq!(first.goal_id, "a");
    assert_eq!(first.materials[0].id, "shards_ragnar");
    assert_eq!(first.materials[0].acquired_count, 25);
    assert!(first.materials[0].is_finished);

    let second = &plan.by_goal[1].materials[0];
    assert_eq!((second.required_count, second.acquired_count), (130, 5));

    let combined = material(&plan, "shards_ragnar");
    assert_eq!((combined.required_count, combined.acquired_count), (155, 30));
}

#[test]
fn combined_mode_pools_inventory() {
    let mut p = player(vec![unlock("b", "ragnar", 2), ascend("a", "ragnar", 1, 0, 2)]);
    p.inventory.insert("shards_ragnar".to_string(), 30);
    let plan = planner().plan(&p);

    assert!(plan.by_goal.is_empty());
    let shards = material(&plan, "shards_ragnar");
    assert_eq!((shards.required_count, shards.acquired_count), (155, 30));
    assert_eq!(shards.related_goals, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn estimate_limit_keeps_partial_results() {
    let mut p = player(vec![unlock("u", "calgar", 1)]);
    p.settings.iteration_limit = 3;
    let plan = planner().plan(&p);

    let shards = material(&plan, "shards_calgar");
    assert_eq!(shards.days_total, 3);
    assert!(plan.issues.iter().any(|e| matches!(
        e,
        PlannerError::IterationLimit {
            stage: LimitStage::Estimate,
            limit: 3,
            ..
        }
    )));
    assert_eq!(scheduled_energy(&plan, "shards_calgar"), shards.energy_total);
}

#[test]
fn priority_order_reports_each_limit_once() {
    let mut p = player(vec![unlock("u", "calgar", 1), ascend("a", "calgar", 2, 0, 3)]);
    p.settings.use_priority_order = true;
    p.settings.iteration_limit = 3;
    let plan = planner().plan(&p);

    // both goals and their sum run past three days of shards
    assert_eq!(plan.by_goal.len(), 2);
    assert!(plan.by_goal.iter().all(|g| g.days_total == 3));
    let hits = plan
        .issues
        .iter()
        .filter(|e| {
            matches!(
                e,
                PlannerError::IterationLimit {
                    stage: LimitStage::Estimate,
                    subject,
                    ..
                } if subject == "shards_calgar"
            )
        })
        .count();
    assert_eq!(hits, 1);
}

#[test]
fn invalid_goals_are_reported_and_skipped() {
    let p = player(vec![
        unlock("x", "nobody", 1),
        rank("g", "calgar", 2, 1, 2),
        rank("r", "calgar", 3, 4, 2),
    ]);
    let plan = planner().plan(&p);

    assert!(plan.issues.iter().any(|e| matches!(e, PlannerError::UnknownUnit(_))));
    assert!(plan.issues.iter().any(|e| matches!(e, PlannerError::InvalidGoal { .. })));
    assert_eq!(plan.materials.len(), 5);
}

#[test]
fn ability_goals_only_cost_resources() {
    let p = player(vec![Goal::CharacterAbilities {
        goal_id: "ab".to_string(),
        unit_id: "ragnar".to_string(),
        priority: 1,
        active_start: 1,
        active_end: 4,
        passive_start: 1,
        passive_end: 2,
    }]);
    let plan = planner().plan(&p);

    assert!(plan.materials.is_empty());
    // levels 2..=4 active plus level 2 passive
    assert_eq!(plan.resource_costs.gold, 200 + 450 + 800 + 200);
    assert_eq!(plan.resource_costs.badges[&Rarity::Common], 3 + 1 + 2 + 3);
}

fn random_goal(rng: &mut ChaCha8Rng, i: usize) -> Goal {
    let id = format!("g{}", i);
    let priority = rng.gen_range(0..4);
    match rng.gen_range(0..5) {
        0 => {
            let start = rng.gen_range(1..5);
            rank(&id, "calgar", priority, start, rng.gen_range(start..=6))
        }
        1 => {
            let start = rng.gen_range(1..3);
            rank(&id, "ragnar", priority, start, rng.gen_range(start..=4))
        }
        2 => {
            let start = rng.gen_range(0..4);
            let unit = if rng.gen_bool(0.5) { "calgar" } else { "ragnar" };
            ascend(&id, unit, priority, start, rng.gen_range(start..=6))
        }
        3 => unlock(&id, "galatian", priority),
        _ => Goal::MowAbilities {
            goal_id: id,
            unit_id: "galatian".to_string(),
            priority,
            primary_start: 1,
            primary_end: rng.gen_range(1..=5),
            secondary_start: 1,
            secondary_end: rng.gen_range(1..=5),
        },
    }
}

fn random_player(rng: &mut ChaCha8Rng) -> PlayerState {
    let goals = (0..rng.gen_range(1..4)).map(|i| random_goal(rng, i)).collect();
    let mut p = player(goals);

    for id in ["stim_pack", "bolt_shells", "servo_skull", "adamantium_plate", "field_medkit"] {
        if rng.gen_bool(0.4) {
            p.inventory.insert(id.to_string(), rng.gen_range(0..12));
        }
    }
    p.settings.daily_energy = rng.gen_range(5..400);
    p.settings.strategy = match rng.gen_range(0..3) {
        0 => FarmStrategy::LeastEnergy,
        1 => FarmStrategy::LeastTime,
        _ => FarmStrategy::Custom,
    };
    for rarity in Rarity::ALL {
        if rng.gen_bool(0.5) {
            p.settings.custom_campaign_types.insert(
                rarity,
                vec![CampaignType::Normal, CampaignType::Mirror, CampaignType::Elite],
            );
        }
    }
    if rng.gen_bool(0.3) {
        p.settings.selected_campaign_event = Some("AdMech".to_string());
    }
    p.settings.use_priority_order = rng.gen_bool(0.3);
    p
}

#[test]
fn random_players_plan_within_budget_and_limits() {
    let planner = planner();
    for seed in 0..48 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let p = random_player(&mut rng);
        let plan = planner.plan(&p);

        assert!(plan.days_total <= p.settings.iteration_limit, "seed {}", seed);
        assert!(
            !plan.issues.iter().any(PlannerError::is_iteration_limit),
            "seed {}: {:?}",
            seed,
            plan.issues
        );
        assert_eq!(plan.days_total, plan.raid_days.len());
        assert_eq!(plan.energy_total, plan.materials.iter().map(|m| m.energy_total).sum::<u32>());
        for day in &plan.raid_days {
            assert!(day.energy_total <= p.settings.daily_energy, "seed {}", seed);
        }
        for m in &plan.materials {
            let scheduled = scheduled_energy(&plan, &m.id);
            assert_eq!(scheduled + m.energy_left, m.energy_total, "seed {} {}", seed, m.id);
            if m.is_finished || m.is_blocked {
                assert_eq!(scheduled, 0);
            }
        }
    }
}

#[test]
fn schedule_spends_nearly_all_estimated_energy() {
    let planner = planner();
    for seed in 100..124 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut p = random_player(&mut rng);
        p.settings.daily_energy = 288;
        p.settings.strategy = FarmStrategy::LeastEnergy;
        let plan = planner.plan(&p);

        for m in plan.materials.iter().filter(|m| m.is_in_progress()) {
            let max_cost = m.suggested_locations().map(|l| l.energy_cost).max().unwrap_or(0);
            assert!(
                m.energy_left < max_cost.max(1),
                "seed {} {} left {}",
                seed,
                m.id,
                m.energy_left
            );
        }
    }
}

#[test]
fn more_inventory_never_costs_more_per_material() {
    let planner = planner();
    for seed in 200..232 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut p = random_player(&mut rng);
        p.settings.strategy = FarmStrategy::LeastEnergy;
        p.settings.use_priority_order = false;
        let before = planner.plan(&p);

        for id in ["stim_pack", "bolt_shells", "flak_plating", "plasma_coil", "targeting_auspex"] {
            *p.inventory.entry(id.to_string()).or_default() += rng.gen_range(0..6);
        }
        let after = planner.plan(&p);
        assert!(after.energy_total <= before.energy_total, "seed {}", seed);

        for m in &after.materials {
            // crafted stock can remove a material's demand entirely
            let Some(old) = before.materials.iter().find(|b| b.id == m.id) else {
                continue;
            };
            assert!(
                m.days_total <= old.days_total,
                "seed {} {}: {} days > {}",
                seed,
                m.id,
                m.days_total,
                old.days_total
            );
            assert!(
                m.energy_total <= old.energy_total,
                "seed {} {}: {} energy > {}",
                seed,
                m.id,
                m.energy_total,
                old.energy_total
            );
        }
    }
}

#[test]
fn least_time_never_takes_longer_than_least_energy() {
    let planner = planner();
    for seed in 300..340 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut p = random_player(&mut rng);
        p.settings.daily_energy = rng.gen_range(60..400);
        p.settings.strategy = FarmStrategy::LeastEnergy;
        let energy = planner.plan(&p);
        p.settings.strategy = FarmStrategy::LeastTime;
        let time = planner.plan(&p);

        assert_eq!(energy.materials.len(), time.materials.len(), "seed {}", seed);
        for m in &time.materials {
            let slow = material(&energy, &m.id);
            assert!(
                m.days_total <= slow.days_total,
                "seed {} {}: {} days > {}",
                seed,
                m.id,
                m.days_total,
                slow.days_total
            );
            assert_eq!(m.required_count, slow.required_count);
        }
        assert!(
            !time.issues.iter().any(PlannerError::is_iteration_limit),
            "seed {}: {:?}",
            seed,
            time.issues
        );
    }
}
