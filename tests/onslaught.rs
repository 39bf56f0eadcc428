use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use raid_planner::models::{Alliance, Rarity};
use raid_planner::onslaught::{OnslaughtData, compute_total_enemies};
use raid_planner::sample::sample_static_data;
use raid_planner::{BattleKey, HsePlan, OnslaughtPlanner, PlannerError};

fn planner() -> OnslaughtPlanner {
    OnslaughtPlanner::new(sample_static_data().onslaught)
}

fn key(track: Alliance, sector: usize, zone: usize) -> BattleKey {
    BattleKey { track, sector, zone }
}

fn single_plan(track: Alliance, pre: u32, event: u32) -> HsePlan {
    HsePlan {
        pre_event_tokens: BTreeMap::from([(track, pre)]),
        event_tokens: BTreeMap::from([(track, event)]),
    }
}

fn random_start(rng: &mut ChaCha8Rng, data: &OnslaughtData, track: Alliance) -> BattleKey {
    let sectors = &data.tracks[&track].sectors;
    let sector = rng.gen_range(0..sectors.len());
    let zone = rng.gen_range(0..sectors[sector].len());
    key(track, sector, zone)
}

fn random_starts(rng: &mut ChaCha8Rng, data: &OnslaughtData) -> Vec<BattleKey> {
    let mut tracks: Vec<Alliance> =
        Alliance::ALL.into_iter().filter(|_| rng.gen_bool(0.6)).collect();
    if tracks.is_empty() {
        tracks.push(Alliance::ALL[rng.gen_range(0..3)]);
    }
    tracks.into_iter().map(|t| random_start(rng, data, t)).collect()
}

#[test]
fn sample_table_plans_like_the_hand_worked_cases() {
    let planner = planner();
    let start = [key(Alliance::Imperial, 0, 0)];

    let plan = planner.plan(&start, 0, 1).unwrap();
    assert_eq!((plan.pre_event(Alliance::Imperial), plan.event(Alliance::Imperial)), (0, 1));

    let plan = planner.plan(&start, 2, 3).unwrap();
    assert_eq!((plan.pre_event(Alliance::Imperial), plan.event(Alliance::Imperial)), (1, 3));
    assert_eq!(compute_total_enemies(planner.data(), &plan, &start), 13);

    let projection = planner.project(&plan, &start);
    // 5 and 3 in the first two sectors earn different badges
    assert_eq!(projection[0].xp, 13 * 25);
    assert_eq!(projection[0].badges[&Rarity::Common], 1);
    assert_eq!(projection[0].badges[&Rarity::Uncommon], 2);
}

#[test]
fn too_many_tracks_are_rejected() {
    let planner = planner();
    let starts = [
        key(Alliance::Imperial, 0, 0),
        key(Alliance::Xenos, 0, 0),
        key(Alliance::Chaos, 0, 0),
        key(Alliance::Imperial, 1, 0),
    ];
    assert!(matches!(
        planner.plan(&starts, 1, 1),
        Err(PlannerError::InvalidTrackSelection(_))
    ));
}

#[test]
fn single_track_matches_brute_force() {
    let planner = planner();
    let data = planner.data().clone();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..200 {
        let track = Alliance::ALL[rng.gen_range(0..3)];
        let start = [random_start(&mut rng, &data, track)];
        let pre = rng.gen_range(0..6);
        let event = rng.gen_range(0..6);

        let plan = planner.plan(&start, pre, event).unwrap();
        let best = (0..=pre)
            .map(|p| compute_total_enemies(&data, &single_plan(track, p, event), &start))
            .max()
            .unwrap_or(0);
        assert_eq!(compute_total_enemies(&data, &plan, &start), best);
        assert!(plan.pre_event(track) <= pre);
        assert!(plan.event(track) <= event);
    }
}

#[test]
fn more_tracks_never_score_less() {
    let planner = planner();
    let data = planner.data().clone();

    for seed in 0..40 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let starts = random_starts(&mut rng, &data);
        let pre = rng.gen_range(0..5);
        let event = rng.gen_range(1..5);

        let plan = planner.plan(&starts, pre, event).unwrap();
        let total = compute_total_enemies(&data, &plan, &starts);
        for start in &starts {
            let single = planner.plan(&[*start], pre, event).unwrap();
            assert!(
                total >= compute_total_enemies(&data, &single, &[*start]),
                "seed {} lost to {} alone",
                seed,
                start.track
            );
        }
    }
}

#[test]
fn multi_track_plans_spend_the_whole_budget() {
    let planner = planner();
    let data = planner.data().clone();

    for seed in 100..140 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let starts = random_starts(&mut rng, &data);
        if starts.len() < 2 {
            continue;
        }
        let pre = rng.gen_range(0..5);
        let event = rng.gen_range(0..5);

        let plan = planner.plan(&starts, pre, event).unwrap();
        assert_eq!(plan.pre_event_tokens.values().sum::<u32>(), pre, "seed {}", seed);
        assert_eq!(plan.event_tokens.values().sum::<u32>(), event, "seed {}", seed);
        assert_eq!(plan.pre_event_tokens.len(), 3);
    }
}
