//! Built-in sample game tables
//!
//! A small but complete slice of the game: three recipe tiers, normal,
//! mirror, elite and event campaigns, two characters and a machine of war,
//! plus a short onslaught table. Used by `load-sample` and the tests.

use std::collections::{BTreeMap, HashMap};

use crate::models::{
    AbilityLevel, Alliance, BattleDef, BattleRewards, CampaignDef, CampaignType, GuaranteedReward,
    MaterialDef, MowLevel, PotentialReward, Rarity, RecipeLine, StaticData, UnitDef, UpgradeStat,
};
use crate::onslaught::{Killzone, OnslaughtData, OnslaughtTrack};

fn material(
    id: &str,
    label: &str,
    rarity: Rarity,
    stat: UpgradeStat,
    recipe: &[(&str, u32)],
) -> MaterialDef {
    MaterialDef {
        id: id.to_string(),
        label: label.to_string(),
        rarity,
        stat,
        craftable: !recipe.is_empty(),
        recipe: recipe
            .iter()
            .map(|(material, count)| RecipeLine {
                material: material.to_string(),
                count: *count,
            })
            .collect(),
    }
}

fn materials() -> Vec<MaterialDef> {
    use Rarity::*;
    use UpgradeStat::*;
    vec![
        material("stim_pack", "Stim Pack", Common, Health, &[]),
        material("bolt_shells", "Bolt Shells", Common, Damage, &[]),
        material("flak_plating", "Flak Plating", Common, Armour, &[]),
        material("servo_skull", "Servo Skull", Uncommon, Health, &[]),
        material("plasma_coil", "Plasma Coil", Uncommon, Damage, &[]),
        material("adamantium_plate", "Adamantium Plate", Rare, Armour, &[]),
        material(
            "field_medkit",
            "Field Medkit",
            Uncommon,
            Health,
            &[("stim_pack", 2), ("servo_skull", 1)],
        ),
        material(
            "targeting_auspex",
            "Targeting Auspex",
            Rare,
            Damage,
            &[("bolt_shells", 3), ("plasma_coil", 1)],
        ),
        material(
            "ceramite_plating",
            "Ceramite Plating",
            Rare,
            Armour,
            &[("flak_plating", 3), ("adamantium_plate", 1)],
        ),
        material(
            "master_crafted_bolter",
            "Master-crafted Bolter",
            Epic,
            Damage,
            &[("targeting_auspex", 2), ("adamantium_plate", 1)],
        ),
        material(
            "relic_aquila",
            "Relic Aquila",
            Legendary,
            Health,
            &[("field_medkit", 2), ("master_crafted_bolter", 1), ("ceramite_plating", 1)],
        ),
    ]
}

struct CampaignRow {
    id: &'static str,
    campaign_type: CampaignType,
    ally_faction: &'static str,
    ally_alliance: Alliance,
    enemy_faction: &'static str,
    enemy_alliance: Alliance,
    enemy_types: &'static [&'static str],
    event: Option<&'static str>,
    energy_cost: u32,
    daily_battle_count: u32,
}

const CAMPAIGNS: [CampaignRow; 5] = [
    CampaignRow {
        id: "Indomitus",
        campaign_type: CampaignType::Normal,
        ally_faction: "Ultramarines",
        ally_alliance: Alliance::Imperial,
        enemy_faction: "Necrons",
        enemy_alliance: Alliance::Xenos,
        enemy_types: &["Necron Warrior", "Flayed One"],
        event: None,
        energy_cost: 6,
        daily_battle_count: 10,
    },
    CampaignRow {
        id: "Indomitus Mirror",
        campaign_type: CampaignType::Mirror,
        ally_faction: "Necrons",
        ally_alliance: Alliance::Xenos,
        enemy_faction: "Ultramarines",
        enemy_alliance: Alliance::Imperial,
        enemy_types: &["Intercessor", "Eliminator"],
        event: None,
        energy_cost: 6,
        daily_battle_count: 10,
    },
    CampaignRow {
        id: "Indomitus Elite",
        campaign_type: CampaignType::Elite,
        ally_faction: "Ultramarines",
        ally_alliance: Alliance::Imperial,
        enemy_faction: "Necrons",
        enemy_alliance: Alliance::Xenos,
        enemy_types: &["Lychguard", "Necron Warrior"],
        event: None,
        energy_cost: 10,
        daily_battle_count: 3,
    },
    CampaignRow {
        id: "Fall of Cadia",
        campaign_type: CampaignType::Normal,
        ally_faction: "Astra Militarum",
        ally_alliance: Alliance::Imperial,
        enemy_faction: "Black Legion",
        enemy_alliance: Alliance::Chaos,
        enemy_types: &["Chaos Space Marine", "Cultist"],
        event: None,
        energy_cost: 6,
        daily_battle_count: 10,
    },
    CampaignRow {
        id: "Adeptus Mechanicus",
        campaign_type: CampaignType::Standard,
        ally_faction: "Adeptus Mechanicus",
        ally_alliance: Alliance::Imperial,
        enemy_faction: "Death Guard",
        enemy_alliance: Alliance::Chaos,
        enemy_types: &["Plague Marine", "Poxwalker"],
        event: Some("AdMech"),
        energy_cost: 5,
        daily_battle_count: 5,
    },
];

/// (battle id, campaign, node, guaranteed drops, potential drops as (id, numerator, denominator))
type BattleRow = (
    &'static str,
    &'static str,
    u32,
    &'static [&'static str],
    &'static [(&'static str, u32, u32)],
);

const BATTLES: [BattleRow; 20] = [
    ("IN01", "Indomitus", 1, &[], &[("stim_pack", 1, 3)]),
    ("IN02", "Indomitus", 2, &[], &[("bolt_shells", 3, 10)]),
    ("IN03", "Indomitus", 3, &[], &[("flak_plating", 3, 10)]),
    ("IN04", "Indomitus", 4, &[], &[("stim_pack", 3, 10), ("servo_skull", 1, 10)]),
    ("IN05", "Indomitus", 5, &[], &[("bolt_shells", 1, 3), ("plasma_coil", 1, 8)]),
    ("IN06", "Indomitus", 6, &[], &[("servo_skull", 3, 20), ("flak_plating", 1, 4)]),
    ("IM01", "Indomitus Mirror", 1, &[], &[("plasma_coil", 3, 20)]),
    ("IM02", "Indomitus Mirror", 2, &[], &[("servo_skull", 1, 5)]),
    ("IM03", "Indomitus Mirror", 3, &[], &[("stim_pack", 2, 5)]),
    ("IM04", "Indomitus Mirror", 4, &[], &[("adamantium_plate", 1, 12)]),
    ("IE01", "Indomitus Elite", 1, &[], &[("adamantium_plate", 1, 6)]),
    ("IE02", "Indomitus Elite", 2, &["shards_calgar"], &[("plasma_coil", 1, 4)]),
    ("IE03", "Indomitus Elite", 3, &[], &[("shards_ragnar", 1, 2), ("adamantium_plate", 1, 5)]),
    ("FC01", "Fall of Cadia", 1, &[], &[("bolt_shells", 1, 4)]),
    ("FC02", "Fall of Cadia", 2, &[], &[("flak_plating", 1, 3)]),
    ("FC03", "Fall of Cadia", 3, &[], &[("adamantium_plate", 1, 15)]),
    ("FC04", "Fall of Cadia", 4, &[], &[("stim_pack", 1, 4)]),
    ("AM01", "Adeptus Mechanicus", 1, &[], &[("servo_skull", 1, 4)]),
    ("AM02", "Adeptus Mechanicus", 2, &[], &[("plasma_coil", 1, 5), ("shards_galatian", 1, 3)]),
    ("AM03", "Adeptus Mechanicus", 3, &[], &[("adamantium_plate", 1, 8)]),
];

fn battle(row: &BattleRow, info: &CampaignRow) -> BattleDef {
    let (id, campaign, node, guaranteed, potential) = *row;
    BattleDef {
        id: id.to_string(),
        campaign: campaign.to_string(),
        campaign_type: info.campaign_type,
        node_number: node,
        energy_cost: info.energy_cost,
        daily_battle_count: info.daily_battle_count,
        rewards: BattleRewards {
            guaranteed: guaranteed
                .iter()
                .map(|g| GuaranteedReward {
                    id: g.to_string(),
                    min: 1,
                    max: 1,
                })
                .collect(),
            potential: potential
                .iter()
                .map(|(reward, numerator, denominator)| PotentialReward {
                    id: reward.to_string(),
                    chance_numerator: *numerator,
                    chance_denominator: *denominator,
                    effective_rate: *numerator as f64 / *denominator as f64,
                })
                .collect(),
        },
        slots: Some(if node > 2 { 5 } else { 4 }),
        enemies_factions: vec![info.enemy_faction.to_string()],
        enemies_alliances: vec![info.enemy_alliance],
        enemies_total: Some(node + 3),
        enemies_types: info.enemy_types.iter().map(|t| t.to_string()).collect(),
    }
}

fn unit(id: &str, name: &str, faction: &str, rarity: Rarity, is_mow: bool) -> UnitDef {
    UnitDef {
        id: id.to_string(),
        name: name.to_string(),
        faction: faction.to_string(),
        alliance: Alliance::Imperial,
        rarity,
        is_mow,
    }
}

fn ranks(rows: &[&[&str]]) -> BTreeMap<u8, Vec<String>> {
    rows.iter()
        .enumerate()
        .map(|(i, upgrades)| (i as u8 + 1, upgrades.iter().map(|u| u.to_string()).collect()))
        .collect()
}

fn ability_levels() -> Vec<AbilityLevel> {
    (2..=12)
        .map(|level| AbilityLevel {
            level,
            gold: level * level * 50,
            badges: 1 + level % 3,
            badge_rarity: match level {
                2..=4 => Rarity::Common,
                5..=7 => Rarity::Uncommon,
                8..=10 => Rarity::Rare,
                _ => Rarity::Epic,
            },
        })
        .collect()
}

fn mow_levels() -> Vec<MowLevel> {
    let upgrades: [(&[&str], &[&str]); 4] = [
        (&["bolt_shells"], &["flak_plating"]),
        (&["field_medkit"], &["stim_pack", "bolt_shells"]),
        (&["targeting_auspex"], &["field_medkit"]),
        (&["ceramite_plating", "plasma_coil"], &["targeting_auspex"]),
    ];
    upgrades
        .iter()
        .enumerate()
        .map(|(i, (primary, secondary))| {
            let level = i as u32 + 2;
            MowLevel {
                level,
                components: level * 2,
                gold: level * 500,
                badges: level - 1,
                badge_rarity: if level < 4 { Rarity::Common } else { Rarity::Uncommon },
                salvage: if level < 4 { 0 } else { level * 5 },
                primary_upgrades: primary.iter().map(|u| u.to_string()).collect(),
                secondary_upgrades: secondary.iter().map(|u| u.to_string()).collect(),
            }
        })
        .collect()
}

fn onslaught_track(sectors: &[&[u32]]) -> OnslaughtTrack {
    let badge = [Rarity::Common, Rarity::Uncommon, Rarity::Rare];
    OnslaughtTrack {
        sectors: sectors
            .iter()
            .enumerate()
            .map(|(sector, zones)| {
                zones
                    .iter()
                    .map(|enemies| Killzone {
                        total_enemy_count: *enemies,
                        waves: enemies.div_ceil(2),
                        total_xp: enemies * 25,
                        badge_counts_by_rarity: BTreeMap::from([(badge[sector.min(2)], 1)]),
                    })
                    .collect()
            })
            .collect(),
    }
}

fn onslaught() -> OnslaughtData {
    OnslaughtData {
        tracks: BTreeMap::from([
            (Alliance::Imperial, onslaught_track(&[&[3, 5], &[3, 5, 2], &[4, 6, 1]])),
            (Alliance::Xenos, onslaught_track(&[&[1, 9], &[2, 2, 8]])),
            (Alliance::Chaos, onslaught_track(&[&[7, 1], &[6]])),
        ]),
    }
}

/// The built-in sample tables, without synthesized shard materials
pub fn sample_static_data() -> StaticData {
    let campaigns: HashMap<String, CampaignDef> = CAMPAIGNS
        .iter()
        .map(|c| {
            let def = CampaignDef {
                id: c.id.to_string(),
                name: c.id.to_string(),
                ally_faction: c.ally_faction.to_string(),
                ally_alliance: c.ally_alliance,
                event: c.event.map(str::to_string),
            };
            (def.id.clone(), def)
        })
        .collect();

    let battles = BATTLES
        .iter()
        .filter_map(|row| CAMPAIGNS.iter().find(|c| c.id == row.1).map(|info| battle(row, info)))
        .collect();

    let units = [
        unit("calgar", "Marneus Calgar", "Ultramarines", Rarity::Legendary, false),
        unit("ragnar", "Ragnar Blackmane", "Space Wolves", Rarity::Rare, false),
        unit("galatian", "Galatian", "Adeptus Mechanicus", Rarity::Epic, true),
    ]
    .into_iter()
    .map(|u| (u.id.clone(), u))
    .collect();

    let rank_upgrades = HashMap::from([
        (
            "calgar".to_string(),
            ranks(&[
                &[
                    "stim_pack",
                    "bolt_shells",
                    "flak_plating",
                    "servo_skull",
                    "plasma_coil",
                    "field_medkit",
                ],
                &[
                    "field_medkit",
                    "bolt_shells",
                    "flak_plating",
                    "stim_pack",
                    "plasma_coil",
                    "servo_skull",
                ],
                &[
                    "targeting_auspex",
                    "field_medkit",
                    "ceramite_plating",
                    "servo_skull",
                    "plasma_coil",
                    "flak_plating",
                ],
                &[
                    "master_crafted_bolter",
                    "ceramite_plating",
                    "targeting_auspex",
                    "field_medkit",
                    "adamantium_plate",
                    "plasma_coil",
                ],
                &[
                    "relic_aquila",
                    "master_crafted_bolter",
                    "ceramite_plating",
                    "targeting_auspex",
                    "field_medkit",
                    "adamantium_plate",
                ],
            ]),
        ),
        (
            "ragnar".to_string(),
            ranks(&[
                &[
                    "bolt_shells",
                    "stim_pack",
                    "flak_plating",
                    "plasma_coil",
                    "servo_skull",
                    "bolt_shells",
                ],
                &[
                    "plasma_coil",
                    "field_medkit",
                    "bolt_shells",
                    "flak_plating",
                    "stim_pack",
                    "servo_skull",
                ],
                &[
                    "targeting_auspex",
                    "ceramite_plating",
                    "field_medkit",
                    "plasma_coil",
                    "flak_plating",
                    "servo_skull",
                ],
            ]),
        ),
    ]);

    StaticData {
        materials: materials().into_iter().map(|m| (m.id.clone(), m)).collect(),
        campaigns,
        battles,
        units,
        rank_upgrades,
        ability_levels: ability_levels(),
        mow_levels: HashMap::from([("galatian".to_string(), mow_levels())]),
        onslaught: onslaught(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_recipe_line_names_a_known_material() {
        let data = sample_static_data();
        for def in data.materials.values() {
            for line in &def.recipe {
                assert!(
                    data.materials.contains_key(&line.material),
                    "{} -> {}",
                    def.id,
                    line.material
                );
            }
        }
    }

    #[test]
    fn every_battle_belongs_to_a_campaign() {
        let data = sample_static_data();
        assert_eq!(data.battles.len(), BATTLES.len());
        assert!(data.battles.iter().all(|b| data.campaigns.contains_key(&b.campaign)));
    }

    #[test]
    fn only_the_event_campaign_is_tagged() {
        let data = sample_static_data();
        let events: Vec<_> = data.campaigns.values().filter_map(|c| c.event.as_deref()).collect();
        assert_eq!(events, vec!["AdMech"]);
    }
}
