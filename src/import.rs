//! JSON fixture import
//!
//! Walks a directory for game-data exports (recipes, battles, campaigns,
//! units, rank upgrades, abilities, machine-of-war levels, onslaught) and
//! loads them into the static tables.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use regex::Regex;
use rusqlite::Connection;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::db;
use crate::goals::RANK_NAMES;
use crate::models::{
    AbilityLevel, Alliance, BattleDef, BattleRewards, CampaignDef, CampaignType, GuaranteedReward,
    MaterialDef, MowLevel, PotentialReward, Rarity, RecipeLine, StaticData, UnitDef, UpgradeStat,
};
use crate::onslaught::OnslaughtData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FixtureKind {
    Recipes,
    Campaigns,
    Battles,
    Units,
    RankUpgrades,
    Abilities,
    Mow,
    Onslaught,
}

impl FixtureKind {
    /// Match a fixture file name such as `battles.json` or `rankUpgrades.v2.json`
    pub fn from_file_name(re: &Regex, name: &str) -> Option<Self> {
        let cap = re.captures(name)?;
        let kind = match cap[1].to_lowercase().replace('_', "").as_str() {
            "recipes" => Self::Recipes,
            "campaigns" => Self::Campaigns,
            "battles" => Self::Battles,
            "units" => Self::Units,
            "rankupgrades" => Self::RankUpgrades,
            "abilities" => Self::Abilities,
            "mow" => Self::Mow,
            "onslaught" => Self::Onslaught,
            _ => return None,
        };
        Some(kind)
    }
}

pub fn fixture_name_regex() -> Result<Regex> {
    Ok(Regex::new(concat!(
        r"(?i)^(recipes|campaigns|battles|units|rank_?upgrades|abilities|mow|onslaught)",
        r"(?:\.v?\d+)?\.json$",
    ))?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeFixture {
    #[serde(default)]
    label: Option<String>,
    rarity: Rarity,
    stat: UpgradeStat,
    #[serde(default)]
    craftable: Option<bool>,
    #[serde(default)]
    recipe: Vec<RecipeLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CampaignFixture {
    id: String,
    #[serde(default)]
    name: Option<String>,
    ally_faction: String,
    ally_alliance: Alliance,
    #[serde(default)]
    event: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PotentialFixture {
    id: String,
    chance_numerator: u32,
    chance_denominator: u32,
    #[serde(default)]
    effective_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RewardsFixture {
    guaranteed: Vec<GuaranteedReward>,
    potential: Vec<PotentialFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BattleFixture {
    campaign: String,
    campaign_type: CampaignType,
    #[serde(default)]
    node_number: Option<u32>,
    energy_cost: u32,
    daily_battle_count: u32,
    #[serde(default)]
    rewards: RewardsFixture,
    #[serde(default)]
    slots: Option<u8>,
    #[serde(default)]
    enemies_factions: Vec<String>,
    #[serde(default)]
    enemies_alliances: Vec<Alliance>,
    #[serde(default)]
    enemies_total: Option<u32>,
    #[serde(default)]
    enemies_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitFixture {
    id: String,
    name: String,
    faction: String,
    alliance: Alliance,
    rarity: Rarity,
    #[serde(default)]
    is_mow: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbilityFixture {
    level: u32,
    gold: u32,
    badges: u32,
    badge_rarity: Rarity,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MowFixture {
    level: u32,
    #[serde(default)]
    components: u32,
    #[serde(default)]
    gold: u32,
    #[serde(default)]
    badges: u32,
    badge_rarity: Rarity,
    #[serde(default)]
    salvage: u32,
    #[serde(default)]
    primary_upgrades: Vec<String>,
    #[serde(default)]
    secondary_upgrades: Vec<String>,
}

/// Node number from the trailing digits of a battle id, e.g. `IN12` -> 12
pub fn node_number_from_id(re: &Regex, id: &str) -> Option<u32> {
    re.captures(id)?.get(2)?.as_str().parse().ok()
}

/// Rank key as a number (`"4"`) or a display name (`"Iron I"`)
pub fn parse_rank(key: &str) -> Option<u8> {
    if let Ok(rank) = key.trim().parse::<u8>() {
        return Some(rank);
    }
    RANK_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(key.trim()))
        .map(|rank| rank as u8)
}

/// Find fixture files under `dir`, in file name order
pub fn find_fixture_files(dir: &Path) -> Result<Vec<(FixtureKind, PathBuf)>> {
    let re = fixture_name_regex()?;
    let mut fixtures = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if let Some(kind) = FixtureKind::from_file_name(&re, name) {
            fixtures.push((kind, path.to_path_buf()));
        }
    }

    fixtures.sort_by_key(|(kind, _)| *kind);
    Ok(fixtures)
}

/// Parse one fixture into `data`, returning how many records it held
pub fn load_fixture(kind: FixtureKind, content: &str, data: &mut StaticData) -> Result<usize> {
    let count = match kind {
        FixtureKind::Recipes => {
            let fixtures: BTreeMap<String, RecipeFixture> = serde_json::from_str(content)?;
            let count = fixtures.len();
            for (id, fixture) in fixtures {
                let craftable = fixture.craftable.unwrap_or(!fixture.recipe.is_empty());
                data.materials.insert(
                    id.clone(),
                    MaterialDef {
                        label: fixture.label.unwrap_or_else(|| id.clone()),
                        id,
                        rarity: fixture.rarity,
                        stat: fixture.stat,
                        craftable,
                        recipe: fixture.recipe,
                    },
                );
            }
            count
        }

        FixtureKind::Campaigns => {
            let fixtures: Vec<CampaignFixture> = serde_json::from_str(content)?;
            let count = fixtures.len();
            for c in fixtures {
                data.campaigns.insert(
                    c.id.clone(),
                    CampaignDef {
                        name: c.name.unwrap_or_else(|| c.id.clone()),
                        id: c.id,
                        ally_faction: c.ally_faction,
                        ally_alliance: c.ally_alliance,
                        event: c.event,
                    },
                );
            }
            count
        }

        FixtureKind::Battles => {
            let node_re = Regex::new(r"^(.*?)(\d+)$")?;
            let fixtures: BTreeMap<String, BattleFixture> = serde_json::from_str(content)?;
            let count = fixtures.len();
            for (id, b) in fixtures {
                let node_number =
                    b.node_number.or_else(|| node_number_from_id(&node_re, &id));
                let node_number = match node_number {
                    Some(node) => node,
                    None => {
                        warn!("Battle {} has no node number, using 0", id);
                        0
                    }
                };
                data.battles.push(BattleDef {
                    id,
                    campaign: b.campaign,
                    campaign_type: b.campaign_type,
                    node_number,
                    energy_cost: b.energy_cost,
                    daily_battle_count: b.daily_battle_count,
                    rewards: BattleRewards {
                        guaranteed: b.rewards.guaranteed,
                        potential: b
                            .rewards
                            .potential
                            .into_iter()
                            .map(|p| PotentialReward {
                                effective_rate: p.effective_rate.unwrap_or_else(|| {
                                    p.chance_numerator as f64 / p.chance_denominator.max(1) as f64
                                }),
                                id: p.id,
                                chance_numerator: p.chance_numerator,
                                chance_denominator: p.chance_denominator,
                            })
                            .collect(),
                    },
                    slots: b.slots,
                    enemies_factions: b.enemies_factions,
                    enemies_alliances: b.enemies_alliances,
                    enemies_total: b.enemies_total,
                    enemies_types: b.enemies_types,
                });
            }
            count
        }

        FixtureKind::Units => {
            let fixtures: Vec<UnitFixture> = serde_json::from_str(content)?;
            let count = fixtures.len();
            for u in fixtures {
                data.units.insert(
                    u.id.clone(),
                    UnitDef {
                        id: u.id,
                        name: u.name,
                        faction: u.faction,
                        alliance: u.alliance,
                        rarity: u.rarity,
                        is_mow: u.is_mow,
                    },
                );
            }
            count
        }

        FixtureKind::RankUpgrades => {
            let fixtures: HashMap<String, BTreeMap<String, Vec<String>>> =
                serde_json::from_str(content)?;
            let mut count = 0;
            for (unit, ranks) in fixtures {
                let entry = data.rank_upgrades.entry(unit.clone()).or_default();
                for (key, upgrades) in ranks {
                    match parse_rank(&key) {
                        Some(rank) => {
                            entry.insert(rank, upgrades);
                            count += 1;
                        }
                        None => warn!("Unknown rank '{}' for {}", key, unit),
                    }
                }
            }
            count
        }

        FixtureKind::Abilities => {
            let fixtures: Vec<AbilityFixture> = serde_json::from_str(content)?;
            let count = fixtures.len();
            data.ability_levels.extend(fixtures.into_iter().map(|a| AbilityLevel {
                level: a.level,
                gold: a.gold,
                badges: a.badges,
                badge_rarity: a.badge_rarity,
            }));
            data.ability_levels.sort_by_key(|l| l.level);
            count
        }

        FixtureKind::Mow => {
            let fixtures: HashMap<String, Vec<MowFixture>> = serde_json::from_str(content)?;
            let mut count = 0;
            for (unit, levels) in fixtures {
                count += levels.len();
                let entry = data.mow_levels.entry(unit).or_default();
                entry.extend(levels.into_iter().map(|m| MowLevel {
                    level: m.level,
                    components: m.components,
                    gold: m.gold,
                    badges: m.badges,
                    badge_rarity: m.badge_rarity,
                    salvage: m.salvage,
                    primary_upgrades: m.primary_upgrades,
                    secondary_upgrades: m.secondary_upgrades,
                }));
                entry.sort_by_key(|l| l.level);
            }
            count
        }

        FixtureKind::Onslaught => {
            let onslaught: OnslaughtData = serde_json::from_str(content)?;
            let count = onslaught
                .tracks
                .values()
                .map(|t| t.sectors.iter().map(Vec::len).sum::<usize>())
                .sum();
            data.onslaught.tracks.extend(onslaught.tracks);
            count
        }
    };
    Ok(count)
}

/// Read every fixture under `dir` into memory
pub fn read_fixtures(dir: &Path) -> Result<(StaticData, ImportStats)> {
    let mut data = StaticData::default();
    let mut stats = ImportStats::default();

    let fixtures = find_fixture_files(dir)?;
    info!("Found {} fixture files in {}", fixtures.len(), dir.display());

    for (kind, path) in &fixtures {
        let loaded = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|content| {
                load_fixture(*kind, &content, &mut data)
                    .with_context(|| format!("Failed to parse {}", path.display()))
            });
        match loaded {
            Ok(count) => {
                stats.files += 1;
                stats.records += count;
                info!("  Loaded {:?} from {} ({} records)", kind, path.display(), count);
            }
            Err(e) => {
                warn!("{:#}", e);
                stats.errors += 1;
            }
        }
    }

    stats.materials = data.materials.len();
    stats.battles = data.battles.len();
    stats.units = data.units.len();
    Ok((data, stats))
}

/// Import every fixture under `dir` into the database
pub fn import_to_database(conn: &Connection, dir: &Path) -> Result<ImportStats> {
    let (data, stats) = read_fixtures(dir)?;
    db::save_static_data(conn, &data)?;
    Ok(stats)
}

#[derive(Debug, Default)]
pub struct ImportStats {
    pub files: usize,
    pub records: usize,
    pub materials: usize,
    pub battles: usize,
    pub units: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} files ({} records: {} materials, {} battles, {} units). Errors: {}",
            self.files, self.records, self.materials, self.battles, self.units, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("raid-planner-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("nested")).unwrap();
        dir
    }

    #[test]
    fn file_names_match_with_optional_version() {
        let re = fixture_name_regex().unwrap();
        assert_eq!(FixtureKind::from_file_name(&re, "battles.json"), Some(FixtureKind::Battles));
        assert_eq!(
            FixtureKind::from_file_name(&re, "rankUpgrades.v2.json"),
            Some(FixtureKind::RankUpgrades)
        );
        assert_eq!(
            FixtureKind::from_file_name(&re, "rank_upgrades.json"),
            Some(FixtureKind::RankUpgrades)
        );
        assert_eq!(FixtureKind::from_file_name(&re, "battles.txt"), None);
        assert_eq!(FixtureKind::from_file_name(&re, "old_battles.json"), None);
    }

    #[test]
    fn node_numbers_come_from_trailing_digits() {
        let re = Regex::new(r"^(.*?)(\d+)$").unwrap();
        assert_eq!(node_number_from_id(&re, "IN12"), Some(12));
        assert_eq!(node_number_from_id(&re, "AM1E03"), Some(3));
        assert_eq!(node_number_from_id(&re, "boss"), None);
    }

    #[test]
    fn ranks_parse_by_number_or_name() {
        assert_eq!(parse_rank("4"), Some(4));
        assert_eq!(parse_rank("iron i"), Some(4));
        assert_eq!(parse_rank("Plastic"), None);
    }

    #[test]
    fn battles_fixture_derives_missing_fields() {
        let json = r#"{
            "IN07": {
                "campaign": "Indomitus",
                "campaignType": "Normal",
                "energyCost": 6,
                "dailyBattleCount": 10,
                "rewards": {
                    "potential": [
                        { "id": "stim_pack", "chanceNumerator": 1, "chanceDenominator": 4 }
                    ]
                }
            }
        }"#;
        let mut data = StaticData::default();
        assert_eq!(load_fixture(FixtureKind::Battles, json, &mut data).unwrap(), 1);

        let battle = &data.battles[0];
        assert_eq!(battle.node_number, 7);
        assert_eq!(battle.rewards.potential[0].effective_rate, 0.25);
        assert!(battle.enemies_total.is_none());
    }

    #[test]
    fn directory_import_reaches_the_database() {
        let dir = fixture_dir("import");
        fs::write(
            dir.join("recipes.json"),
            r#"{
                "stim_pack": { "label": "Stim Pack", "rarity": "Common", "stat": "Health" },
                "field_medkit": { "rarity": "Uncommon", "stat": "Health",
                    "recipe": [{ "material": "stim_pack", "count": 2 }] }
            }"#,
        )
        .unwrap();
        fs::write(
            dir.join("nested").join("campaigns.v3.json"),
            r#"[{ "id": "Indomitus", "allyFaction": "Ultramarines", "allyAlliance": "Imperial" }]"#,
        )
        .unwrap();
        fs::write(
            dir.join("rankUpgrades.json"),
            r#"{ "calgar": { "Stone I": ["stim_pack"], "2": ["field_medkit", "stim_pack"] } }"#,
        )
        .unwrap();
        fs::write(dir.join("units.json"), "not json").unwrap();
        fs::write(dir.join("notes.json"), "{}").unwrap();

        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let stats = import_to_database(&conn, &dir).unwrap();
        assert_eq!(stats.files, 3);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.materials, 2);

        let loaded = db::load_static_data(&conn).unwrap();
        assert!(loaded.materials["field_medkit"].craftable);
        assert_eq!(loaded.materials["field_medkit"].label, "field_medkit");
        assert_eq!(loaded.campaigns["Indomitus"].name, "Indomitus");
        assert_eq!(loaded.rank_upgrades["calgar"][&2].len(), 2);
        assert_eq!(loaded.rank_upgrades["calgar"][&1], vec!["stim_pack".to_string()]);

        let _ = fs::remove_dir_all(&dir);
    }
}
