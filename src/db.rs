//! Database schema and operations

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use anyhow::{Context, Result};
use log::debug;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{
    AbilityLevel, BattleDef, BattleRewards, CampaignDef, GuaranteedReward, MaterialDef, MowLevel,
    ParseLabelError, PotentialReward, Rarity, RecipeLine, StaticData, UnitDef,
};
use crate::onslaught::{Killzone, OnslaughtTrack};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Upgrade materials, base and craftable
        CREATE TABLE IF NOT EXISTS materials (
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            rarity TEXT NOT NULL,
            stat TEXT NOT NULL,
            craftable INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipe_lines (
            material_id TEXT,
            ingredient_id TEXT,
            count INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (material_id, ingredient_id)
        );

        CREATE TABLE IF NOT EXISTS campaigns (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            ally_faction TEXT NOT NULL,
            ally_alliance TEXT NOT NULL,
            event TEXT
        );

        -- Campaign battle nodes; list columns are comma separated
        CREATE TABLE IF NOT EXISTS battles (
            id TEXT PRIMARY KEY,
            campaign TEXT NOT NULL,
            campaign_type TEXT NOT NULL,
            node_number INTEGER NOT NULL,
            energy_cost INTEGER NOT NULL,
            daily_battle_count INTEGER NOT NULL,
            slots INTEGER,
            enemies_total INTEGER,
            enemies_factions TEXT NOT NULL DEFAULT '',
            enemies_alliances TEXT NOT NULL DEFAULT '',
            enemies_types TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS battle_rewards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            battle_id TEXT NOT NULL,
            material_id TEXT NOT NULL,
            guaranteed INTEGER NOT NULL,
            min_count INTEGER,
            max_count INTEGER,
            chance_numerator INTEGER,
            chance_denominator INTEGER,
            effective_rate REAL
        );

        CREATE TABLE IF NOT EXISTS units (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            faction TEXT NOT NULL,
            alliance TEXT NOT NULL,
            rarity TEXT NOT NULL,
            is_mow INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rank_upgrades (
            unit_id TEXT,
            rank INTEGER,
            position INTEGER,
            material_id TEXT NOT NULL,
            PRIMARY KEY (unit_id, rank, position)
        );

        CREATE TABLE IF NOT EXISTS ability_levels (
            level INTEGER PRIMARY KEY,
            gold INTEGER NOT NULL,
            badges INTEGER NOT NULL,
            badge_rarity TEXT NOT NULL
        );

        -- Machine of war ability levels and the materials each level consumes
        CREATE TABLE IF NOT EXISTS mow_levels (
            unit_id TEXT,
            level INTEGER,
            components INTEGER NOT NULL,
            gold INTEGER NOT NULL,
            badges INTEGER NOT NULL,
            badge_rarity TEXT NOT NULL,
            salvage INTEGER NOT NULL,
            PRIMARY KEY (unit_id, level)
        );

        CREATE TABLE IF NOT EXISTS mow_upgrades (
            unit_id TEXT,
            level INTEGER,
            secondary INTEGER,
            position INTEGER,
            material_id TEXT NOT NULL,
            PRIMARY KEY (unit_id, level, secondary, position)
        );

        CREATE TABLE IF NOT EXISTS onslaught_killzones (
            track TEXT,
            sector INTEGER,
            zone INTEGER,
            total_enemy_count INTEGER NOT NULL,
            waves INTEGER NOT NULL,
            total_xp INTEGER NOT NULL,
            PRIMARY KEY (track, sector, zone)
        );

        CREATE TABLE IF NOT EXISTS onslaught_badges (
            track TEXT,
            sector INTEGER,
            zone INTEGER,
            rarity TEXT,
            count INTEGER NOT NULL,
            PRIMARY KEY (track, sector, zone, rarity)
        );

        CREATE INDEX IF NOT EXISTS idx_battle_rewards_battle ON battle_rewards(battle_id);
        CREATE INDEX IF NOT EXISTS idx_battle_rewards_material ON battle_rewards(material_id);
        "#,
    )?;
    Ok(())
}

/// Clear all static game data (for re-import)
pub fn clear_static_data(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM onslaught_badges;
        DELETE FROM onslaught_killzones;
        DELETE FROM mow_upgrades;
        DELETE FROM mow_levels;
        DELETE FROM ability_levels;
        DELETE FROM rank_upgrades;
        DELETE FROM units;
        DELETE FROM battle_rewards;
        DELETE FROM battles;
        DELETE FROM campaigns;
        DELETE FROM recipe_lines;
        DELETE FROM materials;
        "#,
    )?;
    Ok(())
}

fn join_list<T: ToString>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a text column holding an enum label
fn label<T: FromStr<Err = ParseLabelError>>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn label_list<T: FromStr<Err = ParseLabelError>>(
    row: &Row,
    idx: usize,
) -> rusqlite::Result<Vec<T>> {
    let text: String = row.get(idx)?;
    split_list(&text)
        .iter()
        .map(|s| s.parse())
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Insert or replace a material together with its recipe
pub fn upsert_material(conn: &Connection, material: &MaterialDef) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO materials (id, label, rarity, stat, craftable)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &material.id,
            &material.label,
            material.rarity.as_str(),
            material.stat.as_str(),
            material.craftable,
        ),
    )?;
    conn.execute("DELETE FROM recipe_lines WHERE material_id = ?1", [&material.id])?;
    for (position, line) in material.recipe.iter().enumerate() {
        conn.execute(
            "INSERT OR REPLACE INTO recipe_lines (material_id, ingredient_id, count, position)
             VALUES (?1, ?2, ?3, ?4)",
            (&material.id, &line.material, line.count, position as i64),
        )?;
    }
    Ok(())
}

pub fn upsert_campaign(conn: &Connection, campaign: &CampaignDef) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO campaigns (id, name, ally_faction, ally_alliance, event)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &campaign.id,
            &campaign.name,
            &campaign.ally_faction,
            campaign.ally_alliance.as_str(),
            &campaign.event,
        ),
    )?;
    Ok(())
}

/// Insert or replace a battle node and its rewards
pub fn upsert_battle(conn: &Connection, battle: &BattleDef) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO battles (id, campaign, campaign_type, node_number, energy_cost,
             daily_battle_count, slots, enemies_total, enemies_factions, enemies_alliances,
             enemies_types)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        (
            &battle.id,
            &battle.campaign,
            battle.campaign_type.as_str(),
            battle.node_number,
            battle.energy_cost,
            battle.daily_battle_count,
            battle.slots,
            battle.enemies_total,
            join_list(&battle.enemies_factions),
            join_list(&battle.enemies_alliances),
            join_list(&battle.enemies_types),
        ),
    )?;

    conn.execute("DELETE FROM battle_rewards WHERE battle_id = ?1", [&battle.id])?;
    for reward in &battle.rewards.guaranteed {
        conn.execute(
            "INSERT INTO battle_rewards (battle_id, material_id, guaranteed, min_count, max_count)
             VALUES (?1, ?2, 1, ?3, ?4)",
            (&battle.id, &reward.id, reward.min, reward.max),
        )?;
    }
    for reward in &battle.rewards.potential {
        conn.execute(
            "INSERT INTO battle_rewards (battle_id, material_id, guaranteed, chance_numerator,
                 chance_denominator, effective_rate)
             VALUES (?1, ?2, 0, ?3, ?4, ?5)",
            (
                &battle.id,
                &reward.id,
                reward.chance_numerator,
                reward.chance_denominator,
                reward.effective_rate,
            ),
        )?;
    }
    Ok(())
}

pub fn upsert_unit(conn: &Connection, unit: &UnitDef) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO units (id, name, faction, alliance, rarity, is_mow)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            &unit.id,
            &unit.name,
            &unit.faction,
            unit.alliance.as_str(),
            unit.rarity.as_str(),
            unit.is_mow,
        ),
    )?;
    Ok(())
}

/// Replace the upgrades a unit needs at one rank
pub fn set_rank_upgrades(
    conn: &Connection,
    unit_id: &str,
    rank: u8,
    upgrades: &[String],
) -> Result<()> {
    conn.execute(
        "DELETE FROM rank_upgrades WHERE unit_id = ?1 AND rank = ?2",
        (unit_id, rank),
    )?;
    for (position, material) in upgrades.iter().enumerate() {
        conn.execute(
            "INSERT INTO rank_upgrades (unit_id, rank, position, material_id)
             VALUES (?1, ?2, ?3, ?4)",
            (unit_id, rank, position as i64, material),
        )?;
    }
    Ok(())
}

pub fn upsert_ability_level(conn: &Connection, level: &AbilityLevel) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO ability_levels (level, gold, badges, badge_rarity)
         VALUES (?1, ?2, ?3, ?4)",
        (level.level, level.gold, level.badges, level.badge_rarity.as_str()),
    )?;
    Ok(())
}

pub fn upsert_mow_level(conn: &Connection, unit_id: &str, level: &MowLevel) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO mow_levels
             (unit_id, level, components, gold, badges, badge_rarity, salvage)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            unit_id,
            level.level,
            level.components,
            level.gold,
            level.badges,
            level.badge_rarity.as_str(),
            level.salvage,
        ),
    )?;
    conn.execute(
        "DELETE FROM mow_upgrades WHERE unit_id = ?1 AND level = ?2",
        (unit_id, level.level),
    )?;
    let lists = [(false, &level.primary_upgrades), (true, &level.secondary_upgrades)];
    for (secondary, upgrades) in lists {
        for (position, material) in upgrades.iter().enumerate() {
            conn.execute(
                "INSERT INTO mow_upgrades (unit_id, level, secondary, position, material_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (unit_id, level.level, secondary, position as i64, material),
            )?;
        }
    }
    Ok(())
}

pub fn upsert_killzone(
    conn: &Connection,
    track: &str,
    sector: usize,
    zone: usize,
    killzone: &Killzone,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO onslaught_killzones
             (track, sector, zone, total_enemy_count, waves, total_xp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            track,
            sector as i64,
            zone as i64,
            killzone.total_enemy_count,
            killzone.waves,
            killzone.total_xp,
        ),
    )?;
    conn.execute(
        "DELETE FROM onslaught_badges WHERE track = ?1 AND sector = ?2 AND zone = ?3",
        (track, sector as i64, zone as i64),
    )?;
    for (rarity, count) in &killzone.badge_counts_by_rarity {
        conn.execute(
            "INSERT INTO onslaught_badges (track, sector, zone, rarity, count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (track, sector as i64, zone as i64, rarity.as_str(), count),
        )?;
    }
    Ok(())
}

/// Write every static table in one transaction
pub fn save_static_data(conn: &Connection, data: &StaticData) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    for material in data.materials.values() {
        upsert_material(&tx, material)?;
    }
    for campaign in data.campaigns.values() {
        upsert_campaign(&tx, campaign)?;
    }
    for battle in &data.battles {
        upsert_battle(&tx, battle)
            .with_context(|| format!("Failed to store battle {}", battle.id))?;
    }
    for unit in data.units.values() {
        upsert_unit(&tx, unit)?;
    }
    for (unit, ranks) in &data.rank_upgrades {
        for (rank, upgrades) in ranks {
            set_rank_upgrades(&tx, unit, *rank, upgrades)?;
        }
    }
    for level in &data.ability_levels {
        upsert_ability_level(&tx, level)?;
    }
    for (unit, levels) in &data.mow_levels {
        for level in levels {
            upsert_mow_level(&tx, unit, level)?;
        }
    }
    for (track, track_data) in &data.onslaught.tracks {
        for (sector, zones) in track_data.sectors.iter().enumerate() {
            for (zone, killzone) in zones.iter().enumerate() {
                upsert_killzone(&tx, track.as_str(), sector, zone, killzone)?;
            }
        }
    }

    tx.commit()?;
    Ok(())
}

fn material_from_row(row: &Row) -> rusqlite::Result<MaterialDef> {
    Ok(MaterialDef {
        id: row.get(0)?,
        label: row.get(1)?,
        rarity: label(row, 2)?,
        stat: label(row, 3)?,
        craftable: row.get(4)?,
        recipe: Vec::new(),
    })
}

fn recipe_for(conn: &Connection, material_id: &str) -> Result<Vec<RecipeLine>> {
    let mut stmt = conn.prepare(
        "SELECT ingredient_id, count FROM recipe_lines WHERE material_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map([material_id], |row| {
        Ok(RecipeLine {
            material: row.get(0)?,
            count: row.get(1)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// List all materials in the database
pub fn list_materials(conn: &Connection) -> Result<Vec<MaterialDef>> {
    let mut stmt =
        conn.prepare("SELECT id, label, rarity, stat, craftable FROM materials ORDER BY label")?;
    let rows = stmt.query_map([], material_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        let mut material = row?;
        material.recipe = recipe_for(conn, &material.id)?;
        results.push(material);
    }
    Ok(results)
}

/// Get a single material with its recipe
pub fn get_material(conn: &Connection, id: &str) -> Result<Option<MaterialDef>> {
    let material = conn
        .query_row(
            "SELECT id, label, rarity, stat, craftable FROM materials WHERE id = ?1",
            [id],
            material_from_row,
        )
        .optional()?;

    match material {
        Some(mut material) => {
            material.recipe = recipe_for(conn, &material.id)?;
            Ok(Some(material))
        }
        None => Ok(None),
    }
}

fn load_campaigns(conn: &Connection) -> Result<HashMap<String, CampaignDef>> {
    let mut stmt =
        conn.prepare("SELECT id, name, ally_faction, ally_alliance, event FROM campaigns")?;
    let rows = stmt.query_map([], |row| {
        Ok(CampaignDef {
            id: row.get(0)?,
            name: row.get(1)?,
            ally_faction: row.get(2)?,
            ally_alliance: label(row, 3)?,
            event: row.get(4)?,
        })
    })?;

    let mut results = HashMap::new();
    for row in rows {
        let campaign = row?;
        results.insert(campaign.id.clone(), campaign);
    }
    Ok(results)
}

fn load_rewards(conn: &Connection) -> Result<HashMap<String, BattleRewards>> {
    let mut stmt = conn.prepare(
        "SELECT battle_id, material_id, guaranteed, min_count, max_count, chance_numerator,
                chance_denominator, effective_rate
         FROM battle_rewards ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;

    let mut results: HashMap<String, BattleRewards> = HashMap::new();
    while let Some(row) = rows.next()? {
        let battle_id: String = row.get(0)?;
        let material: String = row.get(1)?;
        let rewards = results.entry(battle_id).or_default();
        if row.get::<_, bool>(2)? {
            rewards.guaranteed.push(GuaranteedReward {
                id: material,
                min: row.get::<_, Option<u32>>(3)?.unwrap_or(1),
                max: row.get::<_, Option<u32>>(4)?.unwrap_or(1),
            });
        } else {
            rewards.potential.push(PotentialReward {
                id: material,
                chance_numerator: row.get::<_, Option<u32>>(5)?.unwrap_or(0),
                chance_denominator: row.get::<_, Option<u32>>(6)?.unwrap_or(1),
                effective_rate: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
            });
        }
    }
    Ok(results)
}

fn load_battles(conn: &Connection) -> Result<Vec<BattleDef>> {
    let mut rewards = load_rewards(conn)?;
    let mut stmt = conn.prepare(
        "SELECT id, campaign, campaign_type, node_number, energy_cost, daily_battle_count, slots,
                enemies_total, enemies_factions, enemies_alliances, enemies_types
         FROM battles ORDER BY campaign, node_number",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(BattleDef {
            id: row.get(0)?,
            campaign: row.get(1)?,
            campaign_type: label(row, 2)?,
            node_number: row.get(3)?,
            energy_cost: row.get(4)?,
            daily_battle_count: row.get(5)?,
            rewards: BattleRewards::default(),
            slots: row.get(6)?,
            enemies_total: row.get(7)?,
            enemies_factions: split_list(&row.get::<_, String>(8)?),
            enemies_alliances: label_list(row, 9)?,
            enemies_types: split_list(&row.get::<_, String>(10)?),
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        let mut battle = row?;
        battle.rewards = rewards.remove(&battle.id).unwrap_or_default();
        results.push(battle);
    }
    Ok(results)
}

fn load_units(conn: &Connection) -> Result<HashMap<String, UnitDef>> {
    let mut stmt = conn.prepare("SELECT id, name, faction, alliance, rarity, is_mow FROM units")?;
    let rows = stmt.query_map([], |row| {
        Ok(UnitDef {
            id: row.get(0)?,
            name: row.get(1)?,
            faction: row.get(2)?,
            alliance: label(row, 3)?,
            rarity: label(row, 4)?,
            is_mow: row.get(5)?,
        })
    })?;

    let mut results = HashMap::new();
    for row in rows {
        let unit = row?;
        results.insert(unit.id.clone(), unit);
    }
    Ok(results)
}

fn load_rank_upgrades(conn: &Connection) -> Result<HashMap<String, BTreeMap<u8, Vec<String>>>> {
    let mut stmt = conn.prepare(
        "SELECT unit_id, rank, material_id FROM rank_upgrades ORDER BY unit_id, rank, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u8>(1)?, row.get::<_, String>(2)?))
    })?;

    let mut results: HashMap<String, BTreeMap<u8, Vec<String>>> = HashMap::new();
    for row in rows {
        let (unit, rank, material) = row?;
        results.entry(unit).or_default().entry(rank).or_default().push(material);
    }
    Ok(results)
}

fn load_ability_levels(conn: &Connection) -> Result<Vec<AbilityLevel>> {
    let mut stmt = conn.prepare(
        "SELECT level, gold, badges, badge_rarity FROM ability_levels ORDER BY level",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AbilityLevel {
            level: row.get(0)?,
            gold: row.get(1)?,
            badges: row.get(2)?,
            badge_rarity: label(row, 3)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn load_mow_levels(conn: &Connection) -> Result<HashMap<String, Vec<MowLevel>>> {
    let mut upgrades: HashMap<(String, u32, bool), Vec<String>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT unit_id, level, secondary, material_id FROM mow_upgrades
             ORDER BY unit_id, level, secondary, position",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            upgrades
                .entry((row.get(0)?, row.get(1)?, row.get(2)?))
                .or_default()
                .push(row.get(3)?);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT unit_id, level, components, gold, badges, badge_rarity, salvage FROM mow_levels
         ORDER BY unit_id, level",
    )?;
    let rows = stmt.query_map([], |row| {
        let unit: String = row.get(0)?;
        Ok((
            unit,
            MowLevel {
                level: row.get(1)?,
                components: row.get(2)?,
                gold: row.get(3)?,
                badges: row.get(4)?,
                badge_rarity: label(row, 5)?,
                salvage: row.get(6)?,
                primary_upgrades: Vec::new(),
                secondary_upgrades: Vec::new(),
            },
        ))
    })?;

    let mut results: HashMap<String, Vec<MowLevel>> = HashMap::new();
    for row in rows {
        let (unit, mut level) = row?;
        level.primary_upgrades = upgrades
            .remove(&(unit.clone(), level.level, false))
            .unwrap_or_default();
        level.secondary_upgrades = upgrades
            .remove(&(unit.clone(), level.level, true))
            .unwrap_or_default();
        results.entry(unit).or_default().push(level);
    }
    Ok(results)
}

fn load_onslaught(conn: &Connection, data: &mut StaticData) -> Result<()> {
    let mut badges: HashMap<(String, i64, i64), BTreeMap<Rarity, u32>> = HashMap::new();
    {
        let mut stmt =
            conn.prepare("SELECT track, sector, zone, rarity, count FROM onslaught_badges")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                (row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?),
                label::<Rarity>(row, 3)?,
                row.get::<_, u32>(4)?,
            ))
        })?;
        for row in rows {
            let (key, rarity, count) = row?;
            badges.entry(key).or_default().insert(rarity, count);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT track, sector, zone, total_enemy_count, waves, total_xp FROM onslaught_killzones
         ORDER BY track, sector, zone",
    )?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let track_name: String = row.get(0)?;
        let track = track_name
            .parse()
            .with_context(|| format!("Unknown onslaught track '{}'", track_name))?;
        let sector: i64 = row.get(1)?;
        let zone: i64 = row.get(2)?;

        let killzone = Killzone {
            total_enemy_count: row.get(3)?,
            waves: row.get(4)?,
            total_xp: row.get(5)?,
            badge_counts_by_rarity: badges.remove(&(track_name, sector, zone)).unwrap_or_default(),
        };

        let sector = sector as usize;
        let sectors = &mut data
            .onslaught
            .tracks
            .entry(track)
            .or_insert_with(OnslaughtTrack::default)
            .sectors;
        if sectors.len() <= sector {
            sectors.resize_with(sector + 1, Vec::new);
        }
        // zones are read in order, so pushing keeps their positions
        sectors[sector].push(killzone);
        debug!("Loaded killzone {:?} {}:{}", track, sector, zone);
    }
    Ok(())
}

/// Read every static table back into memory
pub fn load_static_data(conn: &Connection) -> Result<StaticData> {
    let mut data = StaticData {
        materials: list_materials(conn)?.into_iter().map(|m| (m.id.clone(), m)).collect(),
        campaigns: load_campaigns(conn)?,
        battles: load_battles(conn)?,
        units: load_units(conn)?,
        rank_upgrades: load_rank_upgrades(conn)?,
        ability_levels: load_ability_levels(conn)?,
        mow_levels: load_mow_levels(conn)?,
        ..Default::default()
    };
    load_onslaught(conn, &mut data)?;
    Ok(data)
}
