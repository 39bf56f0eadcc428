//! Data models for static Tacticus game tables

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::onslaught::OnslaughtData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeStat {
    Health,
    Damage,
    Armour,
    Shard,
}

impl UpgradeStat {
    pub fn as_str(self) -> &'static str {
        match self {
            UpgradeStat::Health => "Health",
            UpgradeStat::Damage => "Damage",
            UpgradeStat::Armour => "Armour",
            UpgradeStat::Shard => "Shard",
        }
    }
}

/// Difficulty or mode tier of a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CampaignType {
    Early,
    Normal,
    Mirror,
    Elite,
    Extremis,
    Standard,
    StandardChallenge,
}

impl CampaignType {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignType::Early => "Early",
            CampaignType::Normal => "Normal",
            CampaignType::Mirror => "Mirror",
            CampaignType::Elite => "Elite",
            CampaignType::Extremis => "Extremis",
            CampaignType::Standard => "Standard",
            CampaignType::StandardChallenge => "StandardChallenge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Alliance {
    Imperial,
    Xenos,
    Chaos,
}

impl Alliance {
    pub const ALL: [Alliance; 3] = [Alliance::Imperial, Alliance::Xenos, Alliance::Chaos];

    pub fn as_str(self) -> &'static str {
        match self {
            Alliance::Imperial => "Imperial",
            Alliance::Xenos => "Xenos",
            Alliance::Chaos => "Chaos",
        }
    }
}

/// Error returned when a stored enum label is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! impl_label {
    ($ty:ty, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = ParseLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case(stringify!($variant)) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(ParseLabelError { kind: $kind, value: s.to_string() })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_label!(Rarity, "rarity", [Common, Uncommon, Rare, Epic, Legendary, Mythic]);
impl_label!(UpgradeStat, "stat", [Health, Damage, Armour, Shard]);
impl_label!(
    CampaignType,
    "campaign type",
    [Early, Normal, Mirror, Elite, Extremis, Standard, StandardChallenge]
);
impl_label!(Alliance, "alliance", [Imperial, Xenos, Chaos]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub material: String,
    pub count: u32,
}

/// Upgrade material, either farmable (base) or crafted from a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub id: String,
    pub label: String,
    pub rarity: Rarity,
    pub stat: UpgradeStat,
    pub craftable: bool,
    pub recipe: Vec<RecipeLine>, // empty for base materials
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDef {
    pub id: String,
    pub name: String,
    pub ally_faction: String,
    pub ally_alliance: Alliance,
    pub event: Option<String>, // campaign-event group, None for permanent campaigns
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuaranteedReward {
    pub id: String,
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialReward {
    pub id: String,
    pub chance_numerator: u32,
    pub chance_denominator: u32,
    pub effective_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleRewards {
    pub guaranteed: Vec<GuaranteedReward>,
    pub potential: Vec<PotentialReward>,
}

/// Campaign battle node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleDef {
    pub id: String,
    pub campaign: String,
    pub campaign_type: CampaignType,
    pub node_number: u32,
    pub energy_cost: u32,
    pub daily_battle_count: u32,
    pub rewards: BattleRewards,
    pub slots: Option<u8>,
    pub enemies_factions: Vec<String>,
    pub enemies_alliances: Vec<Alliance>,
    pub enemies_total: Option<u32>,
    pub enemies_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDef {
    pub id: String,
    pub name: String,
    pub faction: String,
    pub alliance: Alliance,
    pub rarity: Rarity,
    pub is_mow: bool,
}

/// Cost of raising a character ability to `level`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityLevel {
    pub level: u32,
    pub gold: u32,
    pub badges: u32,
    pub badge_rarity: Rarity,
}

/// Cost of raising a machine-of-war ability to `level`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MowLevel {
    pub level: u32,
    pub components: u32,
    pub gold: u32,
    pub badges: u32,
    pub badge_rarity: Rarity,
    pub salvage: u32,
    pub primary_upgrades: Vec<String>,
    pub secondary_upgrades: Vec<String>,
}

pub fn shard_material_id(unit_id: &str) -> String {
    format!("shards_{}", unit_id)
}

/// All static tables the planner consumes
#[derive(Debug, Clone, Default)]
pub struct StaticData {
    pub materials: HashMap<String, MaterialDef>,
    pub campaigns: HashMap<String, CampaignDef>,
    pub battles: Vec<BattleDef>,
    pub units: HashMap<String, UnitDef>,
    pub rank_upgrades: HashMap<String, BTreeMap<u8, Vec<String>>>, // unit -> rank -> upgrade ids
    pub ability_levels: Vec<AbilityLevel>,
    pub mow_levels: HashMap<String, Vec<MowLevel>>,
    pub onslaught: OnslaughtData,
}

impl StaticData {
    /// Register a farmable shard material for every unit that lacks one
    pub fn add_shard_materials(&mut self) {
        for unit in self.units.values() {
            let id = shard_material_id(&unit.id);
            self.materials.entry(id.clone()).or_insert_with(|| MaterialDef {
                id,
                label: format!("{} shards", unit.name),
                rarity: unit.rarity,
                stat: UpgradeStat::Shard,
                craftable: false,
                recipe: Vec::new(),
            });
        }
    }
}
