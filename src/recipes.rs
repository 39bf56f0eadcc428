//! Recipe graph resolution
//!
//! Expands top-level upgrade requirements into the base (farmable) materials
//! needed to craft them, consuming inventory level by level from the top of
//! the recipe tree down.

use std::collections::{BTreeMap, HashMap};

use log::warn;

use crate::models::MaterialDef;

/// Guards against cyclic recipe data
pub const MAX_RECIPE_DEPTH: usize = 20;

/// Material id -> count owned
pub type Inventory = HashMap<String, u32>;

/// Expand upgrade requirements into base material totals.
///
/// `upgrades` holds one `(material id, count)` entry per requirement and may
/// repeat ids. Crafted materials already on hand are taken from `inventory`
/// before their recipes are expanded, so the map is mutated in place; pass a
/// clone when the caller's copy must stay untouched. Base materials are never
/// taken from inventory here.
pub fn expand_to_base_materials(
    materials: &HashMap<String, MaterialDef>,
    upgrades: &[(String, u32)],
    inventory: &mut Inventory,
) -> BTreeMap<String, u32> {
    let mut base: BTreeMap<String, u32> = BTreeMap::new();
    let mut level: BTreeMap<String, u32> = BTreeMap::new();

    for (id, count) in upgrades {
        classify(materials, id, *count, &mut level, &mut base);
    }

    let mut depth = 0;
    while !level.is_empty() {
        if depth > MAX_RECIPE_DEPTH {
            warn!(
                "Maximum recipe depth exceeded - possible cycle involving {:?}",
                level.keys().collect::<Vec<_>>()
            );
            break;
        }

        let mut next: BTreeMap<String, u32> = BTreeMap::new();
        for (id, required) in level {
            let Some(required) = consume_inventory(inventory, &id, required) else {
                continue;
            };

            let Some(def) = materials.get(&id) else {
                continue;
            };
            for line in &def.recipe {
                classify(materials, &line.material, line.count * required, &mut next, &mut base);
            }
        }

        level = next;
        depth += 1;
    }

    base
}

/// Take `required` crafted items from stock; returns what is still missing.
fn consume_inventory(inventory: &mut Inventory, id: &str, required: u32) -> Option<u32> {
    let acquired = inventory.get(id).copied().unwrap_or(0);
    if acquired >= required {
        inventory.insert(id.to_string(), acquired - required);
        return None;
    }
    if acquired > 0 {
        inventory.insert(id.to_string(), 0);
    }
    Some(required - acquired)
}

fn classify(
    materials: &HashMap<String, MaterialDef>,
    id: &str,
    count: u32,
    crafted: &mut BTreeMap<String, u32>,
    base: &mut BTreeMap<String, u32>,
) {
    if count == 0 {
        return;
    }
    match materials.get(id) {
        Some(def) if def.craftable => *crafted.entry(id.to_string()).or_default() += count,
        Some(_) => *base.entry(id.to_string()).or_default() += count,
        None => warn!("No recipe data for '{}', skipping {} required", id, count),
    }
}
