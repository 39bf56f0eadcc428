//! Text renderings of plans for the command line

use std::fmt;

use crate::estimate::{EstimatedUpgrades, GoalEstimate, UpgradeEstimate};
use crate::goals::ResourceCost;
use crate::locations::Location;
use crate::models::MaterialDef;
use crate::onslaught::{HsePlan, TrackProjection};
use crate::raids::RaidPlanDay;

impl fmt::Display for ResourceCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gold", self.gold)?;
        for (rarity, count) in &self.badges {
            write!(f, ", {} {} badges", count, rarity)?;
        }
        if self.components > 0 {
            write!(f, ", {} components", self.components)?;
        }
        if self.salvage > 0 {
            write!(f, ", {} salvage", self.salvage)?;
        }
        Ok(())
    }
}

impl fmt::Display for UpgradeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_finished {
            "done".to_string()
        } else if self.is_blocked {
            "blocked".to_string()
        } else {
            format!(
                "{} days, {} raids, {} energy",
                self.days_total, self.raids_total, self.energy_total
            )
        };
        write!(
            f,
            "{:<28} {:<10} {:>5}/{:<5} {}",
            self.label,
            self.rarity.as_str(),
            self.acquired_count,
            self.required_count,
            status
        )
    }
}

impl fmt::Display for RaidPlanDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} raids, {} energy", self.raids_total, self.energy_total)?;
        for raid in &self.raids {
            writeln!(f, "  {} ({})", raid.label, raid.rarity)?;
            for location in &raid.locations {
                let done = if location.is_completed { " [done]" } else { "" };
                writeln!(
                    f,
                    "    {:<8} {:<24} x{:<3} {:>4} energy  ~{:.1} items{}",
                    location.location_id,
                    location.campaign,
                    location.raids_count,
                    location.energy_spent,
                    location.farmed_items,
                    done
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for GoalEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Goal {} ({} {}): {} days, {} energy",
            self.goal_id, self.kind, self.unit_id, self.days_total, self.energy_total
        )?;
        if !self.cost.is_empty() {
            writeln!(f, "  Also needs: {}", self.cost)?;
        }
        for material in &self.materials {
            writeln!(f, "  {}", material)?;
        }
        Ok(())
    }
}

impl fmt::Display for EstimatedUpgrades {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Raid Plan ===")?;
        writeln!(
            f,
            "{} materials: {} in progress, {} blocked, {} finished",
            self.materials.len(),
            self.in_progress.len(),
            self.blocked.len(),
            self.finished.len()
        )?;
        writeln!(
            f,
            "Total: {} days, {} raids, {} energy",
            self.days_total, self.raids_total, self.energy_total
        )?;
        if !self.resource_costs.is_empty() {
            writeln!(f, "Other costs: {}", self.resource_costs)?;
        }
        writeln!(f)?;

        if self.by_goal.is_empty() {
            writeln!(f, "Materials:")?;
            for material in &self.materials {
                writeln!(f, "  {}", material)?;
            }
        } else {
            for goal in &self.by_goal {
                writeln!(f, "{}", goal)?;
            }
        }

        if !self.issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings:")?;
            for issue in &self.issues {
                writeln!(f, "  {}", issue)?;
            }
        }
        Ok(())
    }
}

/// Day-by-day listing of a raid schedule
pub struct RaidSchedule<'a>(pub &'a [RaidPlanDay]);

impl fmt::Display for RaidSchedule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "Nothing to raid.");
        }
        for (i, day) in self.0.iter().enumerate() {
            write!(f, "Day {}: {}", i + 1, day)?;
        }
        Ok(())
    }
}

/// A material with its recipe and farming locations
pub struct MaterialReport<'a> {
    pub material: &'a MaterialDef,
    pub locations: &'a [Location],
}

impl fmt::Display for MaterialReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.material;
        writeln!(f, "Material: {}", m.label)?;
        writeln!(f, "  ID: {}", m.id)?;
        writeln!(f, "  Rarity: {}  Stat: {}", m.rarity, m.stat)?;

        if !m.recipe.is_empty() {
            writeln!(f, "  Recipe:")?;
            for line in &m.recipe {
                writeln!(f, "    {}x {}", line.count, line.material)?;
            }
        }

        if self.locations.is_empty() {
            if !m.craftable {
                writeln!(f, "  Not farmable in any campaign")?;
            }
        } else {
            writeln!(f, "  Locations:")?;
            for l in self.locations {
                writeln!(
                    f,
                    "    {:<8} {:<24} {:<10} drop {:.3}  {:.2} energy/item  {:.2} items/day",
                    l.id,
                    l.campaign,
                    l.campaign_type.as_str(),
                    l.drop_rate,
                    l.energy_per_item,
                    l.items_per_day
                )?;
            }
        }
        Ok(())
    }
}

/// Token split plus what the event battles yield
pub struct OnslaughtReport<'a> {
    pub plan: &'a HsePlan,
    pub projections: &'a [TrackProjection],
}

impl fmt::Display for OnslaughtReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Onslaught Plan ===")?;
        writeln!(f, "{:<10} {:>10} {:>10}", "Track", "Pre-event", "Event")?;
        for (track, pre) in &self.plan.pre_event_tokens {
            let event = self.plan.event(*track);
            if *pre == 0 && event == 0 {
                continue;
            }
            writeln!(f, "{:<10} {:>10} {:>10}", track.as_str(), pre, event)?;
        }
        writeln!(f)?;

        let mut enemies = 0;
        for p in self.projections {
            let Some(track) = p.track else {
                continue;
            };
            enemies += p.enemies;
            write!(
                f,
                "{}: {} battles, {} enemies, {} xp",
                track, p.battles, p.enemies, p.xp
            )?;
            for (rarity, count) in &p.badges {
                write!(f, ", {} {} badges", count, rarity)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Enemies defeated during the event: {}", enemies)
    }
}
