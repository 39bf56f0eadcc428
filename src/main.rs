//! Tacticus Raid Planner
//!
//! Plans daily campaign raids and onslaught token spending for
//! Warhammer 40,000: Tacticus.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use rusqlite::Connection;

use raid_planner::models::Alliance;
use raid_planner::onslaught::{BattleKey, OnslaughtPlanner};
use raid_planner::player::PlayerState;
use raid_planner::report::{MaterialReport, OnslaughtReport, RaidSchedule};
use raid_planner::{Planner, db, import, sample};

#[derive(Parser)]
#[command(name = "raid-planner")]
#[command(about = "Daily raid and onslaught planner for Warhammer 40,000: Tacticus")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "raid_data.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Import game data from a directory of JSON fixtures
    Import {
        /// Directory holding recipes.json, battles.json, ...
        dir: PathBuf,

        /// Clear existing data before import
        #[arg(long)]
        clear: bool,
    },

    /// Replace the static data with the built-in sample set
    LoadSample,

    /// List all upgrade materials
    ListMaterials,

    /// Show the recipe and farming locations of a material
    Material {
        /// Material ID
        id: String,
    },

    /// Plan raids for a player snapshot
    Plan {
        /// Player JSON file (inventory, progress, goals, settings)
        #[arg(short, long)]
        player: PathBuf,

        /// Also print the day-by-day raid schedule
        #[arg(short, long)]
        verbose: bool,
    },

    /// Split onslaught tokens across tracks
    Onslaught {
        /// Current battle per track as track:sector:zone, counting from 1 (e.g. imperial:2:1)
        #[arg(short, long = "start", required = true, value_parser = parse_battle_key)]
        starts: Vec<BattleKey>,

        /// Tokens spent before the event
        #[arg(long, default_value = "0")]
        pre: u32,

        /// Tokens spent during the event
        #[arg(long)]
        event: u32,
    },
}

fn parse_battle_key(value: &str) -> std::result::Result<BattleKey, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let [track, sector, zone] = parts.as_slice() else {
        return Err(format!("expected track:sector:zone, got '{}'", value));
    };
    let track = track.parse::<Alliance>().map_err(|e| format!("{}", e))?;
    let position = |s: &str| match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("'{}' is not a position counting from 1", s)),
    };
    Ok(BattleKey {
        track,
        sector: position(*sector)?,
        zone: position(*zone)?,
    })
}

fn load_planner(conn: &Connection) -> Result<Planner> {
    let data = db::load_static_data(conn)?;
    if data.materials.is_empty() {
        bail!("No game data in database. Run 'import' or 'load-sample' first.");
    }
    Ok(Planner::new(data))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::Import { dir, clear } => {
            if clear {
                println!("Clearing existing data...");
                db::clear_static_data(&conn)?;
            }

            let stats = import::import_to_database(&conn, &dir)?;
            println!("{}", stats);
        }

        Commands::LoadSample => {
            db::clear_static_data(&conn)?;
            db::save_static_data(&conn, &sample::sample_static_data())?;
            println!("Sample data loaded successfully!");
        }

        Commands::ListMaterials => {
            let materials = db::list_materials(&conn)?;
            if materials.is_empty() {
                println!("No materials in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("{:<28} {:<10} {:<8} {:>9}", "Material", "Rarity", "Stat", "Craftable");
                println!("{}", "-".repeat(58));
                for m in materials {
                    println!(
                        "{:<28} {:<10} {:<8} {:>9}",
                        m.label,
                        m.rarity.as_str(),
                        m.stat.as_str(),
                        if m.craftable { "yes" } else { "" }
                    );
                }
            }
        }

        Commands::Material { id } => match db::get_material(&conn, &id)? {
            Some(material) => {
                let planner = load_planner(&conn)?;
                let report = MaterialReport {
                    material: &material,
                    locations: planner.index().for_material(&id),
                };
                print!("{}", report);
            }
            None => println!("Material '{}' not found", id),
        },

        Commands::Plan { player, verbose } => {
            let json = fs::read_to_string(&player)
                .with_context(|| format!("Failed to read {}", player.display()))?;
            let state = PlayerState::from_json(&json)
                .with_context(|| format!("Failed to parse {}", player.display()))?;

            let planner = load_planner(&conn)?;
            info!("Planning {} goals", state.goals.len());
            let plan = planner.plan(&state);

            print!("{}", plan);
            if verbose {
                println!();
                print!("{}", RaidSchedule(&plan.raid_days));
            }
        }

        Commands::Onslaught { starts, pre, event } => {
            let data = db::load_static_data(&conn)?;
            if data.onslaught.tracks.is_empty() {
                bail!("No onslaught data in database. Run 'import' or 'load-sample' first.");
            }
            let planner = OnslaughtPlanner::new(data.onslaught);
            let plan = planner.plan(&starts, pre, event)?;
            let projections = planner.project(&plan, &starts);
            print!(
                "{}",
                OnslaughtReport {
                    plan: &plan,
                    projections: &projections,
                }
            );
        }
    }

    Ok(())
}
