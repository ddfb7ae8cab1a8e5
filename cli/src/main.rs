mod replay;

use std::path::{Path, PathBuf};

use beadring_core::config::{clamp_gap_mm, clamp_wrist_size_cm};
use beadring_core::{
    check_fit, compute_stage_geometry, layout_ring, Bead, BuiltinCatalog, CatalogLookup,
    DesignerRules, FitVerdict, InstanceId, ViewportSize, BEAD_CATALOG,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beadring-cli", version, about = "Offline tools for the bracelet designer")]
struct Cli {
    /// Rules file (TOML); defaults apply when absent.
    #[arg(long, global = true, env = "BEADRING_RULES")]
    rules: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    #[arg(long, global = true, env = "BEADRING_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Prints the ring layout for a bead sequence as JSON.
    Layout {
        #[arg(long, default_value_t = 390.0)]
        width: f32,
        #[arg(long)]
        gap_mm: Option<f32>,
        /// Catalog ids in ring order.
        #[arg(required = true)]
        beads: Vec<String>,
    },
    /// Checks a bead sequence against a wrist size.
    Fit {
        #[arg(long)]
        gap_mm: Option<f32>,
        #[arg(long)]
        wrist_cm: Option<f32>,
        #[arg(long)]
        json: bool,
        beads: Vec<String>,
    },
    /// Replays a JSON script of designer actions against a virtual clock.
    Replay {
        script: PathBuf,
        #[arg(long, default_value_t = 390.0)]
        width: f32,
        #[arg(long, default_value_t = 844.0)]
        height: f32,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct LayoutEntry {
    catalog_id: String,
    x: f32,
    y: f32,
    diameter_px: f32,
    angle_rad: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let rules = load_rules(cli.rules.as_deref())?;

    match cli.command {
        Commands::Catalog { command } => match command {
            CatalogCommand::List { json } => {
                if json {
                    let items: Vec<_> = BEAD_CATALOG.iter().map(|entry| entry.to_item()).collect();
                    println!("{}", serde_json::to_string_pretty(&items)?);
                } else {
                    for entry in BEAD_CATALOG {
                        let stock = if entry.in_stock { "" } else { " (out of stock)" };
                        println!(
                            "{:<16} {:>5.1} mm  {:>8}  {}{}",
                            entry.id,
                            entry.diameter_mm,
                            format_price(entry.price_cents),
                            entry.name,
                            stock
                        );
                    }
                }
            }
        },
        Commands::Layout {
            width,
            gap_mm,
            beads,
        } => {
            let beads = resolve_beads(&beads)?;
            let gap_mm = gap_mm.map_or(rules.gap_mm, clamp_gap_mm);
            let geometry = compute_stage_geometry(width, &rules.stage);
            let placed = layout_ring(&beads, gap_mm, &geometry, &rules.bead);
            debug!(count = placed.len(), radius = geometry.guide_radius, "ring laid out");
            let entries: Vec<_> = beads
                .iter()
                .zip(&placed)
                .map(|(bead, placed)| LayoutEntry {
                    catalog_id: bead.catalog_id.clone(),
                    x: placed.position.x,
                    y: placed.position.y,
                    diameter_px: placed.visual_diameter_px,
                    angle_rad: placed.angle_rad,
                })
                .collect();
            let output = serde_json::json!({
                "geometry": geometry,
                "beads": entries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Fit {
            gap_mm,
            wrist_cm,
            json,
            beads,
        } => {
            let beads = resolve_beads(&beads)?;
            let status = check_fit(
                &beads,
                gap_mm.map_or(rules.gap_mm, clamp_gap_mm),
                wrist_cm.map_or(rules.wrist_size_cm, clamp_wrist_size_cm),
                rules.wrist_tolerance_mm,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", status.message());
            }
            if status.verdict == FitVerdict::Overflow {
                std::process::exit(2);
            }
        }
        Commands::Replay {
            script,
            width,
            height,
        } => {
            let raw = std::fs::read_to_string(&script)?;
            let steps = replay::parse_script(&raw)?;
            let report = replay::run(BuiltinCatalog, rules, ViewportSize::new(width, height), &steps);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_rules(path: Option<&Path>) -> Result<DesignerRules, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(DesignerRules::load(path)?),
        None => Ok(DesignerRules::default()),
    }
}

fn resolve_beads(ids: &[String]) -> Result<Vec<Bead>, Box<dyn std::error::Error>> {
    let mut beads = Vec::with_capacity(ids.len());
    for (index, id) in ids.iter().enumerate() {
        let item = BuiltinCatalog
            .lookup(id)
            .ok_or_else(|| format!("unknown bead: {id}"))?;
        beads.push(Bead::from_catalog(InstanceId(index as u64 + 1), &item));
    }
    Ok(beads)
}

fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
