use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use log::LevelFilter;
use stowage_core::{PlacementRequest, PlacementResult, Planner, Session};

#[derive(Parser)]
#[command(name = "stowage")]
#[command(about = "Cargo stowage planner - place items into zoned containers", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan placements for a batch of items
    Plan {
        /// Input request file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute the retrieval plan for a stowed item
    Retrieve {
        /// Input file with containers carrying preloaded items (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Id of the item to retrieve
        #[arg(long)]
        item: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    })?;

    match cli.command {
        Commands::Plan { input, output } => plan_command(input, output),
        Commands::Retrieve { input, item } => retrieve_command(input, item),
    }
}

fn init_logger(level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{:<5}] {}", record.level(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn read_request(input: &Path) -> Result<PlacementRequest> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("could not read {}", input.display()))?;
    let extension = input.extension().and_then(|ext| ext.to_str());
    if extension == Some("yaml") || extension == Some("yml") {
        serde_yaml::from_str(&content).context("not a valid placement request")
    } else {
        serde_json::from_str(&content).context("not a valid placement request")
    }
}

fn plan_command(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    println!("{}", "Loading placement request...".bright_blue());
    let request = read_request(&input)?;
    let containers = request.containers.clone();

    let zones: std::collections::HashSet<&str> =
        containers.iter().map(|c| c.zone.as_str()).collect();
    println!(
        "  {} items to stow",
        request.items.len().to_string().bright_white().bold()
    );
    println!(
        "  {} containers across {} zones",
        containers.len().to_string().bright_white().bold(),
        zones.len().to_string().bright_white().bold()
    );
    println!();

    println!("{}", "Running placement...".bright_blue());
    let planner = Planner::new(request)?;
    let result = planner.plan()?;
    println!();

    if result.success {
        println!("{}", "All items placed".bright_green().bold());
    } else {
        println!(
            "{}",
            format!("{} items could not be placed", result.unplaced_items.len())
                .bright_yellow()
                .bold()
        );
    }
    println!();

    print_container_summary(&containers, &result);

    if !result.unplaced_items.is_empty() {
        println!("  Unplaced:");
        for item_id in &result.unplaced_items {
            println!("    - {}", item_id.bright_red());
        }
        println!();
    }
    for advice in &result.rearrangements {
        println!("  {} {}", "Advice:".bright_yellow(), advice.message);
    }
    println!();

    let json = serde_json::to_string_pretty(&result)?;
    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)?;
            println!(
                "Saved result to {}",
                output_path.display().to_string().bright_white()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn print_container_summary(
    containers: &[stowage_core::Container],
    result: &PlacementResult,
) {
    let mut stowed_volume: HashMap<&str, u64> = HashMap::new();
    let mut stowed_count: HashMap<&str, usize> = HashMap::new();
    for placement in &result.placements {
        *stowed_volume.entry(placement.container_id.as_str()).or_insert(0) +=
            placement.position.volume();
        *stowed_count.entry(placement.container_id.as_str()).or_insert(0) += 1;
    }

    println!("{}", "Containers:".bright_yellow().bold());
    for container in containers {
        let volume = stowed_volume
            .get(container.container_id.as_str())
            .copied()
            .unwrap_or(0);
        let count = stowed_count
            .get(container.container_id.as_str())
            .copied()
            .unwrap_or(0);
        let utilization = 100.0 * volume as f64 / container.total_volume() as f64;
        println!(
            "  {} (zone {}): {} items, {:.1}% of volume",
            container.container_id.bright_white(),
            container.zone,
            count,
            utilization
        );
    }
    println!();
}

fn retrieve_command(input: PathBuf, item: String) -> Result<()> {
    let request = read_request(&input)?;
    let session = Session::from_request(&request)?;
    let steps = session.retrieval_plan(&item)?;

    if steps.is_empty() {
        println!(
            "{} {}",
            item.bright_white().bold(),
            "is directly accessible from the open face".bright_green()
        );
        return Ok(());
    }

    println!(
        "{} steps to retrieve {}:",
        steps.len().to_string().bright_white().bold(),
        item.bright_white().bold()
    );
    for step in &steps {
        let action = match step.action {
            stowage_core::RetrievalAction::Remove => "remove".bright_yellow(),
            stowage_core::RetrievalAction::Retrieve => "retrieve".bright_green().bold(),
            stowage_core::RetrievalAction::PlaceBack => "placeBack".bright_cyan(),
        };
        println!(
            "  {:>2}. {:<9} {} ({})",
            step.step, action, step.item_id, step.item_name
        );
    }

    Ok(())
}
