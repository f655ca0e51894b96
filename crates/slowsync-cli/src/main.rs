mod commands;
mod logging;
mod progress;

use std::fs;
use std::path::Path;
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use slowsync_core::{persist, SyncConfig, SyncEngine, TransferPlan};
use tracing::error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let mut config = match slowsync_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };
    if let Some(block_size_kib) = args.block_size {
        config.block_size = block_size_kib * 1024;
    }
    if let Some(min_size) = args.min_size {
        config.min_size = min_size;
    }

    match args.command {
        Some(Commands::Parse {
            input_dir,
            output_db,
        }) => {
            if let Err(err) = run_parse(&config, &input_dir, &output_db) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::GenerateActions {
            db_a,
            db_b,
            output_file,
        }) => {
            if let Err(err) = run_generate_actions(&config, &db_a, &db_b, &output_file) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Sync { dir_a, dir_b }) => {
            if let Err(err) = run_sync(&config, &dir_a, &dir_b) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::CollisionCheck { directory }) => {
            if let Err(err) = run_collision_check(&config, &directory) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_parse(
    config: &SyncConfig,
    input_dir: &Path,
    output_db: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = SyncEngine::new(config.clone());
    let reporter = CliReporter::new();
    let snapshot = engine.snapshot(input_dir, &reporter)?;

    persist::save_snapshot(&snapshot, output_db)?;

    println!(
        "{} {} files indexed from {} ({} skipped), written to {}",
        "✓".green(),
        snapshot.len().to_string().green(),
        input_dir.display(),
        snapshot.skipped().len(),
        output_db.display(),
    );
    for skip in snapshot.skipped() {
        println!(
            "  {} {}: {}",
            "skipped".yellow(),
            skip.path.display(),
            skip.reason
        );
    }
    Ok(())
}

fn run_generate_actions(
    config: &SyncConfig,
    db_a: &Path,
    db_b: &Path,
    output_file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = SyncEngine::new(config.clone());

    let snapshot_a = persist::load_snapshot(db_a)?;
    let snapshot_b = persist::load_snapshot(db_b)?;

    let report = engine.diff(&snapshot_a, &snapshot_b)?;
    let plan = engine.plan(&report, snapshot_a.root_dir(), snapshot_b.root_dir());

    write_plan(&plan, output_file)?;
    print_plan_summary(&plan);
    Ok(())
}

fn run_sync(
    config: &SyncConfig,
    dir_a: &Path,
    dir_b: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = SyncEngine::new(config.clone());
    let reporter = CliReporter::new();
    let result = engine.reconcile(dir_a, dir_b, &reporter)?;

    println!();
    println!(
        "Snapshot A: {}, Snapshot B: {}, Diff: {}",
        format!("{:.2}s", result.snapshot_a_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.snapshot_b_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.diff_duration.as_secs_f64()).green(),
    );
    println!(
        "{} matched, {} relocated, {} only in A, {} only in B",
        result.report.matched.len().to_string().green(),
        result.report.relocated.len().to_string().yellow(),
        result.report.only_in_a.len().to_string().red(),
        result.report.only_in_b.len().to_string().red(),
    );
    if result.skipped_in_a + result.skipped_in_b > 0 {
        println!(
            "{} files skipped as unreadable ({} in A, {} in B)",
            (result.skipped_in_a + result.skipped_in_b).to_string().yellow(),
            result.skipped_in_a,
            result.skipped_in_b,
        );
    }

    print_plan_summary(&result.plan);
    for action in &result.plan.actions {
        println!(
            "  {} {} {} {}",
            "COPY".cyan(),
            action.source.display(),
            "→".dimmed(),
            action.destination.display()
        );
    }
    Ok(())
}

fn run_collision_check(
    config: &SyncConfig,
    directory: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Checking directory {} for collisions", directory.display());
    let engine = SyncEngine::new(config.clone());
    let reporter = CliReporter::new();
    let report = engine.collision_check(directory, &reporter)?;

    for (a, b) in &report.duplicates {
        println!(
            "{} fingerprint {:016x} at {} and {}",
            "Duplicate".yellow(),
            a.fingerprint,
            a.absolute_path().display(),
            b.absolute_path().display()
        );
    }
    for (a, b) in &report.collisions {
        println!(
            "{} fingerprint {:016x} at {} and {}",
            "Collision".red(),
            a.fingerprint,
            a.absolute_path().display(),
            b.absolute_path().display()
        );
    }

    if report.is_clean() {
        println!("{}", "No collisions found".green());
    } else {
        println!(
            "{} duplicates, {} collisions",
            report.duplicates.len(),
            report.collisions.len()
        );
    }
    Ok(())
}

fn write_plan(plan: &TransferPlan, output_file: &Path) -> Result<(), std::io::Error> {
    let mut out = String::new();
    for action in &plan.actions {
        out.push_str(&format!(
            "COPY\t{}\t{}\n",
            action.source.display(),
            action.destination.display()
        ));
    }
    for pair in &plan.relocations {
        out.push_str(&format!(
            "RELOCATED\t{}\t{}\n",
            pair.a.absolute_path().display(),
            pair.b.absolute_path().display()
        ));
    }
    fs::write(output_file, out)
}

fn print_plan_summary(plan: &TransferPlan) {
    println!(
        "{} actions planned: {} bytes A→B, {} bytes B→A, {} relocations to resolve manually",
        plan.actions.len().to_string().cyan(),
        plan.bytes_a_to_b,
        plan.bytes_b_to_a,
        plan.relocations.len().to_string().yellow(),
    );
}
