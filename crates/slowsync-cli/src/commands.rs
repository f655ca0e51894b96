use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "slowsync")]
#[command(
    about = "Reconcile two directory trees visited infrequently over low bandwidth",
    long_about = None
)]
pub struct Cli {
    /// Override the cheap-fingerprint block size, specified in KiB
    #[arg(short, long)]
    pub block_size: Option<usize>,

    /// Minimum file size in bytes; smaller files are ignored entirely
    #[arg(short, long)]
    pub min_size: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a snapshot of a directory and persist it to a database file
    Parse {
        input_dir: PathBuf,
        output_db: PathBuf,
    },
    /// Diff two persisted snapshots and write the transfer actions to a file
    GenerateActions {
        db_a: PathBuf,
        db_b: PathBuf,
        output_file: PathBuf,
    },
    /// Snapshot, diff and plan two live directories in one pass
    Sync { dir_a: PathBuf, dir_b: PathBuf },
    /// Check a directory for cheap-fingerprint duplicates and collisions
    CollisionCheck { directory: PathBuf },
    /// Print effective configuration values
    PrintConfig,
}
