use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Snapshot persistence error: {0}")]
    Persist(#[from] bincode::Error),

    #[error("Duplicate relative path '{}' during walk", .path.display())]
    StructuralIntegrity { path: PathBuf },

    #[error("Operation cancelled")]
    Cancelled,
}
