use crate::error::Error;
use config::{Config, File as ConfigFile};
use serde::Deserialize;

/// Files smaller than this are not worth tracking (markers, placeholders).
pub const DEFAULT_MIN_SIZE: u64 = 4096;

/// Cheap fingerprints hash at most this many leading bytes (4 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 4096 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Minimum file size in bytes; smaller files are excluded from snapshots.
    pub min_size: u64,
    /// Number of leading bytes covered by the cheap fingerprint tier.
    pub block_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Load configuration from an optional `slowsync` config file,
/// falling back to the defaults for anything unset.
pub fn load_configuration() -> Result<SyncConfig, Error> {
    let builder = Config::builder()
        .set_default("min_size", DEFAULT_MIN_SIZE)?
        .set_default("block_size", DEFAULT_BLOCK_SIZE as u64)?
        .add_source(ConfigFile::with_name("slowsync").required(false))
        .build()?;
    Ok(builder.try_deserialize::<SyncConfig>()?)
}
