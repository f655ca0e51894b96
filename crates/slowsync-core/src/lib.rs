pub mod config;
pub mod differ;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod persist;
pub mod planner;
pub mod progress;
pub mod resolver;
pub mod snapshot;

pub use config::SyncConfig;
pub use differ::{DiffReport, MatchedPair, RelocatedPair};
pub use engine::{CollisionCheckReport, SyncEngine, SyncResult};
pub use error::Error;
pub use fingerprint::FingerprintEngine;
pub use planner::{Action, ActionKind, TransferPlan};
pub use progress::{ProgressReporter, SilentReporter};
pub use resolver::Verdict;
pub use snapshot::{FileRecord, SkippedFile, Snapshot, SnapshotBuilder};
