use crate::error::Error;
use crate::fingerprint::FingerprintEngine;
use crate::snapshot::FileRecord;

/// Outcome of comparing two files that share a cheap fingerprint.
/// `Collision` is a normal result, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Full content digests match; the files are truly identical.
    Identical,
    /// The cheap fingerprints matched by coincidence; the files are
    /// unrelated and must be treated as distinct.
    Collision,
}

/// Arbitrate a cheap-fingerprint match with the full-content digest.
/// This is the correctness-critical step: without it, same-prefix files
/// with different tails would be wrongly treated as duplicates.
pub fn resolve(
    engine: &FingerprintEngine,
    a: &FileRecord,
    b: &FileRecord,
) -> Result<Verdict, Error> {
    let full_a = engine.full(&a.absolute_path())?;
    let full_b = engine.full(&b.absolute_path())?;
    if full_a == full_b {
        Ok(Verdict::Identical)
    } else {
        Ok(Verdict::Collision)
    }
}
