use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use twox_hash::XxHash64;

const READ_CHUNK: usize = 64 * 1024;

/// Two-tier content fingerprinting:
/// 1. `cheap` hashes at most one leading block (XxHash64) — fast index key
/// 2. `full` streams the entire file through the hasher — ground truth,
///    computed only when two files must be proven identical or coincidental
#[derive(Debug, Clone)]
pub struct FingerprintEngine {
    block_size: usize,
}

impl FingerprintEngine {
    pub fn new(block_size: usize) -> Self {
        Self { block_size }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Digest of at most `block_size` leading bytes.
    pub fn cheap(&self, path: &Path) -> io::Result<u64> {
        let file = File::open(path)?;
        hash_reader(file.take(self.block_size as u64))
    }

    /// Digest of the complete file content, read in bounded chunks so
    /// large files never get slurped into memory.
    pub fn full(&self, path: &Path) -> io::Result<u64> {
        let file = File::open(path)?;
        hash_reader(file)
    }
}

fn hash_reader<R: Read>(mut reader: R) -> io::Result<u64> {
    let mut hasher = XxHash64::with_seed(0);
    let mut buffer = vec![0u8; READ_CHUNK];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.write(&buffer[..bytes_read]);
    }
    Ok(hasher.finish())
}
