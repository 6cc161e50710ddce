#![warn(missing_docs)]
//! Deterministic testing surfaces for terrain generation (event stream,
//! chunk digests and metrics export).

mod metrics;

use anyhow::Result;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use metrics::*;

/// Primary event record captured by headless generation runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// World seed of the run.
    pub seed: u64,
    /// Chunk coordinates [x, z].
    pub chunk: [i32; 2],
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Free-form payload for smoke tests.
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

/// Stable FNV-1a digest of a chunk's block ids, as a hex string.
///
/// Two runs with the same seed must produce the same digest for every chunk.
pub fn chunk_digest(blocks: &[u16]) -> String {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for block in blocks {
        for byte in block.to_le_bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(PRIME);
        }
    }
    format!("{:016x}", hash)
}

/// Digest snapshot for a generated chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkDigestMetric {
    /// Chunk coordinates [x, z].
    pub chunk: [i32; 2],
    /// Non-air voxels in the chunk.
    pub solid_blocks: usize,
    /// Block digest (hex string) for deterministic comparisons.
    pub hash: String,
}

/// Writes chunk digests to JSON for CI artifacts.
pub struct DigestSink {
    file: File,
}

impl DigestSink {
    /// Create a sink pointed at the supplied path, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Persist the provided digests as pretty JSON.
    pub fn write(&mut self, digests: &[ChunkDigestMetric]) -> Result<()> {
        let json = serde_json::to_string_pretty(digests)?;
        self.file.write_all(json.as_bytes())?;
        tracing::debug!(chunks = digests.len(), "Wrote chunk digests");
        Ok(())
    }
}
