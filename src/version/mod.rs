//! Version Resolution Module
//!
//! Decides what is retrievable from raw per-node chunk listings. Two
//! deliberately different completeness predicates live here:
//!
//! - **`latest_complete_version`** (used by `get`): a timestamp is complete
//!   iff every chunk index `0..N` was observed for that exact timestamp;
//!   the newest complete timestamp wins.
//! - **`filename_completeness`** (used by `ls`): chunk indices are pooled
//!   across *all* timestamps of a filename, so a file whose indices are only
//!   jointly covered by two versions still lists as complete.
//!
//! The divergence is inherited behavior and must not be unified. Both folds
//! are order-independent, so callers may gather node responses in any order.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::placement::chunk::ChunkName;

/// One `(timestamp, chunk index)` sighting of a logical file somewhere in
/// the cluster. Duplicates (primary + secondary replicas) are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: u64,
    pub chunk_index: u32,
}

/// Cluster-wide status of one logical filename, as reported by `ls`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub filename: String,
    pub complete: bool,
}

/// Newest timestamp for which every chunk index in `0..cluster_size` was
/// observed at least once. `None` means no version of the file is
/// reconstructible; a partial file is never fabricated from the runner-up.
pub fn latest_complete_version(
    observations: &[Observation],
    cluster_size: usize,
) -> Option<u64> {
    let mut indices_by_version: HashMap<u64, HashSet<u32>> = HashMap::new();
    for obs in observations {
        // Indices outside the ring (stale data from a differently-sized
        // deployment) can never contribute to completeness.
        if (obs.chunk_index as usize) < cluster_size {
            indices_by_version
                .entry(obs.timestamp)
                .or_default()
                .insert(obs.chunk_index);
        }
    }

    indices_by_version
        .into_iter()
        .filter(|(_, indices)| indices.len() == cluster_size)
        .map(|(timestamp, _)| timestamp)
        .max()
}

/// Filename-level aggregation for `ls`: every parsed chunk name counts
/// toward its filename regardless of timestamp. Output is sorted by name.
pub fn filename_completeness(chunks: &[ChunkName], cluster_size: usize) -> Vec<FileStatus> {
    let mut indices_by_file: BTreeMap<&str, HashSet<u32>> = BTreeMap::new();
    for chunk in chunks {
        let indices = indices_by_file.entry(&chunk.filename).or_default();
        if (chunk.index as usize) < cluster_size {
            indices.insert(chunk.index);
        }
    }

    indices_by_file
        .into_iter()
        .map(|(filename, indices)| FileStatus {
            filename: filename.to_string(),
            complete: indices.len() == cluster_size,
        })
        .collect()
}
