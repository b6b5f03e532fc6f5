/// One ring position of a put schedule: the node at `(bucket + i) mod N`
/// receives chunk `i` as primary and chunk `(i + 1) mod N` as secondary,
/// both inside a single PUT exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Index of the target node in the cluster config order.
    pub node: usize,
    /// Chunk this node holds as primary.
    pub primary_chunk: u32,
    /// Chunk this node additionally holds as secondary.
    pub secondary_chunk: u32,
}

/// Ring position a filename hashes to.
///
/// Uses djb2 over the UTF-8 bytes, truncated to 32 bits before the modulo.
/// Placement is re-derivable only by listing every node, so this must stay
/// stable across client builds.
pub fn bucket(filename: &str, cluster_size: usize) -> usize {
    (djb2(filename) as u32) as usize % cluster_size
}

// djb2: hash * 33 + c, seed 5381
fn djb2(s: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    hash
}

/// Full replica schedule for one put: one `Assignment` per ring position,
/// starting at the file's bucket.
pub fn replica_schedule(bucket: usize, cluster_size: usize) -> Vec<Assignment> {
    (0..cluster_size)
        .map(|i| Assignment {
            node: (bucket + i) % cluster_size,
            primary_chunk: i as u32,
            secondary_chunk: ((i + 1) % cluster_size) as u32,
        })
        .collect()
}

/// Whether a put may proceed against the given reachability mask.
///
/// Rejects when any two adjacent ring nodes are both down: some chunk would
/// then have zero surviving replicas. Individually-down nodes are fine, the
/// schedule just skips them.
pub fn put_admissible(reachable: &[bool]) -> bool {
    let n = reachable.len();
    (0..n).all(|i| reachable[i] || reachable[(i + 1) % n])
}
