use std::fmt;

/// Parsed physical chunk name: `<timestamp>_<index>_<filename>`.
///
/// The filename part may itself contain underscores; only the first two
/// separators are structural, and the remainder after the index is compared
/// whole. A chunk of `b_a.txt` can never satisfy a request for `a.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkName {
    /// Version timestamp, milliseconds since epoch.
    pub timestamp: u64,
    /// Chunk index within the version, `0..N`.
    pub index: u32,
    /// Logical filename the chunk belongs to.
    pub filename: String,
}

impl ChunkName {
    /// Parses a directory entry into its chunk metadata.
    ///
    /// Returns `None` for entries that are not chunk files (wrong shape or
    /// non-numeric fields); callers skip those.
    pub fn parse(s: &str) -> Option<ChunkName> {
        let (timestamp, rest) = s.split_once('_')?;
        let (index, filename) = rest.split_once('_')?;
        if filename.is_empty() {
            return None;
        }
        Some(ChunkName {
            timestamp: timestamp.parse().ok()?,
            index: index.parse().ok()?,
            filename: filename.to_string(),
        })
    }
}

impl fmt::Display for ChunkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.timestamp, self.index, self.filename)
    }
}

/// Byte range of one chunk within the original file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub offset: u64,
    pub size: u64,
}

/// Splits a file of `total_size` bytes into `cluster_size` spans.
///
/// The first N-1 chunks are `total_size / N` bytes; the last chunk absorbs
/// the remainder. Offsets are multiples of the uniform size.
pub fn chunk_spans(total_size: u64, cluster_size: usize) -> Vec<ChunkSpan> {
    let uniform = total_size / cluster_size as u64;
    let mut spans: Vec<ChunkSpan> = (0..cluster_size as u64)
        .map(|i| ChunkSpan {
            offset: i * uniform,
            size: uniform,
        })
        .collect();
    if let Some(last) = spans.last_mut() {
        last.size += total_size % cluster_size as u64;
    }
    spans
}
