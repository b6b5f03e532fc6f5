//! Chunk Placement Module
//!
//! Pure data-distribution logic shared by the client coordinator and the
//! tests. Nothing in here touches the network or the filesystem.
//!
//! ## Core Concepts
//! - **Bucketing**: A logical filename hashes to a ring position (its
//!   bucket), which anchors where its chunk 0 lives.
//! - **Chunking**: A file of size S splits into N equal chunks; the last
//!   chunk absorbs the division remainder.
//! - **Replication**: Each chunk gets two replicas on adjacent ring nodes,
//!   so the cluster survives the loss of any single node.
//! - **Naming**: Physical chunk names embed `<timestamp>_<index>_<filename>`
//!   and are the only placement metadata that exists at rest.

pub mod chunk;
pub mod ring;

#[cfg(test)]
mod tests;
