//! Distributed Chunked-File Store Library
//!
//! This library crate defines the core modules of the store. It serves as the
//! foundation for the two binaries: the storage node server (`chunkstore-node`)
//! and the client coordinator CLI (`chunkstore`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`placement`**: The data distribution layer. Pure functions mapping a
//!   logical filename to its ring bucket, its chunk boundaries, and the
//!   primary/secondary replica schedule across the cluster.
//! - **`protocol`**: The wire layer. Length-prefixed command frames, blob
//!   transfers, and chunk records shared verbatim by node and client.
//! - **`node`**: The storage node server. Owns a flat chunk directory and
//!   serves LIST / GET / PUT over persistent connections, one worker task
//!   per connection.
//! - **`version`**: The reconciliation logic. Decides which timestamp of a
//!   logical file is complete enough to retrieve, and aggregates cluster-wide
//!   listings for `ls`.
//! - **`client`**: The coordinator. Connects to every node at startup and
//!   orchestrates the other subsystems to implement `ls`, `get` and `put`.

pub mod client;
pub mod node;
pub mod placement;
pub mod protocol;
pub mod version;
