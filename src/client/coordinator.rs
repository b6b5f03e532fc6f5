use anyhow::{Context, Result, bail};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncSeekExt, AsyncWriteExt, SeekFrom};
use tokio::net::TcpStream;
use tracing::{info, warn};

use super::config::ClusterConfig;
use crate::placement::chunk::{ChunkName, chunk_spans};
use crate::placement::ring::{bucket, put_admissible, replica_schedule};
use crate::protocol::{
    Command, read_chunk_record, read_frame, write_frame, write_timestamp,
};
use crate::version::{self, FileStatus, Observation};

/// Outcome of a `get` for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetStatus {
    /// A complete version was found and written to the destination.
    Complete,
    /// No timestamp had all its chunks; nothing was written.
    Incomplete,
}

/// Live handle on the cluster for one CLI invocation.
///
/// Connections are opened once at construction; a node that fails to
/// connect is recorded as unreachable and skipped for the rest of the run.
/// All state about stored files is re-derived per operation from listings.
pub struct Coordinator {
    addresses: Vec<String>,
    connections: Vec<Option<TcpStream>>,
}

impl Coordinator {
    /// Dials every configured node. Never fails as a whole: unreachable
    /// nodes are logged and recorded, and the operations degrade per the
    /// replication guarantees.
    pub async fn connect(config: &ClusterConfig) -> Self {
        let mut connections = Vec::with_capacity(config.nodes.len());
        for address in &config.nodes {
            match TcpStream::connect(address).await {
                Ok(stream) => {
                    tracing::debug!("Connected to storage node {}", address);
                    connections.push(Some(stream));
                }
                Err(e) => {
                    warn!("Storage node {} unreachable: {}", address, e);
                    connections.push(None);
                }
            }
        }
        Self {
            addresses: config.nodes.clone(),
            connections,
        }
    }

    /// Cluster size N: fixed by the config, independent of reachability.
    pub fn cluster_size(&self) -> usize {
        self.connections.len()
    }

    pub fn reachable(&self) -> Vec<bool> {
        self.connections.iter().map(|c| c.is_some()).collect()
    }

    /// `ls`: merge LIST responses from every reachable node and report each
    /// logical filename, complete iff all chunk indices appear somewhere,
    /// timestamps pooled. Deliberately looser than `get`.
    pub async fn ls(&mut self) -> Result<Vec<FileStatus>> {
        let cluster_size = self.cluster_size();
        let mut chunks: Vec<ChunkName> = Vec::new();

        for connection in self.connections.iter_mut().flatten() {
            write_frame(connection, Command::List.encode().as_bytes()).await?;
            let frame = read_frame(connection).await?;
            let listing =
                String::from_utf8(frame).context("LIST response is not valid UTF-8")?;
            for line in listing.lines() {
                if line.is_empty() {
                    continue;
                }
                match ChunkName::parse(line) {
                    Some(chunk) => chunks.push(chunk),
                    None => tracing::debug!("Ignoring non-chunk entry {:?}", line),
                }
            }
        }

        Ok(version::filename_completeness(&chunks, cluster_size))
    }

    /// `put`: chunk the local file at `path` and execute the replica
    /// schedule under a fresh timestamp. Rejected up front when two
    /// adjacent ring nodes are down; individually-down nodes are skipped.
    pub async fn put(&mut self, path: &Path) -> Result<()> {
        let filename = logical_filename(path)?;
        let cluster_size = self.cluster_size();

        if !put_admissible(&self.reachable()) {
            let down: Vec<&str> = self
                .connections
                .iter()
                .zip(&self.addresses)
                .filter(|(c, _)| c.is_none())
                .map(|(_, a)| a.as_str())
                .collect();
            bail!(
                "put rejected: adjacent storage nodes are unreachable ({}), some chunk would have no replica",
                down.join(", ")
            );
        }

        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let spans = chunk_spans(data.len() as u64, cluster_size);
        let timestamp = now_ms();
        let file_bucket = bucket(&filename, cluster_size);

        for assignment in replica_schedule(file_bucket, cluster_size) {
            let Some(connection) = self.connections[assignment.node].as_mut() else {
                warn!(
                    "Skipping unreachable node {} for chunks {} and {} of {}",
                    self.addresses[assignment.node],
                    assignment.primary_chunk,
                    assignment.secondary_chunk,
                    filename
                );
                continue;
            };

            let name_for = |index: u32| ChunkName {
                timestamp,
                index,
                filename: filename.clone(),
            };
            let command = Command::Put {
                primary: name_for(assignment.primary_chunk).to_string(),
                secondary: name_for(assignment.secondary_chunk).to_string(),
            };
            write_frame(connection, command.encode().as_bytes()).await?;

            for index in [assignment.primary_chunk, assignment.secondary_chunk] {
                let span = spans[index as usize];
                let chunk = &data[span.offset as usize..(span.offset + span.size) as usize];
                write_frame(connection, chunk).await?;
            }
            info!(
                "Sent chunks {} and {} of {} to node {}",
                assignment.primary_chunk,
                assignment.secondary_chunk,
                filename,
                self.addresses[assignment.node]
            );
        }
        Ok(())
    }

    /// `get`: resolve the newest complete version of `filename` across the
    /// cluster and reconstruct it at `destination`. Returns `Incomplete`
    /// without touching the destination when no version is whole.
    pub async fn get(&mut self, filename: &str, destination: &Path) -> Result<GetStatus> {
        let cluster_size = self.cluster_size();

        // Phase 1: ask every reachable node what it holds for this file.
        let mut listings: Vec<Vec<(ChunkName, u64)>> = vec![Vec::new(); cluster_size];
        for (node, slot) in self.connections.iter_mut().enumerate() {
            let Some(connection) = slot else { continue };
            let command = Command::Get {
                filename: filename.to_string(),
            };
            write_frame(connection, command.encode().as_bytes()).await?;
            let frame = read_frame(connection).await?;
            let listing =
                String::from_utf8(frame).context("GET listing is not valid UTF-8")?;
            for line in listing.lines() {
                if line.is_empty() {
                    continue;
                }
                listings[node].push(parse_listing_line(line)?);
            }
        }

        let observations: Vec<Observation> = listings
            .iter()
            .flatten()
            .map(|(chunk, _)| Observation {
                timestamp: chunk.timestamp,
                chunk_index: chunk.index,
            })
            .collect();

        // Phase 2: every node that served the GET is now blocked awaiting a
        // timestamp frame, so answer all of them even when resolution fails.
        let Some(timestamp) = version::latest_complete_version(&observations, cluster_size)
        else {
            for connection in self.connections.iter_mut().flatten() {
                write_timestamp(connection, None).await?;
            }
            return Ok(GetStatus::Incomplete);
        };

        // Reconstruction stride: the largest size observed for chunk 0 of
        // the winning version. Exact for every chunk except the last, which
        // absorbs the division remainder and is written at the same stride.
        let stride = listings
            .iter()
            .flatten()
            .filter(|(chunk, _)| chunk.timestamp == timestamp && chunk.index == 0)
            .map(|(_, size)| *size)
            .max()
            .unwrap_or(0);

        let mut output = tokio::fs::File::create(destination)
            .await
            .with_context(|| format!("failed to create {}", destination.display()))?;

        for (node, slot) in self.connections.iter_mut().enumerate() {
            let Some(connection) = slot else { continue };
            write_timestamp(connection, Some(timestamp)).await?;

            let expected = listings[node]
                .iter()
                .filter(|(chunk, _)| chunk.timestamp == timestamp)
                .count();
            for _ in 0..expected {
                let (index, data) = read_chunk_record(connection).await?;
                output.seek(SeekFrom::Start(index as u64 * stride)).await?;
                output.write_all(&data).await?;
            }
        }
        output.flush().await?;

        info!(
            "Reconstructed {} (version {}) at {}",
            filename,
            timestamp,
            destination.display()
        );
        Ok(GetStatus::Complete)
    }
}

/// `"<chunk-name> <size>"` as sent in a GET listing.
fn parse_listing_line(line: &str) -> Result<(ChunkName, u64)> {
    let (name, size) = line
        .rsplit_once(' ')
        .with_context(|| format!("malformed GET listing line {:?}", line))?;
    let chunk = ChunkName::parse(name)
        .with_context(|| format!("malformed chunk name in GET listing {:?}", line))?;
    let size = size
        .parse()
        .with_context(|| format!("malformed chunk size in GET listing {:?}", line))?;
    Ok((chunk, size))
}

/// Logical name of a local path: its final component. The store's namespace
/// is flat, and the wire grammar is whitespace-separated.
fn logical_filename(path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?;
    if filename.chars().any(char::is_whitespace) {
        bail!("file name {:?} contains whitespace, which the protocol cannot carry", filename);
    }
    Ok(filename.to_string())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
