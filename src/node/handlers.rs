use anyhow::{Context, Result, bail};
use std::path::Path;
use tokio::net::TcpStream;

use crate::placement::chunk::ChunkName;
use crate::protocol::{
    Command, read_frame, read_timestamp, try_read_frame, write_chunk_record, write_frame,
};

/// Services one connection until the peer closes it or a command fails.
/// Runs under the worker deadline set by the server.
pub async fn serve_connection(mut stream: TcpStream, storage_dir: &Path) -> Result<()> {
    loop {
        let Some(frame) = try_read_frame(&mut stream).await? else {
            return Ok(());
        };
        let text = String::from_utf8(frame).context("command frame is not valid UTF-8")?;
        let command = Command::parse(&text)?;
        tracing::debug!("{}", text);

        match command {
            Command::List => handle_list(&mut stream, storage_dir).await?,
            Command::Get { filename } => handle_get(&mut stream, storage_dir, &filename).await?,
            Command::Put { primary, secondary } => {
                handle_put(&mut stream, storage_dir, &primary, &secondary).await?
            }
        }
    }
}

/// LIST: one frame of newline-separated physical chunk names.
async fn handle_list(stream: &mut TcpStream, storage_dir: &Path) -> Result<()> {
    let names = list_chunk_names(storage_dir).await?;
    write_frame(stream, names.join("\n").as_bytes()).await
}

/// GET: one frame of `"<name> <size>"` lines for chunks of the requested
/// filename, then a timestamp frame from the client, then one chunk record
/// per locally-held chunk of that timestamp.
async fn handle_get(stream: &mut TcpStream, storage_dir: &Path, filename: &str) -> Result<()> {
    let mut matches: Vec<(ChunkName, u64)> = Vec::new();
    for name in list_chunk_names(storage_dir).await? {
        if let Some(chunk) = ChunkName::parse(&name)
            && chunk.filename == filename
        {
            let size = tokio::fs::metadata(storage_dir.join(&name))
                .await
                .with_context(|| format!("failed to stat chunk {}", name))?
                .len();
            matches.push((chunk, size));
        }
    }

    let listing: Vec<String> = matches
        .iter()
        .map(|(chunk, size)| format!("{} {}", chunk, size))
        .collect();
    write_frame(stream, listing.join("\n").as_bytes()).await?;

    // The client answers with the version it wants; the sentinel parses to
    // None and matches nothing.
    let Some(timestamp) = read_timestamp(stream).await? else {
        return Ok(());
    };

    for (chunk, _) in matches.iter().filter(|(c, _)| c.timestamp == timestamp) {
        let path = storage_dir.join(chunk.to_string());
        let data = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read chunk {}", path.display()))?;
        write_chunk_record(stream, chunk.index, &data).await?;
    }
    Ok(())
}

/// PUT: two `[size][bytes]` transfers written verbatim under the announced
/// names. Existing files are replaced silently; timestamp-versioned names
/// never collide in practice.
async fn handle_put(
    stream: &mut TcpStream,
    storage_dir: &Path,
    primary: &str,
    secondary: &str,
) -> Result<()> {
    for name in [primary, secondary] {
        validate_chunk_target(name)?;
        let data = read_frame(stream).await?;
        let path = storage_dir.join(name);
        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("failed to write chunk {}", path.display()))?;
        tracing::debug!("Stored {} ({} bytes)", name, data.len());
    }
    Ok(())
}

/// The namespace is flat; a chunk name that would escape the storage
/// directory is a protocol violation.
fn validate_chunk_target(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("illegal chunk name: {:?}", name);
    }
    Ok(())
}

/// Every plain file in the storage directory, by name. Entries with
/// non-UTF-8 names are skipped; nothing else should be writing here.
async fn list_chunk_names(storage_dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(storage_dir)
        .await
        .with_context(|| format!("failed to list {}", storage_dir.display()))?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file()
            && let Ok(name) = entry.file_name().into_string()
        {
            names.push(name);
        }
    }
    Ok(names)
}
