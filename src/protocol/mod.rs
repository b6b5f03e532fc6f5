//! Wire Protocol Module
//!
//! Defines the framing and the command grammar spoken between the client
//! coordinator and the storage nodes. Both sides use these helpers verbatim,
//! so the byte layout is specified in exactly one place.
//!
//! ## Frame shapes (all integers big-endian `u32`)
//! - **Command / listing / blob**: `[len][bytes]`. Commands and listings
//!   carry UTF-8 text, blobs carry raw chunk data.
//! - **Chunk record** (GET retrieval phase): `[index][size][bytes]`.
//! - **Timestamp**: exactly 32 bytes, ASCII decimal, NUL-padded. The client
//!   sends `-1` (which parses to no version) to release nodes blocked in a
//!   GET exchange when resolution found nothing retrievable.

use anyhow::{Context, Result, bail, ensure};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Sanity bound on a single frame or blob. Listings grow with the chunk
/// directory and are otherwise unbounded.
pub const MAX_FRAME_LEN: usize = 1 << 30;

/// Fixed width of the timestamp exchange in a GET.
pub const TIMESTAMP_FRAME_LEN: usize = 32;

/// A command as sent by the coordinator and parsed by a node worker.
///
/// Text form on the wire: `LIST`, `GET <filename>`,
/// `PUT <primary> <secondary>`. Tokens are whitespace-separated, which is
/// why filenames may not contain whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request every physical chunk name in the node's directory.
    List,
    /// Request the chunks of one logical filename, then a retrieval phase.
    Get { filename: String },
    /// Announce two chunk uploads, primary then secondary.
    Put { primary: String, secondary: String },
}

impl Command {
    pub fn encode(&self) -> String {
        match self {
            Command::List => "LIST".to_string(),
            Command::Get { filename } => format!("GET {}", filename),
            Command::Put { primary, secondary } => format!("PUT {} {}", primary, secondary),
        }
    }

    pub fn parse(text: &str) -> Result<Command> {
        let mut tokens = text.split_whitespace();
        let command = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
            (Some("LIST"), None, ..) => Command::List,
            (Some("GET"), Some(filename), None, _) => Command::Get {
                filename: filename.to_string(),
            },
            (Some("PUT"), Some(primary), Some(secondary), None) => Command::Put {
                primary: primary.to_string(),
                secondary: secondary.to_string(),
            },
            _ => bail!("invalid command: {:?}", text),
        };
        Ok(command)
    }
}

/// Writes one `[len][bytes]` frame.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    ensure!(
        payload.len() <= MAX_FRAME_LEN,
        "frame of {} bytes exceeds the {} byte bound",
        payload.len(),
        MAX_FRAME_LEN
    );
    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(payload).await?;
    Ok(())
}

/// Reads one `[len][bytes]` frame, or `None` on a clean peer close at a
/// frame boundary.
pub async fn try_read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e).context("failed to read frame length"),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    ensure!(
        len <= MAX_FRAME_LEN,
        "peer announced a {} byte frame, exceeding the {} byte bound",
        len,
        MAX_FRAME_LEN
    );
    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .context("peer closed mid-frame")?;
    Ok(Some(payload))
}

/// Reads one frame where peer close is a protocol violation.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    try_read_frame(reader)
        .await?
        .context("peer closed while a frame was expected")
}

/// Writes one `[index][size][bytes]` chunk record.
pub async fn write_chunk_record<W: AsyncWrite + Unpin>(
    writer: &mut W,
    index: u32,
    data: &[u8],
) -> Result<()> {
    writer.write_u32(index).await?;
    write_frame(writer, data).await
}

/// Reads one `[index][size][bytes]` chunk record.
pub async fn read_chunk_record<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(u32, Vec<u8>)> {
    let index = reader
        .read_u32()
        .await
        .context("peer closed while a chunk record was expected")?;
    let data = read_frame(reader).await?;
    Ok((index, data))
}

/// Writes the fixed-width timestamp frame. `None` writes the `-1` sentinel,
/// which no stored chunk can ever match.
pub async fn write_timestamp<W: AsyncWrite + Unpin>(
    writer: &mut W,
    timestamp: Option<u64>,
) -> Result<()> {
    let text = match timestamp {
        Some(ts) => ts.to_string(),
        None => "-1".to_string(),
    };
    // u64 needs at most 20 digits, well inside the frame.
    let mut frame = [0u8; TIMESTAMP_FRAME_LEN];
    frame[..text.len()].copy_from_slice(text.as_bytes());
    writer.write_all(&frame).await?;
    Ok(())
}

/// Reads the fixed-width timestamp frame. Anything that does not parse as a
/// decimal timestamp (including the `-1` sentinel) comes back as `None`.
pub async fn read_timestamp<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<u64>> {
    let mut frame = [0u8; TIMESTAMP_FRAME_LEN];
    reader
        .read_exact(&mut frame)
        .await
        .context("peer closed while a timestamp was expected")?;
    let end = frame
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(TIMESTAMP_FRAME_LEN);
    Ok(std::str::from_utf8(&frame[..end])
        .ok()
        .and_then(|text| text.parse().ok()))
}
