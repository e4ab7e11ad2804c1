//! JSONL framing for channel messages.
//!
//! One serde-serialized message per line. `read_message` returns `None` on
//! a cleanly closed stream.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::channel::errors::ChannelError;

pub async fn write_message<W, T>(writer: &mut W, msg: &T) -> Result<(), ChannelError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_string(msg).map_err(|e| ChannelError::ProtocolError {
        message: format!("failed to serialize message: {}", e),
    })?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>, ChannelError>
where
    R: AsyncBufReadExt + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        return serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| ChannelError::ProtocolError {
                message: format!("failed to parse message: {}", e),
            });
    }
}
