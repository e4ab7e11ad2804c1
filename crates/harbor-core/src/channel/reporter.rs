use tokio::io::BufReader;
use tokio::net::UnixStream;
use tracing::{debug, warn};

use crate::channel::codec::{read_message, write_message};
use crate::channel::endpoint::ChannelBookmark;
use crate::channel::errors::ChannelError;
use crate::channel::messages::ChannelMessage;

/// Reporter half of a remote-control channel.
///
/// Lives in the process performing the long-running operation. Streams
/// monotonically non-decreasing progress and exactly one completion to the
/// controller, and receives `invoke` commands from it.
pub struct ProgressReporter {
    reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    writer: tokio::net::unix::OwnedWriteHalf,
    last_progress: f64,
    completed: bool,
}

impl ProgressReporter {
    /// Connect to the endpoint named by `bookmark` and announce ourselves.
    pub async fn connect(bookmark: &ChannelBookmark) -> Result<Self, ChannelError> {
        let stream = UnixStream::connect(bookmark.as_path())
            .await
            .map_err(|e| ChannelError::ConnectionFailed {
                message: format!("{}: {}", bookmark, e),
            })?;
        let (reader, writer) = stream.into_split();
        let mut reporter = Self {
            reader: BufReader::new(reader),
            writer,
            last_progress: 0.0,
            completed: false,
        };
        write_message(&mut reporter.writer, &ChannelMessage::ConnectionEstablished).await?;

        debug!(event = "core.channel.reporter_connected", bookmark = %bookmark);
        Ok(reporter)
    }

    /// Report progress in `[previous, 1.0]`. Values outside that range fail
    /// with `InvalidArgument` and do not change channel state.
    pub async fn report_progress(&mut self, value: f64) -> Result<(), ChannelError> {
        if self.completed {
            return Err(ChannelError::Closed);
        }
        if !value.is_finite() || value < self.last_progress || value > 1.0 {
            return Err(ChannelError::InvalidArgument {
                message: format!(
                    "progress must be within [{}, 1.0], got {}",
                    self.last_progress, value
                ),
            });
        }
        write_message(&mut self.writer, &ChannelMessage::Progress { value }).await?;
        self.last_progress = value;
        Ok(())
    }

    /// Terminate the operation. `None` reports success; at most one
    /// completion may be reported per channel.
    pub async fn report_completion(&mut self, error: Option<String>) -> Result<(), ChannelError> {
        if self.completed {
            return Err(ChannelError::Closed);
        }
        write_message(&mut self.writer, &ChannelMessage::Completion { error }).await?;
        self.completed = true;
        debug!(event = "core.channel.completion_reported");
        Ok(())
    }

    /// Wait for the next `invoke` from the controller. Returns `None` when
    /// the controller closed its end.
    pub async fn next_command(&mut self) -> Result<Option<String>, ChannelError> {
        loop {
            match read_message::<_, ChannelMessage>(&mut self.reader).await? {
                Some(ChannelMessage::Invoke { action }) => return Ok(Some(action)),
                Some(other) => {
                    warn!(
                        event = "core.channel.unexpected_message",
                        message = ?other,
                    );
                }
                None => return Ok(None),
            }
        }
    }
}
