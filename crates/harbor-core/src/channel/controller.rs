use std::time::Duration;

use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::channel::codec::{read_message, write_message};
use crate::channel::endpoint::{AnonymousEndpoint, ChannelBookmark};
use crate::channel::errors::ChannelError;
use crate::channel::messages::ChannelMessage;

/// How the reporter's operation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResult {
    Success,
    Failure { message: String },
    /// The peer disconnected before reporting a completion. Synthesized by
    /// the controller so consumers never block on a completion that will
    /// never arrive.
    PeerDisconnected,
}

impl CompletionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionResult::Success)
    }
}

/// Events observed by the controller, in the order the peer produced them.
/// `Completed` is always last; nothing follows it.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Progress { value: f64 },
    Completed { result: CompletionResult },
}

/// Controller half of a remote-control channel.
///
/// Owns the anonymous endpoint, hands its bookmark to the peer's launch
/// payload, and after the peer connects can remote-control it with
/// [`RemoteController::invoke`] while consuming its progress stream.
pub struct RemoteController {
    endpoint: AnonymousEndpoint,
    writer: Option<tokio::net::unix::OwnedWriteHalf>,
    events_rx: Option<mpsc::UnboundedReceiver<ChannelEvent>>,
}

impl RemoteController {
    /// Open a fresh anonymous endpoint. Must be called from within a tokio
    /// runtime.
    pub fn open() -> Result<Self, ChannelError> {
        Ok(Self {
            endpoint: AnonymousEndpoint::open()?,
            writer: None,
            events_rx: None,
        })
    }

    pub fn bookmark(&self) -> ChannelBookmark {
        self.endpoint.bookmark()
    }

    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    /// Wait for a peer to connect and announce itself.
    pub async fn wait_for_peer(&mut self, timeout: Duration) -> Result<(), ChannelError> {
        let stream = tokio::time::timeout(timeout, self.endpoint.accept())
            .await
            .map_err(|_| ChannelError::PeerTimeout {
                waited_ms: timeout.as_millis() as u64,
            })??;

        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        match read_message::<_, ChannelMessage>(&mut reader).await? {
            Some(ChannelMessage::ConnectionEstablished) => {}
            other => {
                return Err(ChannelError::ProtocolError {
                    message: format!("expected connection_established, got {:?}", other),
                });
            }
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        tokio::spawn(read_peer_messages(reader, events_tx));

        self.writer = Some(write_half);
        self.events_rx = Some(events_rx);
        info!(event = "core.channel.peer_connected");
        Ok(())
    }

    /// Instruct the connected peer to perform an action.
    pub async fn invoke(&mut self, action: &str) -> Result<(), ChannelError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(ChannelError::NotConnected);
        };
        write_message(
            writer,
            &ChannelMessage::Invoke {
                action: action.to_string(),
            },
        )
        .await?;
        debug!(event = "core.channel.action_invoked", action = action);
        Ok(())
    }

    /// Next event from the peer. Fails with `NotConnected` before a peer
    /// connects and with `Closed` once the completion event was consumed.
    pub async fn next_event(&mut self) -> Result<ChannelEvent, ChannelError> {
        let Some(events_rx) = self.events_rx.as_mut() else {
            return Err(ChannelError::NotConnected);
        };
        events_rx.recv().await.ok_or(ChannelError::Closed)
    }
}

/// Background reader pumping peer messages into the controller's event
/// queue. Emits exactly one `Completed` event and stops; EOF or a read
/// error before completion becomes a synthetic `PeerDisconnected`.
async fn read_peer_messages(
    mut reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
) {
    loop {
        match read_message::<_, ChannelMessage>(&mut reader).await {
            Ok(Some(ChannelMessage::Progress { value })) => {
                if events_tx.send(ChannelEvent::Progress { value }).is_err() {
                    break;
                }
            }
            Ok(Some(ChannelMessage::Completion { error })) => {
                let result = match error {
                    None => CompletionResult::Success,
                    Some(message) => CompletionResult::Failure { message },
                };
                let _ = events_tx.send(ChannelEvent::Completed { result });
                break;
            }
            Ok(Some(other)) => {
                warn!(
                    event = "core.channel.unexpected_message",
                    message = ?other,
                );
            }
            Ok(None) => {
                let _ = events_tx.send(ChannelEvent::Completed {
                    result: CompletionResult::PeerDisconnected,
                });
                break;
            }
            Err(e) => {
                warn!(event = "core.channel.read_failed", error = %e);
                let _ = events_tx.send(ChannelEvent::Completed {
                    result: CompletionResult::PeerDisconnected,
                });
                break;
            }
        }
    }
}
