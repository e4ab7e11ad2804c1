use crate::errors::HarborError;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("No peer has connected to this channel")]
    NotConnected,

    #[error("Peer disconnected before completing the operation")]
    PeerDisconnected,

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Channel operation already completed")]
    Closed,

    #[error("Failed to connect to channel endpoint: {message}")]
    ConnectionFailed { message: String },

    #[error("No peer connected within {waited_ms}ms")]
    PeerTimeout { waited_ms: u64 },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl HarborError for ChannelError {
    fn error_code(&self) -> &'static str {
        match self {
            ChannelError::NotConnected => "CHANNEL_NOT_CONNECTED",
            ChannelError::PeerDisconnected => "CHANNEL_PEER_DISCONNECTED",
            ChannelError::InvalidArgument { .. } => "CHANNEL_INVALID_ARGUMENT",
            ChannelError::Closed => "CHANNEL_CLOSED",
            ChannelError::ConnectionFailed { .. } => "CHANNEL_CONNECTION_FAILED",
            ChannelError::PeerTimeout { .. } => "CHANNEL_PEER_TIMEOUT",
            ChannelError::ProtocolError { .. } => "CHANNEL_PROTOCOL_ERROR",
            ChannelError::IoError { .. } => "CHANNEL_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ChannelError::NotConnected | ChannelError::InvalidArgument { .. } | ChannelError::Closed
        )
    }
}
