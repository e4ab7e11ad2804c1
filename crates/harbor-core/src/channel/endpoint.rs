use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::net::{UnixListener, UnixStream};
use tracing::debug;
use uuid::Uuid;

use crate::channel::errors::ChannelError;

/// Serialized claim to a channel endpoint.
///
/// Possession of the bookmark is the only credential: the socket lives in a
/// private (0700) directory under an unguessable uuid name, so nothing can
/// connect without being handed this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelBookmark(String);

impl ChannelBookmark {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl std::fmt::Display for ChannelBookmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An unnamed listening endpoint. The backing socket and its directory are
/// removed when the endpoint is dropped.
pub struct AnonymousEndpoint {
    // Held for its Drop: deletes the socket directory with the endpoint.
    _dir: tempfile::TempDir,
    socket_path: PathBuf,
    listener: UnixListener,
}

impl AnonymousEndpoint {
    /// Bind a fresh endpoint. Must be called from within a tokio runtime.
    pub fn open() -> Result<Self, ChannelError> {
        let dir = tempfile::Builder::new()
            .prefix("harbor-chan-")
            .tempdir()
            .map_err(ChannelError::from)?;
        let socket_path = dir.path().join(format!("{}.sock", Uuid::new_v4().simple()));
        let listener = UnixListener::bind(&socket_path)?;

        debug!(
            event = "core.channel.endpoint_opened",
            socket = %socket_path.display(),
        );

        Ok(Self {
            _dir: dir,
            socket_path,
            listener,
        })
    }

    pub fn bookmark(&self) -> ChannelBookmark {
        ChannelBookmark(self.socket_path.to_string_lossy().to_string())
    }

    pub async fn accept(&self) -> Result<UnixStream, ChannelError> {
        let (stream, _addr) = self.listener.accept().await?;
        Ok(stream)
    }
}
