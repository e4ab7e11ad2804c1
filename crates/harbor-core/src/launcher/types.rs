use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::channel::ChannelBookmark;

/// Opaque token correlating one hosted-process request with its
/// interruption callbacks and kill requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(Uuid);

impl RequestToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Interruption notifications are re-dispatched through this channel onto
/// the context that owns session state; hosts only ever see the sender.
pub type InterruptionSender = mpsc::UnboundedSender<RequestToken>;
pub type InterruptionReceiver = mpsc::UnboundedReceiver<RequestToken>;

/// Input handed to the hosting subsystem alongside the guest identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchPayload {
    /// The persisted selected-app key, forwarded so helpers know which
    /// guest the host currently has selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_app: Option<String>,

    /// Bookmark of a remote-control channel the guest should connect back
    /// to (refresh helpers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<ChannelBookmark>,

    /// Extra environment variables for the guest process.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

/// A request to start one guest app instance.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub bundle_id: String,
    pub container_id: String,
    pub payload: LaunchPayload,
}

impl LaunchRequest {
    pub fn new(bundle_id: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            container_id: container_id.into(),
            payload: LaunchPayload::default(),
        }
    }

    pub fn with_payload(mut self, payload: LaunchPayload) -> Self {
        self.payload = payload;
        self
    }
}
