use serde::{Deserialize, Serialize};

/// Wire messages carried over a remote-control channel.
///
/// Each variant maps to a JSONL message with `"type"` as the tag field.
/// The reporter opens with `connection_established`, streams `progress`,
/// and finishes with exactly one `completion`; the controller sends
/// `invoke` in the other direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelMessage {
    #[serde(rename = "connection_established")]
    ConnectionEstablished,

    #[serde(rename = "progress")]
    Progress { value: f64 },

    #[serde(rename = "completion")]
    Completion {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "invoke")]
    Invoke { action: String },
}
