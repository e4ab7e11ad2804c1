//! Anonymous remote-control channel.
//!
//! A channel is an unnamed Unix socket bound at an unguessable path inside
//! a private temp directory; the serialized [`ChannelBookmark`] is the only
//! way a peer can reach it, so unrelated processes cannot attach. One
//! channel carries one operation: the reporter side streams monotonic
//! progress and exactly one completion, the controller side remote-controls
//! the peer and consumes the event stream. Peer death before completion is
//! surfaced as a synthetic `PeerDisconnected` completion so consumers never
//! wait forever.

pub mod codec;
pub mod controller;
pub mod endpoint;
pub mod errors;
pub mod messages;
pub mod reporter;

pub use controller::{ChannelEvent, CompletionResult, RemoteController};
pub use endpoint::{AnonymousEndpoint, ChannelBookmark};
pub use errors::ChannelError;
pub use messages::ChannelMessage;
pub use reporter::ProgressReporter;
