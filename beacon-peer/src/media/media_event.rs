use beacon_core::{IceCandidate, StreamKind};
use bytes::Bytes;

/// Events the media engine raises back into the session loop.
///
/// The engine's callback surface is flattened into one enum delivered over a
/// channel, so media events and rendezvous frames are handled on a single task
/// and never re-enter a transition in progress.
#[derive(Debug, Clone)]
pub enum MediaEvent {
    /// The engine wants an offer/answer cycle (initial or renegotiation).
    NegotiationNeeded,
    /// A local connectivity candidate was discovered.
    IceCandidate(IceCandidate),
    /// The remote peer's media started arriving.
    IncomingStream { kind: StreamKind },
    DataChannelOpen { label: String },
    DataChannelMessage { label: String, data: Bytes },
    /// The peer-to-peer transport failed or closed.
    Disconnected,
}
