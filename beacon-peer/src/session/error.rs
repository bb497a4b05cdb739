use crate::link::LinkError;
use beacon_core::ProtocolError;
use thiserror::Error;

/// Fatal session failures.
///
/// Protocol-level noise (malformed frames, rejected SDP) is absorbed inside
/// the engine with a diagnostic instead of surfacing here; only errors that
/// end the session escape.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("rendezvous link failed: {0}")]
    Connection(#[from] LinkError),
    #[error("missing media capability: {0}")]
    Capability(String),
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("negotiation out of order: {0}")]
    State(&'static str),
}
