use crate::model::candidate::IceCandidate;
use crate::model::description::SessionDescription;
use crate::model::media::SessionSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unrecognized rendezvous frame: {0}")]
    Decode(String),
    #[error("failed to encode rendezvous frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The readiness signal a client sends after connecting, relayed by the server
/// to the host. Deployed servers emit it as a plain flag, a protocol-variant
/// marker string, or richer payloads this peer does not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadySignal {
    Flag(bool),
    Mode(String),
    Other(serde_json::Value),
}

impl ReadySignal {
    pub fn separate_ice() -> Self {
        ReadySignal::Mode("separateIce".to_string())
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        ReadySignal::separate_ice()
    }
}

/// One rendezvous frame, in any of the shapes deployed peers produce.
///
/// The wire format keys frames by their single distinguishing field rather
/// than an explicit tag, and candidates appear both at the top level and under
/// an `ice` envelope, so this decodes as one permissive untagged union instead
/// of per-variant code paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RendezvousMessage {
    Ready { ready: ReadySignal },
    Settings { settings: SessionSettings },
    Description { description: SessionDescription },
    Ice { ice: IceCandidate },
    Candidate(IceCandidate),
}

impl RendezvousMessage {
    pub fn ready(signal: ReadySignal) -> Self {
        RendezvousMessage::Ready { ready: signal }
    }

    pub fn settings(settings: SessionSettings) -> Self {
        RendezvousMessage::Settings { settings }
    }

    pub fn description(description: SessionDescription) -> Self {
        RendezvousMessage::Description { description }
    }

    pub fn candidate(candidate: IceCandidate) -> Self {
        RendezvousMessage::Candidate(candidate)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Decode(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RendezvousMessage::Ready { .. } => "ready",
            RendezvousMessage::Settings { .. } => "settings",
            RendezvousMessage::Description { .. } => "description",
            RendezvousMessage::Ice { .. } | RendezvousMessage::Candidate(_) => "candidate",
        }
    }
}
