use serde::{Deserialize, Serialize};

/// A trickled connectivity candidate.
///
/// Candidates are produced in no particular order by the media engine and are
/// only meaningful relative to a committed session description, which is why
/// the negotiation engine gates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_mline_index: u32,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>, sdp_mline_index: u32) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mline_index,
        }
    }
}
