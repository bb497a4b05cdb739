use std::fmt;

/// Phase of the offer/answer exchange.
///
/// Owned exclusively by the negotiation engine and advanced only from its
/// event handlers, so transitions never interleave. `Terminated` is the sole
/// terminal state; `Negotiated` stays live for the whole media session and can
/// re-enter `AwaitingLocalDescription` on renegotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    WaitingForPeerReady,
    AwaitingLocalDescription,
    OfferSent,
    AwaitingRemoteDescription,
    Negotiated,
    Terminated(String),
}

impl NegotiationState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, NegotiationState::Terminated(_))
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationState::Idle => write!(f, "idle"),
            NegotiationState::WaitingForPeerReady => write!(f, "waiting-for-peer-ready"),
            NegotiationState::AwaitingLocalDescription => write!(f, "awaiting-local-description"),
            NegotiationState::OfferSent => write!(f, "offer-sent"),
            NegotiationState::AwaitingRemoteDescription => write!(f, "awaiting-remote-description"),
            NegotiationState::Negotiated => write!(f, "negotiated"),
            NegotiationState::Terminated(reason) => write!(f, "terminated ({reason})"),
        }
    }
}
