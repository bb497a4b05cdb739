use beacon_core::{MediaDirections, ReadySignal, Role};
use std::str::FromStr;

/// Which side creates the first offer.
///
/// Deployed rendezvous servers disagree on this, so it stays a per-session
/// configuration choice rather than a built-in answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Polarity {
    /// The host offers once the client reports ready; the client only answers.
    #[default]
    HostOffers,
    /// The client offers unconditionally once ready.
    ClientOffers,
    /// Whichever side's media engine asks for negotiation first offers.
    EitherOffers,
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host-offers" | "host" => Ok(Polarity::HostOffers),
            "client-offers" | "client" => Ok(Polarity::ClientOffers),
            "either-offers" | "either" => Ok(Polarity::EitherOffers),
            other => Err(format!(
                "unknown polarity '{other}', expected host-offers, client-offers or either-offers"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub role: Role,
    pub polarity: Polarity,
    /// Payload of the client's readiness signal; servers accept a boolean
    /// flag or a protocol-variant marker.
    pub ready_signal: ReadySignal,
    pub directions: MediaDirections,
    /// Whether the host announces `settings` after the peer reports ready.
    pub announce_settings: bool,
    /// Label of a data channel the host opens alongside the media session.
    pub data_channel: Option<String>,
}

impl SessionConfig {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            polarity: Polarity::default(),
            ready_signal: ReadySignal::default(),
            directions: MediaDirections::default(),
            announce_settings: true,
            data_channel: None,
        }
    }
}
