pub mod link;
pub mod media;
pub mod session;

pub use link::{LinkError, LinkReceiver, LinkSender, RendezvousLink, SignalSink};
pub use media::{
    MediaEngine, MediaEngineFactory, MediaError, MediaEvent, TransportConfig, WebRtcEngine,
    WebRtcEngineFactory,
};
pub use session::{
    NegotiationEngine, NegotiationState, NullBehavior, Polarity, Session, SessionBehavior,
    SessionConfig, SessionError,
};
