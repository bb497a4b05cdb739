pub mod model;

pub use model::{
    IceCandidate, MediaDirections, MediaPreference, ProtocolError, ReadySignal, RendezvousMessage,
    Role, Room, RoomError, RoomIdentity, SdpKind, SessionDescription, SessionSettings, StreamKind,
};
