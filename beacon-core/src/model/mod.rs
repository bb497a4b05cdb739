mod candidate;
mod description;
mod media;
mod room;
mod signaling;

pub use candidate::IceCandidate;
pub use description::{SdpKind, SessionDescription};
pub use media::{MediaDirections, MediaPreference, SessionSettings, StreamKind};
pub use room::{Role, Room, RoomError, RoomIdentity};
pub use signaling::{ProtocolError, ReadySignal, RendezvousMessage};
