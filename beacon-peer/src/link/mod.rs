mod rendezvous_link;
mod signal_sink;

pub use rendezvous_link::{LinkError, LinkReceiver, LinkSender, RendezvousLink};
pub use signal_sink::SignalSink;
