use crate::link::rendezvous_link::{LinkError, LinkSender};
use async_trait::async_trait;
use beacon_core::RendezvousMessage;
use tracing::debug;

/// Outbound seam of the rendezvous channel.
///
/// The negotiation engine sends through this trait so tests can substitute a
/// recording double for the live link. Sends are FIFO per sink.
#[async_trait]
pub trait SignalSink: Send {
    async fn send_signal(&mut self, msg: RendezvousMessage) -> Result<(), LinkError>;

    /// Flush and close the underlying channel; late sends after this are lost.
    async fn close(&mut self) {}
}

#[async_trait]
impl SignalSink for LinkSender {
    async fn send_signal(&mut self, msg: RendezvousMessage) -> Result<(), LinkError> {
        let json = msg.to_json()?;
        debug!(kind = msg.label(), "sending rendezvous frame");
        self.send_text(json).await
    }

    async fn close(&mut self) {
        self.shutdown().await;
    }
}
