use beacon_core::ProtocolError;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("rendezvous server unreachable: {0}")]
    Connect(#[source] WsError),
    #[error("rendezvous transport failed: {0}")]
    Transport(#[source] WsError),
    #[error("failed to encode outbound frame: {0}")]
    Encode(#[from] ProtocolError),
}

/// The single ordered, encrypted message channel to the rendezvous server.
///
/// There is no retry logic anywhere here: once this channel drops, the
/// session is over and the process reports failure.
pub struct RendezvousLink {
    ws: WsStream,
}

impl RendezvousLink {
    pub async fn connect(endpoint: &str) -> Result<Self, LinkError> {
        info!(endpoint, "connecting to rendezvous server");
        let (ws, _response) = connect_async(endpoint).await.map_err(LinkError::Connect)?;
        Ok(Self { ws })
    }

    /// Split into independently owned send and receive halves so the session
    /// loop can poll inbound frames while the engine sends.
    pub fn split(self) -> (LinkSender, LinkReceiver) {
        let (tx, rx) = self.ws.split();
        (LinkSender { tx }, LinkReceiver { rx })
    }
}

pub struct LinkSender {
    tx: SplitSink<WsStream, Message>,
}

impl LinkSender {
    pub async fn send_text(&mut self, text: String) -> Result<(), LinkError> {
        self.tx
            .send(Message::Text(text.into()))
            .await
            .map_err(LinkError::Transport)
    }

    pub async fn shutdown(&mut self) {
        if let Err(e) = self.tx.close().await {
            debug!(error = %e, "rendezvous sink close failed");
        }
    }
}

pub struct LinkReceiver {
    rx: SplitStream<WsStream>,
}

impl LinkReceiver {
    /// The next inbound text frame.
    ///
    /// Returns `None` once the remote closes the channel or the stream ends;
    /// control frames and binary frames are skipped.
    pub async fn next_text(&mut self) -> Option<Result<String, LinkError>> {
        loop {
            match self.rx.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(_)) => {
                    debug!("rendezvous server closed the channel");
                    return None;
                }
                Ok(other) => {
                    debug!(kind = ?other, "skipping non-text rendezvous frame");
                }
                Err(e) => return Some(Err(LinkError::Transport(e))),
            }
        }
    }
}
