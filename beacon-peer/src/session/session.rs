use crate::link::{LinkReceiver, RendezvousLink};
use crate::media::{MediaEngineFactory, MediaEvent};
use crate::session::behavior::SessionBehavior;
use crate::session::config::SessionConfig;
use crate::session::engine::NegotiationEngine;
use crate::session::error::SessionError;
use beacon_core::RoomIdentity;
use tokio::sync::mpsc;
use tracing::info;

/// One rendezvous-negotiated peer session.
///
/// A single task selects over the two event sources: inbound rendezvous
/// frames and media-engine events. Each event is handled to completion before
/// the next is taken, which is what makes engine transitions atomic.
pub struct Session {
    engine: NegotiationEngine,
    frames: LinkReceiver,
    media_rx: mpsc::Receiver<MediaEvent>,
}

impl Session {
    /// Connect to the room's rendezvous endpoint and assemble the session.
    /// The configured role is forced to match the resolved identity.
    pub async fn connect(
        identity: &RoomIdentity,
        mut config: SessionConfig,
        factory: Box<dyn MediaEngineFactory>,
        behavior: Box<dyn SessionBehavior>,
    ) -> Result<Self, SessionError> {
        config.role = identity.role();
        let link = RendezvousLink::connect(&identity.endpoint()).await?;
        let (sender, frames) = link.split();
        let (media_tx, media_rx) = mpsc::channel(64);
        let engine =
            NegotiationEngine::new(config, Box::new(sender), factory, behavior, media_tx);
        Ok(Self {
            engine,
            frames,
            media_rx,
        })
    }

    /// Drive the session until the rendezvous channel closes, the media
    /// transport ends, or a fatal error occurs.
    ///
    /// A remote close is a graceful end (`Ok`); there is no reconnection.
    pub async fn run(mut self) -> Result<(), SessionError> {
        self.engine.start().await?;
        let result = self.event_loop().await;
        self.engine.shutdown().await;
        result
    }

    async fn event_loop(&mut self) -> Result<(), SessionError> {
        loop {
            tokio::select! {
                frame = self.frames.next_text() => match frame {
                    Some(Ok(text)) => self.engine.handle_frame(&text).await?,
                    Some(Err(e)) => {
                        self.engine.terminate(e.to_string());
                        return Err(e.into());
                    }
                    None => {
                        info!("rendezvous channel closed; session over");
                        self.engine.terminate("rendezvous channel closed");
                        return Ok(());
                    }
                },
                event = self.media_rx.recv() => match event {
                    Some(event) => self.engine.handle_media_event(event).await?,
                    None => return Ok(()),
                },
            }
            if self.engine.state().is_terminated() {
                return Ok(());
            }
        }
    }
}
