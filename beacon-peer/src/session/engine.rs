use crate::link::SignalSink;
use crate::media::{MediaEngineFactory, MediaEvent};
use crate::session::behavior::SessionBehavior;
use crate::session::config::{Polarity, SessionConfig};
use crate::session::error::SessionError;
use crate::session::state::NegotiationState;
use beacon_core::{
    IceCandidate, RendezvousMessage, Role, SdpKind, SessionDescription, SessionSettings,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::media::MediaEngine;

/// The offer/answer/ICE negotiation state machine.
///
/// Translates rendezvous frames into media-engine commands and media events
/// into rendezvous frames. Two gates keep trickle ICE from racing the
/// descriptions: locally produced candidates are buffered until the local
/// description commits, and remotely received candidates are buffered until
/// the media engine exists.
pub struct NegotiationEngine {
    config: SessionConfig,
    state: NegotiationState,
    signaling: Box<dyn SignalSink>,
    factory: Box<dyn MediaEngineFactory>,
    behavior: Box<dyn SessionBehavior>,
    media: Option<Box<dyn MediaEngine>>,
    media_tx: mpsc::Sender<MediaEvent>,
    /// Local candidates produced before the local description committed.
    pending_local: Vec<IceCandidate>,
    /// Remote candidates received before the media engine existed.
    pending_remote: Vec<IceCandidate>,
    local_committed: bool,
    peer_settings: Option<SessionSettings>,
}

impl NegotiationEngine {
    pub fn new(
        config: SessionConfig,
        signaling: Box<dyn SignalSink>,
        factory: Box<dyn MediaEngineFactory>,
        behavior: Box<dyn SessionBehavior>,
        media_tx: mpsc::Sender<MediaEvent>,
    ) -> Self {
        Self {
            config,
            state: NegotiationState::Idle,
            signaling,
            factory,
            behavior,
            media: None,
            media_tx,
            pending_local: Vec::new(),
            pending_remote: Vec::new(),
            local_committed: false,
            peer_settings: None,
        }
    }

    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn media_started(&self) -> bool {
        self.media.is_some()
    }

    pub fn peer_settings(&self) -> Option<&SessionSettings> {
        self.peer_settings.as_ref()
    }

    /// Role-dependent entry behavior, run once the rendezvous link is up.
    ///
    /// The client announces readiness immediately; under an offering polarity
    /// it also starts its media engine right away, otherwise the engine is
    /// deferred until the host's offer arrives. The host stays quiet and waits
    /// for the server to relay the client's readiness.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        match self.config.role {
            Role::Host => {
                info!("hosting; waiting for a peer to join the room");
                self.state = NegotiationState::WaitingForPeerReady;
            }
            Role::Client => {
                self.signaling
                    .send_signal(RendezvousMessage::ready(self.config.ready_signal.clone()))
                    .await?;
                if self.offers_locally() {
                    self.ensure_media_engine().await?;
                    self.state = NegotiationState::AwaitingLocalDescription;
                } else {
                    self.state = NegotiationState::AwaitingRemoteDescription;
                }
            }
        }
        Ok(())
    }

    /// Handle one raw inbound rendezvous frame.
    ///
    /// Malformed frames are dropped with a diagnostic; the session continues.
    pub async fn handle_frame(&mut self, text: &str) -> Result<(), SessionError> {
        let msg = match RendezvousMessage::from_json(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "dropping malformed rendezvous frame");
                return Ok(());
            }
        };
        self.handle_message(msg).await
    }

    pub async fn handle_message(&mut self, msg: RendezvousMessage) -> Result<(), SessionError> {
        if self.state.is_terminated() {
            debug!(kind = msg.label(), "dropping frame after termination");
            return Ok(());
        }
        match msg {
            RendezvousMessage::Ready { ready } => {
                debug!(signal = ?ready, "peer readiness reported");
                self.on_peer_ready().await
            }
            RendezvousMessage::Settings { settings } => {
                debug!("peer announced settings");
                self.peer_settings = Some(settings);
                Ok(())
            }
            RendezvousMessage::Description { description } => {
                self.on_remote_description(description).await
            }
            RendezvousMessage::Candidate(candidate) | RendezvousMessage::Ice { ice: candidate } => {
                self.on_remote_candidate(candidate).await
            }
        }
    }

    /// Handle one event raised by the media engine.
    pub async fn handle_media_event(&mut self, event: MediaEvent) -> Result<(), SessionError> {
        if self.state.is_terminated() {
            debug!("dropping media event after termination");
            return Ok(());
        }
        match event {
            MediaEvent::NegotiationNeeded => self.on_negotiation_needed().await,
            MediaEvent::IceCandidate(candidate) => self.on_local_candidate(candidate).await,
            MediaEvent::IncomingStream { kind } => {
                debug!(kind = ?kind, "incoming media stream");
                self.behavior.on_stream(kind).await;
                Ok(())
            }
            MediaEvent::DataChannelOpen { label } => {
                info!(label = %label, "data channel open");
                self.behavior.on_data_channel_open(&label).await;
                Ok(())
            }
            MediaEvent::DataChannelMessage { label, data } => {
                self.behavior.on_data_message(&label, data).await;
                Ok(())
            }
            MediaEvent::Disconnected => {
                self.terminate("media transport disconnected");
                Ok(())
            }
        }
    }

    pub fn terminate(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        info!(reason = %reason, "session terminated");
        self.state = NegotiationState::Terminated(reason);
    }

    /// Close the media engine, then the rendezvous sink, in that order, so no
    /// late media callback finds a torn-down link.
    pub async fn shutdown(&mut self) {
        if let Some(media) = self.media.take() {
            if let Err(e) = media.close().await {
                debug!(error = %e, "media engine close failed");
            }
        }
        self.signaling.close().await;
    }

    fn offers_locally(&self) -> bool {
        match self.config.polarity {
            Polarity::HostOffers => self.config.role == Role::Host,
            Polarity::ClientOffers => self.config.role == Role::Client,
            Polarity::EitherOffers => true,
        }
    }

    /// Start the media engine if it is not already running.
    ///
    /// Idempotent; a duplicate `ready` or a second description must not
    /// reconstruct a running engine. Remote candidates buffered while the
    /// engine was absent are applied here, exactly once, in receipt order.
    async fn ensure_media_engine(&mut self) -> Result<(), SessionError> {
        if self.media.is_some() {
            return Ok(());
        }

        let media = self
            .factory
            .start(self.config.directions, self.media_tx.clone())
            .await
            .map_err(|e| SessionError::Capability(e.to_string()))?;

        if self.config.role == Role::Host {
            if let Some(label) = &self.config.data_channel {
                if let Err(e) = media.create_data_channel(label).await {
                    warn!(label = %label, error = %e, "could not open the data channel");
                }
            }
        }

        let buffered = std::mem::take(&mut self.pending_remote);
        if !buffered.is_empty() {
            debug!(
                count = buffered.len(),
                "applying candidates buffered before the media engine started"
            );
        }
        for candidate in &buffered {
            if let Err(e) = media.add_ice_candidate(candidate).await {
                warn!(error = %e, "buffered remote candidate rejected");
            }
        }

        self.media = Some(media);
        Ok(())
    }

    async fn on_peer_ready(&mut self) -> Result<(), SessionError> {
        if self.config.role == Role::Client {
            debug!("ignoring readiness signal on the client side");
            return Ok(());
        }
        if self.media.is_some() {
            debug!("duplicate readiness signal; media engine already running");
            return Ok(());
        }

        info!("peer joined the room");
        self.ensure_media_engine().await?;

        if self.config.announce_settings {
            let settings = SessionSettings::for_host(&self.config.directions);
            self.signaling
                .send_signal(RendezvousMessage::settings(settings))
                .await?;
        }

        self.state = if self.offers_locally() {
            NegotiationState::AwaitingLocalDescription
        } else {
            NegotiationState::AwaitingRemoteDescription
        };
        Ok(())
    }

    async fn on_remote_description(
        &mut self,
        description: SessionDescription,
    ) -> Result<(), SessionError> {
        self.ensure_media_engine().await?;
        let Some(media) = self.media.as_deref() else {
            return Err(SessionError::State("media engine missing after start"));
        };

        if self.config.polarity == Polarity::EitherOffers
            && description.kind == SdpKind::Offer
            && self.state == NegotiationState::OfferSent
        {
            // Both sides offered at once. The host keeps its outstanding
            // offer and drops the peer's; the client abandons its own and
            // answers the peer's instead.
            if self.config.role == Role::Host {
                debug!("offer collision; waiting for the peer to answer ours");
                return Ok(());
            }
            if let Err(e) = media.rollback_local_description().await {
                warn!(error = %e, "could not abandon the outstanding offer");
                return Ok(());
            }
            info!("offer collision; yielding to the peer's offer");
            self.local_committed = false;
        }

        debug!(kind = %description.kind, "applying remote description");
        if let Err(e) = media.set_remote_description(&description).await {
            warn!(
                kind = %description.kind,
                error = %e,
                "remote description rejected; this negotiation attempt stays unresolved"
            );
            return Ok(());
        }

        match description.kind {
            SdpKind::Answer => {
                if self.state != NegotiationState::OfferSent {
                    debug!(state = %self.state, "answer arrived outside an offer exchange");
                }
                self.state = NegotiationState::Negotiated;
                info!("negotiation complete");
            }
            SdpKind::Offer => {
                // The peer (re)offered; respond with an answer, never a
                // counter-offer.
                let answer = match media.create_answer().await {
                    Ok(answer) => answer,
                    Err(e) => {
                        warn!(error = %e, "could not create an answer");
                        return Ok(());
                    }
                };
                if let Err(e) = media.set_local_description(&answer).await {
                    warn!(error = %e, "could not commit the answer");
                    return Ok(());
                }
                self.signaling
                    .send_signal(RendezvousMessage::description(answer))
                    .await?;
                self.local_committed = true;
                self.state = NegotiationState::Negotiated;
                info!("answered remote offer; negotiation complete");
                self.flush_local_candidates().await?;
            }
        }
        Ok(())
    }

    async fn on_remote_candidate(&mut self, candidate: IceCandidate) -> Result<(), SessionError> {
        match self.media.as_deref() {
            Some(media) => {
                if let Err(e) = media.add_ice_candidate(&candidate).await {
                    warn!(error = %e, "remote candidate rejected");
                }
            }
            None => {
                debug!("buffering remote candidate until the media engine starts");
                self.pending_remote.push(candidate);
            }
        }
        Ok(())
    }

    async fn on_negotiation_needed(&mut self) -> Result<(), SessionError> {
        if !self.offers_locally() {
            debug!("peer side drives the offer; ignoring negotiation-needed");
            return Ok(());
        }
        let Some(media) = self.media.as_deref() else {
            debug!("negotiation-needed before the media engine started");
            return Ok(());
        };

        self.state = NegotiationState::AwaitingLocalDescription;
        let offer = match media.create_offer().await {
            Ok(offer) => offer,
            Err(e) => {
                warn!(error = %e, "could not create an offer");
                return Ok(());
            }
        };
        if let Err(e) = media.set_local_description(&offer).await {
            warn!(error = %e, "could not commit the offer");
            return Ok(());
        }

        self.signaling
            .send_signal(RendezvousMessage::description(offer))
            .await?;
        self.local_committed = true;
        self.state = NegotiationState::OfferSent;
        info!("offer sent");
        self.flush_local_candidates().await?;
        Ok(())
    }

    async fn on_local_candidate(&mut self, candidate: IceCandidate) -> Result<(), SessionError> {
        if self.local_committed {
            self.signaling
                .send_signal(RendezvousMessage::candidate(candidate))
                .await?;
        } else {
            // The remote cannot correlate media lines before our description
            // reaches it; hold the candidate back.
            debug!("buffering local candidate until the local description commits");
            self.pending_local.push(candidate);
        }
        Ok(())
    }

    async fn flush_local_candidates(&mut self) -> Result<(), SessionError> {
        for candidate in std::mem::take(&mut self.pending_local) {
            self.signaling
                .send_signal(RendezvousMessage::candidate(candidate))
                .await?;
        }
        Ok(())
    }
}
