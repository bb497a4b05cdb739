use crate::media::media_engine::{MediaEngine, MediaEngineFactory, MediaError};
use crate::media::media_event::MediaEvent;
use async_trait::async_trait;
use beacon_core::{IceCandidate, MediaDirections, SdpKind, SessionDescription, StreamKind};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine as RtcMediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

/// ICE server configuration for the peer-to-peer transport.
#[derive(Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
        }
    }
}

/// Builds webrtc-rs peer connections wired to the session event channel.
pub struct WebRtcEngineFactory {
    config: TransportConfig,
}

impl WebRtcEngineFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MediaEngineFactory for WebRtcEngineFactory {
    async fn start(
        &self,
        directions: MediaDirections,
        events: mpsc::Sender<MediaEvent>,
    ) -> Result<Box<dyn MediaEngine>, MediaError> {
        // Codec and interceptor registration is the capability check: a build
        // without the required features fails here, before any negotiation.
        let mut media_engine = RtcMediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| MediaError::Capability(e.to_string()))?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| MediaError::Capability(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if self.config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: self.config.ice_servers.clone(),
                ..Default::default()
            }]
        };
        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let pc = Arc::new(api.new_peer_connection(rtc_config).await?);

        if let Some(direction) =
            transceiver_direction(directions.send_audio, directions.receive_audio)
        {
            pc.add_transceiver_from_kind(
                RTPCodecType::Audio,
                Some(RTCRtpTransceiverInit {
                    direction,
                    send_encodings: vec![],
                }),
            )
            .await?;
        }
        if let Some(direction) =
            transceiver_direction(directions.send_video, directions.receive_video)
        {
            pc.add_transceiver_from_kind(
                RTPCodecType::Video,
                Some(RTCRtpTransceiverInit {
                    direction,
                    send_encodings: vec![],
                }),
            )
            .await?;
        }

        let negotiation_tx = events.clone();
        pc.on_negotiation_needed(Box::new(move || {
            let tx = negotiation_tx.clone();
            Box::pin(async move {
                let _ = tx.send(MediaEvent::NegotiationNeeded).await;
            })
        }));

        let ice_tx = events.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate::new(
                    init.candidate,
                    u32::from(init.sdp_mline_index.unwrap_or(0)),
                );
                let _ = tx.send(MediaEvent::IceCandidate(candidate)).await;
            })
        }));

        let track_tx = events.clone();
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => StreamKind::Audio,
                    RTPCodecType::Video => StreamKind::Video,
                    _ => {
                        debug!("ignoring track of unspecified kind");
                        return;
                    }
                };
                let _ = tx.send(MediaEvent::IncomingStream { kind }).await;
            })
        }));

        let dc_tx = events.clone();
        pc.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            Box::pin(async move {
                debug!(label = dc.label(), "remote data channel arrived");
                wire_data_channel(&dc, tx);
            })
        }));

        let state_tx = events.clone();
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                info!(?state, "peer connection state changed");
                match state {
                    RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Closed => {
                        let _ = tx.send(MediaEvent::Disconnected).await;
                    }
                    _ => {}
                }
            })
        }));

        Ok(Box::new(WebRtcEngine { pc, events }))
    }
}

/// webrtc-rs backed media engine.
///
/// Pipeline internals (capture, codecs, rendering) stay inside the webrtc
/// crate; this adapter only translates negotiation commands and events.
pub struct WebRtcEngine {
    pc: Arc<RTCPeerConnection>,
    events: mpsc::Sender<MediaEvent>,
}

#[async_trait]
impl MediaEngine for WebRtcEngine {
    async fn create_offer(&self) -> Result<SessionDescription, MediaError> {
        let offer = self.pc.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, MediaError> {
        let answer = self.pc.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), MediaError> {
        let desc = rtc_description(description)?;
        self.pc.set_local_description(desc).await?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), MediaError> {
        let desc = rtc_description(description)?;
        self.pc.set_remote_description(desc).await?;
        Ok(())
    }

    async fn rollback_local_description(&self) -> Result<(), MediaError> {
        let mut rollback = RTCSessionDescription::default();
        rollback.sdp_type = RTCSdpType::Rollback;
        self.pc
            .set_local_description(rollback)
            .await
            .map_err(|e| MediaError::Description(e.to_string()))
    }

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<(), MediaError> {
        self.pc
            .add_ice_candidate(candidate_init(candidate)?)
            .await
            .map_err(|e| MediaError::Candidate(e.to_string()))
    }

    async fn create_data_channel(&self, label: &str) -> Result<(), MediaError> {
        let dc = self.pc.create_data_channel(label, None).await?;
        info!(label, "data channel created");
        wire_data_channel(&dc, self.events.clone());
        Ok(())
    }

    async fn close(&self) -> Result<(), MediaError> {
        self.pc.close().await?;
        Ok(())
    }
}

/// Parse SDP text into the engine's description type; this is where
/// syntactically broken SDP gets rejected.
fn rtc_description(description: &SessionDescription) -> Result<RTCSessionDescription, MediaError> {
    let result = match description.kind {
        SdpKind::Offer => RTCSessionDescription::offer(description.sdp.clone()),
        SdpKind::Answer => RTCSessionDescription::answer(description.sdp.clone()),
    };
    result.map_err(|e| MediaError::Description(e.to_string()))
}

/// Map a wire candidate into the engine's init type. The wire carries the
/// media-line index as a u32 while the engine takes a u16; an index that does
/// not fit is rejected like any other bad candidate.
fn candidate_init(candidate: &IceCandidate) -> Result<RTCIceCandidateInit, MediaError> {
    let index = u16::try_from(candidate.sdp_mline_index).map_err(|_| {
        MediaError::Candidate(format!(
            "sdpMLineIndex {} exceeds the engine's index range",
            candidate.sdp_mline_index
        ))
    })?;
    Ok(RTCIceCandidateInit {
        candidate: candidate.candidate.clone(),
        sdp_mline_index: Some(index),
        ..Default::default()
    })
}

fn transceiver_direction(send: bool, receive: bool) -> Option<RTCRtpTransceiverDirection> {
    match (send, receive) {
        (true, true) => Some(RTCRtpTransceiverDirection::Sendrecv),
        (true, false) => Some(RTCRtpTransceiverDirection::Sendonly),
        (false, true) => Some(RTCRtpTransceiverDirection::Recvonly),
        (false, false) => None,
    }
}

fn wire_data_channel(dc: &Arc<RTCDataChannel>, events: mpsc::Sender<MediaEvent>) {
    let label = dc.label().to_string();

    let open_tx = events.clone();
    let open_label = label.clone();
    dc.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let label = open_label.clone();
        Box::pin(async move {
            let _ = tx.send(MediaEvent::DataChannelOpen { label }).await;
        })
    }));

    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = events.clone();
        let label = label.clone();
        Box::pin(async move {
            let data = Bytes::from(msg.data.to_vec());
            if tx
                .send(MediaEvent::DataChannelMessage { label, data })
                .await
                .is_err()
            {
                warn!("session loop gone; dropping data channel message");
            }
        })
    }));
}
