use crate::media::media_event::MediaEvent;
use async_trait::async_trait;
use beacon_core::{IceCandidate, MediaDirections, SessionDescription};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("missing media capability: {0}")]
    Capability(String),
    #[error("media engine rejected the description: {0}")]
    Description(String),
    #[error("media engine rejected the candidate: {0}")]
    Candidate(String),
    #[error(transparent)]
    Engine(#[from] webrtc::Error),
}

/// Commands the negotiation engine issues to the media engine.
///
/// Every call is awaited to completion before the event that triggered it is
/// considered handled; the candidate and description gates in the negotiation
/// engine rely on that.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, MediaError>;
    async fn create_answer(&self) -> Result<SessionDescription, MediaError>;
    async fn set_local_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), MediaError>;
    async fn set_remote_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), MediaError>;
    /// Discard an uncommitted local offer, returning to the stable state so a
    /// remote offer can be applied instead.
    async fn rollback_local_description(&self) -> Result<(), MediaError>;
    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<(), MediaError>;
    async fn create_data_channel(&self, label: &str) -> Result<(), MediaError>;
    async fn close(&self) -> Result<(), MediaError>;
}

/// Builds and starts one media engine per session.
///
/// Construction doubles as the capability check: a missing codec or feature
/// fails here, before any negotiation begins. Events flow back through the
/// given channel into the session loop.
#[async_trait]
pub trait MediaEngineFactory: Send + Sync {
    async fn start(
        &self,
        directions: MediaDirections,
        events: mpsc::Sender<MediaEvent>,
    ) -> Result<Box<dyn MediaEngine>, MediaError>;
}
