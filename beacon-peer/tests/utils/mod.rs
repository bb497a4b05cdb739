#![allow(dead_code)]

use async_trait::async_trait;
use beacon_core::{IceCandidate, MediaDirections, RendezvousMessage, SessionDescription};
use beacon_peer::{
    LinkError, MediaEngine, MediaEngineFactory, MediaError, MediaEvent, NegotiationEngine,
    NullBehavior, SessionConfig, SignalSink,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::Level;

pub const OFFER_SDP: &str = "v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\n";
pub const ANSWER_SDP: &str = "v=0\r\no=- 2 1 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\n";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// SignalSink double that captures every outgoing frame.
#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<RendezvousMessage>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<RendezvousMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Message labels in send order, for ordering assertions.
    pub fn sent_labels(&self) -> Vec<&'static str> {
        self.sent().iter().map(|m| m.label()).collect()
    }

    pub fn descriptions(&self) -> Vec<SessionDescription> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                RendezvousMessage::Description { description } => Some(description),
                _ => None,
            })
            .collect()
    }

    pub fn candidates(&self) -> Vec<IceCandidate> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                RendezvousMessage::Candidate(candidate) => Some(candidate),
                RendezvousMessage::Ice { ice } => Some(ice),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SignalSink for RecordingSink {
    async fn send_signal(&mut self, msg: RendezvousMessage) -> Result<(), LinkError> {
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}

/// Commands the engine issued to the media engine, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    CreateOffer,
    CreateAnswer,
    SetLocal(SessionDescription),
    SetRemote(SessionDescription),
    Rollback,
    AddCandidate(IceCandidate),
    CreateDataChannel(String),
    Close,
}

#[derive(Default)]
struct MockState {
    commands: Mutex<Vec<MediaCommand>>,
    starts: AtomicUsize,
}

/// MediaEngine double that records commands and hands back canned SDP.
#[derive(Clone)]
pub struct MockMediaEngine {
    state: Arc<MockState>,
    fail_remote_descriptions: bool,
}

#[async_trait]
impl MediaEngine for MockMediaEngine {
    async fn create_offer(&self) -> Result<SessionDescription, MediaError> {
        self.state
            .commands
            .lock()
            .unwrap()
            .push(MediaCommand::CreateOffer);
        Ok(SessionDescription::offer(OFFER_SDP))
    }

    async fn create_answer(&self) -> Result<SessionDescription, MediaError> {
        self.state
            .commands
            .lock()
            .unwrap()
            .push(MediaCommand::CreateAnswer);
        Ok(SessionDescription::answer(ANSWER_SDP))
    }

    async fn set_local_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), MediaError> {
        self.state
            .commands
            .lock()
            .unwrap()
            .push(MediaCommand::SetLocal(description.clone()));
        Ok(())
    }

    async fn set_remote_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), MediaError> {
        if self.fail_remote_descriptions {
            return Err(MediaError::Description("mock SDP parse failure".into()));
        }
        self.state
            .commands
            .lock()
            .unwrap()
            .push(MediaCommand::SetRemote(description.clone()));
        Ok(())
    }

    async fn rollback_local_description(&self) -> Result<(), MediaError> {
        self.state
            .commands
            .lock()
            .unwrap()
            .push(MediaCommand::Rollback);
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<(), MediaError> {
        self.state
            .commands
            .lock()
            .unwrap()
            .push(MediaCommand::AddCandidate(candidate.clone()));
        Ok(())
    }

    async fn create_data_channel(&self, label: &str) -> Result<(), MediaError> {
        self.state
            .commands
            .lock()
            .unwrap()
            .push(MediaCommand::CreateDataChannel(label.to_string()));
        Ok(())
    }

    async fn close(&self) -> Result<(), MediaError> {
        self.state.commands.lock().unwrap().push(MediaCommand::Close);
        Ok(())
    }
}

/// Factory double: counts starts, shares the command log with the engines it
/// builds, and can be told to fail the capability check or to request
/// negotiation as soon as it starts (the way a live engine does once
/// transceivers exist).
#[derive(Clone)]
pub struct MockEngineFactory {
    state: Arc<MockState>,
    pub fail_capability: bool,
    pub fail_remote_descriptions: bool,
    pub negotiate_on_start: bool,
}

impl MockEngineFactory {
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState::default()),
            fail_capability: false,
            fail_remote_descriptions: false,
            negotiate_on_start: false,
        }
    }

    pub fn commands(&self) -> Vec<MediaCommand> {
        self.state.commands.lock().unwrap().clone()
    }

    pub fn candidate_commands(&self) -> Vec<IceCandidate> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                MediaCommand::AddCandidate(candidate) => Some(candidate),
                _ => None,
            })
            .collect()
    }

    pub fn starts(&self) -> usize {
        self.state.starts.load(Ordering::SeqCst)
    }
}

impl Default for MockEngineFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaEngineFactory for MockEngineFactory {
    async fn start(
        &self,
        _directions: MediaDirections,
        events: mpsc::Sender<MediaEvent>,
    ) -> Result<Box<dyn MediaEngine>, MediaError> {
        if self.fail_capability {
            return Err(MediaError::Capability("required codec missing".into()));
        }
        self.state.starts.fetch_add(1, Ordering::SeqCst);
        if self.negotiate_on_start {
            let _ = events.send(MediaEvent::NegotiationNeeded).await;
        }
        Ok(Box::new(MockMediaEngine {
            state: self.state.clone(),
            fail_remote_descriptions: self.fail_remote_descriptions,
        }))
    }
}

/// Assemble an engine wired to recording doubles.
///
/// The media event receiver is returned so callers can keep the channel open
/// (or drive events produced by `negotiate_on_start`).
pub fn test_engine(
    config: SessionConfig,
    sink: &RecordingSink,
    factory: &MockEngineFactory,
) -> (NegotiationEngine, mpsc::Receiver<MediaEvent>) {
    let (media_tx, media_rx) = mpsc::channel(64);
    let engine = NegotiationEngine::new(
        config,
        Box::new(sink.clone()),
        Box::new(factory.clone()),
        Box::new(NullBehavior),
        media_tx,
    );
    (engine, media_rx)
}

/// Poll until `cond` holds or the timeout elapses.
pub async fn wait_until<F>(cond: F, timeout_ms: u64) -> bool
where
    F: Fn() -> bool,
{
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
    cond()
}
