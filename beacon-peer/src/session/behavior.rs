use async_trait::async_trait;
use beacon_core::StreamKind;
use bytes::Bytes;

/// Application hooks for the parts of a session this crate routes but never
/// interprets: incoming media and data-channel traffic. Rendering and message
/// handling belong to the embedding application.
#[async_trait]
pub trait SessionBehavior: Send + Sync {
    async fn on_stream(&self, _kind: StreamKind) {}
    async fn on_data_channel_open(&self, _label: &str) {}
    async fn on_data_message(&self, _label: &str, _data: Bytes) {}
}

/// Ignores everything; useful when only negotiation matters.
pub struct NullBehavior;

#[async_trait]
impl SessionBehavior for NullBehavior {}
