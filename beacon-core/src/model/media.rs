use serde::{Deserialize, Serialize};

/// Which media flows this session wants, per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaDirections {
    pub send_audio: bool,
    pub send_video: bool,
    pub receive_audio: bool,
    pub receive_video: bool,
}

impl MediaDirections {
    pub fn any(&self) -> bool {
        self.send_audio || self.send_video || self.receive_audio || self.receive_video
    }
}

/// Kind of an incoming media stream, as reported by the media engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Video,
}

/// A media toggle as it appears on the wire: peers send booleans, quoted
/// booleans and named capture sources interchangeably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaPreference {
    Flag(bool),
    Named(String),
}

impl MediaPreference {
    const FALSE_STRINGS: [&'static str; 4] = ["false", "null", "none", "no"];

    pub fn enabled(&self) -> bool {
        match self {
            MediaPreference::Flag(value) => *value,
            MediaPreference::Named(name) => {
                let name = name.to_ascii_lowercase();
                !Self::FALSE_STRINGS.contains(&name.as_str())
            }
        }
    }
}

impl Default for MediaPreference {
    fn default() -> Self {
        MediaPreference::Flag(false)
    }
}

impl From<bool> for MediaPreference {
    fn from(value: bool) -> Self {
        MediaPreference::Flag(value)
    }
}

/// The `settings` announcement a host sends once its peer is ready.
///
/// `client-*` fields describe what the client is asked to send, which is what
/// the host wants to receive; `host-*` fields describe what the host sends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default, rename = "separateIce")]
    pub separate_ice: bool,
    #[serde(default)]
    pub serverless: bool,
    #[serde(default, rename = "client-video")]
    pub client_video: MediaPreference,
    #[serde(default, rename = "client-audio")]
    pub client_audio: MediaPreference,
    #[serde(default, rename = "host-video")]
    pub host_video: MediaPreference,
    #[serde(default, rename = "host-audio")]
    pub host_audio: MediaPreference,
    #[serde(default)]
    pub debug: bool,
}

impl SessionSettings {
    /// The announcement matching a host's media directions, in the trickled
    /// ("separateIce") protocol variant.
    pub fn for_host(directions: &MediaDirections) -> Self {
        Self {
            separate_ice: true,
            serverless: false,
            client_video: directions.receive_video.into(),
            client_audio: directions.receive_audio.into(),
            host_video: directions.send_video.into(),
            host_audio: directions.send_audio.into(),
            debug: false,
        }
    }
}
