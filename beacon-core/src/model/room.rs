use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Which side of the rendezvous this peer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Client => write!(f, "client"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("no room name given and the URL carries no '#room' fragment")]
    MissingRoom,
}

/// A resolved rendezvous identity: the server base URL plus the room and role
/// this session will connect as. Role is fixed here, before connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomIdentity {
    base_url: String,
    room: Room,
}

impl RoomIdentity {
    /// Resolve room and role from configuration input.
    ///
    /// An explicit room name makes this side the host. Without one, the room is
    /// taken from the shared link's `#room` fragment and this side joins as the
    /// client.
    pub fn resolve(url: &str, room_name: Option<&str>) -> Result<Self, RoomError> {
        let (base, fragment) = match url.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (url, None),
        };

        let parsed = Url::parse(base).map_err(|source| RoomError::InvalidUrl {
            url: base.to_string(),
            source,
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(RoomError::UnsupportedScheme(other.to_string())),
        }

        let mut base_url = base.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let room = match room_name.filter(|name| !name.is_empty()) {
            Some(name) => Room {
                name: name.to_string(),
                role: Role::Host,
            },
            None => match fragment.filter(|name| !name.is_empty()) {
                Some(name) => Room {
                    name: name.to_string(),
                    role: Role::Client,
                },
                None => return Err(RoomError::MissingRoom),
            },
        };

        Ok(Self { base_url, room })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn room_name(&self) -> &str {
        &self.room.name
    }

    pub fn role(&self) -> Role {
        self.room.role
    }

    /// The rendezvous endpoint for this identity.
    ///
    /// The secure-HTTP prefix is swapped for its WebSocket equivalent
    /// (`https` -> `wss`, `http` -> `ws`) and `ws/<role>/<room>/` is appended
    /// to the base path.
    pub fn endpoint(&self) -> String {
        let upgraded = self.base_url.replacen("http", "ws", 1);
        format!("{}ws/{}/{}/", upgraded, self.room.role, self.room.name)
    }

    /// The `<baseUrl>#<roomName>` link a peer shares out of band.
    pub fn share_link(&self) -> String {
        format!("{}#{}", self.base_url, self.room.name)
    }
}
