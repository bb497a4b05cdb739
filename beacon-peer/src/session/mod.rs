mod behavior;
mod config;
mod engine;
mod error;
mod session;
mod state;

pub use behavior::{NullBehavior, SessionBehavior};
pub use config::{Polarity, SessionConfig};
pub use engine::NegotiationEngine;
pub use error::SessionError;
pub use session::Session;
pub use state::NegotiationState;
