//! Duplex voice conversation with the brand agent.

pub mod protocol;
mod session;
mod web;

pub use session::{SessionState, VoiceSession};
pub use web::WebBackend;

/// The session type the UI drives.
pub type BrowserVoiceSession = VoiceSession<WebBackend>;
