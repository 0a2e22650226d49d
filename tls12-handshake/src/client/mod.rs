mod config;
mod connection;
mod hs;
mod state;

pub use config::ClientConfig;
pub use connection::{ClientConnection, HandshakeEvents, HandshakeTimer, NoEvents};
pub use state::{ClientVerification, ConnectionStatus};
