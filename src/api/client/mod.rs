//! Client module
//!
//! This module provides the session client for the API and the transports it runs on.

mod error;
mod http;
mod session;
mod trait_def;

// Re-export the trait and types
pub use error::{ClientError, TransportError};
pub use http::{HttpTransport, TransportConfig};
pub use session::{ClientConfig, SessionClient};
pub use trait_def::Transport;
