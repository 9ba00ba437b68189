//! API module
//!
//! This module provides the API functionality for the tinder client:
//! the session client and the transports it sends requests through.

pub mod client;

// Re-export commonly used types
pub use client::{
    ClientConfig, ClientError, HttpTransport, SessionClient, Transport, TransportConfig,
    TransportError,
};
