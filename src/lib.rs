//! Tinder client library crate
//!
//! A stateful client for the Tinder JSON API. [`SessionClient`] holds the
//! authorization state and activity cursor of one session and exposes each
//! API operation as an async method returning the raw JSON response.
//! Network I/O goes through a [`Transport`]; [`HttpTransport`] is the
//! production one.

pub mod api;
pub mod cli;
pub mod models;

pub use api::{
    ClientConfig, ClientError, HttpTransport, SessionClient, Transport, TransportConfig,
    TransportError,
};
pub use models::{Method, RequestDescriptor, Session};
