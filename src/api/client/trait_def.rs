//! Transport trait definition
//!
//! This module defines the `Transport` trait that abstracts over the component
//! performing the actual network exchange.

use std::sync::Arc;

use serde_json::Value;

use super::TransportError;
use crate::models::RequestDescriptor;

/// Executes a request descriptor and returns the parsed JSON response.
///
/// Implementations own timeouts and cancellation; the session layer defines none.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> Result<Value, TransportError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: RequestDescriptor) -> Result<Value, TransportError> {
        (**self).send(request).await
    }
}
