//! Session client
//!
//! Owns the authorization state and activity cursor, and turns each API
//! operation into a request descriptor handed to the injected transport.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{ClientError, Transport, TransportError};
use crate::models::{
    self, AuthRequest, Authorization, Method, MessageRequest, PositionRequest,
    RecommendationsRequest, RequestDescriptor, Session, UpdatesRequest,
};

/// Session client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: models::API_HOST.to_string(),
        }
    }
}

/// Stateful client for the API.
///
/// Clones share the same session. Every operation other than [`authorize`]
/// expects an authorized session; this is not checked locally, an
/// unauthorized call is sent without the auth header and rejected remotely.
///
/// Concurrent calls are allowed. Their effects on the session land in
/// completion order, so callers that need `authorize` to happen first must
/// await it first.
///
/// [`authorize`]: SessionClient::authorize
#[derive(Clone)]
pub struct SessionClient {
    transport: Arc<dyn Transport>,
    session: Arc<Mutex<Session>>,
    config: ClientConfig,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.config.base_url)
            .field("authorized", &self.is_authorized())
            .finish()
    }
}

impl SessionClient {
    /// Create a new client against the default API host
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config<T: Transport + 'static>(transport: T, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            session: Arc::new(Mutex::new(Session::new())),
            config,
        }
    }

    // The lock is only ever held for the duration of `f`, never across an await
    fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut session)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// True iff an auth token is held
    pub fn is_authorized(&self) -> bool {
        self.with_session(|session| session.is_authorized())
    }

    pub fn auth_token(&self) -> Option<String> {
        self.with_session(|session| session.auth_token().map(str::to_string))
    }

    pub fn user_id(&self) -> Option<String> {
        self.with_session(|session| session.user_id().map(str::to_string))
    }

    /// The full response of the last successful authentication
    pub fn session_defaults(&self) -> Option<Value> {
        self.with_session(|session| session.defaults().cloned())
    }

    /// Point up to which incremental updates have been fetched
    pub fn activity_cursor(&self) -> DateTime<Utc> {
        self.with_session(|session| session.activity_cursor())
    }

    /// Builds the descriptor for `path` from the current session state without sending it
    pub fn build_request(
        &self,
        path: &str,
        payload: Option<Value>,
        method: Method,
    ) -> RequestDescriptor {
        self.with_session(|session| {
            session.build_request(&self.config.base_url, path, payload, method)
        })
    }

    async fn dispatch(
        &self,
        path: &str,
        payload: Option<Value>,
        method: Method,
    ) -> Result<Value, TransportError> {
        let request = self.build_request(path, payload, method);
        debug!(%method, path, "sending request");
        self.transport.send(request).await
    }

    /// Authorize this client with a Facebook token and user id.
    ///
    /// On success the token, user id and full response are stored and the
    /// response is returned. On failure the session is left as it was.
    pub async fn authorize(
        &self,
        facebook_token: &str,
        facebook_id: &str,
    ) -> Result<Value, ClientError> {
        let payload = to_payload(&AuthRequest {
            facebook_token,
            facebook_id,
        })?;

        let response = self
            .dispatch("auth", Some(payload), Method::Post)
            .await
            .map_err(|err| ClientError::authentication(&err))?;

        let authorization =
            Authorization::from_response(response.clone()).map_err(|err| {
                ClientError::Authentication {
                    message: err.to_string(),
                }
            })?;

        let user_id = authorization.user_id().to_string();
        self.with_session(|session| session.authorize(authorization));
        info!(%user_id, "session authorized");

        Ok(response)
    }

    /// Gets a list of profiles nearby, at most `limit` of them
    pub async fn get_recommendations(&self, limit: NonZeroU32) -> Result<Value, ClientError> {
        let payload = to_payload(&RecommendationsRequest {
            limit: limit.get(),
        })?;
        Ok(self.dispatch("user/recs", Some(payload), Method::Get).await?)
    }

    /// Updates the position for this user
    pub async fn update_position(&self, lon: f64, lat: f64) -> Result<Value, ClientError> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ClientError::InvalidInput(format!(
                "coordinates must be finite, got lon={} lat={}",
                lon, lat
            )));
        }

        let payload = to_payload(&PositionRequest { lon, lat })?;
        Ok(self.dispatch("user/ping", Some(payload), Method::Post).await?)
    }

    /// Sends a message to a matched user
    pub async fn send_message(&self, user_id: &str, message: &str) -> Result<Value, ClientError> {
        validate_user_id(user_id)?;
        if message.is_empty() {
            return Err(ClientError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        let payload = to_payload(&MessageRequest { message })?;
        let path = format!("user/matches/{}", user_id);
        Ok(self.dispatch(&path, Some(payload), Method::Post).await?)
    }

    /// Swipes left on a user
    pub async fn pass(&self, user_id: &str) -> Result<Value, ClientError> {
        validate_user_id(user_id)?;
        let path = format!("pass/{}", user_id);
        Ok(self.dispatch(&path, None, Method::Get).await?)
    }

    /// Swipes right on a user
    pub async fn like(&self, user_id: &str) -> Result<Value, ClientError> {
        validate_user_id(user_id)?;
        let path = format!("like/{}", user_id);
        Ok(self.dispatch(&path, None, Method::Get).await?)
    }

    /// Gets everything new since the activity cursor (messages, likes, matches).
    ///
    /// The cursor advances only when the fetch succeeds.
    pub async fn get_updates(&self) -> Result<Value, ClientError> {
        let payload = to_payload(&UpdatesRequest::since(self.activity_cursor()))?;
        let response = self.dispatch("updates", Some(payload), Method::Post).await?;

        let now = Utc::now();
        self.with_session(|session| session.advance_cursor(now));
        debug!(cursor = %now, "activity cursor advanced");

        Ok(response)
    }

    /// Gets the entire history for the user. Leaves the activity cursor alone.
    pub async fn get_history(&self) -> Result<Value, ClientError> {
        let payload = to_payload(&UpdatesRequest::full_history())?;
        Ok(self.dispatch("updates", Some(payload), Method::Post).await?)
    }

    /// Gets a user profile by id
    pub async fn get_user(&self, user_id: &str) -> Result<Value, ClientError> {
        validate_user_id(user_id)?;
        let path = format!("user/{}", user_id);
        Ok(self.dispatch(&path, None, Method::Get).await?)
    }
}

fn to_payload<T: Serialize>(body: &T) -> Result<Value, ClientError> {
    Ok(serde_json::to_value(body)?)
}

// User ids become a path segment
fn validate_user_id(user_id: &str) -> Result<(), ClientError> {
    if user_id.is_empty() {
        return Err(ClientError::InvalidInput(
            "user id must not be empty".to_string(),
        ));
    }
    if user_id.contains('/') {
        return Err(ClientError::InvalidInput(format!(
            "user id must not contain '/': {}",
            user_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and answers every request with `{}`
    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Transport for CountingTransport {
        async fn send(&self, _request: RequestDescriptor) -> Result<Value, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({}))
        }
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("5a1b").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("../auth").is_err());
    }

    #[tokio::test]
    async fn test_invalid_input_sends_nothing() {
        let transport = Arc::new(CountingTransport::default());
        let client = SessionClient::new(transport.clone());

        assert!(matches!(
            client.send_message("u2", "").await,
            Err(ClientError::InvalidInput(_))
        ));
        assert!(matches!(
            client.like("").await,
            Err(ClientError::InvalidInput(_))
        ));
        assert!(matches!(
            client.update_position(f64::NAN, 1.0).await,
            Err(ClientError::InvalidInput(_))
        ));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

        client.pass("u2").await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auth_response_without_token_leaves_session() {
        struct NoToken;

        #[async_trait::async_trait]
        impl Transport for NoToken {
            async fn send(&self, _request: RequestDescriptor) -> Result<Value, TransportError> {
                Ok(json!({"user": {"_id": "u1"}}))
            }
        }

        let client = SessionClient::new(NoToken);
        let err = client.authorize("fb", "id").await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to authenticate: response missing token");
        assert!(!client.is_authorized());
        assert_eq!(client.session_defaults(), None);
    }

    #[test]
    fn test_clones_share_session() {
        let client = SessionClient::new(CountingTransport::default());
        let other = client.clone();
        let response = json!({"token": "tok", "user": {"_id": "u1"}});
        client.with_session(|session| {
            session.authorize(Authorization::from_response(response).unwrap())
        });

        assert_eq!(other.auth_token().as_deref(), Some("tok"));
        assert_eq!(other.user_id().as_deref(), Some("u1"));
    }
}
