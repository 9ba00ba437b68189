//! Core models for the tinder client
//!
//! This module contains the wire constants, the in-memory session state and the
//! transport-agnostic request descriptor shared by every API operation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base host every request is issued against
pub const API_HOST: &str = "https://api.gotinder.com";

/// Client identification sent with every request
pub const USER_AGENT: &str = "Tinder Android Version 2.2.3";
pub const OS_VERSION: &str = "16";

pub const USER_AGENT_HEADER: &str = "User-Agent";
pub const OS_VERSION_HEADER: &str = "os_version";
/// Header carrying the session token once authorized
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// HTTP method of an outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-formed outbound call, independent of any HTTP library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub json_body: Option<Value>,
}

impl RequestDescriptor {
    /// Looks up a header value by exact name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Credentials and server defaults captured from a successful authentication
#[derive(Debug, Clone, PartialEq)]
pub struct Authorization {
    token: String,
    user_id: String,
    defaults: Value,
}

/// Reasons an authentication response cannot be turned into an [`Authorization`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthResponseError {
    #[error("response missing token")]
    MissingToken,

    #[error("response missing user id")]
    MissingUserId,
}

impl Authorization {
    /// Extracts `token` and `user._id` from an auth response, keeping the whole
    /// response as the session defaults.
    pub fn from_response(response: Value) -> Result<Self, AuthResponseError> {
        let token = response
            .get("token")
            .and_then(Value::as_str)
            .ok_or(AuthResponseError::MissingToken)?
            .to_string();
        let user_id = response
            .pointer("/user/_id")
            .and_then(Value::as_str)
            .ok_or(AuthResponseError::MissingUserId)?
            .to_string();

        Ok(Self {
            token,
            user_id,
            defaults: response,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn defaults(&self) -> &Value {
        &self.defaults
    }
}

/// The authorization state and activity cursor of a single client.
///
/// Token, user id and defaults live in one [`Authorization`] so they can only
/// ever be set together. There is no transition back to unauthorized.
#[derive(Debug, Clone)]
pub struct Session {
    authorization: Option<Authorization>,
    activity_cursor: DateTime<Utc>,
}

impl Session {
    /// Creates an unauthorized session with the cursor at the current time
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Creates an unauthorized session with the cursor at `cursor`
    pub fn starting_at(cursor: DateTime<Utc>) -> Self {
        Self {
            authorization: None,
            activity_cursor: cursor,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorization.is_some()
    }

    pub fn authorization(&self) -> Option<&Authorization> {
        self.authorization.as_ref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.authorization.as_ref().map(Authorization::token)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.authorization.as_ref().map(Authorization::user_id)
    }

    pub fn defaults(&self) -> Option<&Value> {
        self.authorization.as_ref().map(Authorization::defaults)
    }

    pub fn activity_cursor(&self) -> DateTime<Utc> {
        self.activity_cursor
    }

    /// Records a successful authentication. A later call replaces the earlier one.
    pub fn authorize(&mut self, authorization: Authorization) {
        self.authorization = Some(authorization);
    }

    /// Moves the activity cursor forward to `now`; never moves it backward.
    pub fn advance_cursor(&mut self, now: DateTime<Utc>) {
        if now > self.activity_cursor {
            self.activity_cursor = now;
        }
    }

    /// Builds the descriptor for a call to `path` under `base_url`.
    ///
    /// The auth header is present exactly when the session is authorized.
    pub fn build_request(
        &self,
        base_url: &str,
        path: &str,
        payload: Option<Value>,
        method: Method,
    ) -> RequestDescriptor {
        let mut headers = BTreeMap::new();
        headers.insert(USER_AGENT_HEADER.to_string(), USER_AGENT.to_string());
        headers.insert(OS_VERSION_HEADER.to_string(), OS_VERSION.to_string());

        if let Some(token) = self.auth_token() {
            headers.insert(AUTH_HEADER.to_string(), token.to_string());
        }

        RequestDescriptor {
            url: format!("{}/{}", base_url, path),
            method,
            headers,
            json_body: payload,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a timestamp the way the API expects `last_activity_date`
pub fn format_activity_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body of `POST auth`
#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub facebook_token: &'a str,
    pub facebook_id: &'a str,
}

/// Body of `GET user/recs`
#[derive(Debug, Serialize)]
pub struct RecommendationsRequest {
    pub limit: u32,
}

/// Body of `POST user/ping`
#[derive(Debug, Serialize)]
pub struct PositionRequest {
    pub lon: f64,
    pub lat: f64,
}

/// Body of `POST user/matches/{id}`
#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub message: &'a str,
}

/// Body of `POST updates`
#[derive(Debug, Serialize)]
pub struct UpdatesRequest {
    pub last_activity_date: String,
}

impl UpdatesRequest {
    /// Asks for everything that happened after `cursor`
    pub fn since(cursor: DateTime<Utc>) -> Self {
        Self {
            last_activity_date: format_activity_date(cursor),
        }
    }

    /// An empty date makes the server return the full history
    pub fn full_history() -> Self {
        Self {
            last_activity_date: String::new(),
        }
    }
}
