//! Request/response types shared by the transports and the auth client.
//!
//! DESIGN
//! ======
//! Transports see a fully-resolved `ApiRequest` (absolute or same-origin URL,
//! final header list) and return the raw status and body. Everything
//! session-related happens above them in `client`.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unable to reach the server: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("not signed in")]
    SignedOut,
    #[error("session expired")]
    Unauthorized,
    #[error("account is not an admin")]
    NotAdmin,
}

// =============================================================================
// REQUEST
// =============================================================================

/// Caller-side request description, before auth headers are merged in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the request body.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Encode` if serialization fails.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, FetchError> {
        let body = serde_json::to_string(value).map_err(|e| FetchError::Encode(e.to_string()))?;
        Ok(self.body(body))
    }
}

/// A request as handed to a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// First header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_str(&self.body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Turn a non-2xx response into `FetchError::Status`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Status` for non-success statuses.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.ok() {
            Ok(self)
        } else {
            Err(FetchError::Status { status: self.status, body: self.body })
        }
    }
}

/// What an authenticated request produced.
///
/// A `401` still hands the response back, but as a distinct variant so a
/// caller cannot mistake it for data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Response(ApiResponse),
    /// The server rejected the token. The session has already been cleared
    /// and a redirect to login issued.
    Unauthorized(ApiResponse),
    /// No session was stored; no request was sent and a redirect to login
    /// was issued.
    SignedOut,
}

impl FetchOutcome {
    /// The server response, if a request was sent.
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            Self::Response(r) | Self::Unauthorized(r) => Some(r),
            Self::SignedOut => None,
        }
    }

    pub fn into_response(self) -> Option<ApiResponse> {
        match self {
            Self::Response(r) | Self::Unauthorized(r) => Some(r),
            Self::SignedOut => None,
        }
    }

    /// Collapse into the usable response, mapping the session-ending
    /// outcomes to errors.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::SignedOut` or `FetchError::Unauthorized`.
    pub fn authorized(self) -> Result<ApiResponse, FetchError> {
        match self {
            Self::Response(r) => Ok(r),
            Self::Unauthorized(_) => Err(FetchError::Unauthorized),
            Self::SignedOut => Err(FetchError::SignedOut),
        }
    }
}

pub const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");

/// Build the final header list.
///
/// Order of precedence, lowest first: `Content-Type: application/json`, the
/// bearer header (only with a token), caller headers. Names compare
/// case-insensitively.
pub fn merge_headers(token: Option<&str>, caller: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers = vec![(CONTENT_TYPE_JSON.0.to_owned(), CONTENT_TYPE_JSON.1.to_owned())];
    if let Some(token) = token {
        headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
    }
    for (name, value) in caller {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        headers.push((name.clone(), value.clone()));
    }
    headers
}
