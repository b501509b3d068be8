//! Authenticated REST client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every call to the storefront API goes through `AuthClient::request`, which
//! attaches the bearer token and is the only place a `401` ends the session.
//! Login is the one unauthenticated call and also lives here because it is
//! what creates the session in the first place.
//!
//! ERROR HANDLING
//! ==============
//! Network failures propagate unchanged; there is no retry or backoff. A
//! `401` is recovered locally (clear + redirect) and reported as
//! `FetchOutcome::Unauthorized` so callers still see the response.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::transport::HttpTransport;
use super::types::{ApiRequest, ApiResponse, FetchError, FetchOutcome, Method, RequestOptions, merge_headers};
use crate::config::{PortalConfig, PortalKind};
use crate::nav::Navigator;
use crate::session::{Session, SessionStore, SessionUser};

/// Login form input.
#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Persist the email for the next visit to the login form.
    #[serde(skip)]
    pub remember: bool,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into(), remember: false }
    }

    #[must_use]
    pub fn remember(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    token: String,
    user: SessionUser,
}

/// Login endpoints answer either `{token, user}` or `{data: {token, user}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginResponse {
    Flat(LoginPayload),
    Wrapped { data: LoginPayload },
}

impl LoginResponse {
    fn into_payload(self) -> LoginPayload {
        match self {
            Self::Flat(payload) | Self::Wrapped { data: payload } => payload,
        }
    }
}

pub struct AuthClient<T> {
    transport: T,
    sessions: SessionStore,
    navigator: Rc<dyn Navigator>,
    config: PortalConfig,
    kind: PortalKind,
}

impl<T: HttpTransport> AuthClient<T> {
    pub fn new(
        transport: T,
        sessions: SessionStore,
        navigator: Rc<dyn Navigator>,
        config: PortalConfig,
        kind: PortalKind,
    ) -> Self {
        Self { transport, sessions, navigator, config, kind }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Send an authenticated request.
    ///
    /// Without a stored session no request is sent: the page is redirected
    /// to login and `FetchOutcome::SignedOut` returned. A `401` clears the
    /// session and redirects, but the response is still returned.
    ///
    /// # Errors
    ///
    /// Returns an error only when the transport fails.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<FetchOutcome, FetchError> {
        let Some(token) = self.sessions.token() else {
            tracing::debug!(%url, "request without session; redirecting to login");
            self.redirect_to_login();
            return Ok(FetchOutcome::SignedOut);
        };

        let request = self.build_request(url, options, Some(&token));
        let method = request.method;
        let response = self.transport.send(request).await?;

        if response.is_unauthorized() {
            tracing::warn!(%url, method = method.as_str(), "server rejected session token");
            self.sessions.clear();
            self.redirect_to_login();
            return Ok(FetchOutcome::Unauthorized(response));
        }
        Ok(FetchOutcome::Response(response))
    }

    /// `GET` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// Fails when signed out, on `401`, on any other non-2xx status, on
    /// transport failure, or when the body does not decode.
    pub async fn get_json<R: DeserializeOwned>(&self, url: &str) -> Result<R, FetchError> {
        let response = self.request(url, RequestOptions::get()).await?.authorized()?;
        response.error_for_status()?.json()
    }

    /// Send a JSON body and decode a JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`AuthClient::get_json`], plus body encoding failures.
    pub async fn send_json<B, R>(&self, method: Method, url: &str, body: &B) -> Result<R, FetchError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let options = RequestOptions::with_method(method).json(body)?;
        let response = self.request(url, options).await?.authorized()?;
        response.error_for_status()?.json()
    }

    /// Exchange credentials for a session and persist it.
    ///
    /// On the admin portal a non-admin account is rejected and nothing is
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Status` for rejected credentials,
    /// `FetchError::NotAdmin` for a non-admin on the admin portal, and
    /// transport/decode failures unchanged.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, FetchError> {
        let endpoint = self.config.login_endpoint_for(self.kind).to_owned();
        let options = RequestOptions::with_method(Method::Post).json(credentials)?;
        let request = self.build_request(&endpoint, options, None);
        let response: ApiResponse = self.transport.send(request).await?.error_for_status()?;
        let payload = response.json::<LoginResponse>()?.into_payload();
        if payload.token.trim().is_empty() {
            return Err(FetchError::Decode("login response carried an empty token".to_owned()));
        }

        if self.kind == PortalKind::Admin && !payload.user.is_admin() {
            tracing::warn!(email = %credentials.email, "non-admin account used on admin login");
            return Err(FetchError::NotAdmin);
        }

        let session = Session::new(payload.token, payload.user);
        self.sessions.set(&session);
        if credentials.remember {
            self.sessions.remember_email(self.kind, &credentials.email);
        } else {
            self.sessions.forget_remembered_email(self.kind);
        }
        tracing::info!(email = %credentials.email, portal = ?self.kind, "signed in");
        Ok(session)
    }

    fn build_request(&self, url: &str, options: RequestOptions, token: Option<&str>) -> ApiRequest {
        ApiRequest {
            method: options.method,
            url: self.config.api_url(url),
            headers: merge_headers(token, &options.headers),
            body: options.body,
            timeout: self.config.request_timeout,
        }
    }

    fn redirect_to_login(&self) {
        self.navigator.navigate(&self.config.login_url_for(self.kind));
    }
}
