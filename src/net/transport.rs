//! HTTP transports.
//!
//! The browser build sends through `gloo-net` (`browser::BrowserTransport`);
//! native hosts use `ReqwestTransport`. Both only move bytes: no retries, no
//! status interpretation.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use super::types::{ApiRequest, ApiResponse, FetchError};

/// Sends one fully-prepared request.
///
/// Futures are not required to be `Send`: everything runs on the page's
/// single UI thread.
#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FetchError>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestTransport;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::{ApiRequest, ApiResponse, FetchError, HttpTransport};
    use crate::net::types::Method;

    /// `reqwest`-backed transport for native hosts.
    #[derive(Clone, Debug, Default)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(http: reqwest::Client) -> Self {
            Self { http }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FetchError> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Patch => reqwest::Method::PATCH,
                Method::Delete => reqwest::Method::DELETE,
            };
            let mut builder = self.http.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            let response = builder.send().await.map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(map_reqwest_error)?;
            Ok(ApiResponse { status, body })
        }
    }

    fn map_reqwest_error(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
