//! `gloo-net` fetch transport.

use gloo_net::http::Request;

use crate::net::transport::HttpTransport;
use crate::net::types::{ApiRequest, ApiResponse, FetchError, Method};

/// Browser `fetch` transport. `ApiRequest::timeout` is not applied: a hung
/// request waits until the browser gives up.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[async_trait::async_trait(?Send)]
impl HttpTransport for BrowserTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FetchError> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Put => Request::put(&request.url),
            Method::Patch => Request::patch(&request.url),
            Method::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| FetchError::Encode(e.to_string()))?;

        let response = prepared
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}
