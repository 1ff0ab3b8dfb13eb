//! HTTP transport abstraction.
//!
//! This module defines the `HttpSender` trait to abstract request transmission,
//! enabling testability with mock implementations. Requests are plain `reqwest::Request`
//! values, so headers and bodies built by the client (including multipart boundaries)
//! reach the sender untouched.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, Request, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Trait for transmitting HTTP requests.
///
/// # Example
/// ```ignore
/// let sender = reqwest::Client::new();
/// let response = sender.send(request).await?;
/// println!("Status: {}", response.status());
/// ```
#[async_trait]
pub trait HttpSender: Send + Sync {
    /// Send a request and return the response, whatever its status.
    ///
    /// # Errors
    /// Returns [`Error::Transport`] if the request could not be transmitted or no
    /// response was received (connection failures, timeouts).
    async fn send(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl HttpSender for reqwest::Client {
    #[tracing::instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    async fn send(&self, request: Request) -> Result<Response> {
        let url = request.url().clone();

        let response = self.execute(request).await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "HTTP request failed");
            Error::transport("send request", e)
        })?;

        tracing::debug!(status = %response.status(), "HTTP request completed");

        Ok(response)
    }
}

// ============================================================================
// Test/Mock Implementation
// ============================================================================

/// Mock sender for testing.
///
/// Returns predetermined responses without making network calls, and records every
/// request it receives with its body fully collected.
///
/// # Example
/// ```ignore
/// let mock = MockSender::new();
/// mock.add_response("POST /v1/files/upload", Ok(MockResponse::new(201, r#"{"id": "..."}"#)));
/// ```
#[derive(Clone, Default)]
pub struct MockSender {
    responses: Arc<Mutex<HashMap<String, Vec<Result<MockResponse>>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

/// Canned response returned by [`MockSender`].
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl MockResponse {
    /// # Panics
    /// Panics if `status` is not a valid HTTP status code.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body: body.into(),
        }
    }
}

impl From<MockResponse> for Response {
    fn from(mock: MockResponse) -> Self {
        let mut response = http::Response::new(mock.body);
        *response.status_mut() = mock.status;
        Response::from(response)
    }
}

/// Record of a call made to the mock sender.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl MockCall {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predetermined response for a specific method and path.
    ///
    /// The key is formatted as "{method} {path}". Multiple responses can be
    /// added for the same key - they will be returned in FIFO order.
    pub fn add_response(&self, key: &str, response: Result<MockResponse>) {
        self.responses.lock().entry(key.to_string()).or_default().push(response);
    }

    /// Get all calls that have been made to this mock sender.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HttpSender for MockSender {
    async fn send(&self, mut request: Request) -> Result<Response> {
        let body = match request.body_mut().take() {
            Some(body) => body
                .collect()
                .await
                .map_err(|e| Error::transport("read request body", e))?
                .to_bytes(),
            None => Bytes::new(),
        };

        let key = format!("{} {}", request.method(), request.url().path());

        self.calls.lock().push(MockCall {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body,
        });

        let mut responses = self.responses.lock();
        match responses.get_mut(&key) {
            Some(queue) if !queue.is_empty() => queue.remove(0).map(Response::from),
            _ => Err(Error::transport(
                "send request",
                format!("No mock response configured for {key}"),
            )),
        }
    }
}
