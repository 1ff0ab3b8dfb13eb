//! API client shared by the endpoint wrappers.

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::http::HttpSender;
use reqwest::{Method, RequestBuilder, Response};
use tracing::{debug, instrument};
use url::Url;

/// Client for the Dify API.
///
/// Holds the base URL and credentials used to build requests, and the [`HttpSender`] that
/// transmits them. Endpoint methods live next to their request and response types (see
/// [`crate::files`]).
pub struct Client<S = reqwest::Client> {
    /// Used only to build requests; transmission always goes through `sender`.
    builder: reqwest::Client,
    sender: S,
    base_url: Url,
    api_key: Option<String>,
}

impl Client<reqwest::Client> {
    /// Create a client that sends requests over the network.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::transport("create HTTP client", e))?;
        Ok(Self::from_parts(config, http.clone(), http))
    }
}

impl<S: HttpSender> Client<S> {
    /// Create a client that hands its requests to `sender`.
    pub fn with_sender(config: &Config, sender: S) -> Self {
        Self::from_parts(config, reqwest::Client::new(), sender)
    }

    fn from_parts(config: &Config, builder: reqwest::Client, sender: S) -> Self {
        Self {
            builder,
            sender,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Start a request against `path` with the common headers attached.
    ///
    /// `path` is resolved relative to the base URL, so a base URL with a path prefix keeps it.
    /// Callers attach a body and pass the built request to [`Client::send`].
    pub fn base_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = ensure_slash(&self.base_url)
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::transport("create base request", e))?;

        debug!(%method, %url, "Building request");

        let mut request = self.builder.request(method, url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        Ok(request)
    }

    /// Build `request` and transmit it with the configured sender.
    #[instrument(skip_all)]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build().map_err(|e| Error::transport("create base request", e))?;
        self.sender.send(request).await
    }
}

/// Makes sure a url has a trailing slash.
///
/// Joining '/hello' and 'world' gives '/world', but '/hello/' and 'world' gives '/hello/world'.
/// Call this before calling .join
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

/// Read a response body for an error message, falling back to a placeholder if the body
/// itself cannot be read.
pub(crate) async fn read_response_body(response: Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(e) => format!("<failed to read response body: {e}>"),
    }
}
