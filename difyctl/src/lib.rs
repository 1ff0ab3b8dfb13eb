//! # difyctl: a client for the Dify API
//!
//! Thin, typed wrappers around Dify's REST endpoints. Each wrapper builds one request with the
//! shared [`Client`], sends it through an [`HttpSender`], and turns the response into either a
//! typed result or an [`Error`].
//!
//! ## Uploading a file
//!
//! ```no_run
//! use difyctl::{Client, Config, UploadRequest};
//!
//! # async fn run() -> difyctl::Result<()> {
//! let config = Config {
//!     api_key: Some("app-xxxxxxxx".to_string()),
//!     ..Default::default()
//! };
//! let client = Client::new(&config)?;
//!
//! let uploaded = client.upload_file(&UploadRequest::new("report.pdf", "user-123")).await?;
//! println!("{} ({} bytes)", uploaded.id, uploaded.size);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! [`MockSender`] replaces the network: it returns queued responses and records every request,
//! body included, so tests can assert on exactly what would have been sent.
//!
//! ## Modules
//!
//! - [`files`]: file upload endpoint
//! - [`http`]: the [`HttpSender`] transport trait and its implementations
//! - [`config`]: configuration loading (YAML + environment)
//! - [`errors`]: error taxonomy
//! - [`telemetry`]: tracing initialisation for binaries

mod client;
pub mod config;
pub mod errors;
pub mod files;
pub mod http;
pub mod telemetry;

#[cfg(test)]
mod test;

pub use client::Client;
pub use config::Config;
pub use errors::{Error, Result};
pub use files::{UploadRequest, UploadResult};
pub use crate::http::{HttpSender, MockResponse, MockSender};
