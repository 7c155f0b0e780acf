//! # ThunderMail Client
//! Wrapper around the ThunderMail email sending HTTP API: send an email and look up a sent email by ID, with error responses turned into typed, actionable errors.
//!
//! ## Audience and uses
//! For Rust applications that send transactional email through ThunderMail: build a [`Client`] (or a [`blocking::Client`]) with your API key, call [`Client::send`] with the message fields, and branch on the [`ErrorKind`] of any [`ApiError`] you get back.
//!
//! ## Configuration
//! The API key comes from [`ClientBuilder::api_key`] or the `THUNDERMAIL_API_KEY` environment variable. The base URL defaults to the production API and can be overridden with [`ClientBuilder::base_url`] or `THUNDERMAIL_BASE_URL`. Building a client without a key fails immediately with [`ErrorKind::MissingApiKey`].
//!
//! ## Runtime requirements
//! [`Client`] is async and runs inside a Tokio (v1) runtime. [`blocking::Client`] blocks the calling thread and must be used outside of one. HTTP calls use `reqwest`.
//!
//! ## Out of scope
//! No retries, batching, queueing, rate limiting or webhook verification. Every call is one request; the service is the source of truth.
//!
//! ## Errors
//! Transport failures surface as [`Error::Request`]; fields rejected before sending become [`Error::InvalidInput`]; non-2xx responses are classified into [`Error::Api`], whose [`ApiError`] carries the status code, server error type, message and a suggested action. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use serde_json::json;
//! use thundermail::{Client, ErrorKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), thundermail::Error> {
//!     let client = Client::with_api_key("tim_1234567890")?;
//!
//!     let sent = client
//!         .send(json!({
//!             "from": "me@example.com",
//!             "to": "you@example.com",
//!             "subject": "Hello",
//!             "text": "Sent from Rust.",
//!         }))
//!         .await;
//!
//!     match sent {
//!         Ok(body) => println!("Sent: {}", body["id"]),
//!         Err(err) if err.kind() == Some(ErrorKind::InvalidApiKey) => {
//!             eprintln!("{}", err.as_api().unwrap().suggested_action);
//!         }
//!         Err(err) => return Err(err),
//!     }
//!     Ok(())
//! }
//! ```

pub mod blocking;
mod classify;
mod client;
mod error;
mod models;

pub use classify::{CLASSIFICATION_TABLE, classify, lookup};
pub use client::{
    API_KEY_ENV, BASE_URL_ENV, Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
pub use error::{ApiError, Error, ErrorKind};
pub use models::{Content, EmailRequest, Recipients};

/// Result type alias for ThunderMail operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
