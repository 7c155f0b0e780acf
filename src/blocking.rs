//! Blocking ThunderMail client.
//!
//! Each call performs exactly one round trip on the caller's thread. Build it
//! with [`ClientBuilder::build_blocking`](crate::ClientBuilder::build_blocking)
//! or the shortcuts below. Do not use it from inside an async runtime.

use crate::client::{Config, decode_response, to_fields};
use crate::{ClientBuilder, EmailRequest, Recipients, Result};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Blocking counterpart of [`crate::Client`].
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    config: Config,
}

impl Client {
    /// Create a client using the API key from `THUNDERMAIL_API_KEY`.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build_blocking()
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build_blocking()
    }

    pub(crate) fn from_config(config: Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }

    /// Timeout applied to every request.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Send an email. See [`crate::Client::send`].
    ///
    /// # Examples
    /// ```no_run
    /// # use thundermail::{blocking, EmailRequest};
    /// # fn main() -> Result<(), thundermail::Error> {
    /// let client = blocking::Client::new()?;
    /// let email = EmailRequest::text("me@example.com", "you@example.com", "Hi", "Hello!");
    /// let sent = client.send(&email)?;
    /// println!("{}", sent["id"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn send<T: Serialize>(&self, fields: T) -> Result<Value> {
        let email = EmailRequest::from_fields(to_fields(fields)?)?;
        let url = self.config.emails_url()?;
        debug!("POST {url}");

        let response = self
            .http
            .post(url)
            .headers(self.config.headers.clone())
            .json(&email)
            .send()?;

        Self::read_json(response)
    }

    /// Send an HTML email from positional arguments.
    #[deprecated(note = "Use Client::send, which validates the full field set")]
    pub fn send_email(
        &self,
        from: &str,
        to: impl Into<Recipients>,
        subject: &str,
        html: &str,
    ) -> Result<Value> {
        self.send(EmailRequest::html(from, to, subject, html))
    }

    /// Retrieve a sent email by its ID.
    pub fn get(&self, id: &str) -> Result<Value> {
        let url = self.config.email_url(id)?;
        debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .headers(self.config.headers.clone())
            .send()?;

        Self::read_json(response)
    }

    fn read_json(response: reqwest::blocking::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text()?;
        decode_response(status, &body)
    }
}
