//! ThunderMail async client implementation.

use crate::error::ApiError;
use crate::models::ErrorBody;
use crate::{EmailRequest, Error, Recipients, Result, classify};
use log::{debug, warn};
use reqwest::{StatusCode, Url};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "THUNDERMAIL_API_KEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "THUNDERMAIL_BASE_URL";
/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://thundermail.vercel.app/api/v1";
/// Per-request timeout used unless overridden on the builder.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT_VALUE: &str = concat!("thundermail-rust/", env!("CARGO_PKG_VERSION"));

/// Async client for the ThunderMail API.
///
/// Use [`Client::new`] to read the API key from `THUNDERMAIL_API_KEY`,
/// [`Client::with_api_key`] to pass it explicitly, or [`Client::builder`]
/// for custom settings like the base URL, timeout or user agent.
///
/// The client is immutable once built and can be shared between tasks.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Config,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client using the API key from `THUNDERMAIL_API_KEY`.
    ///
    /// Fails with [`ErrorKind::MissingApiKey`](crate::ErrorKind::MissingApiKey)
    /// when the variable is unset or empty. No network request is made.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Create a client with an explicit API key.
    ///
    /// # Examples
    /// ```no_run
    /// # use thundermail::Client;
    /// # fn main() -> Result<(), thundermail::Error> {
    /// let client = Client::with_api_key("tim_1234567890")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }

    /// Timeout applied to every request.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Send an email.
    ///
    /// `fields` is any value that serializes to a JSON object with `from`,
    /// `to` (a string or a list of strings), `subject`, and exactly one of
    /// `html` or `text`. A [`serde_json::json!`] object, a map, or an
    /// [`EmailRequest`] all work. Invalid fields are rejected with
    /// [`Error::InvalidInput`] before any request is sent.
    ///
    /// # Returns
    /// The JSON body returned by the API, unmodified.
    ///
    /// # Examples
    /// ```no_run
    /// # use thundermail::Client;
    /// # use serde_json::json;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), thundermail::Error> {
    /// let client = Client::new()?;
    /// let sent = client
    ///     .send(json!({
    ///         "from": "me@example.com",
    ///         "to": ["you@example.com"],
    ///         "subject": "Hello",
    ///         "html": "<p>It works!</p>",
    ///     }))
    ///     .await?;
    /// println!("{}", sent["id"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send<T: Serialize>(&self, fields: T) -> Result<Value> {
        let email = EmailRequest::from_fields(to_fields(fields)?)?;
        let url = self.config.emails_url()?;
        debug!("POST {url}");

        let response = self
            .http
            .post(url)
            .headers(self.config.headers.clone())
            .json(&email)
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Send an HTML email from positional arguments.
    #[deprecated(note = "Use Client::send, which validates the full field set")]
    pub async fn send_email(
        &self,
        from: &str,
        to: impl Into<Recipients>,
        subject: &str,
        html: &str,
    ) -> Result<Value> {
        self.send(EmailRequest::html(from, to, subject, html)).await
    }

    /// Retrieve a sent email by its ID.
    ///
    /// # Examples
    /// ```no_run
    /// # use thundermail::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), thundermail::Error> {
    /// let client = Client::new()?;
    /// let email = client.get("4ef9a417-02e9-4d39-ad75-9611e0fcc33c").await?;
    /// println!("{email:#}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, id: &str) -> Result<Value> {
        let url = self.config.email_url(id)?;
        debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .headers(self.config.headers.clone())
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Decode a success body or classify an error response.
    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

/// Serialize caller-supplied fields, reporting failures as input errors.
pub(crate) fn to_fields<T: Serialize>(fields: T) -> Result<Value> {
    serde_json::to_value(fields).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Turn a status and body into the call result.
pub(crate) fn decode_response(status: StatusCode, body: &str) -> Result<Value> {
    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(body)?);
    }

    let body = ErrorBody::parse(body);
    let err = classify(status.as_u16(), &body.error_type, &body.message);
    warn!("ThunderMail API returned {status}: {err}");
    Err(err.into())
}

/// Settings resolved at construction, shared by the async and blocking clients.
#[derive(Clone)]
pub(crate) struct Config {
    pub base_url: Url,
    pub timeout: Duration,
    pub headers: HeaderMap,
}

impl Config {
    pub fn emails_url(&self) -> Result<Url> {
        self.endpoint(&["emails"])
    }

    /// URL of a single email. The id is percent-encoded as one path segment.
    pub fn email_url(&self, id: &str) -> Result<Url> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("email id must not be empty".into()));
        }
        if id == "." || id == ".." {
            return Err(Error::InvalidInput(format!("invalid email id '{id}'")));
        }
        self.endpoint(&["emails", id])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::InvalidInput(format!("base URL '{}' cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a ThunderMail client.
///
/// Start with [`Client::builder`] to override defaults. The same builder
/// produces the async [`Client`] via [`build`](ClientBuilder::build) and the
/// [`blocking::Client`](crate::blocking::Client) via
/// [`build_blocking`](ClientBuilder::build_blocking).
#[derive(Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - API key from `THUNDERMAIL_API_KEY`
    /// - Base URL from `THUNDERMAIL_BASE_URL`, else the production API
    /// - 10 second timeout
    /// - `thundermail-rust/<version>` user agent
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT_VALUE.to_string(),
        }
    }

    /// Set the API key instead of reading `THUNDERMAIL_API_KEY`.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL.
    ///
    /// Takes precedence over `THUNDERMAIL_BASE_URL`. Useful for testing
    /// against a mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `user_agent` in the `User-Agent` header instead of the crate's
    /// own `thundermail-rust/<version>`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the async client.
    ///
    /// No network request is made.
    ///
    /// # Examples
    /// ```no_run
    /// # use std::time::Duration;
    /// # use thundermail::Client;
    /// # fn main() -> Result<(), thundermail::Error> {
    /// let client = Client::builder()
    ///     .api_key("tim_1234567890")
    ///     .timeout(Duration::from_secs(5))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let config = self.resolve(|name| std::env::var(name).ok())?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Client { http, config })
    }

    /// Build the blocking client.
    ///
    /// Must not be called from within an async runtime.
    pub fn build_blocking(self) -> Result<crate::blocking::Client> {
        let config = self.resolve(|name| std::env::var(name).ok())?;
        crate::blocking::Client::from_config(config)
    }

    /// Resolve the final settings, consulting `env` for anything not set
    /// explicitly. Empty values count as unset.
    pub(crate) fn resolve(self, env: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .or_else(|| env(API_KEY_ENV).filter(|key| !key.is_empty()))
            .ok_or_else(ApiError::missing_api_key)?;

        let base_url = self
            .base_url
            .filter(|url| !url.is_empty())
            .or_else(|| env(BASE_URL_ENV).filter(|url| !url.is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::InvalidInput(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!("base URL '{base_url}' cannot hold a path")));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);

        Ok(Config {
            base_url,
            timeout: self.timeout,
            headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_key_is_reported_at_construction() {
        let err = ClientBuilder::new().resolve(no_env).unwrap_err();
        let api = err.as_api().expect("classified error");
        assert_eq!(api.kind, ErrorKind::MissingApiKey);
        assert_eq!(api.code, "401");
        assert_eq!(api.error_type, "missing_api_key");
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let err = ClientBuilder::new().api_key("").resolve(no_env).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingApiKey));
    }

    #[test]
    fn key_and_base_url_fall_back_to_env() {
        let config = ClientBuilder::new()
            .resolve(|name| match name {
                API_KEY_ENV => Some("tim_env".to_string()),
                BASE_URL_ENV => Some("http://localhost:3000/api/v1/".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.headers[AUTHORIZATION].to_str().unwrap(), "Bearer tim_env");
        assert_eq!(config.base_url.as_str(), "http://localhost:3000/api/v1");
    }

    #[test]
    fn explicit_settings_win_over_env() {
        let config = ClientBuilder::new()
            .api_key("tim_arg")
            .base_url("http://127.0.0.1:9999")
            .resolve(|_| Some("from_env".to_string()))
            .unwrap();
        assert_eq!(config.headers[AUTHORIZATION].to_str().unwrap(), "Bearer tim_arg");
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9999/");
    }

    #[test]
    fn defaults_to_production_url_and_ten_seconds() {
        let config = ClientBuilder::new().api_key("k").resolve(no_env).unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.emails_url().unwrap().as_str(), format!("{DEFAULT_BASE_URL}/emails"));
        assert_eq!(
            config.email_url("abc").unwrap().as_str(),
            format!("{DEFAULT_BASE_URL}/emails/abc")
        );
        assert!(matches!(config.email_url(" "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn email_id_is_encoded_as_one_segment() {
        let config = ClientBuilder::new()
            .api_key("k")
            .base_url("http://localhost:3000/api/v1/")
            .resolve(no_env)
            .unwrap();
        assert_eq!(
            config.email_url("a/b?c").unwrap().as_str(),
            "http://localhost:3000/api/v1/emails/a%2Fb%3Fc"
        );
        assert_eq!(
            config.email_url("abc#frag").unwrap().path(),
            "/api/v1/emails/abc%23frag"
        );
        assert!(config.email_url("abc#frag").unwrap().fragment().is_none());
        assert!(config.email_url("abc?x=1").unwrap().query().is_none());
        assert!(matches!(config.email_url(".."), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn host_only_base_url_gets_emails_path() {
        let config = ClientBuilder::new()
            .api_key("k")
            .base_url("http://127.0.0.1:9999")
            .resolve(no_env)
            .unwrap();
        assert_eq!(config.emails_url().unwrap().as_str(), "http://127.0.0.1:9999/emails");
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        let err = ClientBuilder::new()
            .api_key("k")
            .base_url("not a url")
            .resolve(no_env)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = ClientBuilder::new()
            .api_key("k")
            .base_url("mailto:ops@example.com")
            .resolve(no_env)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn user_agent_defaults_to_crate_version_and_can_be_overridden() {
        let config = ClientBuilder::new().api_key("k").resolve(no_env).unwrap();
        assert_eq!(config.headers[USER_AGENT].to_str().unwrap(), USER_AGENT_VALUE);

        let config = ClientBuilder::new()
            .api_key("k")
            .user_agent("my-app/1.0")
            .resolve(no_env)
            .unwrap();
        assert_eq!(config.headers[USER_AGENT].to_str().unwrap(), "my-app/1.0");

        let err = ClientBuilder::new()
            .api_key("k")
            .user_agent("bad\nvalue")
            .resolve(no_env)
            .unwrap_err();
        assert!(matches!(err, Error::HeaderValue(_)));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let builder = ClientBuilder::new().api_key("tim_secret");
        assert!(!format!("{builder:?}").contains("tim_secret"));

        let config = builder.resolve(no_env).unwrap();
        assert!(!format!("{config:?}").contains("tim_secret"));
    }

    #[test]
    fn decode_response_handles_success_and_failure() {
        let value = decode_response(StatusCode::CREATED, r#"{"id":"abc"}"#).unwrap();
        assert_eq!(value, serde_json::json!({"id": "abc"}));

        assert_eq!(decode_response(StatusCode::NO_CONTENT, "").unwrap(), Value::Null);
        assert!(matches!(
            decode_response(StatusCode::OK, "not json"),
            Err(Error::Json(_))
        ));

        let err = decode_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"subject","error":{"type":"missing_required_fields"}}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingRequiredFields));

        let err = decode_response(StatusCode::BAD_GATEWAY, "<html></html>").unwrap_err();
        let api = err.as_api().expect("classified error");
        assert_eq!(api.kind, ErrorKind::Generic);
        assert_eq!(api.code, "502");
        assert_eq!(api.message, "");
    }
}
