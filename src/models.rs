//! Request types for the ThunderMail API.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

const VALID_KEYS: [&str; 5] = ["from", "to", "subject", "html", "text"];
const REQUIRED_KEYS: [&str; 3] = ["from", "to", "subject"];
const CONTENT_KEYS: [&str; 2] = ["html", "text"];

/// One or more recipient addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Recipients {
    /// A single address, sent as a JSON string.
    One(String),
    /// Several addresses, sent as a JSON array in the given order.
    Many(Vec<String>),
}

impl From<&str> for Recipients {
    fn from(value: &str) -> Self {
        Recipients::One(value.to_string())
    }
}

impl From<String> for Recipients {
    fn from(value: String) -> Self {
        Recipients::One(value)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(value: Vec<String>) -> Self {
        Recipients::Many(value)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(value: Vec<&str>) -> Self {
        Recipients::Many(value.into_iter().map(str::to_string).collect())
    }
}

/// Email body; exactly one of HTML or plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Content {
    /// HTML body, sent as the `html` field.
    Html(String),
    /// Plain-text body, sent as the `text` field.
    Text(String),
}

/// A validated email ready to be sent.
///
/// Serializes to the JSON body expected by `POST /emails`:
/// `{"from", "to", "subject", "html" | "text"}`.
///
/// # Examples
/// ```
/// use thundermail::EmailRequest;
///
/// let email = EmailRequest::html("me@example.com", "you@example.com", "Hi", "<p>Hello</p>");
/// let body = serde_json::to_value(&email).unwrap();
/// assert_eq!(body["html"], "<p>Hello</p>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRequest {
    pub from: String,
    pub to: Recipients,
    pub subject: String,
    #[serde(flatten)]
    pub content: Content,
}

impl EmailRequest {
    /// Create an HTML email.
    pub fn html(
        from: impl Into<String>,
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            content: Content::Html(html.into()),
        }
    }

    /// Create a plain-text email.
    pub fn text(
        from: impl Into<String>,
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            content: Content::Text(text.into()),
        }
    }

    /// Validate a field mapping and turn it into a request.
    ///
    /// The mapping must be a JSON object holding `from`, `to` and `subject`,
    /// exactly one of `html` or `text`, and nothing else.
    pub fn from_fields(fields: Value) -> Result<Self> {
        let Value::Object(mut fields) = fields else {
            return Err(invalid("email fields must be a JSON object"));
        };

        if !REQUIRED_KEYS.iter().all(|key| fields.contains_key(*key)) {
            return Err(invalid(format!(
                "missing one or more required keys: {}",
                REQUIRED_KEYS.join(", ")
            )));
        }

        let content_count = CONTENT_KEYS
            .iter()
            .filter(|key| fields.contains_key(**key))
            .count();
        if content_count == 0 {
            return Err(invalid(format!(
                "must provide one of the following keys: {}",
                CONTENT_KEYS.join(", ")
            )));
        }
        if content_count > 1 {
            return Err(invalid(
                "cannot provide both 'html' and 'text' keys, only one is allowed",
            ));
        }

        if let Some(key) = fields.keys().find(|key| !VALID_KEYS.contains(&key.as_str())) {
            return Err(invalid(format!(
                "invalid key '{key}', valid keys are: {}",
                VALID_KEYS.join(", ")
            )));
        }

        let content = match fields.remove("html") {
            Some(html) => Content::Html(take_string("html", html)?),
            None => Content::Text(take_string("text", fields.remove("text").unwrap_or_default())?),
        };

        Ok(Self {
            from: take_string("from", fields.remove("from").unwrap_or_default())?,
            to: take_recipients(fields.remove("to").unwrap_or_default())?,
            subject: take_string("subject", fields.remove("subject").unwrap_or_default())?,
            content,
        })
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidInput(msg.into())
}

fn take_string(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(invalid(format!("'{key}' must be a string, got {other}"))),
    }
}

fn take_recipients(value: Value) -> Result<Recipients> {
    match value {
        Value::String(s) => Ok(Recipients::One(s)),
        Value::Array(items) => items
            .into_iter()
            .map(|item| take_string("to", item))
            .collect::<Result<Vec<_>>>()
            .map(Recipients::Many),
        other => Err(invalid(format!(
            "'to' must be a string or a list of strings, got {other}"
        ))),
    }
}

/// Error body returned by the API on non-success responses.
///
/// Every field is optional; missing values decode as empty strings.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ErrorBody {
    pub message: String,
    pub error_type: String,
}

impl ErrorBody {
    /// Decode `{"message": .., "error": {"type": ..}}`, tolerating anything
    /// that is not that shape.
    pub fn parse(body: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
            return Self::default();
        };
        Self {
            message: string_field(&map, "message"),
            error_type: map
                .get("error")
                .and_then(Value::as_object)
                .map(|error| string_field(error, "type"))
                .unwrap_or_default(),
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
