//! Error types for the ThunderMail client.
//!
//! Failures fall into three groups: transport problems reported by
//! `reqwest`, local input errors caught before a request is sent, and error
//! responses from the ThunderMail API, which are classified into an
//! [`ErrorKind`] and carried by [`ApiError`].

use std::fmt;

use thiserror::Error;

/// Errors that can occur during ThunderMail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An HTTP request failed before a response status was available.
    ///
    /// This covers DNS failures, refused connections, TLS errors and
    /// timeouts. These are never classified.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The arguments passed to the client were rejected locally.
    ///
    /// No request is sent when this error is returned.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The ThunderMail API answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success response did not contain valid JSON.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to construct the authorization header from the API key.
    #[error("Invalid header value: {0}")]
    HeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}

impl Error {
    /// Returns the classified API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the kind of the classified API error, if this is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_api().map(|err| err.kind)
    }
}

/// The closed set of error kinds the API can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Any error that is not in the classification table.
    Generic,
    /// The request carried no API key.
    MissingApiKey,
    /// The API key was rejected.
    InvalidApiKey,
    /// One or more fields of the request body are invalid.
    Validation,
    /// One or more required fields are missing from the request body.
    MissingRequiredFields,
    /// The service failed while handling the request.
    Application,
}

const MISSING_FIELDS_MESSAGE: &str = "The request body is missing one or more required fields.";
const CHECK_FIELDS_ACTION: &str = "Check the error message to see the list of missing fields.";

impl ErrorKind {
    /// Remediation hint attached to errors of this kind.
    ///
    /// Empty only for [`ErrorKind::Generic`].
    pub fn suggested_action(self) -> &'static str {
        match self {
            ErrorKind::Generic => "",
            ErrorKind::MissingApiKey => {
                "Include the following header in the request: Authorization: Bearer YOUR_API_KEY."
            }
            ErrorKind::InvalidApiKey => "Generate a new API key in the dashboard.",
            ErrorKind::Validation | ErrorKind::MissingRequiredFields => CHECK_FIELDS_ACTION,
            ErrorKind::Application => "Contact ThunderMail support.",
        }
    }

    /// Status code used when the server did not supply one.
    pub fn default_code(self) -> Option<&'static str> {
        match self {
            ErrorKind::Generic => None,
            ErrorKind::MissingApiKey => Some("401"),
            ErrorKind::InvalidApiKey => Some("403"),
            ErrorKind::Validation => Some("400"),
            ErrorKind::MissingRequiredFields => Some("422"),
            ErrorKind::Application => Some("500"),
        }
    }

    /// Resolves the message stored on the error from the one the server sent.
    fn message(self, message: String) -> String {
        match self {
            ErrorKind::Generic => message,
            ErrorKind::MissingApiKey => "Missing API key in the authorization header.".to_string(),
            ErrorKind::Application => "Something went wrong.".to_string(),
            ErrorKind::InvalidApiKey if message.is_empty() => "Invalid API key.".to_string(),
            ErrorKind::Validation | ErrorKind::MissingRequiredFields if message.is_empty() => {
                MISSING_FIELDS_MESSAGE.to_string()
            }
            ErrorKind::InvalidApiKey | ErrorKind::Validation | ErrorKind::MissingRequiredFields => {
                message
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Generic => "ThunderMail error",
            ErrorKind::MissingApiKey => "missing API key",
            ErrorKind::InvalidApiKey => "invalid API key",
            ErrorKind::Validation => "validation error",
            ErrorKind::MissingRequiredFields => "missing required fields",
            ErrorKind::Application => "application error",
        };
        f.write_str(name)
    }
}

/// An error response from the ThunderMail API, after classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} ({code}): {message}")]
pub struct ApiError {
    /// Classified kind.
    pub kind: ErrorKind,
    /// HTTP status code, as a string.
    pub code: String,
    /// The `error.type` tag sent by the server.
    pub error_type: String,
    /// Human-readable message.
    pub message: String,
    /// Remediation hint; empty for [`ErrorKind::Generic`].
    pub suggested_action: String,
}

impl ApiError {
    /// Build an error of the given kind, applying the kind's fixed message,
    /// remediation text and fallback status code.
    pub fn new(
        kind: ErrorKind,
        code: impl Into<String>,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut code = code.into();
        if code.is_empty() {
            code = kind.default_code().unwrap_or_default().to_string();
        }

        Self {
            kind,
            code,
            error_type: error_type.into(),
            message: kind.message(message.into()),
            suggested_action: kind.suggested_action().to_string(),
        }
    }

    /// The error returned when a client is built without an API key.
    pub(crate) fn missing_api_key() -> Self {
        Self::new(ErrorKind::MissingApiKey, "401", "missing_api_key", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_keeps_caller_message_and_has_no_action() {
        let err = ApiError::new(ErrorKind::Generic, "418", "teapot", "short and stout");
        assert_eq!(err.message, "short and stout");
        assert_eq!(err.code, "418");
        assert!(err.suggested_action.is_empty());
    }

    #[test]
    fn classified_kinds_always_have_an_action() {
        for kind in [
            ErrorKind::MissingApiKey,
            ErrorKind::InvalidApiKey,
            ErrorKind::Validation,
            ErrorKind::MissingRequiredFields,
            ErrorKind::Application,
        ] {
            let err = ApiError::new(kind, "", "", "");
            assert!(!err.suggested_action.is_empty(), "{kind:?}");
            assert!(!err.message.is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn empty_code_falls_back_to_canonical_status() {
        let err = ApiError::new(ErrorKind::Application, "", "application_error", "");
        assert_eq!(err.code, "500");

        let err = ApiError::new(ErrorKind::Generic, "", "whatever", "");
        assert_eq!(err.code, "");
    }

    #[test]
    fn display_includes_kind_code_and_message() {
        let err = ApiError::new(ErrorKind::Validation, "400", "validation_error", "bad `to`");
        assert_eq!(err.to_string(), "validation error (400): bad `to`");
    }

    #[test]
    fn wrapped_error_exposes_kind() {
        let err = Error::from(ApiError::missing_api_key());
        assert_eq!(err.kind(), Some(ErrorKind::MissingApiKey));
        assert_eq!(err.as_api().map(|e| e.code.as_str()), Some("401"));

        let err = Error::InvalidInput("nope".into());
        assert_eq!(err.kind(), None);
    }
}
