//! Classification of ThunderMail error responses.

use std::fmt::Display;

use crate::error::{ApiError, ErrorKind};

/// Known `(status code, error type)` pairs and the kind each maps to.
///
/// Any pair not listed here classifies as [`ErrorKind::Generic`].
pub const CLASSIFICATION_TABLE: &[(&str, &str, ErrorKind)] = &[
    ("400", "validation_error", ErrorKind::Validation),
    ("422", "missing_required_fields", ErrorKind::MissingRequiredFields),
    ("422", "validation_error", ErrorKind::Validation),
    ("401", "missing_api_key", ErrorKind::MissingApiKey),
    ("403", "invalid_api_key", ErrorKind::InvalidApiKey),
    ("500", "application_error", ErrorKind::Application),
];

/// Look up the kind for a status code and error type tag.
pub fn lookup(code: &str, error_type: &str) -> Option<ErrorKind> {
    CLASSIFICATION_TABLE
        .iter()
        .find(|(c, t, _)| *c == code && *t == error_type)
        .map(|(_, _, kind)| *kind)
}

/// Classify an error response into an [`ApiError`].
///
/// `code` may be a numeric status or its string form. Unknown status codes
/// and unknown error types under a known status both produce
/// [`ErrorKind::Generic`], which keeps the code, type and message verbatim
/// and has no suggested action.
///
/// # Examples
/// ```
/// use thundermail::{classify, ErrorKind};
///
/// let err = classify(403, "invalid_api_key", "");
/// assert_eq!(err.kind, ErrorKind::InvalidApiKey);
/// assert!(!err.suggested_action.is_empty());
///
/// let err = classify(404, "not_found", "Email not found");
/// assert_eq!(err.kind, ErrorKind::Generic);
/// assert_eq!(err.message, "Email not found");
/// ```
pub fn classify(code: impl Display, error_type: &str, message: &str) -> ApiError {
    let code = code.to_string();
    let kind = lookup(&code, error_type).unwrap_or(ErrorKind::Generic);
    log::debug!("classified {code}/{error_type:?} as {kind:?}");
    ApiError::new(kind, code, error_type, message)
}
