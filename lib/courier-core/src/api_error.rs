//! Wire shape of structured API errors and the two classified error types.
//!
//! A structured error body looks like:
//!
//! ```json
//! {
//!     "status": 404,
//!     "error": { "message": "Not found", "code": "not_found" },
//!     "resource": { "type": "charge" },
//!     "error_summary": { "message": "Not found" }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::JsonCodec;

/// Fixed message carried by [`UnknownApiError`] when no structured body was found.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unexpected error model - unable to decode JSON";

/// Human-readable summary of an API error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Message intended for display.
    #[serde(default)]
    pub message: String,
}

impl ErrorSummary {
    /// Create a summary with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Server-provided error detail. Every member is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Detailed message.
    #[serde(default)]
    pub message: Option<String>,
    /// Machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Free-form details such as per-field validation failures.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// The resource an error refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type, e.g. `"charge"`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Resource payload, if the server attached one.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Decoded structured error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Status reported in the body.
    pub status: u16,
    /// Optional error detail.
    #[serde(default)]
    pub error: Option<ErrorDetail>,
    /// Optional resource reference.
    #[serde(default)]
    pub resource: Option<Resource>,
    /// Display summary, `error_summary` on the wire.
    #[serde(rename = "error_summary", default)]
    pub summary: Option<ErrorSummary>,
}

impl ApiErrorResponse {
    /// Try to decode an error body. Returns `None` if the body does not match.
    #[must_use]
    pub fn from_body(body: &str, codec: &JsonCodec) -> Option<Self> {
        codec.decode(body).ok()
    }

    /// The summary message, or `""` when the body carried no summary.
    #[must_use]
    pub fn displayable_message(&self) -> &str {
        self.summary
            .as_ref()
            .map_or("", |summary| summary.message.as_str())
    }
}

/// A failing response whose body matched the structured error schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedApiError {
    http_status: u16,
    response: ApiErrorResponse,
}

impl TypedApiError {
    /// Wrap a decoded error body received with the given HTTP status.
    #[must_use]
    pub const fn new(http_status: u16, response: ApiErrorResponse) -> Self {
        Self {
            http_status,
            response,
        }
    }

    /// HTTP status of the response that carried the error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.http_status
    }

    /// The decoded body.
    #[must_use]
    pub const fn response(&self) -> &ApiErrorResponse {
        &self.response
    }

    /// Consume into the decoded body.
    #[must_use]
    pub fn into_response(self) -> ApiErrorResponse {
        self.response
    }

    /// Display message, taken verbatim from `error_summary.message`.
    #[must_use]
    pub fn message(&self) -> &str {
        self.response.displayable_message()
    }
}

impl fmt::Display for TypedApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for TypedApiError {}

/// A failing response whose body was empty or did not match the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownApiError {
    status: u16,
    message: String,
    body: Option<String>,
}

impl UnknownApiError {
    /// Create an error with the fixed diagnostic message.
    #[must_use]
    pub fn new(status: u16, body: Option<String>) -> Self {
        Self {
            status,
            message: UNKNOWN_ERROR_MESSAGE.to_string(),
            body,
        }
    }

    /// Override the diagnostic message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw error body, `None` when the response had no usable body.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl fmt::Display for UnknownApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for UnknownApiError {}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn decodes_full_wire_shape() {
        let body = r#"{
            "status": 400,
            "error": {"message": "Validation error", "code": "validation", "details": [{"field": "card"}]},
            "resource": {"type": "charge"},
            "error_summary": {"message": "Card number is invalid"}
        }"#;

        let_assert!(Some(response) = ApiErrorResponse::from_body(body, &JsonCodec::network()));
        check!(response.status == 400);
        check!(response.displayable_message() == "Card number is invalid");
        check!(response.resource.and_then(|r| r.kind).as_deref() == Some("charge"));

        let_assert!(Some(detail) = response.error);
        check!(detail.code.as_deref() == Some("validation"));
        check!(detail.details == Some(serde_json::json!([{"field": "card"}])));
    }

    #[test]
    fn missing_summary_yields_empty_message() {
        let_assert!(
            Some(response) = ApiErrorResponse::from_body(r#"{"status":500}"#, &JsonCodec::network())
        );
        check!(response.summary.is_none());
        check!(response.displayable_message().is_empty());
        check!(TypedApiError::new(500, response).to_string().is_empty());
    }

    #[test]
    fn missing_status_is_not_a_structured_error() {
        let body = r#"{"error_summary":{"message":"nope"}}"#;
        check!(ApiErrorResponse::from_body(body, &JsonCodec::network()).is_none());
    }

    #[test]
    fn unknown_members_are_ignored() {
        let body = r#"{"status":404,"trace_id":"abc","error_summary":{"message":"Not found","lang":"en"}}"#;
        let_assert!(Some(response) = ApiErrorResponse::from_body(body, &JsonCodec::network()));
        check!(response.displayable_message() == "Not found");
    }

    #[test]
    fn round_trips_through_codec() {
        let codec = JsonCodec::network();
        let original = ApiErrorResponse {
            status: 422,
            error: Some(ErrorDetail {
                message: Some("Unprocessable".to_string()),
                code: None,
                details: None,
            }),
            resource: None,
            summary: Some(ErrorSummary::new("Unprocessable entity")),
        };

        let_assert!(Ok(Some(text)) = codec.encode(&original));
        check!(text.contains("\"error_summary\""));
        check!(!text.contains("null"));

        let_assert!(Ok(decoded) = codec.decode::<ApiErrorResponse>(&text));
        check!(decoded == original);
    }

    #[test]
    fn unknown_error_defaults() {
        let err = UnknownApiError::new(400, Some("not json".to_string()));
        check!(err.status() == 400);
        check!(err.message() == UNKNOWN_ERROR_MESSAGE);
        check!(err.body() == Some("not json"));

        let err = err.with_message("gateway returned HTML");
        check!(err.to_string() == "gateway returned HTML");
    }
}
