//! Response classification: turn failing responses into typed errors.

use bytes::Bytes;

use crate::{ApiErrorResponse, Error, JsonCodec, Response, Result, TypedApiError, UnknownApiError};

/// Classify a completed response.
///
/// - 2xx: the response is returned unchanged.
/// - Any other status with an empty or whitespace-only body:
///   [`Error::UnknownApi`] without a body.
/// - A body matching [`ApiErrorResponse`]: [`Error::Api`].
/// - Any other body: [`Error::UnknownApi`] carrying the raw body.
///
/// The body of a failing response is consumed; it is never read twice.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use bytes::Bytes;
/// use courier_core::{Error, JsonCodec, Response, classify};
///
/// let body = Bytes::from(r#"{"status":404,"error_summary":{"message":"Not found"}}"#);
/// let response = Response::new(404, HashMap::new(), body);
///
/// match classify(response, &JsonCodec::network()) {
///     Err(Error::Api(err)) => assert_eq!(err.message(), "Not found"),
///     other => panic!("unexpected outcome: {other:?}"),
/// }
/// ```
pub fn classify(response: Response<Bytes>, codec: &JsonCodec) -> Result<Response<Bytes>> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.into_body();
    Err(classify_failure(status, &body, codec))
}

fn classify_failure(status: u16, body: &[u8], codec: &JsonCodec) -> Error {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        tracing::debug!(status, "error response without body");
        return UnknownApiError::new(status, None).into();
    }

    match ApiErrorResponse::from_body(&text, codec) {
        Some(decoded) => {
            tracing::debug!(status, "structured error response");
            TypedApiError::new(status, decoded).into()
        }
        None => {
            tracing::debug!(status, "error response did not match the error schema");
            UnknownApiError::new(status, Some(text.into_owned())).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};

    use super::*;
    use crate::UNKNOWN_ERROR_MESSAGE;

    fn response(status: u16, body: &str) -> Response<Bytes> {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Response::new(status, headers, Bytes::from(body.to_string()))
    }

    fn run(status: u16, body: &str) -> Result<Response<Bytes>> {
        classify(response(status, body), &JsonCodec::network())
    }

    #[test]
    fn success_passes_through_unchanged() {
        for status in [200, 201, 204, 299] {
            let_assert!(Ok(passed) = run(status, r#"{"id":7}"#));
            check!(passed.status() == status);
            check!(passed.body().as_ref() == br#"{"id":7}"#);
            check!(passed.header("content-type") == Some("application/json"));
        }
    }

    #[test]
    fn success_with_error_shaped_body_is_still_success() {
        let result = run(200, r#"{"status":404,"error_summary":{"message":"Not found"}}"#);
        check!(result.is_ok());
    }

    #[test]
    fn not_found_with_structured_body() {
        let_assert!(
            Err(Error::Api(err)) = run(404, r#"{"status":404,"error_summary":{"message":"Not found"}}"#)
        );
        check!(err.message() == "Not found");
        check!(err.http_status() == 404);
        check!(err.response().status == 404);
    }

    #[test]
    fn message_is_verbatim() {
        let body = r#"{"status":400,"error_summary":{"message":"  Card declined: insufficient funds  "}}"#;
        let_assert!(Err(Error::Api(err)) = run(400, body));
        check!(err.to_string() == "  Card declined: insufficient funds  ");
    }

    #[test]
    fn structured_body_without_summary_has_empty_message() {
        let_assert!(Err(Error::Api(err)) = run(409, r#"{"status":409,"error":{"code":"conflict"}}"#));
        check!(err.message().is_empty());
    }

    #[test]
    fn empty_body_is_unknown_without_body() {
        let_assert!(Err(Error::UnknownApi(err)) = run(500, ""));
        check!(err.status() == 500);
        check!(err.body().is_none());
        check!(err.message() == UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn whitespace_body_is_unknown_without_body() {
        let_assert!(Err(Error::UnknownApi(err)) = run(503, " \n\t "));
        check!(err.body().is_none());
    }

    #[test]
    fn malformed_body_is_unknown_with_raw_body() {
        let_assert!(Err(Error::UnknownApi(err)) = run(400, "not json"));
        check!(err.status() == 400);
        check!(err.body() == Some("not json"));
        check!(err.message() == UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn mismatched_json_is_unknown_with_raw_body() {
        let body = r#"{"message":"gateway timeout"}"#;
        let_assert!(Err(Error::UnknownApi(err)) = run(504, body));
        check!(err.body() == Some(body));
    }

    #[test]
    fn wrong_member_type_is_unknown() {
        let body = r#"{"status":"bad","error_summary":{"message":"x"}}"#;
        let_assert!(Err(Error::UnknownApi(err)) = run(422, body));
        check!(err.body() == Some(body));
    }

    #[test]
    fn redirect_status_is_a_failure() {
        let_assert!(Err(Error::UnknownApi(err)) = run(302, ""));
        check!(err.status() == 302);
    }

    #[test]
    fn extra_members_are_dropped() {
        let body = r#"{"status":401,"request_id":"r-1","error_summary":{"message":"Unauthorized","locale":"en"}}"#;
        let_assert!(Err(Error::Api(err)) = run(401, body));
        check!(err.message() == "Unauthorized");
    }
}
