//! HTTP response as seen by the classifier and the client.
//!
//! Engines hand back a fully buffered [`Response`]; the body is therefore
//! read from the wire exactly once, before classification.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{JsonCodec, Result};

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, B) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}

impl Response<Bytes> {
    /// Decode the body with the given codec.
    ///
    /// A blank body decodes as JSON `null`, so `()` and `Option<T>` targets
    /// accept `204 No Content` style responses.
    pub fn json<T: DeserializeOwned>(&self, codec: &JsonCodec) -> Result<T> {
        if self.body.trim_ascii().is_empty() {
            return codec.decode("null");
        }
        codec.decode_slice(&self.body)
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn response_basic() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        let response = Response::new(200, headers, Bytes::from(r#"{"id":1}"#));

        check!(response.status() == 200);
        check!(response.header("Content-Type") == Some("application/json"));
        check!(response.is_success());
        check!(!response.is_client_error());
        check!(!response.is_server_error());
    }

    #[test]
    fn response_status_checks() {
        check!(Response::new(404, HashMap::new(), Bytes::new()).is_client_error());
        check!(Response::new(500, HashMap::new(), Bytes::new()).is_server_error());
        check!(!Response::new(301, HashMap::new(), Bytes::new()).is_success());
    }

    #[test]
    fn response_json() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Charge {
            id: String,
            amount: f64,
        }

        let body = Bytes::from(r#"{"id":"ch_1","amount":12.5,"status":"complete"}"#);
        let response = Response::new(200, HashMap::new(), body);

        let_assert!(Ok(charge) = response.json::<Charge>(&JsonCodec::network()));
        check!(
            charge
                == Charge {
                    id: "ch_1".to_string(),
                    amount: 12.5
                }
        );
    }

    #[test]
    fn blank_body_decodes_as_null() {
        let response = Response::new(204, HashMap::new(), Bytes::from_static(b"  "));
        check!(response.json::<()>(&JsonCodec::network()).is_ok());
        let_assert!(Ok(None) = response.json::<Option<u32>>(&JsonCodec::network()));
    }

    #[test]
    fn response_text_is_lossy() {
        let response = Response::new(200, HashMap::new(), Bytes::from_static(b"ok\xff"));
        check!(response.text() == "ok\u{fffd}");
    }
}
