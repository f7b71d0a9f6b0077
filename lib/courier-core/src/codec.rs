//! JSON codec policy shared by error decoding and payload (de)serialization.
//!
//! One [`JsonCodec`] value is owned by each client and used for every body it
//! reads or writes, so error bodies and payloads follow the same rules:
//!
//! - every field is emitted on encode, except `null` object members, which
//!   are dropped unless explicit nulls are enabled;
//! - output is pretty-printed with a four-space indent;
//! - unknown members are ignored on decode;
//! - `NaN`, `Infinity` and `-Infinity` literals decode into floats;
//! - enums use serde's tagged-object representation.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::{Error, Result};

/// MIME type of every body produced by the codec.
pub const JSON_CONTENT_TYPE: &str = "application/json";

const PRETTY_INDENT: &[u8] = b"    ";

/// JSON (de)serialization policy.
///
/// # Example
///
/// ```
/// use courier_core::JsonCodec;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Card {
///     number: String,
///     holder: Option<String>,
/// }
///
/// let codec = JsonCodec::network();
/// let card = Card { number: "4111".to_string(), holder: None };
///
/// let text = codec.encode(&card).expect("encode").expect("non-blank");
/// assert_eq!(text, "{\n    \"number\": \"4111\"\n}");
///
/// let decoded: Card = codec.decode(&text).expect("decode");
/// assert_eq!(decoded, card);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    pretty_print: bool,
    explicit_nulls: bool,
    lenient: bool,
    allow_special_floats: bool,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::network()
    }
}

impl JsonCodec {
    /// The policy used by network clients.
    #[must_use]
    pub const fn network() -> Self {
        Self {
            pretty_print: true,
            explicit_nulls: false,
            lenient: false,
            allow_special_floats: true,
        }
    }

    /// Toggle pretty printing.
    #[must_use]
    pub const fn with_pretty_print(mut self, enabled: bool) -> Self {
        self.pretty_print = enabled;
        self
    }

    /// Toggle emission of `null` object members.
    #[must_use]
    pub const fn with_explicit_nulls(mut self, enabled: bool) -> Self {
        self.explicit_nulls = enabled;
        self
    }

    /// Toggle acceptance of non-strict JSON (unquoted keys, single quotes, trailing commas).
    #[must_use]
    pub const fn with_lenient(mut self, enabled: bool) -> Self {
        self.lenient = enabled;
        self
    }

    /// Toggle acceptance of `NaN` and `Infinity` literals.
    #[must_use]
    pub const fn with_special_floats(mut self, enabled: bool) -> Self {
        self.allow_special_floats = enabled;
        self
    }

    /// Whether output is pretty-printed.
    #[must_use]
    pub const fn pretty_print(&self) -> bool {
        self.pretty_print
    }

    /// Whether `null` object members are emitted.
    #[must_use]
    pub const fn explicit_nulls(&self) -> bool {
        self.explicit_nulls
    }

    /// Whether non-strict JSON is accepted on decode.
    #[must_use]
    pub const fn lenient(&self) -> bool {
        self.lenient
    }

    /// Whether `NaN` and `Infinity` literals are accepted on decode.
    #[must_use]
    pub const fn allow_special_floats(&self) -> bool {
        self.allow_special_floats
    }

    /// Encode a value to text.
    ///
    /// Returns `Ok(None)` when the encoded text is blank; callers treat that
    /// as "no body".
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Option<String>> {
        let mut value = serde_json::to_value(value)?;
        if !self.explicit_nulls {
            strip_null_members(&mut value);
        }

        let text = if self.pretty_print {
            let mut buf = Vec::with_capacity(128);
            let formatter = PrettyFormatter::with_indent(PRETTY_INDENT);
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut serializer)?;
            String::from_utf8(buf)
                .map_err(|e| Error::invalid_request(format!("encoded JSON is not UTF-8: {e}")))?
        } else {
            serde_json::to_string(&value)?
        };

        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }

    /// Encode a value to a request body.
    pub fn encode_bytes<T: Serialize + ?Sized>(&self, value: &T) -> Result<Option<Bytes>> {
        Ok(self.encode(value)?.map(Bytes::from))
    }

    /// Decode a value from text.
    ///
    /// Strict JSON is tried first. On a syntax error, and only if lenient mode
    /// or special floats are enabled, the text is parsed again as JSON5. The
    /// strict error is reported when both fail.
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        let mut deserializer = serde_json::Deserializer::from_str(text);
        let strict = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|e| (e.inner().is_syntax() || e.inner().is_eof(), Error::from_path_error(&e)))
            .and_then(|value| {
                deserializer
                    .end()
                    .map(|()| value)
                    .map_err(|e| (true, Error::json_deserialization(".", e.to_string())))
            });

        match strict {
            Ok(value) => Ok(value),
            Err((syntax, err)) if syntax && (self.lenient || self.allow_special_floats) => {
                json5::from_str(text).map_err(|relaxed| {
                    tracing::trace!(error = %relaxed, "relaxed JSON parse failed");
                    err
                })
            }
            Err((_, err)) => Err(err),
        }
    }

    /// Decode a value from raw bytes.
    pub fn decode_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::json_deserialization(".", format!("body is not UTF-8: {e}")))?;
        self.decode(text)
    }
}

impl Error {
    fn from_path_error(err: &serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self::json_deserialization(err.path().to_string(), err.inner().to_string())
    }
}

fn strip_null_members(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(strip_null_members);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_null_members),
        _ => {}
    }
}
