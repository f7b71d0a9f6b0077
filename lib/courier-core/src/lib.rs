//! Core types for the courier network client.
//!
//! This crate holds everything that does not depend on a concrete engine:
//! - [`Request`], [`RequestBuilder`], [`Response`] and [`Method`]
//! - [`HttpClient`] - the engine boundary
//! - [`JsonCodec`] - the JSON policy shared by payloads and error bodies
//! - [`classify`] - turns failing responses into [`TypedApiError`] or [`UnknownApiError`]
//! - [`Error`] and [`Result`]
//! - [`StatusCode`] and [`header`] (re-exported from the `http` crate)

mod api_error;
mod classify;
mod client;
mod codec;
mod error;
mod method;
pub mod prelude;
mod request;
mod response;

pub use api_error::{
    ApiErrorResponse, ErrorDetail, ErrorSummary, Resource, TypedApiError, UNKNOWN_ERROR_MESSAGE,
    UnknownApiError,
};
pub use classify::classify;
pub use client::HttpClient;
pub use codec::{JSON_CONTENT_TYPE, JsonCodec};
pub use error::{Error, Result};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
