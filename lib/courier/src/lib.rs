//! HTTP client factory for SDK network layers.
//!
//! [`NetworkClientBuilder`] turns a base URL, optional certificate pins, a
//! debug flag, timeouts and a protocol into a [`NetworkClient`]. The client
//! speaks JSON through a shared [`JsonCodec`] and classifies every non-2xx
//! response into [`TypedApiError`] (the body matched the API error envelope)
//! or [`UnknownApiError`] (it did not).
//!
//! # Example
//!
//! ```no_run
//! use courier::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct Charge {
//!     id: String,
//!     amount: u64,
//! }
//!
//! # async fn run() -> courier::Result<()> {
//! let client = NetworkClient::builder()
//!     .base_url("api.example.com/v1")
//!     .ssl_pins(["sha256/ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0="])
//!     .debug(cfg!(debug_assertions))
//!     .build()?;
//!
//! match client.get::<Charge>("charges/ch_1").await {
//!     Ok(charge) => println!("{charge:?}"),
//!     Err(Error::Api(error)) => println!("{}: {}", error.http_status(), error.message()),
//!     Err(other) => return Err(other),
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod client;
mod config;
mod connector;
pub mod middleware;
mod network_client;
mod pinning;
pub mod prelude;

pub use builder::NetworkClientBuilder;
pub use client::{BoxedService, HyperClient, ServiceFuture};
pub use config::{
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RESPONSE_TIMEOUT, NetworkConfig, NetworkConfigBuilder,
    Protocol,
};
pub use connector::https_connector;
pub use network_client::NetworkClient;
pub use pinning::{CertificatePinner, Pin};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use courier_core::{
    ApiErrorResponse, Error, ErrorDetail, ErrorSummary, HttpClient, JSON_CONTENT_TYPE, JsonCodec,
    Method, Request, RequestBuilder, Resource, Response, Result, TypedApiError,
    UNKNOWN_ERROR_MESSAGE, UnknownApiError, classify,
};

// Re-export http types for status codes and headers
pub use courier_core::{StatusCode, header};

pub use url;
