//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier::prelude::*;
//! ```

pub use crate::{
    Error, HttpClient, HyperClient, JsonCodec, Method, NetworkClient, NetworkClientBuilder,
    Protocol, Request, Response, Result, StatusCode, TypedApiError, UnknownApiError, header,
    middleware::LogLevel,
};
pub use serde::{Deserialize, Serialize};
