//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier_core::prelude::*;
//! ```

pub use crate::{
    ApiErrorResponse, Error, ErrorSummary, HttpClient, JsonCodec, Method, Request,
    RequestBuilder, Response, Result, TypedApiError, UnknownApiError, classify,
};
