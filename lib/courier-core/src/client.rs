//! Engine boundary.
//!
//! An engine performs one HTTP exchange and hands back a buffered response.
//! The default engine lives in the `courier` crate; tests and alternative
//! platforms provide their own.

use std::future::Future;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP engine trait.
///
/// Implementations must not classify responses: a 4xx or 5xx is still
/// `Ok(Response)` at this level. Only transport problems (connection, TLS,
/// timeout) are errors.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use bytes::Bytes;
/// use courier_core::{HttpClient, Request, Response, Result};
///
/// struct Canned(u16, &'static str);
///
/// impl HttpClient for Canned {
///     async fn execute(&self, _request: Request<Bytes>) -> Result<Response<Bytes>> {
///         Ok(Response::new(self.0, HashMap::new(), Bytes::from_static(self.1.as_bytes())))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails:
    /// - Network errors
    /// - TLS errors, including pin mismatches
    /// - Timeouts
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<T: HttpClient> HttpClient for std::sync::Arc<T> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        T::execute(self, request)
    }
}
