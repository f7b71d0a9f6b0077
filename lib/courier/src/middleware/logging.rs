//! Request/response logging middleware.
//!
//! Exchanges are logged through `tracing` at debug level inside an
//! `http_request` span. [`LogLevel::Body`] logs the request line, status and
//! body previews; [`LogLevel::All`] adds headers. Credentials in headers are
//! redacted and bodies are truncated to [`BODY_PREVIEW_LIMIT`] bytes.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, span, warn};

use crate::{Error, Request, Response, Result};

/// Maximum number of body bytes written to the log.
pub const BODY_PREVIEW_LIMIT: usize = 8 * 1024;

const REDACTED: &str = "<redacted>";
const SENSITIVE_HEADERS: [&str; 4] = ["authorization", "proxy-authorization", "cookie", "set-cookie"];

/// How much of each exchange is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Nothing is logged.
    #[default]
    None,
    /// Request line, status, timing and bodies.
    Body,
    /// Everything in [`LogLevel::Body`] plus headers.
    All,
}

impl LogLevel {
    /// `All` when debugging, `None` otherwise.
    #[must_use]
    pub const fn from_debug(debug: bool) -> Self {
        if debug { Self::All } else { Self::None }
    }

    /// Returns `true` unless this is [`LogLevel::None`].
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    const fn logs_headers(self) -> bool {
        matches!(self, Self::All)
    }
}

/// Layer that adds request/response logging.
///
/// # Example
///
/// ```
/// use courier::middleware::{LogLevel, LoggingLayer};
///
/// let layer = LoggingLayer::new(LogLevel::Body);
/// assert_eq!(layer.level(), LogLevel::Body);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

impl LoggingLayer {
    /// Create a logging layer at the given level.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs requests and responses.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        // `self.inner` is the service `poll_ready` was driven on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let level = self.level;
        if !level.is_enabled() {
            return Box::pin(async move { inner.call(request).await });
        }

        let method = request.method();
        let url = request.url().to_string();
        let span = span!(Level::DEBUG, "http_request", %method, %url);

        Box::pin(
            async move {
                let start = Instant::now();

                let body = request.body().map(preview).unwrap_or_default();
                if level.logs_headers() {
                    debug!(headers = ?redact(request.headers()), body = %body, "sending request");
                } else {
                    debug!(body = %body, "sending request");
                }

                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) => {
                        let status = response.status();
                        let body = preview(response.body());
                        if level.logs_headers() {
                            debug!(
                                status,
                                elapsed_ms,
                                headers = ?redact(response.headers()),
                                body = %body,
                                "received response"
                            );
                        } else {
                            debug!(status, elapsed_ms, body = %body, "received response");
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "request failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

fn preview(body: &Bytes) -> String {
    match body.get(..BODY_PREVIEW_LIMIT) {
        Some(head) if body.len() > BODY_PREVIEW_LIMIT => format!(
            "{}... ({} more bytes)",
            String::from_utf8_lossy(head),
            body.len() - BODY_PREVIEW_LIMIT
        ),
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

fn redact(headers: &HashMap<String, String>) -> HashMap<&str, &str> {
    headers
        .iter()
        .map(|(name, value)| {
            let sensitive = SENSITIVE_HEADERS
                .iter()
                .any(|candidate| name.eq_ignore_ascii_case(candidate));
            (name.as_str(), if sensitive { REDACTED } else { value.as_str() })
        })
        .collect()
}
