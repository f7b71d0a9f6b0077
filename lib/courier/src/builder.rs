//! Builder for [`NetworkClient`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use courier_core::HttpClient;
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;
use tracing::{debug, warn};

use crate::client::{BoxedService, HyperClient, LayerFn};
use crate::config::{NetworkConfigBuilder, Protocol};
use crate::middleware::LogLevel;
use crate::{Error, JsonCodec, NetworkClient, Request, Response, Result};

/// Configures and builds a [`NetworkClient`].
///
/// Only the base URL is required. Everything else defaults to HTTPS, no pins,
/// no logging, 60 second timeouts and [`JsonCodec::network`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use courier::NetworkClientBuilder;
///
/// let client = NetworkClientBuilder::new()
///     .base_url("api.example.com")
///     .ssl_pins(["sha256/ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0="])
///     .request_timeout(Duration::from_secs(10))
///     .debug(true)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(client.base_url().as_str(), "https://api.example.com/");
/// ```
#[derive(Default)]
pub struct NetworkClientBuilder {
    config: NetworkConfigBuilder,
    codec: JsonCodec,
    layers: Vec<LayerFn>,
}

impl std::fmt::Debug for NetworkClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClientBuilder")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl NetworkClientBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Core Configuration
    // ========================================================================

    /// Set the base URL, a bare host or a full URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.base_url(base_url);
        self
    }

    /// Set the SPKI pins for the base URL host.
    #[must_use]
    pub fn ssl_pins<I, S>(mut self, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config = self.config.ssl_pins(pins);
        self
    }

    /// Log full exchanges when `true`, nothing when `false`.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config = self.config.debug(debug);
        self
    }

    /// Set the exchange logging level.
    #[must_use]
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config = self.config.log_level(level);
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.request_timeout(timeout);
        self
    }

    /// Set the timeout for a complete response.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.response_timeout(timeout);
        self
    }

    /// Set the protocol used for a bare-host base URL.
    #[must_use]
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config = self.config.protocol(protocol);
        self
    }

    /// Replace the JSON codec.
    #[must_use]
    pub const fn codec(mut self, codec: JsonCodec) -> Self {
        self.codec = codec;
        self
    }

    // ========================================================================
    // Middleware
    // ========================================================================

    /// Add a Tower layer around the engine.
    ///
    /// The first added layer is the outermost one. All custom layers wrap the
    /// built-in logging, which stays closest to the wire. Layers only apply to
    /// clients created with [`Self::build`].
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Alias for [`Self::layer`].
    #[must_use]
    pub fn with<L>(self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layer(layer)
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build a client backed by [`HyperClient`].
    ///
    /// # Errors
    ///
    /// - [`Error::MissingBaseUrl`] if no base URL was set.
    /// - [`Error::InvalidConfig`] for an unparsable base URL or pin.
    /// - [`Error::Tls`] if the TLS stack cannot be initialized.
    pub fn build(self) -> Result<NetworkClient<HyperClient>> {
        let config = self.config.build()?;
        if config.protocol == Protocol::Http {
            warn!(base_url = %config.base_url, "network client allows cleartext HTTP");
        }

        let engine = HyperClient::with_layers(config.clone(), self.layers)?;
        debug!(
            base_url = %config.base_url,
            pins = config.ssl_pins.len(),
            log_level = ?config.log_level,
            "network client built"
        );

        Ok(NetworkClient::new(engine, config, self.codec))
    }

    /// Build a client on top of a caller-supplied engine, typically a mock.
    ///
    /// The engine owns transport, TLS and logging, so pins, timeouts and
    /// layers are not applied. The base URL is still required.
    ///
    /// # Errors
    ///
    /// Same configuration errors as [`Self::build`].
    pub fn build_with_engine<E: HttpClient>(self, engine: E) -> Result<NetworkClient<E>> {
        let config = self.config.build()?;
        if !self.layers.is_empty() {
            warn!(
                layers = self.layers.len(),
                "custom layers are not applied to a caller-supplied engine"
            );
        }

        debug!(base_url = %config.base_url, "network client built with custom engine");
        Ok(NetworkClient::new(engine, config, self.codec))
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn build_requires_base_url() {
        let_assert!(Err(Error::MissingBaseUrl) = NetworkClientBuilder::new().debug(true).build());
    }

    #[test]
    fn build_rejects_invalid_pin() {
        let result = NetworkClientBuilder::new()
            .base_url("api.example.com")
            .ssl_pins(["sha256/short"])
            .build();
        let_assert!(Err(Error::InvalidConfig(_)) = result);
    }

    #[test]
    fn build_applies_settings() {
        let_assert!(
            Ok(client) = NetworkClientBuilder::new()
                .base_url("api.example.com/v2")
                .log_level(LogLevel::Body)
                .request_timeout(Duration::from_secs(3))
                .response_timeout(Duration::from_secs(7))
                .codec(JsonCodec::network().with_pretty_print(false))
                .build()
        );

        check!(client.base_url().as_str() == "https://api.example.com/v2/");
        check!(client.config().log_level == LogLevel::Body);
        check!(client.config().request_timeout == Duration::from_secs(3));
        check!(client.config().response_timeout == Duration::from_secs(7));
        check!(!client.codec().pretty_print());
    }

    #[test]
    fn builder_debug_counts_layers() {
        let builder = NetworkClientBuilder::new().layer(tower::layer::util::Identity::new());
        check!(format!("{builder:?}").contains("layers_count: 1"));
    }
}
