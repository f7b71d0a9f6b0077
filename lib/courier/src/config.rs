//! Client configuration types.

use std::time::Duration;

use derive_more::Display;
use url::Url;

use crate::middleware::LogLevel;
use crate::pinning::Pin;
use crate::{Error, Result};

/// Default timeout for establishing a connection.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for receiving a complete response.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

/// URL scheme used when the base URL is given as a bare host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum Protocol {
    /// Plain HTTP. The connector also accepts `https` URLs.
    #[display("http")]
    Http,
    /// HTTPS only.
    #[default]
    #[display("https")]
    Https,
}

impl Protocol {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            _ => None,
        }
    }
}

/// Immutable configuration of a network client.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Base URL every request path is resolved against. Always ends with `/`.
    pub base_url: Url,
    /// SPKI pins enforced for the base URL host.
    pub ssl_pins: Vec<Pin>,
    /// Exchange logging level.
    pub log_level: LogLevel,
    /// Effective protocol, taken from the base URL scheme.
    pub protocol: Protocol,
    /// Connect timeout.
    pub request_timeout: Duration,
    /// Timeout for the whole exchange, body included.
    pub response_timeout: Duration,
}

impl NetworkConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> NetworkConfigBuilder {
        NetworkConfigBuilder::default()
    }

    /// Host of the base URL, without IPv6 brackets.
    #[must_use]
    pub fn host(&self) -> &str {
        self.base_url
            .host_str()
            .map_or("", |host| host.trim_start_matches('[').trim_end_matches(']'))
    }
}

/// Builder for [`NetworkConfig`].
#[derive(Debug, Clone, Default)]
pub struct NetworkConfigBuilder {
    base_url: Option<String>,
    ssl_pins: Vec<String>,
    log_level: Option<LogLevel>,
    protocol: Option<Protocol>,
    request_timeout: Option<Duration>,
    response_timeout: Option<Duration>,
}

impl NetworkConfigBuilder {
    /// Set the base URL: a host (`api.example.com`, optionally with port and
    /// path) or a full URL whose scheme overrides [`Self::protocol`].
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the SPKI pins, `sha256/<base64>` or bare base64.
    #[must_use]
    pub fn ssl_pins<I, S>(mut self, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ssl_pins = pins.into_iter().map(Into::into).collect();
        self
    }

    /// Enable full exchange logging, or disable logging.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.log_level = Some(LogLevel::from_debug(debug));
        self
    }

    /// Set the exchange logging level.
    #[must_use]
    pub const fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the protocol used for a bare-host base URL.
    #[must_use]
    pub const fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the timeout for a complete response.
    #[must_use]
    pub const fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingBaseUrl`] if no (or a blank) base URL was set.
    /// - [`Error::InvalidConfig`] if the base URL or a pin cannot be parsed.
    pub fn build(self) -> Result<NetworkConfig> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(Error::MissingBaseUrl)?;

        let base_url = resolve_base_url(raw, self.protocol.unwrap_or_default())?;
        let protocol = Protocol::from_scheme(base_url.scheme()).unwrap_or_default();

        let ssl_pins = self
            .ssl_pins
            .iter()
            .map(|pin| Pin::parse(pin))
            .collect::<Result<Vec<_>>>()?;

        Ok(NetworkConfig {
            base_url,
            ssl_pins,
            log_level: self.log_level.unwrap_or_default(),
            protocol,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            response_timeout: self.response_timeout.unwrap_or(DEFAULT_RESPONSE_TIMEOUT),
        })
    }
}

fn resolve_base_url(raw: &str, protocol: Protocol) -> Result<Url> {
    let mut url = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{protocol}://{raw}"))
    }
    .map_err(|e| Error::invalid_config(format!("invalid base URL '{raw}': {e}")))?;

    if Protocol::from_scheme(url.scheme()).is_none() {
        return Err(Error::invalid_config(format!(
            "unsupported base URL scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::invalid_config(format!("base URL '{raw}' has no host")));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
