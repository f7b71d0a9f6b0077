//! HTTPS connector using rustls.

use std::sync::Arc;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::RootCertStore;
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;

use crate::config::{NetworkConfig, Protocol};
use crate::pinning::{CertificatePinner, PinnedVerifier};
use crate::{Error, Result};

/// Process-wide crypto provider, falling back to ring when none is installed.
pub(crate) fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider()))
}

/// rustls client configuration with Mozilla roots, bound to the base URL host
/// and its pins.
fn tls_config(config: &NetworkConfig) -> Result<rustls::ClientConfig> {
    let provider = crypto_provider();
    let roots: RootCertStore = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let web_pki = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), Arc::clone(&provider))
        .build()
        .map_err(|e| Error::tls(e.to_string()))?;
    let pinner = CertificatePinner::new(config.host(), config.ssl_pins.clone());

    let tls = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::tls(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(PinnedVerifier::new(web_pki, pinner)))
        .with_no_client_auth();

    Ok(tls)
}

/// Create the connector for a configuration.
///
/// Supports HTTP/1.1 and HTTP/2. With [`Protocol::Https`] plain `http` URLs
/// are refused; with [`Protocol::Http`] both schemes are allowed. The
/// connect timeout is the configured request timeout.
pub fn https_connector(config: &NetworkConfig) -> Result<HttpsConnector<HttpConnector>> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(config.request_timeout));

    let builder = HttpsConnectorBuilder::new().with_tls_config(tls_config(config)?);
    let connector = match config.protocol {
        Protocol::Https => builder
            .https_only()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http),
        Protocol::Http => builder
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http),
    };

    Ok(connector)
}

#[cfg(test)]
mod tests {
    use assert2::let_assert;

    use super::*;

    #[test]
    fn creates_connector_for_both_protocols() {
        for base_url in ["api.example.com", "http://localhost:8080"] {
            let_assert!(Ok(config) = NetworkConfig::builder().base_url(base_url).build());
            let_assert!(Ok(_connector) = https_connector(&config));
        }
    }

    #[test]
    fn creates_connector_with_pins() {
        let_assert!(
            Ok(config) = NetworkConfig::builder()
                .base_url("api.example.com")
                .ssl_pins(["sha256/ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0="])
                .build()
        );
        let_assert!(Ok(_connector) = https_connector(&config));
    }
}
