//! Certificate pinning and host binding.
//!
//! Pins are SHA-256 digests of a certificate's `SubjectPublicKeyInfo`, written
//! `sha256/<base64>` (a bare base64 digest is accepted too). A handshake
//! succeeds only when the peer is the base URL host, the chain passes normal
//! web PKI validation, and (when pins are configured) at least one
//! certificate in the chain matches a pin.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::{Error, Result};

const SHA256_PREFIX: &str = "sha256/";
const SHA1_PREFIX: &str = "sha1/";

/// SHA-256 digest of a `SubjectPublicKeyInfo`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin([u8; 32]);

impl Pin {
    /// Parse a pin from `sha256/<base64>` or bare base64.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for another hash algorithm, invalid
    /// base64, or a digest that is not 32 bytes long.
    pub fn parse(pin: &str) -> Result<Self> {
        let pin = pin.trim();
        if pin.starts_with(SHA1_PREFIX) {
            return Err(Error::invalid_config(format!(
                "unsupported pin '{pin}': sha1 pins are not accepted, use sha256"
            )));
        }
        let encoded = pin.strip_prefix(SHA256_PREFIX).unwrap_or(pin);

        let digest = STANDARD
            .decode(encoded)
            .map_err(|e| Error::invalid_config(format!("invalid pin '{pin}': {e}")))?;
        let digest: [u8; 32] = digest.try_into().map_err(|digest: Vec<u8>| {
            Error::invalid_config(format!(
                "invalid pin '{pin}': expected a 32 byte SHA-256 digest, got {} bytes",
                digest.len()
            ))
        })?;

        Ok(Self(digest))
    }

    /// Pin of a DER encoded `SubjectPublicKeyInfo`.
    #[must_use]
    pub fn from_spki(spki: &[u8]) -> Self {
        Self(Sha256::digest(spki).into())
    }

    /// Pin of a DER encoded X.509 certificate, or `None` if it cannot be parsed.
    #[must_use]
    pub fn for_certificate(der: &[u8]) -> Option<Self> {
        let (_, certificate) = x509_parser::parse_x509_certificate(der).ok()?;
        Some(Self::from_spki(certificate.public_key().raw))
    }

    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SHA256_PREFIX}{}", STANDARD.encode(self.0))
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pin({self})")
    }
}

/// Binds TLS connections to one host and an optional set of pins.
#[derive(Debug, Clone)]
pub struct CertificatePinner {
    host: String,
    pins: Vec<Pin>,
}

impl CertificatePinner {
    /// Create a pinner for `host`.
    #[must_use]
    pub fn new(host: &str, pins: Vec<Pin>) -> Self {
        Self {
            host: normalize_host(host),
            pins,
        }
    }

    /// The only host TLS connections may be made to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Configured pins.
    #[must_use]
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Returns `true` if `host` is the bound host.
    #[must_use]
    pub fn accepts_host(&self, host: &str) -> bool {
        normalize_host(host) == self.host
    }

    /// Returns `true` if no pin is configured or one of the certificates
    /// (DER encoded) matches a pin.
    pub fn accepts_chain<'a>(&self, chain: impl IntoIterator<Item = &'a [u8]>) -> bool {
        self.pins.is_empty()
            || chain
                .into_iter()
                .filter_map(Pin::for_certificate)
                .any(|pin| self.pins.contains(&pin))
    }
}

fn normalize_host(host: &str) -> String {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn server_host(server_name: &ServerName<'_>) -> String {
    match server_name {
        ServerName::DnsName(name) => name.as_ref().to_owned(),
        ServerName::IpAddress(ip) => std::net::IpAddr::from(*ip).to_string(),
        _ => String::new(),
    }
}

/// rustls verifier enforcing a [`CertificatePinner`] on top of web PKI checks.
#[derive(Debug)]
pub(crate) struct PinnedVerifier {
    inner: Arc<WebPkiServerVerifier>,
    pinner: CertificatePinner,
}

impl PinnedVerifier {
    pub(crate) fn new(inner: Arc<WebPkiServerVerifier>, pinner: CertificatePinner) -> Self {
        Self { inner, pinner }
    }
}

impl ServerCertVerifier for PinnedVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let host = server_host(server_name);
        if !self.pinner.accepts_host(&host) {
            warn!(host, expected = self.pinner.host(), "TLS connection to unexpected host");
            return Err(rustls::Error::General(format!(
                "certificate rejected: host '{host}' is not '{}'",
                self.pinner.host()
            )));
        }

        let verified =
            self.inner
                .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)?;

        let chain = std::iter::once(end_entity)
            .chain(intermediates)
            .map(|certificate| certificate.as_ref());
        if !self.pinner.accepts_chain(chain) {
            warn!(host, pins = self.pinner.pins().len(), "certificate pin mismatch");
            return Err(rustls::Error::General(format!(
                "certificate pinning failure for '{host}'"
            )));
        }

        Ok(verified)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
