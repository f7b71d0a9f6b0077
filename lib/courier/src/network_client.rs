//! The configured client handed to API code.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::builder::NetworkClientBuilder;
use crate::client::HyperClient;
use crate::config::NetworkConfig;
use crate::{
    Error, HttpClient, JSON_CONTENT_TYPE, JsonCodec, Method, Request, RequestBuilder, Response, Result,
    classify, header,
};

/// HTTP client bound to a base URL, a JSON codec and an engine.
///
/// Every response goes through [`classify`]: a non-2xx status never reaches
/// the caller as a response, it surfaces as
/// [`Error::Api`](crate::Error::Api) or
/// [`Error::UnknownApi`](crate::Error::UnknownApi).
///
/// Cloning is cheap; clones share the engine and its connection pool.
pub struct NetworkClient<C = HyperClient> {
    engine: Arc<C>,
    config: Arc<NetworkConfig>,
    codec: JsonCodec,
}

impl<C> Clone for NetworkClient<C> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: Arc::clone(&self.config),
            codec: self.codec,
        }
    }
}

impl<C> std::fmt::Debug for NetworkClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl NetworkClient<HyperClient> {
    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> NetworkClientBuilder {
        NetworkClientBuilder::new()
    }
}

impl<C> NetworkClient<C> {
    pub(crate) fn new(engine: C, config: NetworkConfig, codec: JsonCodec) -> Self {
        Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
            codec,
        }
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Base URL, always ending with `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// JSON codec used for bodies and error payloads.
    #[must_use]
    pub const fn codec(&self) -> &JsonCodec {
        &self.codec
    }

    /// Underlying engine.
    #[must_use]
    pub fn engine(&self) -> &C {
        &self.engine
    }

    /// Resolve `path` against the base URL.
    ///
    /// A leading `/` is ignored, so `/users` and `users` both land under the
    /// base path.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] if `path` is an absolute URL or otherwise
    /// resolves outside the base URL origin.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = &self.config.base_url;
        let url = base.join(path.trim_start_matches('/'))?;
        if Url::parse(path).is_ok() || url.origin() != base.origin() {
            return Err(Error::invalid_request(format!(
                "path '{path}' leaves the base URL {base}"
            )));
        }
        Ok(url)
    }
}

impl<C: HttpClient> NetworkClient<C> {
    /// Start a request to `path` with `Accept: application/json`.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder<Bytes>> {
        Ok(Request::builder(method, self.endpoint(path)?)
            .header(header::ACCEPT.as_str(), JSON_CONTENT_TYPE))
    }

    /// Execute a request and classify the response.
    ///
    /// # Errors
    ///
    /// Transport errors from the engine, or the API error a non-2xx status
    /// classifies into.
    pub async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let response = self.engine.execute(request).await?;
        classify(response, &self.codec)
    }

    /// `GET path`, decoding the body as `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(Method::Get, path, None::<&()>).await
    }

    /// `POST path` with a JSON body, decoding the response as `T`.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::Post, path, Some(body)).await
    }

    /// `PUT path` with a JSON body, decoding the response as `T`.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::Put, path, Some(body)).await
    }

    /// `PATCH path` with a JSON body, decoding the response as `T`.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::Patch, path, Some(body)).await
    }

    /// `DELETE path`, decoding the body as `T` (`()` for an empty body).
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(Method::Delete, path, None::<&()>).await
    }

    async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(&self.codec, body)?;
        }

        let response = self.send(builder.build()).await?;
        response.json(&self.codec)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    fn client(base_url: &str) -> NetworkClient<HyperClient> {
        let_assert!(Ok(client) = NetworkClient::builder().base_url(base_url).build());
        client
    }

    #[test]
    fn endpoint_joins_under_base_path() {
        let client = client("api.example.com/v1");
        let_assert!(Ok(with_slash) = client.endpoint("/users/42"));
        let_assert!(Ok(without_slash) = client.endpoint("users/42"));

        check!(with_slash.as_str() == "https://api.example.com/v1/users/42");
        check!(with_slash == without_slash);
    }

    #[test]
    fn endpoint_stays_on_base_origin() {
        let client = client("http://127.0.0.1:8080/api");

        for path in ["http://other.host/x", "https://127.0.0.1:8080/api/x", "mailto:a@b.c"] {
            let_assert!(Err(Error::InvalidRequest(message)) = client.endpoint(path));
            check!(message.contains(path));
        }

        let_assert!(Ok(nested) = client.endpoint("//other.host/x"));
        check!(nested.as_str() == "http://127.0.0.1:8080/api/other.host/x");
        let_assert!(Ok(parent) = client.endpoint("../admin"));
        check!(parent.as_str() == "http://127.0.0.1:8080/admin");
    }

    #[test]
    fn request_defaults_to_json_accept() {
        let client = client("api.example.com");
        let_assert!(Ok(builder) = client.request(Method::Get, "health"));
        let request = builder.query("verbose", "true").build();

        check!(request.url().as_str() == "https://api.example.com/health?verbose=true");
        check!(request.header("accept") == Some("application/json"));
    }

    #[test]
    fn clones_share_the_engine() {
        let client = client("api.example.com");
        let cloned = client.clone();
        check!(std::ptr::eq(client.engine(), cloned.engine()));
        check!(format!("{cloned:?}").contains("NetworkClient"));
    }
}
