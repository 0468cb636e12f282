//! Shared HTTP transport for Linode API clients.
//!
//! [`LinodeClient`] wraps a pooled `reqwest::Client` plus the endpoint
//! resolver. It is cheap to clone and safe to use from many tasks at once.
//! Requests are never retried here; whether a retry is safe depends on the
//! operation and is left to the caller.

use crate::config::LinodeClientConfig;
use crate::context::RequestContext;
use crate::coupler::couple;
use crate::endpoint::Endpoints;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Method};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("linode-rust/", env!("CARGO_PKG_VERSION"));

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default TCP connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// A single API exchange, prior to sending.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    query: Vec<(&'static str, String)>,
    headers: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request with an arbitrary method.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `GET` request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// `POST` request.
    #[must_use]
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// `PUT` request.
    #[must_use]
    pub fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    /// `DELETE` request.
    #[must_use]
    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Append query pairs.
    #[must_use]
    pub fn with_query(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body cannot be serialized.
    pub fn with_json<B>(mut self, body: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::Validation(format!("Failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Builder for [`LinodeClient`].
#[derive(Debug, Clone)]
pub struct LinodeClientBuilder {
    config: LinodeClientConfig,
    pool_idle_timeout: Duration,
    pool_max_idle_per_host: usize,
    connect_timeout: Duration,
}

impl LinodeClientBuilder {
    /// Create a builder from a configuration.
    #[must_use]
    pub fn new(config: LinodeClientConfig) -> Self {
        Self {
            config,
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
        }
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Set the TCP connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validate the configuration and build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid configuration or an unusable token.
    pub fn build(self) -> Result<LinodeClient> {
        self.config.check()?;
        let endpoints = Endpoints::from_config(&self.config)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| Error::Config("API token contains invalid characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = self
            .config
            .user_agent
            .clone()
            .unwrap_or_else(|| USER_AGENT.to_string());

        // Redirects are surfaced to the coupler instead of being followed.
        let http = ClientBuilder::new()
            .redirect(Policy::none())
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(self.config.timeout())
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(LinodeClient { http, endpoints })
    }
}

/// Asynchronous transport handle shared by all resource clients.
#[derive(Debug, Clone)]
pub struct LinodeClient {
    http: Client,
    endpoints: Endpoints,
}

impl LinodeClient {
    /// Construct a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid configuration.
    pub fn new(config: LinodeClientConfig) -> Result<Self> {
        LinodeClientBuilder::new(config).build()
    }

    /// Start a builder pre-populated with the configuration.
    #[must_use]
    pub fn builder(config: LinodeClientConfig) -> LinodeClientBuilder {
        LinodeClientBuilder::new(config)
    }

    /// Endpoint resolver for this client.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Send a request and return the raw success body.
    ///
    /// # Errors
    ///
    /// Returns the coupled error, or [`Error::Cancelled`].
    pub async fn fetch_body(&self, ctx: &RequestContext, request: ApiRequest) -> Result<Vec<u8>> {
        let builder = self.prepare(request);
        ctx.run(async move {
            let response = couple(builder.send().await).await?;
            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        })
        .await
    }

    /// Send a request and deserialize the success body.
    ///
    /// # Errors
    ///
    /// Returns the coupled error, [`Error::Decode`] for malformed bodies, or
    /// [`Error::Cancelled`].
    pub async fn fetch<R>(&self, ctx: &RequestContext, request: ApiRequest) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = request.url().clone();
        let body = self.fetch_body(ctx, request).await?;
        serde_json::from_slice(&body).map_err(|err| {
            Error::Decode(format!("Failed to parse response for `{}`: {err}", url.path()))
        })
    }

    /// Send a request whose success body carries no information.
    ///
    /// # Errors
    ///
    /// Returns the coupled error, or [`Error::Cancelled`].
    pub async fn fetch_empty(&self, ctx: &RequestContext, request: ApiRequest) -> Result<()> {
        self.fetch_body(ctx, request).await.map(|_| ())
    }

    fn prepare(&self, request: ApiRequest) -> reqwest::RequestBuilder {
        debug!(method = %request.method, url = %request.url, query = ?request.query, "Sending Linode request");

        let mut builder = self.http.request(request.method, request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.json(&body);
        }
        builder
    }
}
