//! Fabraic Client — the base client every request goes through.
//!
//! Owns the resolved base endpoint, the default `Accept`/auth headers and the
//! HTTP transport. [`ServiceClient`]s are thin views over a shared handle.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{FabraicError, FabraicResult};
use crate::service::ServiceClient;
use crate::DEFAULT_BASE_URL;

/// Header carrying the API key when no access token is configured.
pub const API_KEY_HEADER: &str = "x-api-key";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Base client for the Fabraic API.
///
/// Cloning is cheap: all clones share one immutable state and one transport,
/// so a single client can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct FabraicClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    /// Base endpoint, trailing separators removed.
    base_url: Url,

    /// HTTP client.
    http: Client,

    /// `Accept` plus exactly one auth header. Cloned per request, never mutated.
    default_headers: HeaderMap,
}

impl FabraicClient {
    /// Validate `config` and build a client.
    pub fn new(config: ClientConfig) -> FabraicResult<Self> {
        let default_headers = default_headers(config.api_key(), config.access_token())?;
        let base_url = parse_base_url(config.base_url.as_deref())?;
        let http = config.http_client.unwrap_or_default();

        tracing::debug!(base_url = %base_url, "Created Fabraic client");

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                http,
                default_headers,
            }),
        })
    }

    /// Create from `FABRAIC_*` environment variables.
    pub fn from_env() -> FabraicResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Scope a client to one service and API version.
    ///
    /// `version` defaults to [`DEFAULT_SERVICE_VERSION`](crate::DEFAULT_SERVICE_VERSION)
    /// when `None` or empty.
    pub fn service(&self, service_path: &str, version: Option<&str>) -> FabraicResult<ServiceClient> {
        ServiceClient::new(self.clone(), service_path, version)
    }

    /// The resolved base endpoint.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Headers sent with every request before per-call overrides.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.inner.default_headers
    }

    // ── Requests ─────────────────────────────────────────────

    /// Send one request and decode the JSON response.
    ///
    /// `path` is joined onto the base endpoint's own path. Returns `Ok(None)`
    /// when a 2xx response has an empty (or whitespace-only) body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> FabraicResult<Option<Value>> {
        let RequestOptions {
            query,
            body,
            headers: overrides,
        } = options;

        let url = self.endpoint(path, &query);
        let body = body.transpose().map_err(FabraicError::Encode)?;

        let mut headers = self.inner.default_headers.clone();
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        }
        for (name, value) in &overrides {
            headers.insert(name.clone(), value.clone());
        }

        tracing::debug!(method = %method, url = %url, "Sending Fabraic request");

        let mut http_request = self.inner.http.request(method, url).headers(headers);
        if let Some(bytes) = body {
            http_request = http_request.body(bytes);
        }

        let response = http_request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(status = status.as_u16(), len = bytes.len(), "Received Fabraic response");

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Fabraic request failed");
            return Err(FabraicError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        decode_body(&bytes)
    }

    /// `GET` shorthand for [`request`](Self::request).
    pub async fn get(&self, path: &str, options: RequestOptions) -> FabraicResult<Option<Value>> {
        self.request(Method::GET, path, options).await
    }

    /// `POST` shorthand for [`request`](Self::request).
    pub async fn post(&self, path: &str, options: RequestOptions) -> FabraicResult<Option<Value>> {
        self.request(Method::POST, path, options).await
    }

    /// `PUT` shorthand for [`request`](Self::request).
    pub async fn put(&self, path: &str, options: RequestOptions) -> FabraicResult<Option<Value>> {
        self.request(Method::PUT, path, options).await
    }

    /// `PATCH` shorthand for [`request`](Self::request).
    pub async fn patch(&self, path: &str, options: RequestOptions) -> FabraicResult<Option<Value>> {
        self.request(Method::PATCH, path, options).await
    }

    /// `DELETE` shorthand for [`request`](Self::request).
    pub async fn delete(&self, path: &str, options: RequestOptions) -> FabraicResult<Option<Value>> {
        self.request(Method::DELETE, path, options).await
    }

    // ── Internal ─────────────────────────────────────────────

    /// Absolute URL for `path` with `query` merged over the base URL's query.
    fn endpoint(&self, path: &str, query: &[(String, String)]) -> Url {
        let mut url = self.inner.base_url.clone();
        url.set_path(&join_path(self.inner.base_url.path(), path));
        merge_query(&mut url, query);
        url
    }
}

// ── Request Options ──────────────────────────────────────────

/// Per-call inputs: query parameters, JSON body and header overrides.
#[derive(Debug, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    body: Option<Result<Vec<u8>, serde_json::Error>>,
    headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a query parameter. A later value for the same key replaces earlier ones.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set several query parameters in iteration order.
    pub fn queries<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach a JSON body.
    ///
    /// Serialization happens here; a failure is reported by the request as
    /// [`FabraicError::Encode`] before anything is sent.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_vec(body));
        self
    }

    /// Override one header. Overrides win over defaults, auth and content type included.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Override several headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in &headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }
}

// ── Helpers ──────────────────────────────────────────────────

fn parse_base_url(raw: Option<&str>) -> FabraicResult<Url> {
    let trimmed = raw.unwrap_or_default().trim_end_matches('/');
    let base = if trimmed.is_empty() {
        DEFAULT_BASE_URL
    } else {
        trimmed
    };

    let url = Url::parse(base)
        .map_err(|e| FabraicError::Config(format!("invalid base URL {base:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(FabraicError::Config(format!(
            "base URL {base:?} cannot carry a path"
        )));
    }
    Ok(url)
}

fn default_headers(api_key: Option<&str>, access_token: Option<&str>) -> FabraicResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

    if let Some(token) = access_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            FabraicError::Config("access_token is not a valid header value".into())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    } else if let Some(key) = api_key {
        let mut value = HeaderValue::from_str(key)
            .map_err(|_| FabraicError::Config("api_key is not a valid header value".into()))?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
    } else {
        return Err(FabraicError::Config(
            "provide either api_key or access_token".into(),
        ));
    }

    Ok(headers)
}

/// Prefix `path` with exactly one `/`.
pub(crate) fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Segment-wise join; empty segments (duplicate or trailing `/`) are dropped.
fn join_path(base: &str, path: &str) -> String {
    let normalized = normalize_path(path);
    let segments: Vec<&str> = base
        .split('/')
        .chain(normalized.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Apply `overrides` over the URL's existing query, last write wins per key.
/// Pairs are re-encoded sorted by key.
fn merge_query(url: &mut Url, overrides: &[(String, String)]) {
    let mut merged: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for (key, value) in overrides {
        merged.retain(|(existing, _)| existing != key);
        merged.push((key.clone(), value.clone()));
    }
    merged.sort_by(|a, b| a.0.cmp(&b.0));

    if merged.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&merged);
    }
}

fn decode_body(bytes: &[u8]) -> FabraicResult<Option<Value>> {
    let blank = match std::str::from_utf8(bytes) {
        Ok(text) => text.trim().is_empty(),
        Err(_) => bytes.iter().all(u8::is_ascii_whitespace),
    };
    if blank {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(FabraicError::Decode)
}
