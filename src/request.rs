//! Request construction and dispatch.
//!
//! Turns a logical [`RequestSpec`] into a fully-formed HTTP call: resolves
//! the base address for the logical target, injects the bearer credential
//! when one is stored, and serializes query parameters and bodies. HTTP
//! error statuses come back as data in [`RawOutcome`]; only genuine
//! transport failure is an error.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientConfig, Service};
use crate::error::{ApiError, Result};
use crate::store::CredentialStore;

/// HTTP verb for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Ordered query mapping.
///
/// Entries whose value is `None` are skipped entirely during
/// serialization; they must never render as `key=null`, which corrupts
/// backend pagination.
#[derive(Debug, Clone, Default)]
pub struct Query(Vec<(String, Option<String>)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key with a present value.
    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), Some(value.to_string())));
        self
    }

    /// Append a key whose value may be absent; absent values are skipped
    /// at serialization time.
    pub fn set_opt(mut self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        self.0
            .push((key.into(), value.map(|v| v.to_string())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to a query string: keys in input order, values
    /// percent-encoded, `None` entries omitted.
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .filter_map(|(k, v)| {
                v.as_ref().map(|v| {
                    format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A single logical API call, immutable once constructed.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub service: Service,
    pub method: Method,
    pub path: String,
    pub query: Query,
    pub body: Option<Value>,
    /// Header overrides; these win over anything the executor injects.
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(service: Service, method: Method, path: impl Into<String>) -> Self {
        Self {
            service,
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::Get, path)
    }

    pub fn post(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::Post, path)
    }

    pub fn put(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::Put, path)
    }

    pub fn delete(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::Delete, path)
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Raw result of a dispatched request: status plus body text, before any
/// envelope interpretation.
#[derive(Debug, Clone)]
pub struct RawOutcome {
    pub status: u16,
    pub body: String,
}

/// Builds and dispatches single HTTP calls.
pub struct RequestExecutor {
    http: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
}

impl RequestExecutor {
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            config,
            store,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL for a spec, query string included.
    fn build_url(&self, spec: &RequestSpec) -> String {
        let mut url = format!("{}{}", self.config.base_url(spec.service), spec.path);
        let qs = spec.query.to_query_string();
        if !qs.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&qs);
        }
        url
    }

    /// Bearer header value from the credential store, if a token exists.
    ///
    /// Absence of a token means the request goes out unauthenticated; a
    /// token is never invented or defaulted.
    fn stored_bearer(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get()?
            .map(|session| format!("Bearer {}", session.token)))
    }

    /// Dispatch a single call.
    ///
    /// 4xx/5xx statuses are returned as data in the outcome; the error
    /// path is reserved for transport failure and storage faults.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<RawOutcome> {
        let url = self.build_url(spec);
        debug!(method = ?spec.method, %url, "Dispatching request");

        let mut request = match spec.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
            Method::Delete => self.http.delete(&url),
        };

        // Spec-level header overrides win over the stored credential.
        let auth_overridden = spec
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("authorization"));
        if !auth_overridden {
            if let Some(bearer) = self.stored_bearer()? {
                request = request.header(header::AUTHORIZATION, bearer);
            }
        }

        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let response = request
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .send()
            .await
            .map_err(transport_err)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_err)?;
        debug!(status, "Received response");

        Ok(RawOutcome { status, body })
    }

    /// Dispatch a multipart request (file upload path).
    ///
    /// Bypasses JSON serialization and the default content type; reqwest
    /// sets the multipart boundary header itself.
    pub async fn execute_multipart(
        &self,
        service: Service,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<RawOutcome> {
        let url = format!("{}{}", self.config.base_url(service), path);
        debug!(%url, "Dispatching multipart request");

        let mut request = self.http.post(&url).multipart(form);

        if let Some(bearer) = self.stored_bearer()? {
            request = request.header(header::AUTHORIZATION, bearer);
        }

        let response = request
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .send()
            .await
            .map_err(transport_err)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_err)?;
        Ok(RawOutcome { status, body })
    }
}

fn transport_err(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        warn!("Request timed out");
        ApiError::Transport(format!("request timed out: {}", e))
    } else {
        warn!("Transport failure: {}", e);
        ApiError::Transport(e.to_string())
    }
}
