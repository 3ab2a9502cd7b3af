// Authenticated request gateway for the parking-management REST backend.
//
// Every call carries the JSON content type and the configured
// `Accept-Language`; authenticated calls add `Authorization: Bearer`.
// Failures pass through the registered interceptors once, then surface
// to the caller. There are no retries: a 401 is terminal.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::envelope;
use crate::error::Error;
use crate::interceptor::Interceptor;
use crate::session::SessionStore;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

// Validation failures come back with `message` as either a string or a
// list of strings.
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

// ── Request description ──────────────────────────────────────────────

/// One call against the backend. `method` defaults to GET.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub path: String,
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            body: None,
            headers: HeaderMap::new(),
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(path).method(Method::DELETE)
    }

    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, Error> {
        Self::new(path).method(Method::POST).json(body)
    }

    pub fn put<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, Error> {
        Self::new(path).method(Method::PUT).json(body)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(path).method(Method::PATCH)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

// ── Gateway ──────────────────────────────────────────────────────────

/// Shared HTTP entry point. Cheap to share behind an `Arc`.
pub struct Gateway {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Gateway {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a gateway with its own HTTP client.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        session: Arc<SessionStore>,
    ) -> Result<Self, Error> {
        let http = transport.build_api_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self::with_client(http, base_url, session))
    }

    /// Wrap an existing `reqwest::Client` (caller manages default headers).
    pub fn with_client(http: reqwest::Client, base_url: Url, session: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url,
            session,
            interceptors: Vec::new(),
        }
    }

    /// Register an error interceptor. Interceptors run in registration order.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    // Ensure a trailing slash so relative joins append instead of replace.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Public surface ───────────────────────────────────────────────

    /// Issue a request and return the decoded JSON body.
    ///
    /// An empty body decodes as `null`; a non-JSON body is returned as a
    /// JSON string.
    pub async fn request(&self, req: ApiRequest) -> Result<Value, Error> {
        let result = self.execute(req, true).await;
        self.finish(result)
    }

    /// Issue a request and decode the body into `T`.
    pub async fn send<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, Error> {
        let value = self.request(req).await?;
        decode(envelope::normalize_record(value))
    }

    /// GET a collection, normalizing the list envelope.
    pub async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, Error> {
        let value = self.request(ApiRequest::get(path)).await?;
        decode(Value::Array(envelope::normalize_list(value)))
    }

    /// POST a single file as multipart form field `field`.
    pub async fn upload(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, Error> {
        let result = self.upload_inner(path, field, file_name, bytes).await;
        self.finish(result)
    }

    async fn upload_inner(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url} (multipart, {} bytes)", bytes.len());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part(field.to_owned(), part);
        let builder = self.authorize(self.http.post(url)).multipart(form);

        let resp = builder.send().await?;
        handle_response(resp).await
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Send without running interceptors. `authenticated` controls
    /// whether the bearer token is attached.
    pub(crate) async fn execute(&self, req: ApiRequest, authenticated: bool) -> Result<Value, Error> {
        let url = self.url(&req.path)?;
        if req.query.is_empty() {
            debug!("{} {url}", req.method);
        } else {
            debug!("{} {url} params={:?}", req.method, req.query);
        }

        let mut builder = self.http.request(req.method, url).headers(req.headers);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        if authenticated {
            builder = self.authorize(builder);
        }

        let resp = builder.send().await?;
        handle_response(resp).await
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.access_token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// The single interception point: each failure is seen exactly once.
    pub(crate) fn finish<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(ref err) = result {
            for interceptor in &self.interceptors {
                interceptor.on_error(err);
            }
        }
        result
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url.as_str())
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response(resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::AuthExpired);
    }

    let body = resp.text().await?;
    if !status.is_success() {
        return Err(parse_error(status, body));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body).unwrap_or_else(|_| Value::String(body)))
}

fn parse_error(status: StatusCode, body: String) -> Error {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    };

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(ErrorResponse {
            message: Some(Value::String(msg)),
            ..
        }) => msg,
        Ok(ErrorResponse {
            message: Some(Value::Array(items)),
            ..
        }) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; "),
        Ok(ErrorResponse {
            error: Some(err), ..
        }) => err,
        _ => fallback(),
    };

    Error::Http {
        status: status.as_u16(),
        message: if message.is_empty() { fallback() } else { message },
        body,
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    T::deserialize(&value).map_err(|e| {
        let body = value.to_string();
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
