//! Request/response protocol around a pluggable HTTP transport.
//!
//! [`ServiceClient`] resolves URLs, encodes bodies and classifies replies;
//! the bytes on the wire are the [`Transport`]'s business.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::error::{DesignerError, Result};

/// Maximum number of characters of a non-JSON error body quoted in a message
const ERROR_SNIPPET_LEN: usize = 100;

/// HTTP verbs used by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed request with everything needed to diagnose it.
///
/// `status` is 0 for failures that never produced an HTTP response
/// (timeouts, connection errors).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("API Error ({status}) on {method} {url}: {message}")]
pub struct TransportError {
    pub message: String,
    pub status: u16,
    pub method: Method,
    pub url: String,
    pub response_body: String,
    pub request_body: Option<String>,
    /// Set when the transport gave up waiting for a response.
    pub timed_out: bool,
}

impl TransportError {
    /// Display text followed by the response body, pretty-printed when it is JSON.
    pub fn full_message(&self) -> String {
        let mut msg = self.to_string();
        if !self.response_body.is_empty() {
            let body = serde_json::from_str::<Value>(&self.response_body)
                .ok()
                .and_then(|json| serde_json::to_string_pretty(&json).ok())
                .unwrap_or_else(|| self.response_body.clone());
            msg.push_str("\nResponse: ");
            msg.push_str(&body);
        }
        msg
    }

    /// The server's `status_message` if the body carries one, else `message`.
    pub fn user_message(&self) -> String {
        serde_json::from_str::<Value>(&self.response_body)
            .ok()
            .and_then(|json| {
                json.get("status_message")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.message.clone())
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

/// Failure reported by a transport before any HTTP status was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    #[error("Request timed out")]
    TimedOut,
    #[error("{0}")]
    Network(String),
}

/// A fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

/// Raw reply from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves one request over the wire.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportFailure>;
}

/// Per-call request options.
///
/// Exactly one of `url` (absolute) or `endpoint` (relative to the client's
/// base URL) must be set; `url` wins if both are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub headers: BTreeMap<String, String>,
    pub content: Option<Value>,
    pub endpoint: Option<String>,
    pub url: Option<String>,
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Deserialize the body, parsing text bodies as JSON.
    pub fn deserialize<R: DeserializeOwned>(self) -> Result<R> {
        match self {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value)?),
            ResponseBody::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}

/// Client bound to one backend base URL.
pub struct ServiceClient<T: Transport> {
    base_url: String,
    transport: T,
    default_timeout: Option<Duration>,
}

impl<T: Transport> ServiceClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            default_timeout: None,
        }
    }

    /// Timeout applied to requests that do not set their own.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, config: RequestConfig) -> Result<ResponseBody> {
        self.request(Method::Get, config)
    }

    pub fn post(&self, config: RequestConfig) -> Result<ResponseBody> {
        self.request(Method::Post, config)
    }

    pub fn put(&self, config: RequestConfig) -> Result<ResponseBody> {
        self.request(Method::Put, config)
    }

    pub fn delete(&self, config: RequestConfig) -> Result<ResponseBody> {
        self.request(Method::Delete, config)
    }

    /// Issue one request and classify the reply.
    pub fn request(&self, method: Method, config: RequestConfig) -> Result<ResponseBody> {
        let request = self.prepare(method, config)?;
        tracing::debug!("{} {}", request.method, request.url);

        let response = self
            .transport
            .send(&request)
            .map_err(|failure| transport_failure(&request, failure))?;

        interpret(&request, response).map_err(DesignerError::from)
    }

    fn prepare(&self, method: Method, config: RequestConfig) -> Result<HttpRequest> {
        let RequestConfig {
            headers,
            content,
            endpoint,
            url,
            timeout,
        } = config;

        let mut url = match (url, endpoint) {
            (Some(url), _) => url,
            (None, Some(endpoint)) => format!("{}{}", self.base_url, endpoint),
            (None, None) => {
                return Err(DesignerError::ConfigurationUsage(
                    "Either 'url' or 'endpoint' must be provided".to_string(),
                ))
            }
        };

        if method == Method::Get {
            let separator = if url.contains('?') { '&' } else { '?' };
            url = format!("{}{}_={}", url, separator, chrono::Utc::now().timestamp_millis());
        }

        let body = content.and_then(format_body);
        let mut headers: Vec<(String, String)> = headers.into_iter().collect();
        let has_content_type = headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("content-type"));
        if body.is_some() && !has_content_type {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: timeout.or(self.default_timeout),
        })
    }
}

fn format_body(content: Value) -> Option<String> {
    match content {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn transport_failure(request: &HttpRequest, failure: TransportFailure) -> DesignerError {
    let response_body = match &failure {
        TransportFailure::TimedOut => "Timeout".to_string(),
        TransportFailure::Network(detail) => detail.clone(),
    };
    TransportError {
        message: failure.to_string(),
        status: 0,
        method: request.method,
        url: request.url.clone(),
        response_body,
        request_body: request.body.clone(),
        timed_out: failure == TransportFailure::TimedOut,
    }
    .into()
}

fn interpret(
    request: &HttpRequest,
    response: HttpResponse,
) -> std::result::Result<ResponseBody, TransportError> {
    let error = |message: String, response_body: String| TransportError {
        message,
        status: response.status,
        method: request.method,
        url: request.url.clone(),
        response_body,
        request_body: request.body.clone(),
        timed_out: false,
    };

    if !response.is_success() {
        let message = error_message(response.status, &response.body);
        return Err(error(message, response.body.clone()));
    }

    let is_json = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return Ok(ResponseBody::Text(response.body));
    }

    let data: Value = serde_json::from_str(&response.body).map_err(|e| {
        error(format!("Invalid JSON response: {}", e), response.body.clone())
    })?;

    // Some endpoints report logical failures inside a 200 reply.
    if data.get("success") == Some(&Value::Bool(false)) {
        let message = first_text(&data, &["message", "error"])
            .unwrap_or_else(|| "API returned success: false".to_string());
        return Err(error(message, data.to_string()));
    }

    Ok(ResponseBody::Json(data))
}

/// Build `HTTP <status>[: detail]` from an error response body.
fn error_message(status: u16, body: &str) -> String {
    let mut message = format!("HTTP {}", status);

    match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            if let Some(detail) = first_text(&json, &["message", "error"]) {
                message.push_str(": ");
                message.push_str(&detail);
            } else if let Some(errors) = json.get("errors").and_then(Value::as_array) {
                let joined = errors.iter().map(value_text).collect::<Vec<_>>().join(", ");
                message.push_str(": ");
                message.push_str(&joined);
            }
        }
        Err(_) => {
            let trimmed = body.trim();
            if !trimmed.is_empty() {
                let snippet: String = trimmed.chars().take(ERROR_SNIPPET_LEN).collect();
                message.push_str(": ");
                message.push_str(&snippet);
                if body.chars().count() > ERROR_SNIPPET_LEN {
                    message.push_str("...");
                }
            }
        }
    }

    message
}

fn first_text(json: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| json.get(*key))
        .find(|v| is_truthy(v))
        .map(value_text)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
