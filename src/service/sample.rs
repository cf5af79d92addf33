//! Fetching sample payloads for schema inference.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::client::{RequestConfig, ResponseBody, ServiceClient, Transport};
use crate::error::{DesignerError, Result};

/// One editable header row of an extract source.
///
/// `extra` holds an optional second token, e.g. the key after `Bearer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRow {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub extra: String,
}

impl HeaderRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            extra: String::new(),
        }
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    /// The header value as sent: `value` or `value extra`.
    pub fn header_value(&self) -> String {
        if self.extra.is_empty() {
            self.value.clone()
        } else {
            format!("{} {}", self.value, self.extra)
        }
    }
}

/// Collapse header rows into a header map. Rows with a blank key are skipped
/// and a repeated key keeps its last value.
pub fn format_headers(rows: &[HeaderRow]) -> BTreeMap<String, String> {
    rows.iter()
        .filter(|row| !row.key.trim().is_empty())
        .map(|row| (row.key.trim().to_string(), row.header_value()))
        .collect()
}

/// A sample fetch: absolute URL plus header rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRequest {
    pub url: String,
    pub headers: Vec<HeaderRow>,
}

impl SampleRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: Vec<HeaderRow>) -> Self {
        self.headers = headers;
        self
    }
}

/// Anything that can produce a sample document.
pub trait SampleSource {
    fn fetch_sample(&self, request: &SampleRequest) -> Result<Value>;
}

/// Fetches samples from arbitrary URLs.
pub struct SchemaFetcher<T: Transport> {
    client: ServiceClient<T>,
}

impl<T: Transport> SchemaFetcher<T> {
    pub fn new(client: ServiceClient<T>) -> Self {
        Self { client }
    }
}

impl<T: Transport> SampleSource for SchemaFetcher<T> {
    fn fetch_sample(&self, request: &SampleRequest) -> Result<Value> {
        let config = RequestConfig::url(&request.url).headers(format_headers(&request.headers));
        let body = self.client.get(config)?;
        let value = match body {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => serde_json::from_str(&text).map_err(|e| {
                DesignerError::SchemaValidation(format!("response is not JSON ({})", e))
            })?,
        };
        ensure_structured(value)
    }
}

/// Accept only JSON objects and arrays as samples.
pub fn ensure_structured(value: Value) -> Result<Value> {
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        other => Err(DesignerError::SchemaValidation(format!(
            "expected a JSON object or array, got {}",
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
