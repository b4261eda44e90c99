use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::{QaffeeError, Result};

/// Describes one logical API call.
///
/// Paths are relative to the client's base URL (`"/auth/me"`).
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<JsonValue>,
    pub(crate) headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets the JSON request body.
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds an extra request header. Headers do not take part in the
    /// request fingerprint.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Successful API response: status plus decoded JSON payload.
///
/// Cache hits report status `200`. Empty bodies decode to `Null`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: JsonValue,
}

impl ApiResponse {
    /// Deserializes the payload into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.body)
            .map_err(|err| QaffeeError::Decode(format!("unexpected response shape: {err}")))
    }
}

pub(crate) fn decode_body(status: u16, text: &str) -> Result<ApiResponse> {
    if text.trim().is_empty() {
        return Ok(ApiResponse {
            status,
            body: JsonValue::Null,
        });
    }
    let body = serde_json::from_str(text).map_err(|err| {
        QaffeeError::Decode(format!("invalid response JSON: {err}; body: {text}"))
    })?;
    Ok(ApiResponse { status, body })
}
