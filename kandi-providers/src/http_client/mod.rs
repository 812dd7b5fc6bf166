//! HTTP seam used by the remote blob store.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod imp;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError>;
}

pub type Headers = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url.into())
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url.into())
    }

    fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {token}"))
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Anything outside 2xx is an error; redirects are followed by the client.
    pub fn error_for_status(self) -> Result<Self, HttpClientError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(HttpClientError::Status(self.status))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("Transport error: `{0}`")]
    Transport(String),
    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("JSON error: `{0}`")]
    Json(#[from] serde_json::Error),
    #[error("HTTP status {0}")]
    Status(StatusCode),
}
