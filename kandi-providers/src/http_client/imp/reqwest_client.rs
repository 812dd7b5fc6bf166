use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::http_client::{
    Headers, HttpClient, HttpClientError, HttpRequest, HttpResponse, Method, StatusCode,
};

#[derive(Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Applies `timeout` to every request, covering connect through body read.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = match method {
            Method::Get => self.client.get(&url),
            Method::Put => self.client.put(&url),
        }
        .headers(to_header_map(headers)?);

        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(%url, ?method, "sending HTTP request");

        let response = builder.send().await.map_err(transport)?;

        let status = StatusCode(response.status().as_u16());
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_owned()))
            })
            .collect();
        let body = response.bytes().await.map_err(transport)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn transport(err: reqwest::Error) -> HttpClientError {
    HttpClientError::Transport(err.to_string())
}

fn to_header_map(headers: Headers) -> Result<HeaderMap, HttpClientError> {
    headers
        .into_iter()
        .map(|(name, value)| {
            let invalid = |reason: String| HttpClientError::InvalidHeader {
                name: name.clone(),
                reason,
            };

            let header_name =
                HeaderName::try_from(name.as_str()).map_err(|err| invalid(err.to_string()))?;
            let header_value =
                HeaderValue::try_from(value.as_str()).map_err(|err| invalid(err.to_string()))?;

            Ok((header_name, header_value))
        })
        .collect()
}
