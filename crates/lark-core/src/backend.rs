use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::LarkError;

/// A fully formatted request, ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl HttpResponse {
    /// A 200 response with a JSON body and no headers.
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The delegation point to an HTTP client. One call, one attempt.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LarkError>;
}

/// Production backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: None,
        }
    }

    /// Reuse an existing reqwest client (proxies, TLS settings, pools).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ReqwestBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn map_reqwest_error(ctx: &str, e: reqwest::Error) -> LarkError {
    if e.is_timeout() {
        LarkError::Timeout(format!("{ctx}: {e}"))
    } else {
        LarkError::Http(format!("{ctx}: {e}"))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LarkError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(&request.url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(&request.url, e))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                // Gateway error pages (HTML or plain text) in front of the platform.
                Err(_) if !(200..300).contains(&status) => {
                    return Err(LarkError::Http(format!("status {status}: {}", text.trim())));
                }
                Err(e) => {
                    return Err(LarkError::Parsing(format!(
                        "status {status}, non-JSON response body: {e}"
                    )));
                }
            }
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Test backend with queued responses. Records every request it receives.
#[derive(Default)]
pub struct FakeBackend {
    responses: Mutex<VecDeque<Result<HttpResponse, LarkError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) -> &Self {
        lock(&self.responses).push_back(Ok(response));
        self
    }

    /// Queue a 200 response with the given JSON body.
    pub fn push_json(&self, body: Value) -> &Self {
        self.push_response(HttpResponse::ok(body))
    }

    pub fn push_error(&self, error: LarkError) -> &Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

#[async_trait]
impl HttpBackend for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LarkError> {
        let url = request.url.clone();
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(LarkError::Http(format!("FakeBackend exhausted ({url})"))))
    }
}
