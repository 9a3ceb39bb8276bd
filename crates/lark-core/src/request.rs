use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{LarkError, PathParams};

/// Which token the platform expects for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `tenant_access_token`, the common case for server-side calls.
    #[default]
    Tenant,
    /// `app_access_token`.
    App,
    /// No `Authorization` header (token endpoints themselves).
    None,
}

/// A single endpoint call before payload formatting: verb, templated path,
/// parameters and body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path template relative to the domain, e.g. `/open-apis/wiki/v2/spaces/:space_id`.
    pub path: String,
    pub path_params: PathParams,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth: AuthMode,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: PathParams::new(),
            query: Vec::new(),
            body: None,
            auth: AuthMode::Tenant,
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

    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when `value` is `Some`.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Append one `key=value` pair per element (the platform's list encoding).
    pub fn query_list<V: ToString>(mut self, key: &str, values: &[V]) -> Self {
        for v in values {
            self.query.push((key.to_string(), v.to_string()));
        }
        self
    }

    /// Replace every occurrence of `key` with a single value.
    pub fn set_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, LarkError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Use an already-built JSON value as the request body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }
}

/// Per-call overrides applied while formatting the payload.
///
/// ```
/// use lark_core::RequestOptions;
///
/// let opts = RequestOptions::new()
///     .with_user_access_token("u-xxx")
///     .with_header("X-Request-Id", "abc");
/// assert_eq!(opts.user_access_token.as_deref(), Some("u-xxx"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub tenant_access_token: Option<String>,
    pub user_access_token: Option<String>,
    /// Tenant the call is made on behalf of (marketplace apps).
    pub tenant_key: Option<String>,
    pub helpdesk_credential: Option<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this tenant token instead of one from the token manager.
    pub fn with_tenant_token(mut self, token: impl Into<String>) -> Self {
        self.tenant_access_token = Some(token.into());
        self
    }

    /// Call the API as a user. Takes precedence over any tenant token.
    pub fn with_user_access_token(mut self, token: impl Into<String>) -> Self {
        self.user_access_token = Some(token.into());
        self
    }

    pub fn with_tenant_key(mut self, tenant_key: impl Into<String>) -> Self {
        self.tenant_key = Some(tenant_key.into());
        self
    }

    pub fn with_helpdesk_credential(
        mut self,
        helpdesk_id: impl Into<String>,
        helpdesk_token: impl Into<String>,
    ) -> Self {
        self.helpdesk_credential = Some((helpdesk_id.into(), helpdesk_token.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
