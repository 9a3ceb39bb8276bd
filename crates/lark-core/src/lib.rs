//! Core building blocks of the Feishu/Lark Open Platform SDK.
//!
//! - [`LarkConfig`]: app credentials, domain and app type
//! - [`fill_api_path`] / [`build_url`]: `:param` path templating
//! - [`ApiRequest`] / [`RequestOptions`]: an endpoint call and its per-call overrides
//! - [`HttpBackend`]: the transport seam ([`ReqwestBackend`], [`FakeBackend`])
//! - [`TokenManager`]: tenant/app access token acquisition and caching
//! - [`paginate`]: lazy cursor pagination over list endpoints
//!
//! Endpoint namespaces and the client live in the `lark-openapi` crate.

mod auth;
mod backend;
mod config;
mod error;
pub mod pagination;
mod path;
mod request;

pub use auth::{
    InMemoryTokenStore, TokenManager, TokenStore, APP_ACCESS_TOKEN_INTERNAL_PATH,
    APP_ACCESS_TOKEN_PATH, APP_TICKET_RESEND_PATH, TENANT_ACCESS_TOKEN_INTERNAL_PATH,
    TENANT_ACCESS_TOKEN_PATH,
};
pub use backend::{FakeBackend, HttpBackend, HttpRequest, HttpResponse, ReqwestBackend};
pub use config::{AppType, Domain, LarkConfig};
pub use error::LarkError;
pub use pagination::{collect_items, items, paginate, Page, PageData, PageStream};
pub use path::{build_url, fill_api_path, PathParams};
pub use request::{ApiRequest, AuthMode, RequestOptions};

/// HTTP verbs, re-exported so callers do not need a direct reqwest dependency.
pub use reqwest::Method;

/// Placeholder for endpoints whose `data` carries nothing of interest.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EmptyData {}
