//! Feishu/Lark Open Platform client.
//!
//! A [`Client`] owns the credentials, the transport and the token cache.
//! Endpoints are grouped into namespaces reached through accessor methods:
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//! use lark_openapi::api::wiki::ListNodesQuery;
//! use lark_openapi::{Client, LarkConfig, PageQuery};
//!
//! # async fn example() -> Result<(), lark_openapi::LarkError> {
//! let client = Client::new(LarkConfig::from_env()?);
//!
//! let query = ListNodesQuery {
//!     page: PageQuery::new().with_page_size(50),
//!     parent_node_token: None,
//! };
//! let mut pages = client.wiki().list_nodes_iter("7034502641455497244", &query);
//! while let Some(page) = pages.try_next().await? {
//!     for node in page.items {
//!         println!("{}", node.title.unwrap_or_default());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Calls authenticate with a tenant access token obtained and cached by the
//! client. Pass [`RequestOptions`] through a namespace's `with_options` to
//! act as a user, for another tenant, or with extra headers.

pub mod api;
mod client;

pub use api::{I18nText, PageQuery};
pub use client::{Client, ClientBuilder};
pub use lark_core::{
    collect_items, items, ApiRequest, AppType, AuthMode, Domain, EmptyData, FakeBackend,
    HttpBackend, HttpRequest, HttpResponse, InMemoryTokenStore, LarkConfig, LarkError, Method,
    Page, PageData, PageStream, ReqwestBackend, RequestOptions, TokenManager, TokenStore,
};
