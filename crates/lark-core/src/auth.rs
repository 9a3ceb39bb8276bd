use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::{build_url, AppType, HttpBackend, HttpRequest, LarkConfig, LarkError, PathParams};

pub const TENANT_ACCESS_TOKEN_INTERNAL_PATH: &str =
    "/open-apis/auth/v3/tenant_access_token/internal";
pub const TENANT_ACCESS_TOKEN_PATH: &str = "/open-apis/auth/v3/tenant_access_token";
pub const APP_ACCESS_TOKEN_INTERNAL_PATH: &str = "/open-apis/auth/v3/app_access_token/internal";
pub const APP_ACCESS_TOKEN_PATH: &str = "/open-apis/auth/v3/app_access_token";
pub const APP_TICKET_RESEND_PATH: &str = "/open-apis/auth/v3/app_ticket/resend";

/// Tokens are dropped from the cache this long before the platform expires them.
const EXPIRY_MARGIN: Duration = Duration::from_secs(3 * 60);
/// Upper bound on keeping a pushed app ticket. Each push overwrites the
/// stored one, so this only limits how long a stale ticket lingers once
/// pushes stop arriving.
const APP_TICKET_TTL: Duration = Duration::from_secs(12 * 60 * 60);

const TENANT_TOKEN_KEY: &str = "tenant_access_token";
const APP_TOKEN_KEY: &str = "app_access_token";
const APP_TICKET_KEY: &str = "app_ticket";

/// Storage for access tokens and app tickets.
///
/// Implement this to share tokens between processes (e.g. backed by Redis).
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Return the value if present and not expired.
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl: Duration);
    async fn remove(&self, key: &str);
}

/// Process-local token store with per-entry expiry.
#[derive(Default)]
pub struct InMemoryTokenStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone())
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value, Instant::now() + ttl));
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// Acquires and caches `tenant_access_token` / `app_access_token`.
///
/// Cache misses are single-flight: concurrent callers wait on one refresh and
/// then read the freshly stored token.
pub struct TokenManager {
    config: Arc<LarkConfig>,
    backend: Arc<dyn HttpBackend>,
    store: Arc<dyn TokenStore>,
    refresh: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        config: Arc<LarkConfig>,
        backend: Arc<dyn HttpBackend>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            config,
            backend,
            store,
            refresh: Mutex::new(()),
        }
    }

    fn cache_key(&self, kind: &str, tenant_key: Option<&str>) -> String {
        format!(
            "{kind}-{}-{}",
            self.config.app_id,
            tenant_key.unwrap_or_default()
        )
    }

    async fn cached(&self, key: &str) -> Option<String> {
        if self.config.disable_token_cache {
            return None;
        }
        self.store.get(key).await
    }

    async fn remember(&self, key: &str, token: &str, expire_secs: u64) {
        if self.config.disable_token_cache {
            return;
        }
        let ttl = Duration::from_secs(expire_secs).saturating_sub(EXPIRY_MARGIN);
        self.store.set(key, token.to_string(), ttl).await;
    }

    /// Get a tenant token, fetching a new one when the cache has none.
    ///
    /// Marketplace apps must pass the `tenant_key` of the tenant being served.
    pub async fn tenant_access_token(&self, tenant_key: Option<&str>) -> Result<String, LarkError> {
        let key = self.cache_key(TENANT_TOKEN_KEY, tenant_key);
        if let Some(token) = self.cached(&key).await {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        if let Some(token) = self.cached(&key).await {
            return Ok(token);
        }

        let (token, expire) = match self.config.app_type {
            AppType::SelfBuild => {
                let body = json!({
                    "app_id": self.config.app_id,
                    "app_secret": self.config.app_secret,
                });
                self.fetch_token(TENANT_ACCESS_TOKEN_INTERNAL_PATH, body, TENANT_TOKEN_KEY)
                    .await?
            }
            AppType::Marketplace => {
                let tenant_key = tenant_key.ok_or_else(|| {
                    LarkError::Auth("tenant_key is required for marketplace apps".to_string())
                })?;
                let app_access_token = self.app_access_token_unlocked().await?;
                let body = json!({
                    "app_access_token": app_access_token,
                    "tenant_key": tenant_key,
                });
                self.fetch_token(TENANT_ACCESS_TOKEN_PATH, body, TENANT_TOKEN_KEY)
                    .await?
            }
        };
        self.remember(&key, &token, expire).await;
        Ok(token)
    }

    /// Get an app token, fetching a new one when the cache has none.
    pub async fn app_access_token(&self) -> Result<String, LarkError> {
        let key = self.cache_key(APP_TOKEN_KEY, None);
        if let Some(token) = self.cached(&key).await {
            return Ok(token);
        }
        let _guard = self.refresh.lock().await;
        self.app_access_token_unlocked().await
    }

    /// Caller must hold the refresh lock.
    async fn app_access_token_unlocked(&self) -> Result<String, LarkError> {
        let key = self.cache_key(APP_TOKEN_KEY, None);
        if let Some(token) = self.cached(&key).await {
            return Ok(token);
        }

        let (token, expire) = match self.config.app_type {
            AppType::SelfBuild => {
                let body = json!({
                    "app_id": self.config.app_id,
                    "app_secret": self.config.app_secret,
                });
                self.fetch_token(APP_ACCESS_TOKEN_INTERNAL_PATH, body, APP_TOKEN_KEY)
                    .await?
            }
            AppType::Marketplace => {
                let ticket_key = self.cache_key(APP_TICKET_KEY, None);
                let Some(app_ticket) = self.store.get(&ticket_key).await else {
                    if let Err(e) = self.resend_app_ticket().await {
                        tracing::warn!("app_ticket resend failed: {e}");
                    }
                    return Err(LarkError::Auth(
                        "app_ticket not received yet; a resend has been requested".to_string(),
                    ));
                };
                let body = json!({
                    "app_id": self.config.app_id,
                    "app_secret": self.config.app_secret,
                    "app_ticket": app_ticket,
                });
                self.fetch_token(APP_ACCESS_TOKEN_PATH, body, APP_TOKEN_KEY)
                    .await?
            }
        };
        self.remember(&key, &token, expire).await;
        Ok(token)
    }

    /// Store the app ticket pushed by the platform (`app_ticket` event).
    ///
    /// Tickets are always stored, even with the token cache disabled, since
    /// they cannot be fetched on demand.
    pub async fn set_app_ticket(&self, ticket: impl Into<String>) {
        let key = self.cache_key(APP_TICKET_KEY, None);
        self.store.set(&key, ticket.into(), APP_TICKET_TTL).await;
    }

    /// Ask the platform to push a new app ticket.
    pub async fn resend_app_ticket(&self) -> Result<(), LarkError> {
        let body = json!({
            "app_id": self.config.app_id,
            "app_secret": self.config.app_secret,
        });
        let resp = self.post(APP_TICKET_RESEND_PATH, body).await?;
        check_auth(&resp, "app_ticket resend")
    }

    /// Drop the cached tenant token, e.g. after the platform rejected it.
    pub async fn invalidate(&self, tenant_key: Option<&str>) {
        let key = self.cache_key(TENANT_TOKEN_KEY, tenant_key);
        self.store.remove(&key).await;
    }

    /// Drop the cached app token.
    pub async fn invalidate_app(&self) {
        let key = self.cache_key(APP_TOKEN_KEY, None);
        self.store.remove(&key).await;
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, LarkError> {
        let url = build_url(self.config.base_url(), path, &PathParams::new())?;
        let resp = self
            .backend
            .send(HttpRequest {
                method: Method::POST,
                url,
                query: Vec::new(),
                headers: vec![("User-Agent".to_string(), self.config.user_agent.clone())],
                body: Some(body),
            })
            .await?;
        Ok(resp.body)
    }

    async fn fetch_token(
        &self,
        path: &str,
        body: Value,
        field: &str,
    ) -> Result<(String, u64), LarkError> {
        let resp = self.post(path, body).await?;
        check_auth(&resp, field)?;
        let token = resp[field]
            .as_str()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LarkError::Auth(format!("{field} missing from response")))?
            .to_string();
        let expire = resp["expire"].as_u64().unwrap_or(0);
        tracing::info!(app_id = %self.config.app_id, expire, "fetched {field}");
        Ok((token, expire))
    }
}

fn check_auth(body: &Value, ctx: &str) -> Result<(), LarkError> {
    let code = body["code"].as_i64().unwrap_or(-1);
    if code != 0 {
        Err(LarkError::Auth(format!(
            "{ctx} failed code={code}: {}",
            body["msg"].as_str().unwrap_or("unknown")
        )))
    } else {
        Ok(())
    }
}
