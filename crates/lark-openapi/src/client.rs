use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use lark_core::{
    build_url, paginate, ApiRequest, AppType, AuthMode, Domain, HttpBackend, HttpRequest,
    InMemoryTokenStore, LarkConfig, LarkError, Page, PageStream, ReqwestBackend, RequestOptions,
    TokenManager, TokenStore,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{
    application::Application, bitable::Bitable, calendar::Calendar, contact::Contact,
    drive::Drive, im::Im, sheets::Sheets, task::Task, wiki::Wiki, workplace::Workplace,
};

const LOG_ID_HEADER: &str = "X-Tt-Logid";
const HELPDESK_AUTH_HEADER: &str = "X-Lark-Helpdesk-Authorization";

/// Entry point to the Open Platform API.
///
/// Cloning is cheap; clones share the backend and the token cache.
///
/// ```rust,no_run
/// use lark_openapi::Client;
///
/// # async fn example() -> Result<(), lark_openapi::LarkError> {
/// let client = Client::builder("cli_xxx", "app_secret_xxx").build();
/// let space = client.wiki().get_space("7034502641455497244", None).await?;
/// println!("{}", space.name.unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: Arc<LarkConfig>,
    backend: Arc<dyn HttpBackend>,
    tokens: TokenManager,
}

impl Client {
    /// Create a client using reqwest as the transport.
    pub fn new(config: LarkConfig) -> Self {
        let mut backend = ReqwestBackend::new();
        if let Some(timeout) = config.timeout {
            backend = backend.with_timeout(timeout);
        }
        Self::with_backend(config, Arc::new(backend))
    }

    /// Create a client on top of a custom transport.
    pub fn with_backend(config: LarkConfig, backend: Arc<dyn HttpBackend>) -> Self {
        Self::assemble(config, backend, Arc::new(InMemoryTokenStore::new()))
    }

    pub fn builder(app_id: impl Into<String>, app_secret: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(LarkConfig::new(app_id, app_secret))
    }

    fn assemble(
        config: LarkConfig,
        backend: Arc<dyn HttpBackend>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        let config = Arc::new(config);
        let tokens = TokenManager::new(config.clone(), backend.clone(), store);
        Self {
            inner: Arc::new(ClientInner {
                config,
                backend,
                tokens,
            }),
        }
    }

    pub fn config(&self) -> &LarkConfig {
        &self.inner.config
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.inner.tokens
    }

    // ── Namespaces ───────────────────────────────────────────────────────────

    pub fn wiki(&self) -> Wiki<'_> {
        Wiki::new(Scope::new(self))
    }

    pub fn application(&self) -> Application<'_> {
        Application::new(Scope::new(self))
    }

    pub fn workplace(&self) -> Workplace<'_> {
        Workplace::new(Scope::new(self))
    }

    pub fn im(&self) -> Im<'_> {
        Im::new(Scope::new(self))
    }

    pub fn contact(&self) -> Contact<'_> {
        Contact::new(Scope::new(self))
    }

    pub fn calendar(&self) -> Calendar<'_> {
        Calendar::new(Scope::new(self))
    }

    pub fn task(&self) -> Task<'_> {
        Task::new(Scope::new(self))
    }

    pub fn sheets(&self) -> Sheets<'_> {
        Sheets::new(Scope::new(self))
    }

    pub fn bitable(&self) -> Bitable<'_> {
        Bitable::new(Scope::new(self))
    }

    pub fn drive(&self) -> Drive<'_> {
        Drive::new(Scope::new(self))
    }

    // ── Transport ────────────────────────────────────────────────────────────

    /// Send a request and decode the `data` field of the response envelope.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        options: &RequestOptions,
    ) -> Result<T, LarkError> {
        let body = self.raw_request(request, options).await?;
        let data = match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Null) | None => Value::Object(Default::default()),
                Some(data) => data,
            },
            _ => Value::Object(Default::default()),
        };
        serde_json::from_value(data)
            .map_err(|e| LarkError::Parsing(format!("response data: {e}")))
    }

    /// Send a request and return the whole response body once its `code` is 0.
    ///
    /// Useful for endpoints without a typed binding.
    pub async fn raw_request(
        &self,
        request: ApiRequest,
        options: &RequestOptions,
    ) -> Result<Value, LarkError> {
        let auth = request.auth;
        let http = self.format_payload(request, options).await?;
        tracing::debug!(method = %http.method, url = %http.url, "lark request");

        let response = self.inner.backend.send(http).await?;
        let log_id = response.header(LOG_ID_HEADER).map(String::from);

        let Some(code) = response.body.get("code").and_then(Value::as_i64) else {
            if (200..300).contains(&response.status) {
                return Ok(response.body);
            }
            return Err(LarkError::Http(format!(
                "unexpected status {}: {}",
                response.status, response.body
            )));
        };
        if code != 0 {
            let msg = response.body["msg"]
                .as_str()
                .unwrap_or("unknown")
                .to_string();
            tracing::warn!(code, log_id = ?log_id, "lark api error: {msg}");
            let err = LarkError::Api { code, msg, log_id };
            let managed_token =
                options.tenant_access_token.is_none() && options.user_access_token.is_none();
            if err.is_token_invalid() && managed_token {
                match auth {
                    AuthMode::Tenant => {
                        self.inner
                            .tokens
                            .invalidate(options.tenant_key.as_deref())
                            .await
                    }
                    AuthMode::App => self.inner.tokens.invalidate_app().await,
                    AuthMode::None => {}
                }
            }
            return Err(err);
        }
        Ok(response.body)
    }

    /// Resolve the URL and attach credentials and headers.
    pub(crate) async fn format_payload(
        &self,
        request: ApiRequest,
        options: &RequestOptions,
    ) -> Result<HttpRequest, LarkError> {
        let config = &self.inner.config;
        let url = build_url(config.base_url(), &request.path, &request.path_params)?;

        let mut headers = vec![("User-Agent".to_string(), config.user_agent.clone())];

        let token = match (&options.user_access_token, &options.tenant_access_token) {
            (Some(user), _) => Some(user.clone()),
            (None, Some(tenant)) => Some(tenant.clone()),
            (None, None) => match request.auth {
                AuthMode::Tenant => Some(
                    self.inner
                        .tokens
                        .tenant_access_token(options.tenant_key.as_deref())
                        .await?,
                ),
                AuthMode::App => Some(self.inner.tokens.app_access_token().await?),
                AuthMode::None => None,
            },
        };
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        if let Some((id, token)) = &options.helpdesk_credential {
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(format!("{id}:{token}"));
            headers.push((HELPDESK_AUTH_HEADER.to_string(), encoded));
        }
        headers.extend(options.headers.iter().cloned());

        Ok(HttpRequest {
            method: request.method,
            url,
            query: request.query,
            headers,
            body: request.body,
        })
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    config: LarkConfig,
    backend: Option<Arc<dyn HttpBackend>>,
    store: Option<Arc<dyn TokenStore>>,
}

impl ClientBuilder {
    pub fn new(config: LarkConfig) -> Self {
        Self {
            config,
            backend: None,
            store: None,
        }
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.config.domain = domain;
        self
    }

    pub fn app_type(mut self, app_type: AppType) -> Self {
        self.config.app_type = app_type;
        self
    }

    pub fn disable_token_cache(mut self, disable: bool) -> Self {
        self.config.disable_token_cache = disable;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn HttpBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Share tokens through a custom store instead of the in-process default.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Client {
        let backend = self.backend.unwrap_or_else(|| {
            let mut backend = ReqwestBackend::new();
            if let Some(timeout) = self.config.timeout {
                backend = backend.with_timeout(timeout);
            }
            Arc::new(backend)
        });
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryTokenStore::new()));
        Client::assemble(self.config, backend, store)
    }
}

/// A client borrowed by a namespace, together with the options applied to
/// every call made through it.
#[derive(Clone)]
pub(crate) struct Scope<'a> {
    client: &'a Client,
    options: RequestOptions,
}

impl<'a> Scope<'a> {
    fn new(client: &'a Client) -> Self {
        Self {
            client,
            options: RequestOptions::default(),
        }
    }

    pub(crate) fn set_options(&mut self, options: RequestOptions) {
        self.options = options;
    }

    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, LarkError> {
        self.client.request(request, &self.options).await
    }

    /// Page through a list endpoint. The request is re-sent with a fresh
    /// `page_token` for every page after the first.
    pub(crate) fn pages<P>(&self, request: ApiRequest) -> PageStream<'static, P>
    where
        P: Page + DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let options = self.options.clone();
        paginate(move |cursor: Option<String>| {
            let client = client.clone();
            let options = options.clone();
            let request = match cursor {
                Some(token) => request.clone().set_query("page_token", token),
                None => request.clone(),
            };
            async move { client.request::<P>(request, &options).await }
        })
    }
}
