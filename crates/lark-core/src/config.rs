use std::time::Duration;

use crate::LarkError;

const FEISHU_BASE_URL: &str = "https://open.feishu.cn";
const LARK_BASE_URL: &str = "https://open.larksuite.com";

/// Which Open Platform deployment the client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Domain {
    /// Feishu (mainland China), `https://open.feishu.cn`.
    #[default]
    Feishu,
    /// Lark (international), `https://open.larksuite.com`.
    Lark,
    /// Any other base URL, e.g. a private deployment or a test server.
    Custom(String),
}

impl Domain {
    pub fn base_url(&self) -> &str {
        match self {
            Domain::Feishu => FEISHU_BASE_URL,
            Domain::Lark => LARK_BASE_URL,
            Domain::Custom(url) => url,
        }
    }

    /// Parse `"feishu"`, `"lark"`, or an `http(s)://` URL.
    pub fn parse(s: &str) -> Result<Self, LarkError> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "feishu" => Ok(Domain::Feishu),
            "lark" | "larksuite" => Ok(Domain::Lark),
            lower if lower.starts_with("http://") || lower.starts_with("https://") => {
                Ok(Domain::Custom(trimmed.trim_end_matches('/').to_string()))
            }
            _ => Err(LarkError::Config(format!("unrecognized domain: {s}"))),
        }
    }
}

/// How the application is distributed, which decides how tokens are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppType {
    /// Custom app built for a single tenant.
    #[default]
    SelfBuild,
    /// App published on the app store; needs an app ticket and a tenant key.
    Marketplace,
}

impl AppType {
    pub fn parse(s: &str) -> Result<Self, LarkError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self_build" | "selfbuild" | "internal" => Ok(AppType::SelfBuild),
            "marketplace" | "store" | "isv" => Ok(AppType::Marketplace),
            _ => Err(LarkError::Config(format!("unrecognized app type: {s}"))),
        }
    }
}

/// Configuration for the Lark Open Platform.
///
/// Obtain `app_id` and `app_secret` from the developer console
/// (<https://open.feishu.cn/app>).
#[derive(Debug, Clone)]
pub struct LarkConfig {
    /// Application ID (`cli_xxx`).
    pub app_id: String,
    /// Application secret.
    pub app_secret: String,
    pub domain: Domain,
    pub app_type: AppType,
    /// When set, every request fetches a fresh token instead of using the store.
    pub disable_token_cache: bool,
    /// Per-request timeout applied by the default HTTP backend.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl LarkConfig {
    /// Create a config for a self-built app on Feishu.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            domain: Domain::Feishu,
            app_type: AppType::SelfBuild,
            disable_token_cache: false,
            timeout: None,
            user_agent: format!("lark-openapi-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Build a config from `LARK_APP_ID`, `LARK_APP_SECRET` and the optional
    /// `LARK_DOMAIN` / `LARK_APP_TYPE` variables.
    pub fn from_env() -> Result<Self, LarkError> {
        let app_id = std::env::var("LARK_APP_ID")
            .map_err(|_| LarkError::Config("LARK_APP_ID not set".to_string()))?;
        let app_secret = std::env::var("LARK_APP_SECRET")
            .map_err(|_| LarkError::Config("LARK_APP_SECRET not set".to_string()))?;
        let mut config = Self::new(app_id, app_secret);
        if let Ok(domain) = std::env::var("LARK_DOMAIN") {
            config.domain = Domain::parse(&domain)?;
        }
        if let Ok(app_type) = std::env::var("LARK_APP_TYPE") {
            config.app_type = AppType::parse(&app_type)?;
        }
        Ok(config)
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Shorthand for `with_domain(Domain::Custom(url))`, mostly for tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.domain = Domain::Custom(url.into());
        self
    }

    pub fn with_app_type(mut self, app_type: AppType) -> Self {
        self.app_type = app_type;
        self
    }

    pub fn with_disable_token_cache(mut self, disable: bool) -> Self {
        self.disable_token_cache = disable;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &str {
        self.domain.base_url()
    }
}
