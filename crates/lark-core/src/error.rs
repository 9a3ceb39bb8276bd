use thiserror::Error;

/// Vendor codes signalling that the access token attached to a request is
/// expired or otherwise unusable.
const TOKEN_INVALID_CODES: &[i64] = &[99991661, 99991663, 99991664, 99991668, 99991671, 99991677];

/// Unified error type for the SDK.
#[derive(Debug, Error)]
pub enum LarkError {
    #[error("http error: {0}")]
    Http(String),
    #[error("api error code={code}: {msg}")]
    Api {
        code: i64,
        msg: String,
        log_id: Option<String>,
    },
    #[error("auth error: {0}")]
    Auth(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("request miss {0} path argument")]
    MissingPathParam(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("timeout: {0}")]
    Timeout(String),
}

impl LarkError {
    /// The vendor error code, if this is an API error.
    pub fn code(&self) -> Option<i64> {
        match self {
            LarkError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The request log id returned by the platform, useful for support tickets.
    pub fn log_id(&self) -> Option<&str> {
        match self {
            LarkError::Api { log_id, .. } => log_id.as_deref(),
            _ => None,
        }
    }

    /// Whether the platform rejected the access token itself.
    pub fn is_token_invalid(&self) -> bool {
        self.code()
            .map(|c| TOKEN_INVALID_CODES.contains(&c))
            .unwrap_or(false)
    }
}

impl From<serde_json::Error> for LarkError {
    fn from(e: serde_json::Error) -> Self {
        LarkError::Parsing(e.to_string())
    }
}
