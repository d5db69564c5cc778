use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_HUB_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const ENV_HUB_URL: &str = "CONTEXT_HUB_URL";
pub const ENV_HUB_KEY: &str = "CONTEXT_HUB_KEY";

/// Where the hub lives and how to authenticate against it.
#[derive(Clone)]
pub struct HubConfig {
    pub base_url: String,
    /// Bearer token. `None` means the hub is not configured and no
    /// request is ever attempted.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HubConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() { None } else { Some(token) };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `CONTEXT_HUB_URL` and `CONTEXT_HUB_KEY`.
    pub fn from_env() -> Self {
        Self::from_values(env::var(ENV_HUB_URL).ok(), env::var(ENV_HUB_KEY).ok())
    }

    pub fn from_values(url: Option<String>, key: Option<String>) -> Self {
        let url = url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HUB_URL.to_string());
        let config = Self::new(url);
        match key {
            Some(key) => config.with_token(key),
            None => config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for HubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Parameters of the reconciliation itself.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound on remote decisions fetched per pull.
    pub pull_limit: usize,
    /// Actor identity sent with drafts and confirmations.
    pub chat_id: String,
    pub user_id: String,
    pub user_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pull_limit: 200,
            chat_id: "cursor-tracker".into(),
            user_id: "kamilla".into(),
            user_name: "Камилла".into(),
        }
    }
}
