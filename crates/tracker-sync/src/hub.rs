//! Thin JSON client for the context hub.

use crate::config::HubConfig;
use crate::error::HubError;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

/// The request surface the reconciler needs from the hub.
///
/// Implementations never fail loudly: `None` means the hub was unreachable,
/// answered with a non-2xx status, or sent something that is not JSON.
pub trait HubApi {
    /// False when no credential is configured. Callers must not issue
    /// requests in that case.
    fn is_configured(&self) -> bool;

    fn get(&self, path: &str, params: &[(&str, String)]) -> Option<Value>;

    fn post(&self, path: &str, body: &Value) -> Option<Value>;

    /// `GET /api/health` answered `{"status": "ok"}`.
    fn healthy(&self) -> bool {
        self.is_configured()
            && self
                .get("/api/health", &[])
                .and_then(|v| v.get("status").and_then(Value::as_str).map(|s| s == "ok"))
                .unwrap_or(false)
    }

    /// Opaque statistics object, for display only.
    fn stats(&self) -> Option<Value> {
        if !self.is_configured() {
            return None;
        }
        self.get("/api/decisions/stats", &[])
    }
}

/// Blocking HTTP implementation of [`HubApi`].
///
/// Every request carries `Authorization: Bearer <token>` and is bounded by
/// the configured timeout. No retries.
pub struct HubClient {
    config: HubConfig,
    http: Client,
}

impl HubClient {
    pub fn new(config: HubConfig) -> Result<Self, HubError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(HubError::Client)?;
        debug!(
            base_url = %config.base_url,
            configured = config.is_configured(),
            "hub client ready"
        );
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    fn send(&self, request: RequestBuilder, token: &str) -> Result<Value, HubError> {
        let response = request.bearer_auth(token).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Status(status));
        }
        response.json::<Value>().map_err(HubError::Decode)
    }

    fn token(&self, method: &str, path: &str) -> Option<&str> {
        let token = self.config.token.as_deref();
        if token.is_none() {
            debug!(method, path, "hub not configured, skipping request");
        }
        token
    }
}

impl HubApi for HubClient {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn get(&self, path: &str, params: &[(&str, String)]) -> Option<Value> {
        let token = self.token("GET", path)?;
        let url = self.config.endpoint(path);
        debug!(%url, "hub GET");
        match self.send(self.http.get(&url).query(params), token) {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(method = "GET", path, error = %e, "hub request failed");
                None
            }
        }
    }

    fn post(&self, path: &str, body: &Value) -> Option<Value> {
        let token = self.token("POST", path)?;
        let url = self.config.endpoint(path);
        debug!(%url, "hub POST");
        match self.send(self.http.post(&url).json(body), token) {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(method = "POST", path, error = %e, "hub request failed");
                None
            }
        }
    }
}
