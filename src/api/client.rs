/// HTTP client for the usage service.
///
/// Uses the synchronous `ureq` client with one shared agent, so the two
/// authenticated requests of a fetch cycle can run on separate threads while
/// reusing pooled connections.
use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::types::{KeyInfo, ServiceStatus, UsageHistory};
use super::{KEY_INFO_PATH, STATUS_PATH, USAGE_HISTORY_PATH, UsageApi};
use crate::config::schema::ApiConfig;
use crate::error::DashError;

/// `ureq`-backed implementation of [`UsageApi`].
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl HttpApi {
    /// Build a client from the resolved `[api]` config.
    pub fn from_config(config: &ApiConfig) -> Self {
        let timeout = config.timeout();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body.
    ///
    /// Non-2xx answers become [`DashError::ApiRequest`], transport failures
    /// [`DashError::Network`], bodies of the wrong shape [`DashError::Decode`].
    fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, DashError> {
        let mut request = self
            .agent
            .get(&self.url(path))
            .set("Accept", "application/json");
        if let Some(token) = token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        match request.call() {
            Ok(resp) => resp
                .into_json::<T>()
                .map_err(|e| DashError::Decode(format!("{path}: {e}"))),
            Err(ureq::Error::Status(status, _)) => Err(DashError::ApiRequest {
                endpoint: path.to_string(),
                status,
            }),
            Err(ureq::Error::Transport(transport)) => Err(DashError::Network(transport.to_string())),
        }
    }
}

impl fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApi")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl UsageApi for HttpApi {
    fn service_status(&self) -> Result<ServiceStatus, DashError> {
        self.get_json(STATUS_PATH, None)
    }

    fn key_info(&self, token: &str) -> Result<KeyInfo, DashError> {
        self.get_json(KEY_INFO_PATH, Some(token))
    }

    fn usage_history(&self, token: &str) -> Result<UsageHistory, DashError> {
        let history: UsageHistory = self.get_json(USAGE_HISTORY_PATH, Some(token))?;
        history.validate().map_err(DashError::Decode)?;
        Ok(history)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
