//! Read-only client for the usage service.
//!
//! Three endpoints, all JSON over HTTPS:
//! - `GET /` — unauthenticated service status
//! - `GET /v1/key-info` — per-key metadata and rate limits (bearer token)
//! - `GET /v1/usage-history` — daily request counts (bearer token)
//!
//! The session talks to the service through [`UsageApi`] so tests can
//! substitute an in-process fake for [`HttpApi`].

pub mod client;
pub mod types;

pub use client::HttpApi;
pub use types::{KeyInfo, RateLimit, ServiceStatus, UsageHistory};

use crate::error::DashError;

pub const STATUS_PATH: &str = "/";
pub const KEY_INFO_PATH: &str = "/v1/key-info";
pub const USAGE_HISTORY_PATH: &str = "/v1/usage-history";

/// The three calls the dashboard makes against the service.
///
/// Implementations are shared between the scheduled task threads, hence the
/// `Send + Sync` bound.
pub trait UsageApi: Send + Sync {
    /// `GET /` without credentials.
    fn service_status(&self) -> Result<ServiceStatus, DashError>;

    /// `GET /v1/key-info` with `Authorization: Bearer <token>`.
    fn key_info(&self, token: &str) -> Result<KeyInfo, DashError>;

    /// `GET /v1/usage-history` with `Authorization: Bearer <token>`.
    fn usage_history(&self, token: &str) -> Result<UsageHistory, DashError>;
}
