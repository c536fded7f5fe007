//! The dashboard render target.
//!
//! Every field corresponds to one region of the page. Regions are only ever
//! replaced wholesale; a failed fetch cycle touches the status indicator and
//! the error banner and nothing else.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::chart::ChartSlot;
use super::rate_card::{RateCard, RateKind, render_rate_card};
use super::format_number;
use crate::api::{KeyInfo, ServiceStatus, UsageHistory};

/// Key-usage status indicator next to the refresh control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    #[default]
    Idle,
    Loading,
    Live,
    Error,
}

impl Indicator {
    pub fn text(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Loading => "Loading...",
            Self::Live => "Live",
            Self::Error => "Error",
        }
    }
}

/// Service status dot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceDot {
    #[default]
    Unknown,
    Active,
    Error,
}

/// Environment badge text used when the status endpoint is unreachable.
pub const OFFLINE: &str = "offline";

/// Service status strip: dot, text and environment badge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceIndicator {
    pub visible: bool,
    pub dot: ServiceDot,
    pub text: String,
    pub environment: String,
    /// Badge uses the offline styling.
    pub offline: bool,
}

/// Ban details shown inside the user panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BanInfo {
    pub reason: String,
    pub expires: String,
}

/// User-info panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPanel {
    pub username: String,
    pub plan: String,
    pub admin: bool,
    pub ban: Option<BanInfo>,
}

impl UserPanel {
    pub fn from_key_info(key: &KeyInfo) -> Self {
        let ban = key.banned.then(|| BanInfo {
            reason: non_empty_or(key.ban_reason.as_deref(), "Not specified"),
            expires: non_empty_or(key.ban_expires.as_deref(), "Never"),
        });
        Self {
            username: key.username.clone(),
            plan: key.plan.clone(),
            admin: key.admin,
            ban,
        }
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Global service statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalStats {
    pub total_requests: u64,
    pub total_tokens: u64,
    pub endpoint_count: usize,
    pub endpoints: Vec<String>,
}

impl GlobalStats {
    pub fn from_status(status: &ServiceStatus) -> Self {
        Self {
            total_requests: status.requests,
            total_tokens: status.total_tokens_used,
            endpoint_count: status.endpoints.len(),
            endpoints: status.endpoints.clone(),
        }
    }
}

/// Transient error banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Banner {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardView {
    /// Masked token shown in the input surface.
    pub token_input: Option<String>,
    /// Key-usage section shown.
    pub visible: bool,
    pub refresh_visible: bool,
    pub status: Indicator,
    pub service: ServiceIndicator,
    pub user: Option<UserPanel>,
    pub rpm: Option<RateCard>,
    pub rpd: Option<RateCard>,
    pub total_usage: Option<u64>,
    pub total_tokens: Option<u64>,
    pub chart: ChartSlot,
    pub global_stats: Option<GlobalStats>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<Banner>,
}

impl DashboardView {
    /// Rebuild every key-usage region from one successful fetch cycle.
    pub fn render_key_usage(&mut self, key: &KeyInfo, history: &UsageHistory, now: DateTime<Utc>) {
        self.user = Some(UserPanel::from_key_info(key));
        self.rpm = Some(render_rate_card(
            RateKind::Rpm,
            key.rpm,
            key.rpm_used,
            RateKind::Rpm.label(),
        ));
        self.rpd = Some(render_rate_card(
            RateKind::Rpd,
            key.rpd,
            key.rpd_used,
            RateKind::Rpd.label(),
        ));
        self.total_usage = Some(key.total_usage);
        self.total_tokens = Some(key.total_tokens_used);
        self.chart.replace(history);
        self.last_updated = Some(now);
    }

    /// Rebuild the global statistics panel from a cached status snapshot.
    pub fn render_global_stats(&mut self, status: &ServiceStatus) {
        self.global_stats = Some(GlobalStats::from_status(status));
    }

    /// Service strip after a successful status check.
    pub fn render_service_online(&mut self, status: &ServiceStatus) {
        self.service = ServiceIndicator {
            visible: true,
            dot: ServiceDot::Active,
            text: format!(
                "Service {} - {} requests served",
                status.status,
                format_number(status.requests)
            ),
            environment: status.environment.clone(),
            offline: false,
        };
    }

    /// Service strip after a failed status check.
    pub fn render_service_offline(&mut self) {
        self.service = ServiceIndicator {
            visible: true,
            dot: ServiceDot::Error,
            text: "Service unreachable".to_string(),
            environment: OFFLINE.to_string(),
            offline: true,
        };
    }

    pub fn show_dashboard(&mut self) {
        self.visible = true;
        self.refresh_visible = true;
    }

    /// Hide the key-usage section and refresh control. Rendered regions are
    /// kept; the next successful cycle overwrites them.
    pub fn hide_dashboard(&mut self) {
        self.visible = false;
        self.refresh_visible = false;
        self.global_stats = None;
    }

    pub fn show_error(&mut self, message: impl Into<String>, ttl: Duration, now: DateTime<Utc>) {
        self.error = Some(Banner {
            message: message.into(),
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    pub fn hide_error(&mut self) {
        self.error = None;
    }

    /// The error banner if it has not expired yet.
    pub fn visible_error(&self, now: DateTime<Utc>) -> Option<&Banner> {
        self.error.as_ref().filter(|b| b.is_visible(now))
    }

    /// Copy of the view as it looks at `now` (expired banner dropped).
    pub fn snapshot(&self, now: DateTime<Utc>) -> DashboardView {
        let mut view = self.clone();
        if view.visible_error(now).is_none() {
            view.error = None;
        }
        view
    }
}
