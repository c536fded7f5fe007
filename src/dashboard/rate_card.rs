//! RPM / RPD rate-limit cards.
//!
//! Two independent threshold sets apply to a finite limit: the badge is
//! flagged `limited` above 80 %, while the progress fill has its own three
//! bands (above 90 %, above 70 %, the rest).

use serde::Serialize;

use super::one_decimal;
use crate::api::RateLimit;

/// Badge threshold, in percent.
pub const LIMITED_BADGE_ABOVE: f64 = 80.0;
/// Fill turns critical above this percentage.
pub const CRITICAL_FILL_ABOVE: f64 = 90.0;
/// Fill turns to warning above this percentage.
pub const WARNING_FILL_ABOVE: f64 = 70.0;

/// Which limit a card describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    Rpm,
    Rpd,
}

impl RateKind {
    /// Default badge label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Rpm => "RPM",
            Self::Rpd => "RPD",
        }
    }
}

/// Color band of the progress fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillSeverity {
    Normal,
    Warning,
    Critical,
}

impl FillSeverity {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage > CRITICAL_FILL_ABOVE {
            Self::Critical
        } else if percentage > WARNING_FILL_ABOVE {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

/// Progress bar of a finite limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub used: u64,
    pub limit: u64,
    /// True consumption, may exceed 100.
    pub percentage: f64,
    /// Visual fill width, clamped to 100.
    pub fill_width: f64,
    pub severity: FillSeverity,
}

/// A rendered rate-limit card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateCard {
    pub kind: RateKind,
    /// Card styled as "infinite" (no cap).
    pub infinite: bool,
    pub badge_text: String,
    pub badge_limited: bool,
    pub value_text: String,
    /// `None` when the progress bar is hidden.
    pub progress: Option<Progress>,
}

impl RateCard {
    /// `"85.0% used"`, or `None` without a progress bar.
    pub fn usage_text(&self) -> Option<String> {
        self.progress
            .as_ref()
            .map(|p| format!("{}% used", one_decimal(p.percentage)))
    }
}

/// Build the card for one limit.
pub fn render_rate_card(kind: RateKind, limit: RateLimit, used: u64, label: &str) -> RateCard {
    let RateLimit::Limited(limit) = limit else {
        return RateCard {
            kind,
            infinite: true,
            badge_text: "♾️ Unlimited".to_string(),
            badge_limited: false,
            value_text: "∞".to_string(),
            progress: None,
        };
    };

    let percentage = usage_percentage(used, limit);
    RateCard {
        kind,
        infinite: false,
        badge_text: label.to_string(),
        badge_limited: percentage > LIMITED_BADGE_ABOVE,
        value_text: format!("{used} / {limit}"),
        progress: Some(Progress {
            used,
            limit,
            percentage,
            fill_width: percentage.min(100.0),
            severity: FillSeverity::for_percentage(percentage),
        }),
    }
}

/// `used / limit * 100`. A zero limit counts as exhausted once anything was used.
pub fn usage_percentage(used: u64, limit: u64) -> f64 {
    if limit == 0 {
        return if used > 0 { 100.0 } else { 0.0 };
    }
    used as f64 / limit as f64 * 100.0
}
