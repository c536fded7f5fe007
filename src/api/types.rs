/// Response shapes of the usage service.
///
/// The service is loose about numbers: counters arrive either as JSON
/// numbers or as decimal strings, so every counter goes through
/// [`lenient_count`], which reads the leading integer the way a browser's
/// `parseInt` would.
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Literal value the service uses for "no cap".
pub const UNLIMITED: &str = "unlimited";

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Unauthenticated service status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(deserialize_with = "lenient_count")]
    pub requests: u64,
    pub environment: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_tokens_used: u64,
    #[serde(default)]
    pub endpoints: Vec<String>,
}

// ---------------------------------------------------------------------------
// GET /v1/key-info
// ---------------------------------------------------------------------------

/// Per-key metadata and rate-limit consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub username: String,
    pub plan: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub ban_reason: Option<String>,
    #[serde(default)]
    pub ban_expires: Option<String>,
    pub rpm: RateLimit,
    #[serde(deserialize_with = "lenient_count")]
    pub rpm_used: u64,
    pub rpd: RateLimit,
    #[serde(deserialize_with = "lenient_count")]
    pub rpd_used: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_usage: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_tokens_used: u64,
}

/// A rate limit: a finite count or the `"unlimited"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimit {
    Limited(u64),
    Unlimited,
}

impl<'de> Deserialize<'de> for RateLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.as_str() == Some(UNLIMITED) {
            return Ok(Self::Unlimited);
        }
        count_from_value(&value)
            .map(Self::Limited)
            .ok_or_else(|| de::Error::custom(format!("invalid rate limit: {value}")))
    }
}

impl Serialize for RateLimit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Limited(n) => serializer.serialize_u64(*n),
            Self::Unlimited => serializer.serialize_str(UNLIMITED),
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/usage-history
// ---------------------------------------------------------------------------

/// Daily request counts, index-aligned with their date labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageHistory {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl UsageHistory {
    /// Check the labels/data alignment the chart relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.labels.len() == self.data.len() {
            Ok(())
        } else {
            Err(format!(
                "usage history has {} labels but {} data points",
                self.labels.len(),
                self.data.len()
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient counters
// ---------------------------------------------------------------------------

/// Deserialize a non-negative counter sent as a number or a decimal string.
pub fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    count_from_value(&value).ok_or_else(|| de::Error::custom(format!("invalid count: {value}")))
}

fn count_from_value(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64)),
        serde_json::Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// Parse the leading run of digits, ignoring surrounding whitespace and any
/// trailing text (`"850"` → 850, `"12.7"` → 12, `"abc"` → `None`).
pub fn parse_leading_int(raw: &str) -> Option<u64> {
    let trimmed = raw.trim().trim_start_matches('+');
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_info_accepts_mixed_number_forms() {
        let json = r#"{
            "username": "alice", "plan": "pro", "admin": false, "banned": false,
            "rpm": "unlimited", "rpm_used": 500,
            "rpd": "1000", "rpd_used": "850",
            "total_usage": 12345, "total_tokens_used": "987654"
        }"#;
        let info: KeyInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.rpm, RateLimit::Unlimited);
        assert_eq!(info.rpm_used, 500);
        assert_eq!(info.rpd, RateLimit::Limited(1000));
        assert_eq!(info.rpd_used, 850);
        assert_eq!(info.total_tokens_used, 987_654);
        assert_eq!(info.ban_reason, None);
    }

    #[test]
    fn rate_limit_rejects_garbage() {
        let result: Result<RateLimit, _> = serde_json::from_str(r#""lots""#);
        assert!(result.is_err());
        let result: Result<RateLimit, _> = serde_json::from_str("null");
        assert!(result.is_err());
    }

    #[test]
    fn rate_limit_serializes_back_to_wire_form() {
        assert_eq!(serde_json::to_string(&RateLimit::Unlimited).unwrap(), r#""unlimited""#);
        assert_eq!(serde_json::to_string(&RateLimit::Limited(60)).unwrap(), "60");
    }

    #[test]
    fn parse_leading_int_matches_parse_int() {
        assert_eq!(parse_leading_int("850"), Some(850));
        assert_eq!(parse_leading_int(" 42 "), Some(42));
        assert_eq!(parse_leading_int("12.7"), Some(12));
        assert_eq!(parse_leading_int("7req"), Some(7));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn fractional_numbers_truncate() {
        let value = serde_json::json!(12.9);
        assert_eq!(count_from_value(&value), Some(12));
        let value = serde_json::json!(-3);
        assert_eq!(count_from_value(&value), None);
    }

    #[test]
    fn service_status_defaults_optional_fields() {
        let json = r#"{"status": "online", "requests": "1500", "environment": "production"}"#;
        let status: ServiceStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.requests, 1500);
        assert_eq!(status.total_tokens_used, 0);
        assert!(status.endpoints.is_empty());
    }

    #[test]
    fn usage_history_validation() {
        let ok = UsageHistory {
            labels: vec!["2024-01-01".into(), "2024-01-02".into()],
            data: vec![1.0, 2.0],
        };
        assert!(ok.validate().is_ok());

        let bad = UsageHistory {
            labels: vec!["2024-01-01".into()],
            data: vec![1.0, 2.0],
        };
        assert!(bad.validate().unwrap_err().contains("1 labels but 2 data points"));
    }
}
