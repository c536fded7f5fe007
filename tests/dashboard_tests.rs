/// Dashboard rendering tests.
///
/// Rate cards, the usage chart and the terminal rendering, driven through
/// the public `DashboardView` API the way the session drives them.
use chrono::Utc;

use mapledash::api::{KeyInfo, RateLimit, UsageHistory};
use mapledash::dashboard::DashboardView;
use mapledash::dashboard::chart::{ChartSlot, ChartSummary, Trend};
use mapledash::dashboard::rate_card::{FillSeverity, RateKind, render_rate_card, usage_percentage};
use mapledash::dashboard::terminal;

fn key_info(rpm: RateLimit, rpm_used: u64, rpd: RateLimit, rpd_used: u64) -> KeyInfo {
    KeyInfo {
        username: "carol".to_string(),
        plan: "enterprise".to_string(),
        admin: true,
        banned: true,
        ban_reason: Some("abuse".to_string()),
        ban_expires: None,
        rpm,
        rpm_used,
        rpd,
        rpd_used,
        total_usage: 9_876_543,
        total_tokens_used: 1_000,
    }
}

fn history(labels: &[&str], data: &[f64]) -> UsageHistory {
    UsageHistory {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        data: data.to_vec(),
    }
}

// ---------------------------------------------------------------------------
// Rate cards
// ---------------------------------------------------------------------------

#[test]
fn card_at_85_percent_is_limited_and_warning() {
    let card = render_rate_card(RateKind::Rpd, RateLimit::Limited(1000), 850, "RPD");
    let progress = card.progress.as_ref().unwrap();
    assert_eq!(card.value_text, "850 / 1000");
    assert!(card.badge_limited);
    assert_eq!(progress.severity, FillSeverity::Warning);
    assert_eq!(card.usage_text().as_deref(), Some("85.0% used"));
}

#[test]
fn card_thresholds_are_strict() {
    let at = |used| render_rate_card(RateKind::Rpm, RateLimit::Limited(100), used, "RPM");

    let seventy = at(70);
    assert_eq!(seventy.progress.unwrap().severity, FillSeverity::Normal);

    let eighty = at(80);
    assert!(!eighty.badge_limited);
    assert_eq!(eighty.progress.unwrap().severity, FillSeverity::Warning);

    let ninety = at(90);
    assert!(ninety.badge_limited);
    assert_eq!(ninety.progress.unwrap().severity, FillSeverity::Warning);

    let ninety_one = at(91);
    assert_eq!(ninety_one.progress.unwrap().severity, FillSeverity::Critical);
}

#[test]
fn overuse_clamps_fill_but_not_percentage() {
    let card = render_rate_card(RateKind::Rpm, RateLimit::Limited(60), 90, "RPM");
    let progress = card.progress.as_ref().unwrap();
    assert_eq!(progress.percentage, 150.0);
    assert_eq!(progress.fill_width, 100.0);
    assert_eq!(progress.severity, FillSeverity::Critical);
    assert_eq!(card.usage_text().as_deref(), Some("150.0% used"));
}

#[test]
fn zero_limit_does_not_divide_by_zero() {
    assert_eq!(usage_percentage(0, 0), 0.0);
    assert_eq!(usage_percentage(3, 0), 100.0);
    let card = render_rate_card(RateKind::Rpd, RateLimit::Limited(0), 0, "RPD");
    assert!(!card.badge_limited);
    assert_eq!(card.progress.unwrap().fill_width, 0.0);
}

#[test]
fn unlimited_card_has_no_progress() {
    let card = render_rate_card(RateKind::Rpd, RateLimit::Unlimited, 123_456, "RPD");
    assert!(card.infinite);
    assert_eq!(card.value_text, "∞");
    assert_eq!(card.badge_text, "♾️ Unlimited");
    assert!(!card.badge_limited);
    assert!(card.progress.is_none());
    assert!(card.usage_text().is_none());
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

#[test]
fn chart_summary_matches_series() {
    let summary = ChartSummary::from_series(&[10.0, 20.0, 5.0, 40.0]).unwrap();
    assert_eq!(summary.total_text(), "75");
    assert_eq!(summary.average_text(), "18.8");
    assert_eq!(summary.max, 40.0);
    assert_eq!(summary.min, 5.0);
    assert_eq!(summary.trend, Trend::Up);
}

#[test]
fn rerendering_keeps_exactly_one_chart_and_summary() {
    let mut slot = ChartSlot::default();
    let data = history(&["2024-01-01", "2024-01-02"], &[4.0, 2.0]);
    let first = slot.replace(&data).clone();
    let second = slot.replace(&data).clone();

    assert_ne!(first.revision, second.revision);
    assert_eq!(first.labels, second.labels);
    assert_eq!(first.summary, second.summary);
    assert_eq!(second.summary.unwrap().trend, Trend::Down);
    assert_eq!(slot.current().unwrap().revision, second.revision);

    let json = serde_json::to_value(&slot).unwrap();
    assert_eq!(json["current"]["revision"], second.revision);
    assert!(json.get("renders").is_none());
}

#[test]
fn empty_history_renders_chart_without_summary() {
    let mut slot = ChartSlot::default();
    let chart = slot.replace(&history(&[], &[]));
    assert!(chart.labels.is_empty());
    assert!(chart.summary.is_none());
}

// ---------------------------------------------------------------------------
// View + terminal
// ---------------------------------------------------------------------------

#[test]
fn banned_admin_panel() {
    let mut view = DashboardView::default();
    view.render_key_usage(
        &key_info(RateLimit::Limited(10), 1, RateLimit::Unlimited, 0),
        &history(&["2024-03-01"], &[1.0]),
        Utc::now(),
    );
    let user = view.user.unwrap();
    assert!(user.admin);
    let ban = user.ban.unwrap();
    assert_eq!(ban.reason, "abuse");
    assert_eq!(ban.expires, "Never");
}

#[test]
fn terminal_render_of_full_dashboard() {
    colored::control::set_override(false);

    let mut view = DashboardView::default();
    view.render_key_usage(
        &key_info(RateLimit::Limited(100), 95, RateLimit::Unlimited, 5),
        &history(&["2024-05-01", "2024-05-02", "2024-05-03"], &[3.0, 1.0, 2.0]),
        Utc::now(),
    );
    view.show_dashboard();

    let text = terminal::render(&view, Utc::now());
    assert!(text.contains("@carol"));
    assert!(text.contains("[enterprise]"));
    assert!(text.contains("👑"));
    assert!(text.contains("⛔ Account Banned"));
    assert!(text.contains("95 / 100"));
    assert!(text.contains("95.0% used"));
    assert!(text.contains("♾️ Unlimited"));
    assert!(text.contains("9,876,543"));
    assert!(text.contains("May 1 → May 3"));
    assert!(text.contains("Average: 2.0"));
    assert!(text.contains("Trend: 📉"));
}

#[test]
fn view_serializes_for_the_web_surface() {
    let mut view = DashboardView::default();
    view.render_key_usage(
        &key_info(RateLimit::Limited(100), 50, RateLimit::Unlimited, 5),
        &history(&["2024-05-01"], &[3.0]),
        Utc::now(),
    );
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["status"], "idle");
    assert_eq!(json["rpm"]["kind"], "rpm");
    assert_eq!(json["rpm"]["progress"]["severity"], "normal");
    assert!(json["rpd"]["progress"].is_null());
    assert_eq!(json["chart"]["current"]["labels"][0], "May 1");
    assert_eq!(json["chart"]["current"]["summary"]["trend"], "down");
}
