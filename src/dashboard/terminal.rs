//! Colored terminal rendering of a [`DashboardView`].
//!
//! Used by `mapledash usage` (one shot) and `mapledash watch` (redrawn).

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};

use super::chart::sparkline;
use super::rate_card::{FillSeverity, RateCard};
use super::view::{DashboardView, Indicator, ServiceDot};
use super::format_number;

const BAR_WIDTH: usize = 30;

/// Render the whole view as it looks at `now`.
pub fn render(view: &DashboardView, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    render_service(&mut out, view);

    if let Some(banner) = view.visible_error(now) {
        let _ = writeln!(out, "  {} {}", "✗".red().bold(), banner.message.red());
        out.push('\n');
    }

    if !view.visible {
        let hint = match view.status {
            Indicator::Loading => "Loading usage data...",
            Indicator::Error => "Usage data unavailable.",
            _ => "No API token loaded. Run `mapledash token set <TOKEN>`.",
        };
        let _ = writeln!(out, "  {}", hint.yellow());
        return out;
    }

    render_user(&mut out, view);
    render_cards(&mut out, view);
    render_chart(&mut out, view);
    render_global(&mut out, view);

    let _ = writeln!(
        out,
        "  {} {}",
        status_label(view.status),
        view.last_updated
            .map(|t| format!("Last updated: {}", t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")))
            .unwrap_or_default()
            .dimmed()
    );
    out
}

fn render_service(out: &mut String, view: &DashboardView) {
    if !view.service.visible {
        return;
    }
    let dot = match view.service.dot {
        ServiceDot::Active => "●".green(),
        ServiceDot::Error => "●".red(),
        ServiceDot::Unknown => "●".dimmed(),
    };
    let badge = if view.service.offline {
        format!("[{}]", view.service.environment).red()
    } else {
        format!("[{}]", view.service.environment).cyan()
    };
    let _ = writeln!(out, "  {} {} {}", dot, view.service.text, badge);
    out.push('\n');
}

fn render_user(out: &mut String, view: &DashboardView) {
    let Some(user) = &view.user else {
        return;
    };
    let crown = if user.admin { " 👑" } else { "" };
    let _ = writeln!(
        out,
        "{} {}{}",
        format!("👤 User: @{}", user.username).bold().cyan(),
        format!("[{}]", user.plan).magenta(),
        crown
    );
    let _ = writeln!(out, "{}", "=".repeat(50));
    if let Some(ban) = &user.ban {
        let _ = writeln!(out, "  {}", "⛔ Account Banned".red().bold());
        let _ = writeln!(out, "  {} {}", "Reason: ".bold(), ban.reason);
        let _ = writeln!(out, "  {} {}", "Expires:".bold(), ban.expires);
    }
    out.push('\n');
}

fn render_cards(out: &mut String, view: &DashboardView) {
    for card in [&view.rpm, &view.rpd].into_iter().flatten() {
        render_card(out, card);
    }
    let _ = writeln!(
        out,
        "  {} {}",
        "Total requests:".bold(),
        view.total_usage.map(format_number).unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "  {} {}",
        "Total tokens:  ".bold(),
        view.total_tokens.map(format_number).unwrap_or_default()
    );
    out.push('\n');
}

fn render_card(out: &mut String, card: &RateCard) {
    let badge = if card.infinite {
        card.badge_text.green()
    } else if card.badge_limited {
        card.badge_text.red().bold()
    } else {
        card.badge_text.normal()
    };
    let label = format!("{:<4}", card.kind.label()).bold();

    match (&card.progress, card.usage_text()) {
        (Some(progress), Some(usage)) => {
            let filled = ((progress.fill_width / 100.0) * BAR_WIDTH as f64).round() as usize;
            let bar = format!(
                "{}{}",
                "█".repeat(filled.min(BAR_WIDTH)),
                "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
            );
            let _ = writeln!(
                out,
                "  {} {:<14} {} {}  {}",
                label,
                card.value_text,
                severity_color(progress.severity, &bar),
                usage.dimmed(),
                badge
            );
        }
        _ => {
            let _ = writeln!(out, "  {} {:<14} {}", label, card.value_text, badge);
        }
    }
}

fn severity_color(severity: FillSeverity, text: &str) -> ColoredString {
    match severity {
        FillSeverity::Critical => text.red(),
        FillSeverity::Warning => text.yellow(),
        FillSeverity::Normal => text.blue(),
    }
}

fn render_chart(out: &mut String, view: &DashboardView) {
    let Some(chart) = view.chart.current() else {
        return;
    };
    let _ = writeln!(out, "{}", "Daily API Usage".bold().cyan());
    let _ = writeln!(out, "  {}", sparkline(&chart.data).blue());
    if let (Some(first), Some(last)) = (chart.labels.first(), chart.labels.last()) {
        let _ = writeln!(out, "  {}", format!("{first} → {last}").dimmed());
    }
    if let Some(summary) = &chart.summary {
        let _ = writeln!(
            out,
            "  Total: {}  Average: {}  Max: {}  Trend: {}",
            summary.total_text().bold(),
            summary.average_text().bold(),
            summary.max.to_string().bold(),
            summary.trend.glyph()
        );
    }
    out.push('\n');
}

fn render_global(out: &mut String, view: &DashboardView) {
    let Some(stats) = &view.global_stats else {
        return;
    };
    let _ = writeln!(out, "{}", "🌍 Global Service Statistics".bold().cyan());
    let _ = writeln!(
        out,
        "  Requests: {}  Tokens: {}  Endpoints: {}",
        format_number(stats.total_requests),
        format_number(stats.total_tokens),
        stats.endpoint_count
    );
    for endpoint in &stats.endpoints {
        let _ = writeln!(out, "    {}", endpoint.dimmed());
    }
    out.push('\n');
}

fn status_label(status: Indicator) -> ColoredString {
    match status {
        Indicator::Live => status.text().green().bold(),
        Indicator::Error => status.text().red().bold(),
        Indicator::Loading => status.text().yellow(),
        Indicator::Idle => status.text().normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{KeyInfo, RateLimit, UsageHistory};

    fn rendered_view() -> DashboardView {
        let key = KeyInfo {
            username: "bob".to_string(),
            plan: "free".to_string(),
            admin: false,
            banned: false,
            ban_reason: None,
            ban_expires: None,
            rpm: RateLimit::Limited(60),
            rpm_used: 59,
            rpd: RateLimit::Unlimited,
            rpd_used: 3,
            total_usage: 1234,
            total_tokens_used: 5678,
        };
        let history = UsageHistory {
            labels: vec!["2024-02-01".to_string(), "2024-02-02".to_string()],
            data: vec![2.0, 8.0],
        };
        let mut view = DashboardView::default();
        view.render_key_usage(&key, &history, Utc::now());
        view.show_dashboard();
        view.status = Indicator::Live;
        view
    }

    #[test]
    fn hidden_dashboard_shows_hint() {
        colored::control::set_override(false);
        let text = render(&DashboardView::default(), Utc::now());
        assert!(text.contains("No API token loaded"));
    }

    #[test]
    fn visible_dashboard_lists_cards_and_summary() {
        colored::control::set_override(false);
        let text = render(&rendered_view(), Utc::now());
        assert!(text.contains("@bob"));
        assert!(text.contains("59 / 60"));
        assert!(text.contains("98.3% used"));
        assert!(text.contains("∞"));
        assert!(text.contains("1,234"));
        assert!(text.contains("Feb 1 → Feb 2"));
        assert!(text.contains("Trend: 📈"));
        assert!(text.contains("Live"));
        assert_eq!(text.matches("Total: ").count(), 1);
    }
}
