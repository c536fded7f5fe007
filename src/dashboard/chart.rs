//! Usage-history chart model and its summary block.
//!
//! The chart itself is drawn by the surface (Chart.js in the web frontend,
//! a sparkline in the terminal). This module owns what they draw: short
//! date labels, the series, and the total/average/max/min/trend summary.
//! Every render replaces the previous chart wholesale.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use super::one_decimal;
use crate::api::UsageHistory;

/// Direction of the series from first to last point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Up only when the last point is strictly above the first.
    pub fn of(first: f64, last: f64) -> Self {
        if last > first { Self::Up } else { Self::Down }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Up => "📈",
            Self::Down => "📉",
        }
    }
}

/// Aggregates shown under the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub trend: Trend,
}

impl ChartSummary {
    /// Summarize a series; `None` for an empty one.
    pub fn from_series(data: &[f64]) -> Option<Self> {
        let (&first, &last) = (data.first()?, data.last()?);
        let total: f64 = data.iter().sum();
        Some(Self {
            total,
            average: total / data.len() as f64,
            max: data.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min: data.iter().copied().fold(f64::INFINITY, f64::min),
            trend: Trend::of(first, last),
        })
    }

    /// Total as given, without a trailing `.0` for whole numbers.
    pub fn total_text(&self) -> String {
        self.total.to_string()
    }

    /// Average to exactly one decimal place.
    pub fn average_text(&self) -> String {
        one_decimal(self.average)
    }
}

/// One rendered chart instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageChart {
    /// Increases with every render; surfaces rebuild when it changes.
    pub revision: u64,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub summary: Option<ChartSummary>,
}

/// Holder of the current chart. Replacing drops the previous instance
/// together with its summary, so there is never more than one of each.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ChartSlot {
    current: Option<UsageChart>,
    #[serde(skip)]
    renders: u64,
}

impl ChartSlot {
    /// Destroy the current chart (if any) and build a new one from `history`.
    pub fn replace(&mut self, history: &UsageHistory) -> &UsageChart {
        self.renders += 1;
        let chart = UsageChart {
            revision: self.renders,
            labels: history.labels.iter().map(|l| short_date_label(l)).collect(),
            data: history.data.clone(),
            summary: ChartSummary::from_series(&history.data),
        };
        self.current.insert(chart)
    }

    pub fn current(&self) -> Option<&UsageChart> {
        self.current.as_ref()
    }
}

/// Re-label a date as short month/day (`"2024-01-15"` → `"Jan 15"`).
///
/// Accepts plain dates and RFC 3339 timestamps; anything else is returned
/// unchanged.
pub fn short_date_label(raw: &str) -> String {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));
    match date {
        Some(date) => date.format("%b %-d").to_string(),
        None => raw.to_string(),
    }
}

/// Render a series as a one-line block sparkline.
pub fn sparkline(data: &[f64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let Some(summary) = ChartSummary::from_series(data) else {
        return String::new();
    };
    let span = summary.max - summary.min;
    data.iter()
        .map(|v| {
            if span <= 0.0 {
                BARS[0]
            } else {
                let idx = ((v - summary.min) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[idx.min(BARS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(labels: &[&str], data: &[f64]) -> UsageHistory {
        UsageHistory {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn summary_of_typical_week() {
        let summary = ChartSummary::from_series(&[10.0, 20.0, 5.0, 40.0]).unwrap();
        assert_eq!(summary.total, 75.0);
        assert_eq!(summary.total_text(), "75");
        assert_eq!(summary.average_text(), "18.8");
        assert_eq!(summary.max, 40.0);
        assert_eq!(summary.min, 5.0);
        assert_eq!(summary.trend, Trend::Up);
    }

    #[test]
    fn ties_resolve_downward() {
        assert_eq!(Trend::of(5.0, 5.0), Trend::Down);
        assert_eq!(Trend::of(5.0, 4.0), Trend::Down);
        assert_eq!(Trend::of(5.0, 6.0), Trend::Up);
        let single = ChartSummary::from_series(&[3.0]).unwrap();
        assert_eq!(single.trend, Trend::Down);
        assert_eq!(single.trend.glyph(), "📉");
    }

    #[test]
    fn empty_series_has_no_summary() {
        assert!(ChartSummary::from_series(&[]).is_none());
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn average_is_one_decimal() {
        let summary = ChartSummary::from_series(&[1.0, 2.0]).unwrap();
        assert_eq!(summary.average_text(), "1.5");
        let summary = ChartSummary::from_series(&[1.0, 1.0, 2.0]).unwrap();
        assert_eq!(summary.average_text(), "1.3");
        let summary = ChartSummary::from_series(&[4.0]).unwrap();
        assert_eq!(summary.average_text(), "4.0");
        let mut series = vec![1.0; 19];
        series.push(4.0);
        let summary = ChartSummary::from_series(&series).unwrap();
        assert_eq!(summary.average_text(), "1.1");
    }

    #[test]
    fn short_labels() {
        assert_eq!(short_date_label("2024-01-15"), "Jan 15");
        assert_eq!(short_date_label("2024-12-05"), "Dec 5");
        assert_eq!(short_date_label("2024-03-09T10:00:00Z"), "Mar 9");
        assert_eq!(short_date_label("yesterday"), "yesterday");
    }

    #[test]
    fn replace_builds_a_fresh_instance() {
        let mut slot = ChartSlot::default();
        let first = slot
            .replace(&history(&["2024-01-01", "2024-01-02"], &[1.0, 2.0]))
            .revision;
        let second = slot.replace(&history(&["2024-01-03"], &[9.0])).clone();
        assert!(second.revision > first);
        assert_eq!(second.labels, vec!["Jan 3"]);
        assert_eq!(second.data, vec![9.0]);
        assert_eq!(slot.current().unwrap(), &second);
    }

    #[test]
    fn sparkline_spans_the_range() {
        assert_eq!(sparkline(&[0.0, 7.0]), "▁█");
        assert_eq!(sparkline(&[3.0, 3.0, 3.0]), "▁▁▁");
    }
}
