//! Dashboard rendering.
//!
//! [`view::DashboardView`] is the single render target: the session writes
//! API results into it, and the surfaces (terminal, web) read it.
//!
//! - [`rate_card`] — RPM / RPD cards with their severity bands
//! - [`chart`] — usage-history chart model and summary block
//! - [`view`] — everything else on the page: panels, indicators, banner
//! - [`terminal`] — colored terminal rendering of a view

pub mod chart;
pub mod rate_card;
pub mod terminal;
pub mod view;

pub use view::DashboardView;

/// Format a count with comma separators (`1234567` → `"1,234,567"`).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Format to exactly one decimal place.
///
/// Rounds the exact binary value, so `0.15` (stored just below) gives
/// `"0.1"`. Exact ties (odd multiples of a quarter) round away from zero.
pub fn one_decimal(value: f64) -> String {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        let rounded = (value * 10.0).round() / 10.0;
        return format!("{rounded:.1}");
    }
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_one_decimal() {
        assert_eq!(one_decimal(85.0), "85.0");
        assert_eq!(one_decimal(18.75), "18.8");
        assert_eq!(one_decimal(2.0 / 3.0 * 100.0), "66.7");
        assert_eq!(one_decimal(0.04), "0.0");
    }

    #[test]
    fn one_decimal_rounds_the_stored_value() {
        assert_eq!(one_decimal(0.15), "0.1");
        assert_eq!(one_decimal(1.15), "1.1");
        assert_eq!(one_decimal(3.0 / 2000.0 * 100.0), "0.1");
        assert_eq!(one_decimal(23.0 / 20.0), "1.1");
    }

    #[test]
    fn one_decimal_exact_ties_round_up() {
        assert_eq!(one_decimal(0.25), "0.3");
        assert_eq!(one_decimal(0.75), "0.8");
        assert_eq!(one_decimal(2.5), "2.5");
        assert_eq!(one_decimal(-0.25), "-0.3");
    }
}
