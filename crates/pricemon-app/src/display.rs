//! Text rendering of instrument state.
//!
//! Prices use two decimals, quantities are whole numbers, and both are
//! grouped by thousands.

use crate::error::AppResult;
use pricemon_core::DeltaSign;
use pricemon_monitor::InstrumentSnapshot;
use std::fmt::Write;
use std::time::Duration;

/// Format a price with two decimals and thousands separators.
pub fn format_price(px: f64) -> String {
    if !px.is_finite() {
        return px.to_string();
    }
    let fixed = format!("{:.2}", px.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if px < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{frac_part}", group_thousands(int_part))
}

/// Format a quantity with thousands separators.
pub fn format_qty(qty: u64) -> String {
    group_thousands(&qty.to_string())
}

pub fn format_delta(delta: DeltaSign) -> &'static str {
    match delta {
        DeltaSign::Up => "▲",
        DeltaSign::Down => "▼",
        DeltaSign::Flat => " ",
    }
}

pub fn format_period(period: Duration) -> String {
    format!("{}ms", period.as_millis())
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Render instruments as an aligned table.
pub fn render_table(snapshots: &[InstrumentSnapshot], refresh_period: Duration) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "refresh period: {}", format_period(refresh_period));
    let _ = writeln!(
        out,
        "{:<14} {:>10} {:>12}   {:>12} {:>10}   {:>12}",
        "instrument", "bid qty", "bid", "ask", "ask qty", "volume"
    );
    for s in snapshots {
        let _ = writeln!(
            out,
            "{:<14} {:>10} {:>12}{} {}{:>12} {:>10}   {:>12}",
            s.id.label(),
            format_qty(s.bid_qty),
            format_price(s.bid_price),
            format_delta(s.delta_bid),
            format_delta(s.delta_ask),
            format_price(s.ask_price),
            format_qty(s.ask_qty),
            format_qty(s.volume),
        );
    }
    out
}

/// Render instruments as one JSON document.
pub fn render_json(snapshots: &[InstrumentSnapshot]) -> AppResult<String> {
    Ok(serde_json::to_string(snapshots)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricemon_core::InstrumentId;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(10.006), "10.01");
        assert_eq!(format_price(9.99), "9.99");
        assert_eq!(format_price(1234567.891), "1,234,567.89");
        assert_eq!(format_price(-1234.5), "-1,234.50");
        assert_eq!(format_price(-0.001), "0.00");
    }

    #[test]
    fn test_format_qty() {
        assert_eq!(format_qty(0), "0");
        assert_eq!(format_qty(999), "999");
        assert_eq!(format_qty(1000), "1,000");
        assert_eq!(format_qty(12_345_678), "12,345,678");
    }

    #[test]
    fn test_format_delta_and_period() {
        assert_eq!(format_delta(DeltaSign::Up), "▲");
        assert_eq!(format_delta(DeltaSign::Down), "▼");
        assert_eq!(format_period(Duration::from_millis(150)), "150ms");
    }

    #[test]
    fn test_render_table_rows() {
        let snap = InstrumentSnapshot {
            bid_price: 10.0,
            bid_qty: 1500,
            ask_price: 10.05,
            ask_qty: 5,
            volume: 103,
            delta_bid: DeltaSign::Up,
            ..InstrumentSnapshot::zeroed(InstrumentId::new(3))
        };
        let table = render_table(&[snap], Duration::from_millis(100));
        assert!(table.starts_with("refresh period: 100ms"));
        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("Instrument 3"));
        assert!(row.contains("1,500"));
        assert!(row.contains("10.00▲"));
        assert!(row.contains("10.05"));
    }

    #[test]
    fn test_render_json() {
        let snap = InstrumentSnapshot::zeroed(InstrumentId::new(1));
        let json = render_json(&[snap]).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"delta_bid\":\"flat\""));
    }
}
