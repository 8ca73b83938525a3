//! Shared helper functions for CLI commands
//!
//! Formatting used by more than one command lives here so tables, summaries
//! and exports agree on how values look.

use crate::entities::sample::FailureBasis;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Resistance with an SI prefix, e.g. `4.7 kΩ`
pub fn format_ohms(ohms: f64) -> String {
    if !ohms.is_finite() {
        return format!("{} Ω", ohms);
    }

    let (scaled, prefix) = match ohms.abs() {
        v if v >= 1e9 => (ohms / 1e9, "G"),
        v if v >= 1e6 => (ohms / 1e6, "M"),
        v if v >= 1e3 => (ohms / 1e3, "k"),
        _ => (ohms, ""),
    };
    format!("{} {}Ω", trim_float(scaled, 4), prefix)
}

/// Tolerance fraction as a percentage, e.g. `±5%`
pub fn format_tolerance(fraction: f64) -> String {
    format!("±{}%", trim_float(fraction * 100.0, 4))
}

/// Failure rate in the units of its basis
pub fn format_failure_rate(rate: f64, basis: FailureBasis) -> String {
    match basis {
        FailureBasis::Percent => format!("{}%", trim_float(rate, 2)),
        FailureBasis::Count => format!("{} unit(s)", trim_float(rate, 0)),
    }
}

/// Fixed decimals with trailing zeros removed
pub fn trim_float(value: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, value);
    if s.contains('.') {
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Ωhmmeter", 5), "Ωh...");
    }

    #[test]
    fn test_format_ohms() {
        assert_eq!(format_ohms(1000.0), "1 kΩ");
        assert_eq!(format_ohms(4700.0), "4.7 kΩ");
        assert_eq!(format_ohms(0.47), "0.47 Ω");
        assert_eq!(format_ohms(2_200_000.0), "2.2 MΩ");
        assert_eq!(format_ohms(950.0), "950 Ω");
    }

    #[test]
    fn test_format_tolerance() {
        assert_eq!(format_tolerance(0.05), "±5%");
        assert_eq!(format_tolerance(0.0025), "±0.25%");
    }

    #[test]
    fn test_format_failure_rate() {
        assert_eq!(format_failure_rate(10.0, FailureBasis::Percent), "10%");
        assert_eq!(format_failure_rate(3.0, FailureBasis::Count), "3 unit(s)");
    }

    #[test]
    fn test_trim_float() {
        assert_eq!(trim_float(30.000000000000004, 4), "30");
        assert_eq!(trim_float(28.4605, 2), "28.46");
        assert_eq!(trim_float(-0.0001, 2), "0");
        assert_eq!(trim_float(12.0, 0), "12");
    }
}
