//! Unit conversions used by the presentation projections.

use std::fmt;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// `1073741824` → `"1.00GB"`
pub fn format_gb(bytes: u64) -> String {
    format!("{:.2}GB", bytes_to_gb(bytes))
}

/// `1048576` → `"1.00MB"`
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / MIB)
}

/// `0.1234` → `"12.34%"`
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Uptime split into whole days and the remaining whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeParts {
    pub days: u64,
    pub hours: u64,
}

impl UptimeParts {
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            days: seconds / 86_400,
            hours: (seconds % 86_400) / 3_600,
        }
    }
}

impl fmt::Display for UptimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d {}h", self.days, self.hours)
    }
}

/// Parses a Proxmox size token (`32G`, `512M`, `1T`, `4096K`) into GB.
///
/// A bare number is a byte count. Returns `None` for anything else.
pub fn parse_size_gb(token: &str) -> Option<f64> {
    let token = token.trim();
    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (number, unit) = token.split_at(split);
    let value: f64 = number.parse().ok()?;

    let gb = match unit.to_ascii_uppercase().as_str() {
        "T" => value * 1024.0,
        "G" => value,
        "M" => value / 1024.0,
        "K" => value / MIB,
        "" => value / GIB,
        _ => return None,
    };
    Some(gb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_parts() {
        assert_eq!(
            UptimeParts::from_seconds(90_061),
            UptimeParts { days: 1, hours: 1 }
        );
        assert_eq!(
            UptimeParts::from_seconds(59),
            UptimeParts { days: 0, hours: 0 }
        );
        assert_eq!(UptimeParts::from_seconds(86_399).to_string(), "0d 23h");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_gb(4_294_967_296), "4.00GB");
        assert_eq!(format_gb(0), "0.00GB");
        assert_eq!(format_mb(134_217_728), "128.00MB");
        assert_eq!(format_percent(0.2345), "23.45%");
    }

    #[test]
    fn test_parse_size_gb() {
        assert_eq!(parse_size_gb("32G"), Some(32.0));
        assert_eq!(parse_size_gb("512M"), Some(0.5));
        assert_eq!(parse_size_gb("2T"), Some(2048.0));
        assert_eq!(parse_size_gb("1073741824"), Some(1.0));
        assert_eq!(parse_size_gb("garbage"), None);
        assert_eq!(parse_size_gb("12X"), None);
        assert_eq!(parse_size_gb(""), None);
    }
}
