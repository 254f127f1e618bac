use chrono::{DateTime, Utc};
use tracing::warn;

/// Parse a SQLite timestamp column. SQLite's datetime('now') default stores
/// "YYYY-MM-DD HH:MM:SS" without a timezone, so fall back to parsing it as
/// naive UTC when RFC 3339 fails.
pub(crate) fn parse_created_at(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on {}: {}", raw, context, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_default_format() {
        let ts = parse_created_at("2026-08-26 07:30:00", "test");
        assert_eq!(ts.to_rfc3339(), "2026-08-26T07:30:00+00:00");
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_created_at("2026-08-26T07:30:00Z", "test");
        assert_eq!(ts.timestamp(), 1787729400);
    }

    #[test]
    fn corrupt_value_falls_back_to_epoch() {
        let ts = parse_created_at("yesterday-ish", "test");
        assert_eq!(ts, DateTime::<Utc>::default());
    }
}
