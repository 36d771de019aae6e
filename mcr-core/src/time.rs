//! `HH:MM:SS` time parsing and formatting, accepting hours >= 24 for next-day services.

use crate::Error;

/// Parses a `HH:MM:SS` string into seconds since the day origin.
///
/// Hours may exceed 23 (e.g. `25:10:00`) to express a trip running into the next
/// service day, mirroring how GTFS `stop_times.txt` encodes overnight trips.
pub fn parse_hhmmss(s: &str) -> Result<u32, Error> {
    let mut parts = s.splitn(3, ':');
    let (h, m, sec) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s)) => (h, m, s),
        _ => return Err(Error::MalformedStartTime(s.to_string())),
    };

    let h: u32 = h.parse().map_err(|_| Error::MalformedStartTime(s.to_string()))?;
    let m: u32 = m.parse().map_err(|_| Error::MalformedStartTime(s.to_string()))?;
    let sec: u32 = sec.parse().map_err(|_| Error::MalformedStartTime(s.to_string()))?;

    if m >= 60 || sec >= 60 {
        return Err(Error::MalformedStartTime(s.to_string()));
    }

    Ok(h * 3600 + m * 60 + sec)
}

/// Formats seconds since the day origin back into `HH:MM:SS`, allowing `HH` >= 24.
pub fn format_hhmmss(total_seconds: u32) -> String {
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ordinary_time() {
        assert_eq!(parse_hhmmss("15:00:00").unwrap(), 15 * 3600);
        assert_eq!(parse_hhmmss("15:33:27").unwrap(), 15 * 3600 + 33 * 60 + 27);
    }

    #[test]
    fn parses_next_day_hours() {
        assert_eq!(parse_hhmmss("25:10:00").unwrap(), 25 * 3600 + 600);
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(parse_hhmmss("15:70:00").is_err());
        assert!(parse_hhmmss("not-a-time").is_err());
    }

    #[test]
    fn round_trips() {
        assert_eq!(format_hhmmss(parse_hhmmss("15:33:27").unwrap()), "15:33:27");
    }
}
