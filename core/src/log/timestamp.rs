use chrono::{Local, NaiveDateTime};

const FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

/// Local wall clock, used whenever a line carries no usable timestamp.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse the timestamp at the head of a log line.
///
/// Accepts both `[2024-01-15 10:00:00] ...` and the game's own
/// `[UnityCrossThreadLogger]1/15/2024 10:00:00 AM ...` layout.
pub fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
    let rest = line.trim_start().strip_prefix('[')?;
    let close = rest.find(']')?;
    let inside = rest[..close].trim();
    let after = rest[close + 1..].trim_start();

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(inside, fmt).ok())
        .or_else(|| {
            FORMATS.iter().find_map(|fmt| {
                NaiveDateTime::parse_and_remainder(after, fmt)
                    .ok()
                    .map(|(ts, _)| ts)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_bracketed_iso() {
        let ts = parse_timestamp("[2024-01-15 10:00:00] <== Event {}");
        assert_eq!(ts, Some(at(10, 0, 0)));
    }

    #[test]
    fn test_bracketed_fractional() {
        let ts = parse_timestamp("[2024-01-15 10:00:00.250] <== Event {}").unwrap();
        assert_eq!(ts.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_unity_logger_prefix() {
        let ts = parse_timestamp("[UnityCrossThreadLogger]1/15/2024 3:04:05 PM ==> Event {}");
        assert_eq!(ts, Some(at(15, 4, 5)));
    }

    #[test]
    fn test_missing_timestamp() {
        assert_eq!(parse_timestamp("no brackets here"), None);
        assert_eq!(parse_timestamp("[UnityCrossThreadLogger] Client.SceneChange"), None);
    }
}
