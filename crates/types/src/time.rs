//! Fixed timestamp format shared by `LoginTime`, `ResponseTime` and `LogoutTime`.

use chrono::Local;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H:%M:%S";

/// Current local time in the document's timestamp format.
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_timestamp_round_trips_through_format() {
        let stamp = timestamp_now();
        assert_eq!(stamp.len(), "20240101_12:00:00".len());
        assert!(NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
    }
}
