use chrono::{DateTime, Local, NaiveDate, Utc};
use shared::lenient::RecordTime;
use shared::usage;

/// Today's date in the browser's time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Start of today in the browser's time zone
pub fn local_midnight() -> DateTime<Utc> {
    usage::day_start(today(), &Local)
}

/// Short date for tables, e.g. "Mar 4, 2025"; falls back to the raw text
pub fn format_short_date(raw: &str) -> String {
    match RecordTime::parse(raw) {
        Some(RecordTime::Zoned(instant)) => instant.with_timezone(&Local).format("%b %-d, %Y").to_string(),
        Some(RecordTime::Floating(naive)) => naive.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// Chart axis label for a `YYYY-MM-DD` bucket, e.g. "03/04"
pub fn axis_label(date: NaiveDate) -> String {
    date.format("%m/%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_date_floating() {
        assert_eq!(format_short_date("2025-03-04T10:00:00"), "Mar 4, 2025");
    }

    #[test]
    fn test_format_short_date_unparseable_is_kept() {
        assert_eq!(format_short_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_axis_label() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(axis_label(date), "03/04");
    }
}
