use chrono::{DateTime, SecondsFormat, Utc};

pub fn time_millis() -> i64 {
    let time: DateTime<chrono::Utc> = Utc::now();
    time.timestamp_millis()
}

/// Current time as an RFC 3339 string, eg. `2024-05-01T10:00:00.000Z`.
pub fn time_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Wall-clock time of day, eg. `10:42:07`.
pub fn time_of_day() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
