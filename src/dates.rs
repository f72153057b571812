use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ClientError, ClientResult};

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Map a user-supplied point in time onto a server-local timestamp. Accepts
/// "now", absolute dates with optional time of day, and relative offsets in
/// the form "2 hours ago" or "-2h".
pub fn parse_when(input: &str) -> ClientResult<NaiveDateTime> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("now") {
        return Ok(now());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(parsed);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(parsed);
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(parsed.and_time(NaiveTime::MIN));
    }
    if let Some(offset) = parse_relative(trimmed) {
        return Ok(now() - offset);
    }
    Err(ClientError::parse(
        "time expression",
        format!("{trimmed:?} is not a date, \"now\", or a relative offset"),
    ))
}

fn unit_duration(unit: &str, amount: i64) -> Option<Duration> {
    match unit {
        "m" | "minute" | "minutes" => Some(Duration::minutes(amount)),
        "h" | "hour" | "hours" => Some(Duration::hours(amount)),
        "d" | "day" | "days" => Some(Duration::days(amount)),
        "w" | "week" | "weeks" => Some(Duration::weeks(amount)),
        _ => None,
    }
}

fn parse_relative(input: &str) -> Option<Duration> {
    if let Some(rest) = input.strip_prefix('-') {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
        let amount = rest[..digits_end].parse::<i64>().ok()?;
        return unit_duration(&rest[digits_end..], amount);
    }
    let words: Vec<&str> = input.split_whitespace().collect();
    if let [amount, unit, "ago"] = words.as_slice() {
        let amount = amount.parse::<i64>().ok()?;
        return unit_duration(unit, amount);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_forms() {
        assert_eq!(
            parse_when("2021-01-02 03:04:05").unwrap().to_string(),
            "2021-01-02 03:04:05"
        );
        assert_eq!(
            parse_when("2021-01-02 03:04").unwrap().to_string(),
            "2021-01-02 03:04:00"
        );
        assert_eq!(
            parse_when("2021-01-02").unwrap().to_string(),
            "2021-01-02 00:00:00"
        );
    }

    #[test]
    fn parses_relative_forms() {
        assert_eq!(parse_relative("2 hours ago"), Some(Duration::hours(2)));
        assert_eq!(parse_relative("1 day ago"), Some(Duration::days(1)));
        assert_eq!(parse_relative("90 minutes ago"), Some(Duration::minutes(90)));
        assert_eq!(parse_relative("-2h"), Some(Duration::hours(2)));
        assert_eq!(parse_relative("-3w"), Some(Duration::weeks(3)));
        assert_eq!(parse_relative("soon"), None);
    }

    #[test]
    fn rejects_unparseable_input() {
        assert!(matches!(
            parse_when("whenever"),
            Err(ClientError::Parse { .. })
        ));
        assert!(parse_when("2021-13-40").is_err());
    }

    #[test]
    fn now_is_accepted_case_insensitively() {
        assert!(parse_when("now").is_ok());
        assert!(parse_when("NOW").is_ok());
    }
}
