use chrono::{NaiveDate, NaiveTime};

/// Accepts an optional leading `+` followed by 7 to 15 digits, ignoring
/// spaces, dashes and parentheses.
pub fn validate_phone(phone: &str, _ctx: &()) -> garde::Result {
    let trimmed = phone.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut count = 0;
    for c in digits.chars() {
        match c {
            '0'..='9' => count += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => return Err(garde::Error::new("Phone number contains invalid characters")),
        }
    }

    if !(7..=15).contains(&count) {
        return Err(garde::Error::new("Phone number must have between 7 and 15 digits"));
    }

    Ok(())
}

/// Event dates are calendar dates in `YYYY-MM-DD` form.
pub fn validate_event_date(date: &str, _ctx: &()) -> garde::Result {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| garde::Error::new("Event date must be formatted as YYYY-MM-DD"))
}

/// Event times are 24-hour `HH:MM`.
pub fn validate_event_time(time: &str, _ctx: &()) -> garde::Result {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| garde::Error::new("Event time must be formatted as HH:MM"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers() {
        assert!(validate_phone("+15550001234", &()).is_ok());
        assert!(validate_phone("(555) 000-1234", &()).is_ok());
        assert!(validate_phone("555", &()).is_err());
        assert!(validate_phone("call me", &()).is_err());
    }

    #[test]
    fn dates_and_times() {
        assert!(validate_event_date("2025-06-01", &()).is_ok());
        assert!(validate_event_date("2025-02-30", &()).is_err());
        assert!(validate_event_date("06/01/2025", &()).is_err());
        assert!(validate_event_time("14:00", &()).is_ok());
        assert!(validate_event_time("25:00", &()).is_err());
    }
}
