//! Calendar and clock helpers shared by the temporal value types.
//!
//! Covers fixed-width digit parsing, calendar validation and UTC offset
//! parsing/formatting in both the extended (`+HH:MM`) and basic (`+HHMM`)
//! spellings.

/// Parses exactly `s.len()` ASCII digits into an unsigned number.
pub(crate) fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Returns true if the given year is a leap year.
pub(crate) fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
pub(crate) fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Parses a `HH:MM:SS` clock reading and validates its ranges.
pub(crate) fn parse_clock(s: &str) -> Option<(u8, u8, u8)> {
    if s.len() != 8 || s.as_bytes()[2] != b':' || s.as_bytes()[5] != b':' {
        return None;
    }
    let hour = parse_digits(&s[0..2])?;
    let minute = parse_digits(&s[3..5])?;
    let second = parse_digits(&s[6..8])?;
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    Some((hour as u8, minute as u8, second as u8))
}

/// Parses a timezone offset (`Z`, `+HH:MM`, `-HH:MM`) into minutes.
pub(crate) fn parse_timezone_offset(offset: &str) -> Option<i16> {
    if offset == "Z" || offset == "z" {
        return Some(0);
    }

    if offset.len() != 6 || offset.as_bytes()[3] != b':' {
        return None;
    }

    let sign = match offset.as_bytes()[0] {
        b'+' => 1i16,
        b'-' => -1i16,
        _ => return None,
    };

    let hours = parse_digits(&offset[1..3])? as i16;
    let minutes = parse_digits(&offset[4..6])? as i16;

    // Allow 24:00 as special case for +/-24:00
    if hours > 24 || (hours == 24 && minutes != 0) || minutes > 59 {
        return None;
    }

    Some(sign * (hours * 60 + minutes))
}

/// Formats an offset in minutes as `Z`, `+HH:MM` or `-HH:MM`.
pub(crate) fn format_timezone_offset(offset_min: i16) -> String {
    if offset_min == 0 {
        return "Z".to_string();
    }
    let (sign, hours, minutes) = split_offset(offset_min);
    format!("{}{:02}:{:02}", sign, hours, minutes)
}

/// Formats an offset in minutes as `+HHMM` / `-HHMM` (no `Z` shorthand).
pub(crate) fn format_basic_offset(offset_min: i16) -> String {
    let (sign, hours, minutes) = split_offset(offset_min);
    format!("{}{:02}{:02}", sign, hours, minutes)
}

fn split_offset(offset_min: i16) -> (char, i16, i16) {
    let sign = if offset_min >= 0 { '+' } else { '-' };
    let abs_offset = offset_min.abs();
    (sign, abs_offset / 60, abs_offset % 60)
}
