//! Date, time-of-day and timecode values.
//!
//! Dates encode to the canonical ISO 8601 form (`YYYY`, `YYYY-MM`,
//! `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS` with an optional offset) and also
//! accept the colon-separated variant the binary standards use. Times encode as `HH:MM:SS` with an optional UTC
//! offset. Timecodes carry a [`TimecodeFormat`] that selects the separator
//! before the frame count and the drop-frame rule.

use std::fmt;

use crate::error::{DecodeError, ValueError};
use crate::util::datetime::{
    days_in_month, format_basic_offset, format_timezone_offset, parse_clock, parse_digits,
    parse_timezone_offset,
};
use crate::value::TypeKind;

fn invalid(kind: TypeKind, reason: impl Into<String>) -> ValueError {
    ValueError::Invalid {
        kind,
        reason: reason.into(),
    }
}

fn decode_text(bytes: &[u8], kind: TypeKind) -> Result<&str, DecodeError> {
    std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { kind })
}

// =============================================================================
// DATE
// =============================================================================

/// Calendar date of year, month or day precision, with an optional time
/// of day and UTC offset.
///
/// A month is only present with a year, a day only with a month, a time
/// only with a day, and an offset only with a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    year: u16,
    month: Option<u8>,
    day: Option<u8>,
    time: Option<(u8, u8, u8)>,
    offset: Option<i16>,
}

impl Date {
    pub fn new(year: u16, month: u8, day: u8) -> Result<Date, ValueError> {
        let date = Date::year_month(year, month)?;
        if day == 0 || day as u32 > days_in_month(year as u32, month as u32) {
            return Err(invalid(
                TypeKind::Date,
                format!("day {} out of range for {:04}-{:02}", day, year, month),
            ));
        }
        Ok(Date {
            day: Some(day),
            ..date
        })
    }

    /// A date known only to the year.
    pub fn year_only(year: u16) -> Result<Date, ValueError> {
        if year > 9999 {
            return Err(invalid(TypeKind::Date, format!("year {} has more than four digits", year)));
        }
        Ok(Date {
            year,
            month: None,
            day: None,
            time: None,
            offset: None,
        })
    }

    /// A date known only to the month.
    pub fn year_month(year: u16, month: u8) -> Result<Date, ValueError> {
        let date = Date::year_only(year)?;
        if month == 0 || month > 12 {
            return Err(invalid(TypeKind::Date, format!("month {} out of range", month)));
        }
        Ok(Date {
            month: Some(month),
            ..date
        })
    }

    /// Attaches a time of day. Requires day precision.
    pub fn with_time(mut self, hour: u8, minute: u8, second: u8) -> Result<Date, ValueError> {
        if self.day.is_none() {
            return Err(invalid(TypeKind::Date, "a time of day needs a full date"));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(invalid(
                TypeKind::Date,
                format!("time {:02}:{:02}:{:02} out of range", hour, minute, second),
            ));
        }
        self.time = Some((hour, minute, second));
        Ok(self)
    }

    /// Attaches a UTC offset in minutes (at most ±24:00). Requires a time.
    pub fn with_offset(mut self, minutes: i16) -> Result<Date, ValueError> {
        if self.time.is_none() {
            return Err(invalid(TypeKind::Date, "a UTC offset needs a time of day"));
        }
        if minutes.abs() > 24 * 60 {
            return Err(ValueError::OutOfRange {
                kind: TypeKind::Date,
                value: minutes as f64,
                min: -1440.0,
                max: 1440.0,
            });
        }
        self.offset = Some(minutes);
        Ok(self)
    }

    /// Parses `YYYY`, `YYYY-MM` or `YYYY-MM-DD` (`:` may replace `-`). A
    /// full date may be followed by a space or `T`, `HH:MM:SS` and an
    /// optional `Z` or `±HH:MM` offset.
    pub fn parse(s: &str) -> Result<Date, ValueError> {
        let malformed = || invalid(TypeKind::Date, format!("{:?} is not a date", s));

        if !s.is_ascii() || s.len() < 4 {
            return Err(malformed());
        }
        let year = parse_digits(&s[0..4]).ok_or_else(malformed)?;
        if s.len() == 4 {
            return Date::year_only(year as u16);
        }

        let bytes = s.as_bytes();
        let separator = bytes[4];
        if !(separator == b'-' || separator == b':') || s.len() < 7 {
            return Err(malformed());
        }
        let month = parse_digits(&s[5..7]).ok_or_else(malformed)?;
        if s.len() == 7 {
            return Date::year_month(year as u16, month as u8);
        }

        if s.len() < 10 || bytes[7] != separator {
            return Err(malformed());
        }
        let day = parse_digits(&s[8..10]).ok_or_else(malformed)?;
        let parsed = Date::new(year as u16, month as u8, day as u8)?;

        let rest = &s[10..];
        if rest.is_empty() {
            return Ok(parsed);
        }
        let clock = rest
            .strip_prefix(' ')
            .or_else(|| rest.strip_prefix('T'))
            .ok_or_else(malformed)?;
        if clock.len() < 8 {
            return Err(malformed());
        }
        let (clock, zone) = clock.split_at(8);
        let (hour, minute, second) = parse_clock(clock).ok_or_else(malformed)?;
        let parsed = parsed.with_time(hour, minute, second)?;
        if zone.is_empty() {
            return Ok(parsed);
        }
        let offset = parse_timezone_offset(zone).ok_or_else(malformed)?;
        parsed.with_offset(offset)
    }

    /// Parses the IPTC `CCYYMMDD` form, where `00` marks an unknown month
    /// or day.
    pub fn parse_basic(s: &str) -> Result<Date, ValueError> {
        let malformed = || invalid(TypeKind::Date, format!("{:?} is not a CCYYMMDD date", s));
        if s.len() != 8 || !s.is_ascii() {
            return Err(malformed());
        }
        let year = parse_digits(&s[0..4]).ok_or_else(malformed)?;
        let month = parse_digits(&s[4..6]).ok_or_else(malformed)?;
        let day = parse_digits(&s[6..8]).ok_or_else(malformed)?;
        match (month, day) {
            (0, 0) => Date::year_only(year as u16),
            (month, 0) => Date::year_month(year as u16, month as u8),
            (month, day) => Date::new(year as u16, month as u8, day as u8),
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> Option<u8> {
        self.month
    }

    pub fn day(&self) -> Option<u8> {
        self.day
    }

    pub fn time(&self) -> Option<(u8, u8, u8)> {
        self.time
    }

    /// UTC offset in minutes.
    pub fn offset(&self) -> Option<i16> {
        self.offset
    }

    /// Canonical ISO 8601 form: `YYYY[-MM[-DD[THH:MM:SS[offset]]]]`.
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// `YYYY:MM:DD HH:MM:SS`, midnight when no time is set. Unknown month
    /// and day digits are blank. The offset is not part of this field; EXIF
    /// records it in a separate tag.
    pub fn encode_exif(&self) -> Vec<u8> {
        let (hour, minute, second) = self.time.unwrap_or((0, 0, 0));
        format!(
            "{:04}:{}:{} {:02}:{:02}:{:02}",
            self.year,
            self.month.map_or_else(|| "  ".to_string(), |m| format!("{:02}", m)),
            self.day.map_or_else(|| "  ".to_string(), |d| format!("{:02}", d)),
            hour,
            minute,
            second
        )
        .into_bytes()
    }

    /// `CCYYMMDD` with `00` for an unknown month or day. The time of day
    /// and offset are carried by a separate time dataset.
    pub fn encode_iptc(&self) -> Vec<u8> {
        format!(
            "{:04}{:02}{:02}",
            self.year,
            self.month.unwrap_or(0),
            self.day.unwrap_or(0)
        )
        .into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Date, DecodeError> {
        let text = decode_text(bytes, TypeKind::Date)?;
        Date::parse(text).map_err(|_| DecodeError::Malformed {
            kind: TypeKind::Date,
            input: text.to_string(),
        })
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
        }
        if let Some(day) = self.day {
            write!(f, "-{:02}", day)?;
        }
        if let Some((hour, minute, second)) = self.time {
            write!(f, "T{:02}:{:02}:{:02}", hour, minute, second)?;
        }
        if let Some(offset) = self.offset {
            f.write_str(&format_timezone_offset(offset))?;
        }
        Ok(())
    }
}

// =============================================================================
// TIME
// =============================================================================

/// Time of day with an optional UTC offset in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time {
    hour: u8,
    minute: u8,
    second: u8,
    offset: Option<i16>,
}

impl Time {
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Time, ValueError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(invalid(
                TypeKind::Time,
                format!("{:02}:{:02}:{:02} out of range", hour, minute, second),
            ));
        }
        Ok(Time {
            hour,
            minute,
            second,
            offset: None,
        })
    }

    /// Attaches a UTC offset in minutes (at most ±24:00).
    pub fn with_offset(mut self, minutes: i16) -> Result<Time, ValueError> {
        if minutes.abs() > 24 * 60 {
            return Err(ValueError::OutOfRange {
                kind: TypeKind::Time,
                value: minutes as f64,
                min: -1440.0,
                max: 1440.0,
            });
        }
        self.offset = Some(minutes);
        Ok(self)
    }

    /// Parses `HH:MM:SS` with an optional `Z` or `±HH:MM` suffix.
    pub fn parse(s: &str) -> Result<Time, ValueError> {
        let malformed = || invalid(TypeKind::Time, format!("{:?} is not HH:MM:SS", s));
        if !s.is_ascii() || s.len() < 8 {
            return Err(malformed());
        }
        let (clock, zone) = s.split_at(8);
        let (hour, minute, second) = parse_clock(clock).ok_or_else(malformed)?;
        let time = Time::new(hour, minute, second)?;
        if zone.is_empty() {
            return Ok(time);
        }
        let offset = parse_timezone_offset(zone).ok_or_else(malformed)?;
        time.with_offset(offset)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn offset(&self) -> Option<i16> {
        self.offset
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// `HHMMSS±HHMM`; a missing offset is written as UTC.
    pub fn encode_iptc(&self) -> Vec<u8> {
        format!(
            "{:02}{:02}{:02}{}",
            self.hour,
            self.minute,
            self.second,
            format_basic_offset(self.offset.unwrap_or(0))
        )
        .into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Time, DecodeError> {
        let text = decode_text(bytes, TypeKind::Time)?;
        Time::parse(text).map_err(|_| DecodeError::Malformed {
            kind: TypeKind::Time,
            input: text.to_string(),
        })
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if let Some(offset) = self.offset {
            f.write_str(&format_timezone_offset(offset))?;
        }
        Ok(())
    }
}

// =============================================================================
// TIMECODE
// =============================================================================

/// Frame rate and counting rule of a timecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimecodeFormat {
    Fps23976,
    Fps24,
    Fps25,
    Drop2997,
    NonDrop2997,
    Fps30,
    Fps50,
    Drop5994,
    NonDrop5994,
    Fps60,
}

impl TimecodeFormat {
    pub const ALL: [TimecodeFormat; 10] = [
        TimecodeFormat::Fps23976,
        TimecodeFormat::Fps24,
        TimecodeFormat::Fps25,
        TimecodeFormat::Drop2997,
        TimecodeFormat::NonDrop2997,
        TimecodeFormat::Fps30,
        TimecodeFormat::Fps50,
        TimecodeFormat::Drop5994,
        TimecodeFormat::NonDrop5994,
        TimecodeFormat::Fps60,
    ];

    /// Frames per labelled second.
    pub fn nominal_fps(self) -> u32 {
        match self {
            TimecodeFormat::Fps23976 | TimecodeFormat::Fps24 => 24,
            TimecodeFormat::Fps25 => 25,
            TimecodeFormat::Drop2997 | TimecodeFormat::NonDrop2997 | TimecodeFormat::Fps30 => 30,
            TimecodeFormat::Fps50 => 50,
            TimecodeFormat::Drop5994 | TimecodeFormat::NonDrop5994 | TimecodeFormat::Fps60 => 60,
        }
    }

    /// Frame labels skipped at the start of each minute not divisible by ten.
    pub fn dropped_frames(self) -> u32 {
        match self {
            TimecodeFormat::Drop2997 => 2,
            TimecodeFormat::Drop5994 => 4,
            _ => 0,
        }
    }

    pub fn is_drop_frame(self) -> bool {
        self.dropped_frames() > 0
    }

    /// Separator written before the frame count.
    pub fn separator(self) -> char {
        if self.is_drop_frame() { ';' } else { ':' }
    }

    /// Dynamic-media `timeFormat` name.
    pub fn name(self) -> &'static str {
        match self {
            TimecodeFormat::Fps23976 => "23976Timecode",
            TimecodeFormat::Fps24 => "24Timecode",
            TimecodeFormat::Fps25 => "25Timecode",
            TimecodeFormat::Drop2997 => "2997DropTimecode",
            TimecodeFormat::NonDrop2997 => "2997NonDropTimecode",
            TimecodeFormat::Fps30 => "30Timecode",
            TimecodeFormat::Fps50 => "50Timecode",
            TimecodeFormat::Drop5994 => "5994DropTimecode",
            TimecodeFormat::NonDrop5994 => "5994NonDropTimecode",
            TimecodeFormat::Fps60 => "60Timecode",
        }
    }

    pub fn from_name(name: &str) -> Option<TimecodeFormat> {
        TimecodeFormat::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for TimecodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `HH:MM:SS:FF` (or `HH:MM:SS;FF` for drop-frame formats) timecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timecode {
    hour: u8,
    minute: u8,
    second: u8,
    frame: u8,
    format: TimecodeFormat,
}

impl Timecode {
    /// Validates the clock fields, the frame against the nominal rate, and
    /// rejects labels the drop-frame rule skips.
    pub fn new(
        hour: u8,
        minute: u8,
        second: u8,
        frame: u8,
        format: TimecodeFormat,
    ) -> Result<Timecode, ValueError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(invalid(
                TypeKind::Timecode,
                format!("{:02}:{:02}:{:02} out of range", hour, minute, second),
            ));
        }
        if frame as u32 >= format.nominal_fps() {
            return Err(ValueError::OutOfRange {
                kind: TypeKind::Timecode,
                value: frame as f64,
                min: 0.0,
                max: (format.nominal_fps() - 1) as f64,
            });
        }
        if second == 0 && minute % 10 != 0 && (frame as u32) < format.dropped_frames() {
            return Err(invalid(
                TypeKind::Timecode,
                format!(
                    "frame {} of minute {} is skipped by {}",
                    frame, minute, format
                ),
            ));
        }
        Ok(Timecode {
            hour,
            minute,
            second,
            frame,
            format,
        })
    }

    /// Parses a timecode, choosing 29.97 drop-frame for a `;` separator and
    /// 30 fps otherwise.
    pub fn parse(s: &str) -> Result<Timecode, ValueError> {
        let format = if s.as_bytes().get(8) == Some(&b';') {
            TimecodeFormat::Drop2997
        } else {
            TimecodeFormat::Fps30
        };
        Timecode::parse_with(s, format)
    }

    /// Parses a timecode in an explicit format. Either separator is accepted.
    pub fn parse_with(s: &str, format: TimecodeFormat) -> Result<Timecode, ValueError> {
        let malformed = || invalid(TypeKind::Timecode, format!("{:?} is not HH:MM:SS:FF", s));
        if s.len() != 11 || !s.is_ascii() {
            return Err(malformed());
        }
        let separator = s.as_bytes()[8];
        if separator != b':' && separator != b';' {
            return Err(malformed());
        }
        let (hour, minute, second) = parse_clock(&s[0..8]).ok_or_else(malformed)?;
        let frame = parse_digits(&s[9..11]).ok_or_else(malformed)?;
        Timecode::new(hour, minute, second, frame as u8, format)
    }

    /// Converts an absolute frame count back to a timecode.
    pub fn from_frames(frames: u64, format: TimecodeFormat) -> Result<Timecode, ValueError> {
        let fps = format.nominal_fps() as u64;
        let drop = format.dropped_frames() as u64;

        let mut labelled = frames;
        if drop > 0 {
            let per_ten_minutes = fps * 600 - drop * 9;
            let per_minute = fps * 60 - drop;
            let tens = frames / per_ten_minutes;
            let remainder = frames % per_ten_minutes;
            labelled += drop * 9 * tens;
            if remainder > drop {
                labelled += drop * ((remainder - drop) / per_minute);
            }
        }

        let hour = labelled / (fps * 3600);
        if hour > 23 {
            return Err(ValueError::OutOfRange {
                kind: TypeKind::Timecode,
                value: frames as f64,
                min: 0.0,
                max: (Timecode::frames_per_day(format) - 1) as f64,
            });
        }
        let frame = labelled % fps;
        let second = (labelled / fps) % 60;
        let minute = (labelled / (fps * 60)) % 60;
        Timecode::new(hour as u8, minute as u8, second as u8, frame as u8, format)
    }

    fn frames_per_day(format: TimecodeFormat) -> u64 {
        let fps = format.nominal_fps() as u64;
        let drop = format.dropped_frames() as u64;
        fps * 86_400 - drop * (1440 - 144)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn format(&self) -> TimecodeFormat {
        self.format
    }

    /// Absolute frame count since `00:00:00:00`.
    pub fn frames(&self) -> u64 {
        let fps = self.format.nominal_fps() as u64;
        let drop = self.format.dropped_frames() as u64;
        let total_minutes = 60 * self.hour as u64 + self.minute as u64;
        let labelled = (total_minutes * 60 + self.second as u64) * fps + self.frame as u64;
        labelled - drop * (total_minutes - total_minutes / 10)
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Decodes with an explicit format; the separator on the wire does not
    /// identify the frame rate.
    pub fn decode(bytes: &[u8], format: TimecodeFormat) -> Result<Timecode, DecodeError> {
        let text = decode_text(bytes, TypeKind::Timecode)?;
        if text.len() != 11 || !text.is_ascii() {
            return Err(DecodeError::Malformed {
                kind: TypeKind::Timecode,
                input: text.to_string(),
            });
        }
        Ok(Timecode::parse_with(text, format)?)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}",
            self.hour,
            self.minute,
            self.second,
            self.format.separator(),
            self.frame
        )
    }
}
