use std::fmt;

/// Calendar date plus time of day, seconds precision.
///
/// Covers years 0 through 9999 in a fixed ISO-8601 text form:
/// `YYYY-MM-DDTHH:MM:SS` on output, with a bare `YYYY-MM-DD` (time
/// zeroed) and a space separator also accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if year > 9999 || month == 0 || month > 12 {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub fn parse(text: &str) -> Option<Self> {
        let mut scan = Scan::new(text);
        let value = scan.datetime()?;
        if scan.done() {
            Some(value)
        } else {
            None
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// [`DateTime`] extended with fractional seconds and an optional UTC
/// offset in minutes.
///
/// Output form: `YYYY-MM-DDTHH:MM:SS[.fff][Z|±HH:MM]`; the fraction is
/// omitted when zero, the zero offset prints as `Z`, and no suffix is
/// printed for an offset-free value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub datetime: DateTime,
    pub nanos: u32,
    pub offset_minutes: Option<i16>,
}

impl Timestamp {
    pub fn new(datetime: DateTime, nanos: u32, offset_minutes: Option<i16>) -> Option<Self> {
        if nanos >= 1_000_000_000 {
            return None;
        }
        if let Some(offset) = offset_minutes {
            if offset.abs() > 14 * 60 {
                return None;
            }
        }
        Some(Self {
            datetime,
            nanos,
            offset_minutes,
        })
    }

    pub fn parse(text: &str) -> Option<Self> {
        let mut scan = Scan::new(text);
        let datetime = scan.datetime()?;
        let nanos = scan.fraction()?;
        let offset_minutes = scan.offset()?;
        if scan.done() {
            Timestamp::new(datetime, nanos, offset_minutes)
        } else {
            None
        }
    }
}

impl From<DateTime> for Timestamp {
    fn from(datetime: DateTime) -> Self {
        Self {
            datetime,
            nanos: 0,
            offset_minutes: None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.datetime.fmt(f)?;
        if self.nanos > 0 {
            let mut digits = [b'0'; 9];
            let mut rest = self.nanos;
            for slot in digits.iter_mut().rev() {
                *slot = b'0' + (rest % 10) as u8;
                rest /= 10;
            }
            let mut len = 9;
            while len > 1 && digits[len - 1] == b'0' {
                len -= 1;
            }
            f.write_str(".")?;
            f.write_str(std::str::from_utf8(&digits[..len]).unwrap_or(""))?;
        }
        match self.offset_minutes {
            None => Ok(()),
            Some(0) => f.write_str("Z"),
            Some(offset) => {
                let sign = if offset < 0 { '-' } else { '+' };
                let magnitude = offset.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, magnitude / 60, magnitude % 60)
            }
        }
    }
}

pub fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

struct Scan<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn digits(&mut self, count: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..count {
            let byte = *self.bytes.get(self.pos)?;
            if !byte.is_ascii_digit() {
                return None;
            }
            value = value * 10 + u32::from(byte - b'0');
            self.pos += 1;
        }
        Some(value)
    }

    fn datetime(&mut self) -> Option<DateTime> {
        let year = self.digits(4)? as u16;
        if !self.eat(b'-') {
            return None;
        }
        let month = self.digits(2)? as u8;
        if !self.eat(b'-') {
            return None;
        }
        let day = self.digits(2)? as u8;
        if !self.eat(b'T') && !self.eat(b' ') {
            return DateTime::new(year, month, day, 0, 0, 0);
        }
        let hour = self.digits(2)? as u8;
        if !self.eat(b':') {
            return None;
        }
        let minute = self.digits(2)? as u8;
        if !self.eat(b':') {
            return None;
        }
        let second = self.digits(2)? as u8;
        DateTime::new(year, month, day, hour, minute, second)
    }

    /// Optional `.d{1..9}` fraction, scaled to nanoseconds.
    fn fraction(&mut self) -> Option<u32> {
        if !self.eat(b'.') {
            return Some(0);
        }
        let mut value = 0u32;
        let mut count = 0usize;
        while let Some(byte) = self.bytes.get(self.pos) {
            if !byte.is_ascii_digit() || count == 9 {
                break;
            }
            value = value * 10 + u32::from(byte - b'0');
            count += 1;
            self.pos += 1;
        }
        if count == 0 {
            return None;
        }
        for _ in count..9 {
            value *= 10;
        }
        Some(value)
    }

    /// Optional `Z` or `±HH:MM` suffix.
    fn offset(&mut self) -> Option<Option<i16>> {
        if self.eat(b'Z') {
            return Some(Some(0));
        }
        let sign = match self.bytes.get(self.pos) {
            Some(b'+') => 1i16,
            Some(b'-') => -1i16,
            _ => return Some(None),
        };
        self.pos += 1;
        let hours = self.digits(2)?;
        if !self.eat(b':') {
            return None;
        }
        let minutes = self.digits(2)?;
        if hours > 14 || minutes > 59 {
            return None;
        }
        Some(Some(sign * (hours as i16 * 60 + minutes as i16)))
    }
}
