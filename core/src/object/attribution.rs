use std::fmt;
use std::str;

use super::parse_utils::{parse_decimal, rsplit_once, split_once};

/// An `Attribution` combines a person's identity (name and e-mail address)
/// with the timestamp for a particular action.
///
/// Attributions are typically associated with commits or tags in git.
///
/// The `timestamp` value is in seconds relative to the Unix epoch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribution {
    name: String,
    email: String,
    timestamp: i64,
    tz_offset: i16,
}

impl Attribution {
    /// Creates a new attribution.
    ///
    /// `tz_offset` is in minutes east of UTC and is clamped to the range
    /// git can represent (-12:00 to +14:00).
    pub fn new(name: &str, email: &str, timestamp: i64, tz_offset: i16) -> Attribution {
        Attribution {
            name: name.to_string(),
            email: email.to_string(),
            timestamp,
            tz_offset: tz_offset.max(-720).min(840),
        }
    }

    /// Parse a name line (e.g. author, committer, tagger) into an `Attribution` struct.
    ///
    /// The line must have the form `Name <email> <seconds> <±HHMM>`.
    /// Returns `None` if unable to parse the line properly.
    pub fn parse(line: &[u8]) -> Option<Attribution> {
        let line = drop_last_newline(line);

        let (line, tz) = rsplit_once(line, &b' ')?;
        let tz_offset = tz_from_bytes(tz)?;

        let (line, timestamp) = rsplit_once(line, &b' ')?;
        let timestamp = parse_decimal(timestamp)? as i64;

        if line.last() != Some(&b'>') || !line.contains(&b'<') {
            return None;
        }

        let (name, email) = split_once(&line[..line.len() - 1], &b'<');
        if email.contains(&b'<') || email.contains(&b'>') {
            return None;
        }

        let name = str::from_utf8(drop_last_space(name)).ok()?;
        let email = str::from_utf8(email).ok()?;

        Some(Attribution {
            name: name.to_string(),
            email: email.to_string(),
            timestamp,
            tz_offset,
        })
    }

    /// Returns the person's human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the person's email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns `Name <email>` as it appears in commit headers.
    pub fn name_and_email(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Returns the timestamp.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the timezone offset (minutes relative to GMT).
    pub fn tz_offset(&self) -> i16 {
        self.tz_offset
    }

    /// Returns the timezone formatted in human readable offset from GMT.
    pub fn format_tz(&self) -> String {
        let sign = if self.tz_offset < 0 { "-" } else { "+" };

        let offset = self.tz_offset.abs();
        let hours = offset / 60;
        let min = offset % 60;

        format!("{}{:02}{:02}", sign, hours, min)
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.name_and_email(),
            self.timestamp,
            self.format_tz()
        )
    }
}

fn drop_last_newline(s: &[u8]) -> &[u8] {
    if s.last() == Some(&b'\n') {
        &s[0..s.len() - 1]
    } else {
        s
    }
}

fn drop_last_space(s: &[u8]) -> &[u8] {
    if s.last() == Some(&b' ') {
        &s[0..s.len() - 1]
    } else {
        s
    }
}

/// Parses `+HHMM` or `-HHMM` into minutes east of UTC.
pub(crate) fn tz_from_bytes(s: &[u8]) -> Option<i16> {
    if s.len() != 5 {
        return None;
    }

    let sign = match s[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };

    let hours = parse_decimal(&s[1..3])? as i16;
    let minutes = parse_decimal(&s[3..5])? as i16;
    if minutes >= 60 {
        return None;
    }

    Some(sign * (hours * 60 + minutes))
}
