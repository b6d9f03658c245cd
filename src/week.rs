//! Week keys and calendar arithmetic.
//!
//! A week is identified by the ISO date (`YYYY-MM-DD`) of its first day. The
//! first day is either Sunday or Monday and every calculation is made in one
//! fixed UTC offset, both carried by [`WeekPolicy`]. The key string is the
//! join column for tasks and archived weeks, so switching the first-day
//! policy on an existing database is a schema migration.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A day-of-week bucket on the board.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// All seven days, Sunday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }

    pub fn from_weekday(weekday: Weekday) -> DayOfWeek {
        DayOfWeek::ALL[weekday.num_days_from_sunday() as usize]
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            DayOfWeek::Sunday => Weekday::Sun,
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
        }
    }

    /// Capitalised name for headings, e.g. `Wednesday`.
    pub fn title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DayOfWeek::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| Error::UnknownDay(s.to_string()))
    }
}

/// Which day opens a week.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FirstDay {
    #[default]
    Sunday,
    Monday,
}

/// The single calendar policy used for every week and day computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekPolicy {
    pub first_day: FirstDay,
    pub offset: FixedOffset,
}

impl Default for WeekPolicy {
    fn default() -> Self {
        WeekPolicy {
            first_day: FirstDay::Sunday,
            offset: utc(),
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

impl WeekPolicy {
    pub fn new(first_day: FirstDay, offset: FixedOffset) -> Self {
        WeekPolicy { first_day, offset }
    }

    /// `now` seen as a wall-clock time in the configured offset.
    pub fn local(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    /// Calendar date of `now` in the configured offset.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local(now).date_naive()
    }

    pub fn day_of_week(&self, now: DateTime<Utc>) -> DayOfWeek {
        DayOfWeek::from_weekday(self.today(now).weekday())
    }

    /// Key of the week that contains `date`.
    pub fn week_key_for_date(&self, date: NaiveDate) -> WeekKey {
        let back = match self.first_day {
            FirstDay::Sunday => date.weekday().num_days_from_sunday(),
            FirstDay::Monday => date.weekday().num_days_from_monday(),
        };
        WeekKey(date - Duration::days(i64::from(back)))
    }

    pub fn current_week_key(&self, now: DateTime<Utc>) -> WeekKey {
        self.week_key_for_date(self.today(now))
    }
}

/// Canonical identifier of a calendar week: the date of its first day.
///
/// Ordering follows the date, which matches the lexicographic order of the
/// zero-padded string form.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    pub fn from_date(date: NaiveDate) -> Self {
        WeekKey(date)
    }

    /// First day of the week.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Seventh day of the week.
    pub fn end_date(&self) -> NaiveDate {
        self.0 + Duration::days(6)
    }

    pub fn next(&self) -> WeekKey {
        WeekKey(self.0 + Duration::days(7))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.0 && date <= self.end_date()
    }

    /// The dates of the week in calendar order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.0;
        (0..7).map(move |i| start + Duration::days(i))
    }

    /// Date on which `day` falls within this week.
    pub fn date_of(&self, day: DayOfWeek) -> NaiveDate {
        let start = self.0.weekday().num_days_from_sunday() as i64;
        let target = day.weekday().num_days_from_sunday() as i64;
        self.0 + Duration::days((target - start).rem_euclid(7))
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_iso(self.0))
    }
}

impl FromStr for WeekKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_iso_date(s)
            .map(WeekKey)
            .ok_or_else(|| Error::MalformedWeekKey(s.to_string()))
    }
}

impl TryFrom<String> for WeekKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<WeekKey> for String {
    fn from(key: WeekKey) -> String {
        key.to_string()
    }
}

/// Parses a strict, zero-padded `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Short display form used on the board, e.g. `Jun 9`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Parses a UTC offset written as `+HH:MM`, `-HH:MM` or `Z`.
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = if let Some(rest) = s.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = s.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    let (h, m) = rest.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    let hours: i32 = h.parse().ok()?;
    let minutes: i32 = m.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Key of the week containing `now` under `policy`.
pub fn current_week_key(now: DateTime<Utc>, policy: &WeekPolicy) -> WeekKey {
    policy.current_week_key(now)
}

/// `key` advanced by exactly seven days.
pub fn next_week_key(key: WeekKey) -> WeekKey {
    key.next()
}

/// The seven `(day, display date)` pairs of a week, starting at `key`.
pub fn day_labels_for_week(key: WeekKey) -> Vec<(DayOfWeek, String)> {
    key.dates()
        .map(|d| (DayOfWeek::from_weekday(d.weekday()), display_date(d)))
        .collect()
}

/// Display forms of the first and seventh day of the week.
pub fn week_range_label(key: WeekKey) -> (String, String) {
    (display_date(key.date()), display_date(key.end_date()))
}
