use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Earliest year a month can fall in.
pub const MIN_YEAR: i32 = 1900;
/// Latest year a month can fall in.
pub const MAX_YEAR: i32 = 9999;

/// The timestamp clients send (or that a handler substitutes) when no month was given:
/// `0001-01-01T00:00:00Z`.
pub fn zero_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .expect("0001-01-01T00:00:00Z is a valid UTC timestamp")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonthError {
    Unset,
    OutOfRange,
    YearOutOfRange,
    Unparseable,
}

impl std::error::Error for MonthError {}

impl fmt::Display for MonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthError::Unset => write!(f, "No month was specified"),
            MonthError::OutOfRange => write!(f, "Month must be between 1 and 12"),
            MonthError::YearOutOfRange => {
                write!(f, "Year must be between {MIN_YEAR} and {MAX_YEAR}")
            }
            MonthError::Unparseable => {
                write!(f, "Month must be formatted as YYYY-MM or an RFC 3339 timestamp")
            }
        }
    }
}

/// A calendar month in UTC, between `MIN_YEAR` and `MAX_YEAR`. Ordered chronologically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if !(1..=12).contains(&month) {
            return Err(MonthError::OutOfRange);
        }

        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(MonthError::YearOutOfRange);
        }

        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or(MonthError::OutOfRange)?;

        Ok(Self { first_day })
    }

    /// Normalizes a timestamp to the month it falls in. The zero timestamp is rejected.
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Result<Self, MonthError> {
        if timestamp == zero_timestamp() {
            return Err(MonthError::Unset);
        }

        Self::try_from(timestamp)
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Midnight UTC on the first day of the month.
    pub fn start(&self) -> DateTime<Utc> {
        NaiveDateTime::from(self.first_day).and_utc()
    }

    /// Exclusive upper bound of the month, i.e. the start of the next month.
    pub fn end(&self) -> DateTime<Utc> {
        // Years stay far inside chrono's range, so adding a month cannot overflow
        NaiveDateTime::from(self.first_day + Months::new(1)).and_utc()
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.start() && *timestamp < self.end()
    }

    /// The following month, or `None` after December of `MAX_YEAR`.
    pub fn succ(&self) -> Option<Month> {
        if self.month() == 12 {
            Month::new(self.year() + 1, 1).ok()
        } else {
            Month::new(self.year(), self.month() + 1).ok()
        }
    }

    /// Every month from `self` through `last`, inclusive. Empty if `last` comes first.
    pub fn through(self, last: Month) -> impl Iterator<Item = Month> {
        std::iter::successors(Some(self), Month::succ).take_while(move |m| *m <= last)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl TryFrom<DateTime<Utc>> for Month {
    type Error = MonthError;

    fn try_from(timestamp: DateTime<Utc>) -> Result<Self, Self::Error> {
        Month::new(timestamp.year(), timestamp.month())
    }
}

/// Midnight UTC on the first day of the month `timestamp` falls in. Works for any timestamp,
/// including ones outside the `Month` year range.
pub fn start_of_month(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let date = timestamp.date_naive();
    let first_day = date - Days::new(u64::from(date.day0()));

    NaiveDateTime::from(first_day).and_utc()
}

/// Parses a month query parameter into the timestamp handed to the calculators.
///
/// Accepts `YYYY-MM` or an RFC 3339 timestamp. The zero timestamp is passed through untouched
/// so that the calculators can reject it.
pub fn parse_month_param(param: Option<&str>) -> Result<DateTime<Utc>, MonthError> {
    let param = match param.map(str::trim) {
        None | Some("") => return Ok(zero_timestamp()),
        Some(p) => p,
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(param) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let (year, month) = param.split_once('-').ok_or(MonthError::Unparseable)?;
    let year = i32::from_str(year).map_err(|_| MonthError::Unparseable)?;
    let month = u32::from_str(month).map_err(|_| MonthError::Unparseable)?;

    Ok(Month::new(year, month)?.start())
}
