//! Calendar values used for bucketing transactions: plain dates, ISO-8601 weeks and months.
//!
//! All parsing is strict. A malformed string is a `ParseError`, never a silently invalid value.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// An error produced when a date, week or month string cannot be parsed.
#[derive(Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Expected `YYYY-MM-DD`.
    Date(String),
    /// Expected `YYYY-Www` naming a week that exists in that ISO year.
    Week(String),
    /// Expected `YYYY-MM`.
    Month(String),
}

impl Debug for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Date(s) => write!(f, "Invalid date '{s}', expected YYYY-MM-DD"),
            ParseError::Week(s) => write!(f, "Invalid ISO week '{s}', expected YYYY-Www"),
            ParseError::Month(s) => write!(f, "Invalid month '{s}', expected YYYY-MM"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a `YYYY-MM-DD` string into a calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    let s = s.trim();
    if !has_shape(s, &[4, 2, 2]) {
        return Err(ParseError::Date(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ParseError::Date(s.to_string()))
}

/// Checks that `s` is made of ASCII digit groups of the given widths, separated by `-`.
fn has_shape(s: &str, widths: &[usize]) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    parts.len() == widths.len()
        && parts
            .iter()
            .zip(widths)
            .all(|(p, w)| p.len() == *w && p.bytes().all(|b| b.is_ascii_digit()))
}

/// An ISO-8601 week: the week-numbering year and the week within it (1 to 52 or 53).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeek {
    year: i32,
    week: u32,
    monday: NaiveDate,
}

impl IsoWeek {
    /// Creates an `IsoWeek`, failing if `week` does not exist in the ISO `year`.
    pub fn new(year: i32, week: u32) -> Result<Self, ParseError> {
        match NaiveDate::from_isoywd_opt(year, week, Weekday::Mon) {
            Some(monday) => Ok(Self { year, week, monday }),
            None => Err(ParseError::Week(format!("{year:04}-W{week:02}"))),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// The Monday that begins this week.
    pub fn first_day(&self) -> NaiveDate {
        self.monday
    }

    /// True if `date` falls in `[Monday, Monday + 7 days)` of this week.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let start = self.first_day();
        match start.checked_add_days(Days::new(7)) {
            Some(end) => start <= date && date < end,
            None => start <= date,
        }
    }
}

impl Display for IsoWeek {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

impl FromStr for IsoWeek {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseError::Week(s.to_string());
        let (year, week) = s.split_once("-W").ok_or_else(err)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(err());
        }
        if !year.bytes().chain(week.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let week: u32 = week.parse().map_err(|_| err())?;
        IsoWeek::new(year, week).map_err(|_| err())
    }
}

/// Returns the ISO-8601 week containing `date`.
///
/// The week that contains a date's Thursday decides both the week number and the week-numbering
/// year, so the first days of January can belong to the last week of the previous year and the
/// last days of December to week 1 of the next.
pub fn week_number(date: NaiveDate) -> IsoWeek {
    let iso = date.iso_week();
    let back = i64::from(date.weekday().num_days_from_monday());
    IsoWeek {
        year: iso.year(),
        week: iso.week(),
        monday: date - Duration::days(back),
    }
}

/// Returns the Monday that begins ISO `week` of ISO `year`, at local midnight.
pub fn start_of_iso_week(week: u32, year: i32) -> Result<NaiveDateTime, ParseError> {
    let monday = IsoWeek::new(year, week)?.first_day();
    monday
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ParseError::Week(format!("{year:04}-W{week:02}")))
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ParseError> {
        if !(1..=12).contains(&month) {
            return Err(ParseError::Month(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseError::Month(s.to_string());
        if !has_shape(s, &[4, 2]) {
            return Err(err());
        }
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        YearMonth::new(year, month).map_err(|_| err())
    }
}

macro_rules! serde_via_string {
    ($t:ty) => {
        impl Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                <$t>::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

serde_via_string!(IsoWeek);
serde_via_string!(YearMonth);

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_week_number_reference_dates() {
        // Jan 1 2021 is a Friday, so it belongs to the last week of 2020.
        assert_eq!(week_number(d("2021-01-01")).to_string(), "2020-W53");
        assert_eq!(week_number(d("2021-01-03")).to_string(), "2020-W53");
        assert_eq!(week_number(d("2021-01-04")).to_string(), "2021-W01");
        // Jan 1 2022 is a Saturday.
        assert_eq!(week_number(d("2022-01-01")).to_string(), "2021-W52");
        // Jan 1 2023 is a Sunday.
        assert_eq!(week_number(d("2023-01-01")).to_string(), "2022-W52");
        // Dec 31 2024 is a Tuesday, and that week's Thursday is Jan 2 2025.
        assert_eq!(week_number(d("2024-12-30")).to_string(), "2025-W01");
        assert_eq!(week_number(d("2024-12-31")).to_string(), "2025-W01");
        // Jan 1 2026 is a Thursday.
        assert_eq!(week_number(d("2026-01-01")).to_string(), "2026-W01");
        assert_eq!(week_number(d("2015-12-31")).to_string(), "2015-W53");
    }

    #[test]
    fn test_start_of_iso_week() {
        let start = start_of_iso_week(53, 2020).unwrap();
        assert_eq!(start, d("2020-12-28").and_hms_opt(0, 0, 0).unwrap());

        let start = start_of_iso_week(1, 2021).unwrap();
        assert_eq!(start, d("2021-01-04").and_hms_opt(0, 0, 0).unwrap());

        let start = start_of_iso_week(1, 2025).unwrap();
        assert_eq!(start.date(), d("2024-12-30"));
    }

    #[test]
    fn test_start_of_iso_week_rejects_missing_weeks() {
        // 2021 has only 52 ISO weeks.
        assert!(start_of_iso_week(53, 2021).is_err());
        assert!(start_of_iso_week(0, 2021).is_err());
        assert!(start_of_iso_week(54, 2020).is_err());
    }

    #[test]
    fn test_start_of_week_brackets_every_day() {
        let mut day = d("2019-12-20");
        let last = d("2027-01-10");
        while day <= last {
            let week = week_number(day);
            let start = start_of_iso_week(week.week(), week.year()).unwrap();
            let end = start + Duration::days(7);
            let midnight = day.and_hms_opt(0, 0, 0).unwrap();
            assert!(start <= midnight, "{day} is before the start of {week}");
            assert!(midnight < end, "{day} is after the end of {week}");
            assert!(week.contains(day));
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_parse_date_is_strict() {
        assert_eq!(d("2024-03-31"), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(
            parse_date("2024-3-31").unwrap_err(),
            ParseError::Date("2024-3-31".to_string())
        );
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("31/03/2024").is_err());
        assert!(parse_date("").is_err());
        assert!(parse_date("2024-03-31T00:00:00").is_err());
    }

    #[test]
    fn test_iso_week_parse_and_display() {
        let week: IsoWeek = "2024-W05".parse().unwrap();
        assert_eq!(week.year(), 2024);
        assert_eq!(week.week(), 5);
        assert_eq!(week.to_string(), "2024-W05");
        assert!("2024-W5".parse::<IsoWeek>().is_err());
        assert!("2024W05".parse::<IsoWeek>().is_err());
        assert!("2021-W53".parse::<IsoWeek>().is_err());
        assert!("2020-W53".parse::<IsoWeek>().is_ok());
    }

    #[test]
    fn test_year_month() {
        let month: YearMonth = "2024-03".parse().unwrap();
        assert!(month.contains(d("2024-03-01")));
        assert!(month.contains(d("2024-03-31")));
        assert!(!month.contains(d("2024-04-01")));
        assert!(!month.contains(d("2023-03-15")));
        assert_eq!(month.to_string(), "2024-03");
        assert_eq!(YearMonth::of(d("2024-12-09")).to_string(), "2024-12");
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024-3".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_serde_as_strings() {
        let week: IsoWeek = serde_json::from_str("\"2020-W53\"").unwrap();
        assert_eq!(serde_json::to_string(&week).unwrap(), "\"2020-W53\"");
        assert!(serde_json::from_str::<YearMonth>("\"2020-00\"").is_err());
    }
}
