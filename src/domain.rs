use crate::error::DirectoryError;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day of the week a business-hours record applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = DirectoryError;

    /// Case-insensitive parse; anything outside Monday..Sunday is a
    /// client-input error, not an empty match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monday" => Ok(DayOfWeek::Monday),
            "tuesday" => Ok(DayOfWeek::Tuesday),
            "wednesday" => Ok(DayOfWeek::Wednesday),
            "thursday" => Ok(DayOfWeek::Thursday),
            "friday" => Ok(DayOfWeek::Friday),
            "saturday" => Ok(DayOfWeek::Saturday),
            "sunday" => Ok(DayOfWeek::Sunday),
            _ => Err(DirectoryError::InvalidDay(s.to_string())),
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// One contiguous open interval within a day. Invariant: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Shift {
    /// Returns `None` when the interval would be empty or inverted.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Half-open containment: `start <= t < end`.
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }
}

/// Operating hours for one weekday. Zero shifts means closed that day;
/// the source encodes at most two shifts per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    pub day: DayOfWeek,
    pub shifts: Vec<Shift>,
}

impl DayHours {
    pub fn closed(day: DayOfWeek) -> Self {
        Self {
            day,
            shifts: Vec::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shifts.is_empty()
    }
}

/// A business in the directory. Created once per CSV row; immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: i64,
    pub timezone: String,
    pub rating: f64,
    pub max_rating: f64,
    pub review_count: i64,
}

/// One fully normalized CSV row: the business plus everything it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessRecord {
    pub business: Business,
    pub categories: Vec<String>,
    pub hours: Vec<DayHours>,
}

/// Query response shape: business fields plus matched categories and hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSummary {
    pub id: i64,
    pub timezone: String,
    pub rating: f64,
    pub max_rating: f64,
    pub review_count: i64,
    pub categories: Vec<String>,
    pub hours: Vec<DayHours>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn day_of_week_parses_case_insensitively() {
        assert_eq!("monday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!("SATURDAY".parse::<DayOfWeek>().unwrap(), DayOfWeek::Saturday);
        assert_eq!(" Sunday ".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
    }

    #[test]
    fn unknown_day_is_an_input_error() {
        let err = "Funday".parse::<DayOfWeek>().unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidDay(ref d) if d == "Funday"));
    }

    #[test]
    fn shift_containment_is_half_open() {
        let shift = Shift::new(t(9, 0), t(12, 0)).unwrap();
        assert!(shift.contains(t(9, 0)));
        assert!(shift.contains(t(11, 59)));
        assert!(!shift.contains(t(12, 0)));
        assert!(!shift.contains(t(8, 59)));
    }

    #[test]
    fn inverted_shift_is_rejected() {
        assert!(Shift::new(t(18, 0), t(9, 0)).is_none());
        assert!(Shift::new(t(9, 0), t(9, 0)).is_none());
    }
}
