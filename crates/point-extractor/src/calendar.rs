//! Calendar-aware date arithmetic for CF time axes.
//!
//! Climate model output frequently uses calendars other than the Gregorian
//! one (360-day years, no leap years). Adding a day count onto a Gregorian
//! date silently produces the wrong date for those, so every calendar here
//! converts dates to and from a day number within its own rules.
//!
//! `standard` and `gregorian` are treated as proleptic Gregorian.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use series_common::{ExtractError, ExtractResult};

pub(crate) const MICROS_PER_SECOND: i64 = 1_000_000;
pub(crate) const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

const CUMULATIVE_DAYS: [i64; 13] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];
const CUMULATIVE_DAYS_LEAP: [i64; 13] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366];

/// Date-arithmetic system governing a time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calendar {
    /// Proleptic Gregorian (`standard`, `gregorian`, `proleptic_gregorian`)
    Gregorian,
    /// Every year has 365 days (`noleap`, `365_day`)
    NoLeap,
    /// Every year has 366 days (`all_leap`, `366_day`)
    AllLeap,
    /// Twelve 30-day months (`360_day`)
    Day360,
    /// Julian calendar, leap year every fourth year
    Julian,
}

impl Calendar {
    /// Canonical CF name.
    pub fn name(&self) -> &'static str {
        match self {
            Calendar::Gregorian => "standard",
            Calendar::NoLeap => "noleap",
            Calendar::AllLeap => "all_leap",
            Calendar::Day360 => "360_day",
            Calendar::Julian => "julian",
        }
    }

    /// Whether `year` has a leap day in this calendar.
    pub fn is_leap_year(&self, year: i32) -> bool {
        match self {
            Calendar::Gregorian => {
                (year.rem_euclid(4) == 0 && year.rem_euclid(100) != 0) || year.rem_euclid(400) == 0
            }
            Calendar::Julian => year.rem_euclid(4) == 0,
            Calendar::AllLeap => true,
            Calendar::NoLeap | Calendar::Day360 => false,
        }
    }

    /// Number of days in `month` (1-12) of `year`.
    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        if *self == Calendar::Day360 {
            return 30;
        }
        let table = if self.is_leap_year(year) {
            &CUMULATIVE_DAYS_LEAP
        } else {
            &CUMULATIVE_DAYS
        };
        let m = month.clamp(1, 12) as usize;
        (table[m] - table[m - 1]) as u32
    }

    /// Day number of a date, counted from an arbitrary calendar-specific epoch.
    fn day_number(&self, year: i32, month: u32, day: u32) -> ExtractResult<i64> {
        if !(1..=12).contains(&month) {
            return Err(ExtractError::InvalidDate(format!("month {} out of range", month)));
        }
        let y = year as i64;
        let m = month as i64;
        let d = day as i64;
        let number = match self {
            Calendar::Gregorian => {
                let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                    ExtractError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day))
                })?;
                date.num_days_from_ce() as i64
            }
            Calendar::Day360 => y * 360 + (m - 1) * 30 + (d - 1),
            Calendar::NoLeap => y * 365 + CUMULATIVE_DAYS[(m - 1) as usize] + (d - 1),
            Calendar::AllLeap => y * 366 + CUMULATIVE_DAYS_LEAP[(m - 1) as usize] + (d - 1),
            Calendar::Julian => {
                // Julian day number
                let a = (14 - m).div_euclid(12);
                let yy = y + 4800 - a;
                let mm = m + 12 * a - 3;
                d + (153 * mm + 2).div_euclid(5) + 365 * yy + yy.div_euclid(4) - 32083
            }
        };
        Ok(number)
    }

    /// Inverse of [`Calendar::day_number`].
    fn date_from_day_number(&self, number: i64) -> ExtractResult<(i32, u32, u32)> {
        let overflow = || ExtractError::InvalidDate(format!("day number {} out of range", number));
        let (year, month, day) = match self {
            Calendar::Gregorian => {
                let days = i32::try_from(number).map_err(|_| overflow())?;
                let date = NaiveDate::from_num_days_from_ce_opt(days).ok_or_else(overflow)?;
                (date.year() as i64, date.month() as i64, date.day() as i64)
            }
            Calendar::Day360 => {
                let rem = number.rem_euclid(360);
                (number.div_euclid(360), rem / 30 + 1, rem % 30 + 1)
            }
            Calendar::NoLeap => {
                let (m, d) = month_and_day(number.rem_euclid(365), &CUMULATIVE_DAYS);
                (number.div_euclid(365), m, d)
            }
            Calendar::AllLeap => {
                let (m, d) = month_and_day(number.rem_euclid(366), &CUMULATIVE_DAYS_LEAP);
                (number.div_euclid(366), m, d)
            }
            Calendar::Julian => {
                let c = number + 32082;
                let dd = (4 * c + 3).div_euclid(1461);
                let e = c - (1461 * dd).div_euclid(4);
                let mm = (5 * e + 2).div_euclid(153);
                let day = e - (153 * mm + 2).div_euclid(5) + 1;
                let month = mm + 3 - 12 * mm.div_euclid(10);
                (dd - 4800 + mm.div_euclid(10), month, day)
            }
        };
        let year = i32::try_from(year).map_err(|_| overflow())?;
        Ok((year, month as u32, day as u32))
    }
}

fn month_and_day(day_of_year: i64, table: &[i64; 13]) -> (i64, i64) {
    let month = (1..=12).find(|&m| day_of_year < table[m]).unwrap_or(12);
    (month as i64, day_of_year - table[month - 1] + 1)
}

impl FromStr for Calendar {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "standard" | "gregorian" | "proleptic_gregorian" => Ok(Calendar::Gregorian),
            "noleap" | "no_leap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            "julian" => Ok(Calendar::Julian),
            _ => Err(ExtractError::UnsupportedCalendar(s.to_string())),
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An instant on a specific calendar.
///
/// Ordering compares wall-clock fields (year first), so timestamps from
/// sources on different calendars still sort sensibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CfDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
    pub calendar: Calendar,
}

impl CfDateTime {
    /// Build a date-time, validating the fields against the calendar.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        calendar: Calendar,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    ) -> ExtractResult<Self> {
        let invalid = || {
            ExtractError::InvalidDate(format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02} is not valid in the {} calendar",
                year, month, day, hour, minute, second, calendar
            ))
        };
        if !(1..=12).contains(&month) || day == 0 || day > calendar.days_in_month(year, month) {
            return Err(invalid());
        }
        if hour > 23 || minute > 59 || second > 59 || microsecond >= MICROS_PER_SECOND as u32 {
            return Err(invalid());
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            calendar,
        })
    }

    /// Midnight on the given date.
    pub fn from_ymd(calendar: Calendar, year: i32, month: u32, day: u32) -> ExtractResult<Self> {
        Self::new(calendar, year, month, day, 0, 0, 0, 0)
    }

    /// Microseconds since the calendar's internal epoch.
    pub(crate) fn to_micros(&self) -> ExtractResult<i64> {
        let day = self.calendar.day_number(self.year, self.month, self.day)?;
        let time_of_day = (self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64)
            * MICROS_PER_SECOND
            + self.microsecond as i64;
        day.checked_mul(MICROS_PER_DAY)
            .and_then(|v| v.checked_add(time_of_day))
            .ok_or_else(|| ExtractError::InvalidDate(format!("{} out of range", self)))
    }

    /// Inverse of [`CfDateTime::to_micros`].
    pub(crate) fn from_micros(calendar: Calendar, micros: i64) -> ExtractResult<Self> {
        let day = micros.div_euclid(MICROS_PER_DAY);
        let mut rem = micros.rem_euclid(MICROS_PER_DAY);
        let (year, month, day) = calendar.date_from_day_number(day)?;

        let microsecond = (rem % MICROS_PER_SECOND) as u32;
        rem /= MICROS_PER_SECOND;
        let second = (rem % 60) as u32;
        rem /= 60;
        let minute = (rem % 60) as u32;
        let hour = (rem / 60) as u32;

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            calendar,
        })
    }

    /// Shift by a signed number of microseconds within this calendar.
    pub fn add_micros(&self, delta: i64) -> ExtractResult<Self> {
        let micros = self
            .to_micros()?
            .checked_add(delta)
            .ok_or_else(|| ExtractError::InvalidDate(format!("{} + {}us out of range", self, delta)))?;
        Self::from_micros(self.calendar, micros)
    }

    /// Convert to a chrono timestamp. Only Gregorian dates have one.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        if self.calendar != Calendar::Gregorian {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_micro_opt(
            self.hour,
            self.minute,
            self.second,
            self.microsecond,
        )
    }
}

impl From<NaiveDateTime> for CfDateTime {
    fn from(dt: NaiveDateTime) -> Self {
        use chrono::Timelike;
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            microsecond: dt.nanosecond() / 1000 % MICROS_PER_SECOND as u32,
            calendar: Calendar::Gregorian,
        }
    }
}

impl fmt::Display for CfDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.microsecond > 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calendar_names() {
        assert_eq!("standard".parse::<Calendar>().unwrap(), Calendar::Gregorian);
        assert_eq!("proleptic_gregorian".parse::<Calendar>().unwrap(), Calendar::Gregorian);
        assert_eq!("365_day".parse::<Calendar>().unwrap(), Calendar::NoLeap);
        assert_eq!("366_day".parse::<Calendar>().unwrap(), Calendar::AllLeap);
        assert_eq!("360_DAY".parse::<Calendar>().unwrap(), Calendar::Day360);
        assert_eq!("julian".parse::<Calendar>().unwrap(), Calendar::Julian);
        assert!(matches!(
            "lunar".parse::<Calendar>(),
            Err(ExtractError::UnsupportedCalendar(_))
        ));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(Calendar::Gregorian.days_in_month(2000, 2), 29);
        assert_eq!(Calendar::Gregorian.days_in_month(1900, 2), 28);
        assert_eq!(Calendar::Julian.days_in_month(1900, 2), 29);
        assert_eq!(Calendar::NoLeap.days_in_month(2000, 2), 28);
        assert_eq!(Calendar::AllLeap.days_in_month(2001, 2), 29);
        assert_eq!(Calendar::Day360.days_in_month(2001, 2), 30);
    }

    #[test]
    fn test_day_number_round_trip_each_calendar() {
        let calendars = [
            Calendar::Gregorian,
            Calendar::NoLeap,
            Calendar::AllLeap,
            Calendar::Day360,
            Calendar::Julian,
        ];
        for cal in calendars {
            let start = cal.day_number(1999, 12, 1).unwrap();
            let mut previous = cal.date_from_day_number(start).unwrap();
            assert_eq!(previous, (1999, 12, 1), "{}", cal);
            for n in start + 1..start + 800 {
                let (y, m, d) = cal.date_from_day_number(n).unwrap();
                assert_eq!(cal.day_number(y, m, d).unwrap(), n, "{} day {}", cal, n);
                assert!((y, m, d) > previous, "{} not increasing at {}", cal, n);
                previous = (y, m, d);
            }
        }
    }

    #[test]
    fn test_360_day_february_30_is_valid() {
        assert!(CfDateTime::from_ymd(Calendar::Day360, 2000, 2, 30).is_ok());
        assert!(CfDateTime::from_ymd(Calendar::Gregorian, 2000, 2, 30).is_err());
        assert!(CfDateTime::from_ymd(Calendar::NoLeap, 2000, 2, 29).is_err());
    }

    #[test]
    fn test_add_micros_crosses_day_boundary() {
        let dt = CfDateTime::new(Calendar::Day360, 2000, 12, 30, 23, 0, 0, 0).unwrap();
        let next = dt.add_micros(2 * 3600 * MICROS_PER_SECOND).unwrap();
        assert_eq!((next.year, next.month, next.day, next.hour), (2001, 1, 1, 1));

        let back = dt.add_micros(-MICROS_PER_DAY * 360).unwrap();
        assert_eq!((back.year, back.month, back.day), (1999, 12, 30));
    }

    #[test]
    fn test_display_and_naive_conversion() {
        let dt = CfDateTime::new(Calendar::Gregorian, 2020, 1, 2, 3, 4, 5, 0).unwrap();
        assert_eq!(dt.to_string(), "2020-01-02 03:04:05");
        let naive = dt.to_naive().unwrap();
        assert_eq!(CfDateTime::from(naive), dt);

        let frac = CfDateTime::new(Calendar::Gregorian, 2020, 1, 2, 0, 0, 0, 500_000).unwrap();
        assert_eq!(frac.to_string(), "2020-01-02 00:00:00.500000");

        let d360 = CfDateTime::from_ymd(Calendar::Day360, 2000, 2, 30).unwrap();
        assert!(d360.to_naive().is_none());
    }

    #[test]
    fn test_ordering_by_wall_clock() {
        let a = CfDateTime::from_ymd(Calendar::Gregorian, 2021, 1, 1).unwrap();
        let b = CfDateTime::from_ymd(Calendar::Gregorian, 2021, 1, 2).unwrap();
        let c = CfDateTime::new(Calendar::Gregorian, 2021, 1, 1, 6, 0, 0, 0).unwrap();
        let mut v = vec![b, c, a];
        v.sort();
        assert_eq!(v, vec![a, c, b]);
    }
}
