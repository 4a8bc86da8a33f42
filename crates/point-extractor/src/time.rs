//! Decoding of CF time axes (`<unit> since <reference>`).

use series_common::{ExtractError, ExtractResult, TimeAttributes};

use crate::calendar::{Calendar, CfDateTime, MICROS_PER_DAY, MICROS_PER_SECOND};

/// Unit of a CF time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    /// 30 days; only meaningful on a 360-day calendar
    Months,
    /// 360 days; only meaningful on a 360-day calendar
    Years,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        let unit = match s.to_lowercase().as_str() {
            "microseconds" | "microsecond" | "us" => TimeUnit::Microseconds,
            "milliseconds" | "millisecond" | "msec" | "ms" => TimeUnit::Milliseconds,
            "seconds" | "second" | "secs" | "sec" | "s" => TimeUnit::Seconds,
            "minutes" | "minute" | "mins" | "min" => TimeUnit::Minutes,
            "hours" | "hour" | "hrs" | "hr" | "h" => TimeUnit::Hours,
            "days" | "day" | "d" => TimeUnit::Days,
            "months" | "month" => TimeUnit::Months,
            "years" | "year" => TimeUnit::Years,
            _ => return None,
        };
        Some(unit)
    }

    fn micros(&self) -> i64 {
        match self {
            TimeUnit::Microseconds => 1,
            TimeUnit::Milliseconds => 1_000,
            TimeUnit::Seconds => MICROS_PER_SECOND,
            TimeUnit::Minutes => 60 * MICROS_PER_SECOND,
            TimeUnit::Hours => 3600 * MICROS_PER_SECOND,
            TimeUnit::Days => MICROS_PER_DAY,
            TimeUnit::Months => 30 * MICROS_PER_DAY,
            TimeUnit::Years => 360 * MICROS_PER_DAY,
        }
    }
}

/// Converts raw time values into calendar-aware instants.
///
/// The units string and calendar are parsed once; [`TimeDecoder::decode`]
/// is then a single multiply-add plus a calendar conversion per value.
#[derive(Debug, Clone)]
pub struct TimeDecoder {
    calendar: Calendar,
    unit: TimeUnit,
    reference_micros: i64,
}

impl TimeDecoder {
    /// Build a decoder from the time variable's attributes.
    pub fn new(attrs: &TimeAttributes) -> ExtractResult<Self> {
        Self::from_parts(&attrs.units, &attrs.calendar)
    }

    /// Build a decoder from a units string such as `"days since 1970-01-01"`
    /// and a CF calendar name.
    pub fn from_parts(units: &str, calendar: &str) -> ExtractResult<Self> {
        let calendar: Calendar = calendar.parse()?;

        let lower = units.to_ascii_lowercase();
        let since = lower
            .find(" since ")
            .ok_or_else(|| ExtractError::invalid_time_units(units, "expected '<unit> since <date>'"))?;
        let unit_str = units[..since].trim();
        let reference_str = units[since + " since ".len()..].trim();

        let unit = TimeUnit::parse(unit_str)
            .ok_or_else(|| ExtractError::invalid_time_units(units, format!("unknown unit '{}'", unit_str)))?;
        if matches!(unit, TimeUnit::Months | TimeUnit::Years) && calendar != Calendar::Day360 {
            return Err(ExtractError::invalid_time_units(
                units,
                format!("'{}' offsets are only defined for the 360_day calendar", unit_str),
            ));
        }

        let (reference, utc_offset_micros) = parse_reference(calendar, reference_str)
            .map_err(|message| ExtractError::invalid_time_units(units, message))?;
        let reference = reference.add_micros(-utc_offset_micros)?;
        let reference_micros = reference.to_micros()?;

        Ok(Self {
            calendar,
            unit,
            reference_micros,
        })
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Decode one raw offset, rounded to the nearest microsecond.
    pub fn decode(&self, value: f64) -> ExtractResult<CfDateTime> {
        if !value.is_finite() {
            return Err(ExtractError::InvalidDate(format!("non-finite time value {}", value)));
        }
        let offset = (value * self.unit.micros() as f64).round();
        if offset.abs() >= i64::MAX as f64 {
            return Err(ExtractError::InvalidDate(format!("time value {} out of range", value)));
        }
        let micros = self
            .reference_micros
            .checked_add(offset as i64)
            .ok_or_else(|| ExtractError::InvalidDate(format!("time value {} out of range", value)))?;
        CfDateTime::from_micros(self.calendar, micros)
    }

    /// Decode a whole axis, preserving input order.
    pub fn decode_all(&self, values: &[f64]) -> ExtractResult<Vec<CfDateTime>> {
        values.iter().map(|&v| self.decode(v)).collect()
    }
}

/// Decode a raw time axis using the time variable's attributes.
pub fn decode_times(values: &[f64], attrs: &TimeAttributes) -> ExtractResult<Vec<CfDateTime>> {
    TimeDecoder::new(attrs)?.decode_all(values)
}

/// Parse `YYYY-M-D[( |T)H[:M[:S[.f]]]][Z|UTC|±HH[:MM]]`.
///
/// Returns the local reference and its UTC offset in microseconds.
fn parse_reference(calendar: Calendar, s: &str) -> Result<(CfDateTime, i64), String> {
    let s = s.trim();
    let (negative_year, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let split = body.find(|c: char| c == ' ' || c == 'T').unwrap_or(body.len());
    let date_part = &body[..split];
    let mut rest = body[split..].trim_start_matches([' ', 'T']).trim();

    let mut fields = date_part.split('-');
    let mut next_field = |name: &str| -> Result<u32, String> {
        fields
            .next()
            .ok_or_else(|| format!("missing {} in reference date '{}'", name, s))?
            .parse::<u32>()
            .map_err(|_| format!("invalid {} in reference date '{}'", name, s))
    };
    let year = next_field("year")? as i32;
    let month = next_field("month")?;
    let day = next_field("day")?;
    let year = if negative_year { -year } else { year };

    // Trailing zone designators
    for suffix in ["utc", "gmt", "z"] {
        let Some(cut) = rest.len().checked_sub(suffix.len()) else {
            continue;
        };
        if rest.get(cut..).is_some_and(|tail| tail.eq_ignore_ascii_case(suffix)) {
            rest = rest[..cut].trim();
            break;
        }
    }

    let (clock, zone) = match rest.find(['+', '-']) {
        Some(i) => (rest[..i].trim(), Some(rest[i..].trim())),
        None => {
            let mut tokens = rest.split_whitespace();
            (tokens.next().unwrap_or(""), tokens.next())
        }
    };

    let (hour, minute, second, microsecond) = parse_clock(clock)
        .ok_or_else(|| format!("invalid time of day '{}' in reference '{}'", clock, s))?;
    let offset = match zone {
        Some(z) => parse_utc_offset(z).ok_or_else(|| format!("invalid UTC offset '{}'", z))?,
        None => 0,
    };

    let reference = CfDateTime::new(calendar, year, month, day, hour, minute, second, microsecond)
        .map_err(|e| e.to_string())?;
    Ok((reference, offset))
}

fn parse_clock(clock: &str) -> Option<(u32, u32, u32, u32)> {
    if clock.is_empty() {
        return Some((0, 0, 0, 0));
    }
    let mut parts = clock.split(':');
    let hour = parts.next()?.parse::<u32>().ok()?;
    let minute = match parts.next() {
        Some(m) => m.parse::<u32>().ok()?,
        None => 0,
    };
    let seconds = match parts.next() {
        Some(sec) => sec.parse::<f64>().ok()?,
        None => 0.0,
    };
    if parts.next().is_some() || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let total_micros = (seconds * MICROS_PER_SECOND as f64).round() as i64;
    let whole = (total_micros / MICROS_PER_SECOND).min(59) as u32;
    let micros = (total_micros - whole as i64 * MICROS_PER_SECOND).clamp(0, MICROS_PER_SECOND - 1) as u32;
    Some((hour, minute, whole, micros))
}

fn parse_utc_offset(zone: &str) -> Option<i64> {
    let (sign, digits) = match zone.chars().next()? {
        '+' => (1, &zone[1..]),
        '-' => (-1, &zone[1..]),
        _ => return None,
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h.parse::<i64>().ok()?, m.parse::<i64>().ok()?),
        None if digits.len() == 4 => (
            digits.get(..2)?.parse::<i64>().ok()?,
            digits.get(2..)?.parse::<i64>().ok()?,
        ),
        None => (digits.parse::<i64>().ok()?, 0),
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60) * MICROS_PER_SECOND)
}
