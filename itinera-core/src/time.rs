//! Same-day clock arithmetic.
//!
//! Itineraries are scheduled on a 24-hour clock that never wraps past
//! midnight: `24:00` is the latest representable time and acts as the
//! end-of-day sentinel for overnight stays. An unset time (the state before
//! the outbound journey) is modelled as `Option<ClockTime>::None` by callers,
//! so it can never leak into arithmetic.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const MINUTES_PER_HOUR: u16 = 60;
const MINUTES_PER_DAY: u16 = 24 * MINUTES_PER_HOUR;

/// Errors raised when parsing `HH:MM` clock strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFormatError {
    /// The input was empty (the unset time).
    #[error("clock time is empty")]
    Empty,
    /// The input did not contain a `:` separator.
    #[error("clock time {input:?} is missing the ':' separator")]
    MissingSeparator {
        /// Text that failed to parse.
        input: String,
    },
    /// The hour component was not a number in `0..=24`.
    #[error("clock time {input:?} has an invalid hour")]
    InvalidHour {
        /// Text that failed to parse.
        input: String,
    },
    /// The minute component was not two digits in `0..=59`.
    #[error("clock time {input:?} has an invalid minute")]
    InvalidMinute {
        /// Text that failed to parse.
        input: String,
    },
    /// The value lies beyond `24:00`.
    #[error("{minutes} minutes is past the end of the day")]
    OutOfRange {
        /// Minutes since midnight that were rejected.
        minutes: u32,
    },
}

/// A time of day with minute resolution, from `00:00` to `24:00` inclusive.
///
/// # Examples
/// ```
/// use itinera_core::ClockTime;
///
/// let noon: ClockTime = "12:00".parse().unwrap();
/// assert_eq!(noon.add_minutes(90).to_string(), "13:30");
/// assert_eq!(noon.add_minutes(1_000), ClockTime::END_OF_DAY);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct ClockTime(u16);

impl ClockTime {
    /// `00:00`.
    pub const MIDNIGHT: Self = Self(0);
    /// `24:00`, the end-of-day sentinel.
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Build a clock time from minutes since midnight.
    pub fn from_minutes(minutes: u32) -> Result<Self, TimeFormatError> {
        u16::try_from(minutes)
            .ok()
            .filter(|value| *value <= MINUTES_PER_DAY)
            .map(Self)
            .ok_or(TimeFormatError::OutOfRange { minutes })
    }

    /// Build a clock time from an hour and minute pair.
    pub fn from_hm(hours: u16, minutes: u16) -> Result<Self, TimeFormatError> {
        if minutes >= MINUTES_PER_HOUR {
            return Err(TimeFormatError::InvalidMinute {
                input: format!("{hours}:{minutes}"),
            });
        }
        Self::from_minutes(u32::from(hours) * u32::from(MINUTES_PER_HOUR) + u32::from(minutes))
    }

    /// Build a clock time from literal hours and minutes, clamping at
    /// `24:00`. Minutes beyond 59 carry into the hour.
    ///
    /// ```
    /// use itinera_core::ClockTime;
    ///
    /// assert_eq!(ClockTime::hm(11, 0).to_string(), "11:00");
    /// assert_eq!(ClockTime::hm(25, 0), ClockTime::END_OF_DAY);
    /// ```
    pub const fn hm(hours: u16, minutes: u16) -> Self {
        let total = hours
            .saturating_mul(MINUTES_PER_HOUR)
            .saturating_add(minutes);
        if total > MINUTES_PER_DAY {
            Self::END_OF_DAY
        } else {
            Self(total)
        }
    }

    /// Minutes since midnight.
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Add `minutes`, clamping at `24:00`.
    pub fn add_minutes(self, minutes: u32) -> Self {
        let total = u32::from(self.0).saturating_add(minutes);
        Self(u16::try_from(total).map_or(MINUTES_PER_DAY, |value| value.min(MINUTES_PER_DAY)))
    }

    /// Minutes from `self` until `later`, zero when `later` is not after `self`.
    pub const fn minutes_until(self, later: Self) -> u16 {
        later.0.saturating_sub(self.0)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / MINUTES_PER_HOUR;
        let minutes = self.0 % MINUTES_PER_HOUR;
        write!(f, "{hours:02}:{minutes:02}")
    }
}

impl FromStr for ClockTime {
    type Err = TimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TimeFormatError::Empty);
        }
        let (hour_text, minute_text) =
            trimmed
                .split_once(':')
                .ok_or_else(|| TimeFormatError::MissingSeparator {
                    input: s.to_owned(),
                })?;
        let hour_ok = (1..=2).contains(&hour_text.len())
            && hour_text.bytes().all(|byte| byte.is_ascii_digit());
        let hours: u16 = hour_ok
            .then(|| hour_text.parse::<u16>().ok())
            .flatten()
            .filter(|hours| *hours <= 24)
            .ok_or_else(|| TimeFormatError::InvalidHour {
                input: s.to_owned(),
            })?;
        let minute_ok =
            minute_text.len() == 2 && minute_text.bytes().all(|byte| byte.is_ascii_digit());
        let minutes: u16 = minute_ok
            .then(|| minute_text.parse::<u16>().ok())
            .flatten()
            .filter(|minutes| *minutes < MINUTES_PER_HOUR)
            .ok_or_else(|| TimeFormatError::InvalidMinute {
                input: s.to_owned(),
            })?;
        Self::from_hm(hours, minutes)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Return whether clock time `a` is at or before `b`.
///
/// Both inputs are `HH:MM` strings. The empty string is the unset time and is
/// rejected with [`TimeFormatError::Empty`]; callers must handle it before
/// comparing.
///
/// # Examples
/// ```
/// use itinera_core::time_compare_if_earlier_equal;
///
/// assert_eq!(time_compare_if_earlier_equal("09:30", "10:00"), Ok(true));
/// assert_eq!(time_compare_if_earlier_equal("10:00", "10:00"), Ok(true));
/// assert_eq!(time_compare_if_earlier_equal("23:59", "08:00"), Ok(false));
/// assert!(time_compare_if_earlier_equal("", "08:00").is_err());
/// ```
pub fn time_compare_if_earlier_equal(a: &str, b: &str) -> Result<bool, TimeFormatError> {
    Ok(a.parse::<ClockTime>()? <= b.parse::<ClockTime>()?)
}

/// Add `minutes` to an `HH:MM` start time, clamping at `24:00`.
///
/// # Examples
/// ```
/// use itinera_core::add_time_delta;
///
/// assert_eq!(add_time_delta("11:00", 60).unwrap().to_string(), "12:00");
/// assert_eq!(add_time_delta("23:30", 90).unwrap().to_string(), "24:00");
/// ```
pub fn add_time_delta(start: &str, minutes: u32) -> Result<ClockTime, TimeFormatError> {
    Ok(start.parse::<ClockTime>()?.add_minutes(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("00:00", 0)]
    #[case("8:05", 485)]
    #[case("13:45", 825)]
    #[case("24:00", 1440)]
    fn parses_clock_strings(#[case] input: &str, #[case] minutes: u16) {
        let parsed: ClockTime = input.parse().expect("valid clock string");
        assert_eq!(parsed.minutes(), minutes);
    }

    #[rstest]
    #[case("", TimeFormatError::Empty)]
    #[case("1200", TimeFormatError::MissingSeparator { input: "1200".into() })]
    #[case("25:00", TimeFormatError::InvalidHour { input: "25:00".into() })]
    #[case("ab:00", TimeFormatError::InvalidHour { input: "ab:00".into() })]
    #[case("12:60", TimeFormatError::InvalidMinute { input: "12:60".into() })]
    #[case("12:5", TimeFormatError::InvalidMinute { input: "12:5".into() })]
    #[case("24:30", TimeFormatError::OutOfRange { minutes: 1470 })]
    fn rejects_malformed_strings(#[case] input: &str, #[case] expected: TimeFormatError) {
        assert_eq!(input.parse::<ClockTime>(), Err(expected));
    }

    #[rstest]
    fn displays_zero_padded() {
        let time = ClockTime::from_hm(7, 5).expect("valid time");
        assert_eq!(time.to_string(), "07:05");
        assert_eq!(ClockTime::END_OF_DAY.to_string(), "24:00");
    }

    #[rstest]
    fn adding_clamps_to_end_of_day() {
        let late = ClockTime::from_hm(23, 0).expect("valid time");
        assert_eq!(late.add_minutes(30).to_string(), "23:30");
        assert_eq!(late.add_minutes(120), ClockTime::END_OF_DAY);
        assert_eq!(late.add_minutes(u32::MAX), ClockTime::END_OF_DAY);
    }

    #[rstest]
    fn minutes_until_saturates() {
        let morning = ClockTime::from_hm(9, 0).expect("valid time");
        let noon = ClockTime::from_hm(12, 0).expect("valid time");
        assert_eq!(morning.minutes_until(noon), 180);
        assert_eq!(noon.minutes_until(morning), 0);
    }

    #[rstest]
    #[case("09:59", "10:00", true)]
    #[case("10:00", "10:00", true)]
    #[case("10:01", "10:00", false)]
    #[case("23:00", "24:00", true)]
    fn compares_string_times(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
        assert_eq!(time_compare_if_earlier_equal(a, b), Ok(expected));
    }

    #[rstest]
    fn unset_time_is_not_comparable() {
        assert_eq!(
            time_compare_if_earlier_equal("", "10:00"),
            Err(TimeFormatError::Empty)
        );
        assert_eq!(add_time_delta("", 10), Err(TimeFormatError::Empty));
    }
}
