use chrono::{DateTime, LocalResult, TimeZone, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A nonnegative length of time, in whole seconds.
///
/// Edge costs are always of this type, which is how the traversal rules out
/// negative weights by construction. Durations are only ever computed (from
/// walking distances or schedule differences) and summed onto a day time,
/// so the type carries nothing beyond that.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct PositiveDuration {
    seconds: u32,
}

impl PositiveDuration {
    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds as u64
    }
}

/// A point in time expressed as seconds since midnight of the service day,
/// in the timezone of the query.
///
/// This matches the "Time" notion of gtfs stop_times.txt, where values past
/// 24:00:00 belong to trips that run over midnight. It is also the value
/// carried by every trace of the traversal, so the heap key of the engine
/// is directly an arrival time.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SecondsSinceDayStart {
    seconds: u32,
}

impl SecondsSinceDayStart {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            seconds: seconds + 60 * minutes + 60 * 60 * hours,
        }
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// `None` when `earlier` is in fact later than `self`.
    pub fn duration_since(&self, earlier: &SecondsSinceDayStart) -> Option<PositiveDuration> {
        self.seconds
            .checked_sub(earlier.seconds)
            .map(|seconds| PositiveDuration { seconds })
    }
}

impl std::ops::Add<PositiveDuration> for SecondsSinceDayStart {
    type Output = Self;

    fn add(self, rhs: PositiveDuration) -> Self::Output {
        Self {
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl Display for SecondsSinceDayStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.seconds / 60 / 60,
            self.seconds / 60 % 60,
            self.seconds % 60
        )
    }
}

/// The days of week on which a service calendar runs, as a bitmask.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct DaysPattern {
    bits: u8,
}

impl DaysPattern {
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn from_weekdays<'a, Days>(days: Days) -> Self
    where
        Days: IntoIterator<Item = &'a Weekday>,
    {
        let mut bits = 0u8;
        for day in days {
            bits |= 1 << day.num_days_from_monday();
        }
        Self { bits }
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.bits & (1 << day.num_days_from_monday()) != 0
    }
}

/// Midnight of `datetime`'s local date, in `datetime`'s timezone.
///
/// Returns `None` when local midnight does not exist or is ambiguous on that
/// date (daylight saving transitions); such departures are rejected at the
/// query boundary.
pub fn zone_midnight(datetime: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let local_midnight = datetime.date_naive().and_hms_opt(0, 0, 0)?;
    match datetime.timezone().from_local_datetime(&local_midnight) {
        LocalResult::Single(midnight) => Some(midnight),
        LocalResult::Ambiguous(_, _) | LocalResult::None => None,
    }
}
