use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One operating range within a day, in minutes since midnight.
/// Invariant: `start_minute < end_minute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl TimeRange {
    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    pub fn contains_interval(&self, start: u32, end: u32) -> bool {
        self.start_minute <= start && end <= self.end_minute
    }
}

/// Operating hours for a single weekday. A day with breaks carries
/// several ranges; a plain open-to-close day carries one. Empty ranges
/// with `enabled = true` never happens in stored data but is treated as
/// closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub enabled: bool,
    pub ranges: Vec<TimeRange>,
}

impl DaySchedule {
    pub fn closed() -> Self {
        Self {
            enabled: false,
            ranges: Vec::new(),
        }
    }

    pub fn open(ranges: Vec<TimeRange>) -> Self {
        Self {
            enabled: !ranges.is_empty(),
            ranges,
        }
    }
}

/// Per-tenant weekly operating hours, indexed Monday = 0 .. Sunday = 6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub days: [DaySchedule; 7],
}

impl WeeklySchedule {
    pub fn closed() -> Self {
        Self {
            days: std::array::from_fn(|_| DaySchedule::closed()),
        }
    }

    pub fn day(&self, date: NaiveDate) -> &DaySchedule {
        &self.days[weekday_index(date.weekday())]
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut DaySchedule {
        &mut self.days[weekday_index(weekday)]
    }
}

pub fn weekday_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_contains_interval() {
        let range = TimeRange::new(540, 1020); // 09:00-17:00
        assert!(range.contains_interval(540, 600));
        assert!(range.contains_interval(960, 1020));
        assert!(!range.contains_interval(530, 590));
        assert!(!range.contains_interval(990, 1050));
    }

    #[test]
    fn open_with_no_ranges_is_closed() {
        let day = DaySchedule::open(Vec::new());
        assert!(!day.enabled);
    }

    #[test]
    fn weekly_lookup_by_date() {
        let mut schedule = WeeklySchedule::closed();
        schedule.day_mut(Weekday::Wed).enabled = true;
        schedule
            .day_mut(Weekday::Wed)
            .ranges
            .push(TimeRange::new(540, 720));

        // 2025-06-11 is a Wednesday
        let wed = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        assert!(schedule.day(wed).enabled);

        let thu = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
        assert!(!schedule.day(thu).enabled);
    }
}
