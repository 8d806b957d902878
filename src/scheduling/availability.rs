//! Pure slot computation. Same inputs always produce the same output —
//! no clock reads, no storage, safely shared by the availability display
//! and the pre-write check.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::models::{DaySchedule, OccupiedInterval};

/// Candidate grid granularity.
pub const SLOT_STEP_MINUTES: u32 = 10;

/// Compute bookable slot-start times for one day.
///
/// A candidate survives when it starts inside an operating range on a
/// non-past instant, its full duration fits before that range closes,
/// and it overlaps no occupied interval. Overlap is half-open —
/// `candidate_start < occupied_end && occupied_start < candidate_end` —
/// so back-to-back appointments that merely touch are legal.
pub fn available_slots(
    day: NaiveDate,
    schedule: &DaySchedule,
    duration_minutes: u32,
    occupied: &[OccupiedInterval],
    now: NaiveDateTime,
) -> Vec<NaiveTime> {
    if !schedule.enabled || duration_minutes == 0 {
        return Vec::new();
    }
    if day < now.date() {
        return Vec::new();
    }

    let cutoff_minute = if day == now.date() {
        // Today: drop candidates at or before the current wall-clock.
        Some(now.time().hour() * 60 + now.time().minute())
    } else {
        None
    };

    let mut minutes: Vec<u32> = Vec::new();
    for range in &schedule.ranges {
        let mut start = range.start_minute;
        while start + duration_minutes <= range.end_minute {
            let end = start + duration_minutes;
            let past = cutoff_minute.is_some_and(|cutoff| start <= cutoff);
            let taken = occupied.iter().any(|occ| occ.overlaps(start, end));
            if !past && !taken {
                minutes.push(start);
            }
            start += SLOT_STEP_MINUTES;
        }
    }

    minutes.sort_unstable();
    minutes.dedup();
    minutes
        .into_iter()
        .filter_map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
        .collect()
}
