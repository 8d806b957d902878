//! First-available-date search.
//!
//! Walks forward week by week asking the availability calculator for
//! each candidate day. Exhaustion after the bound is a real, typed
//! outcome: callers render "no availability" and must never substitute
//! a fully-booked day.

use chrono::{Days, NaiveDate, Weekday};

/// How many week windows to examine before giving up.
pub const SEARCH_WEEKS: u32 = 8;

/// Search progress. `Searching` holds the week window about to be
/// scanned; the terminal states carry the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Searching { week_offset: u32 },
    Found(NaiveDate),
    Exhausted,
}

/// Terminal result of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(NaiveDate),
    Exhausted,
}

/// Find the earliest date with at least one bookable slot.
///
/// Week windows are calendar weeks starting Monday; week 0 is the week
/// containing `today`, with days before `today` skipped. `has_slots` is
/// the per-day probe (the availability calculator over live data) and
/// may fail — a store error aborts the search rather than guessing.
pub fn first_available_date<E>(
    today: NaiveDate,
    max_weeks: u32,
    mut has_slots: impl FnMut(NaiveDate) -> Result<bool, E>,
) -> Result<SearchOutcome, E> {
    let week_anchor = today.week(Weekday::Mon).first_day();
    let mut state = SearchState::Searching { week_offset: 0 };

    loop {
        state = match state {
            SearchState::Searching { week_offset } if week_offset >= max_weeks => {
                SearchState::Exhausted
            }
            SearchState::Searching { week_offset } => {
                let week_start = week_anchor
                    .checked_add_days(Days::new(u64::from(week_offset) * 7))
                    .unwrap_or(week_anchor);

                let mut found = None;
                for day_offset in 0..7 {
                    let day = match week_start.checked_add_days(Days::new(day_offset)) {
                        Some(d) if d >= today => d,
                        _ => continue,
                    };
                    if has_slots(day)? {
                        found = Some(day);
                        break;
                    }
                }

                match found {
                    Some(day) => SearchState::Found(day),
                    None => SearchState::Searching {
                        week_offset: week_offset + 1,
                    },
                }
            }
            SearchState::Found(day) => return Ok(SearchOutcome::Found(day)),
            SearchState::Exhausted => return Ok(SearchOutcome::Exhausted),
        };
    }
}
