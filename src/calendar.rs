use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An imported calendar entry such as a bank holiday. Both dates are
/// inclusive, so a one-day holiday has `start_date == end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEvent {
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl HolidayEvent {
    pub fn new(label: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            label: label.into(),
            start_date,
            end_date,
        }
    }

    pub fn single_day(label: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(label, date, date)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |day| *day <= self.end_date)
    }
}

/// Which days count as working days when summarising leave.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

impl Default for LeaveCalendar {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl LeaveCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn add_holidays(&mut self, events: &[HolidayEvent]) {
        for event in events {
            self.holidays.extend(event.days());
        }
    }

    /// Replace the working week. An empty list leaves the calendar unchanged.
    pub fn set_working_days(&mut self, days: &[Weekday]) {
        if days.is_empty() {
            return;
        }
        self.non_working_days.clear();
        for day in Self::ALL_WEEKDAYS {
            if !days.contains(&day) {
                self.non_working_days.insert(day);
            }
        }
    }

    pub fn working_days(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !self.non_working_days.contains(day))
            .collect()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// Working days in `[start, end)`.
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let working = start
            .iter_days()
            .take_while(|day| *day < end)
            .filter(|day| self.is_working_day(*day))
            .count();
        working as i64
    }
}
