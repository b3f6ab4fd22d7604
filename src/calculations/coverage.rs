use crate::calculations::overlap::OverlapSegment;
use crate::timeline::Timeline;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub first_leave_days: i64,
    pub second_leave_days: i64,
    pub overlap_days: i64,
    /// Days on which at least one caregiver is on leave.
    pub covered_days: i64,
    /// First day from the birth date on which nobody is on leave.
    pub coverage_end: NaiveDate,
    /// Uncovered days between the birth date and the last covered day.
    pub gap_days: i64,
    pub latest_return: Option<NaiveDate>,
}

impl PlanSummary {
    pub fn compute(
        birth_date: NaiveDate,
        first: &Timeline,
        second: &Timeline,
        overlaps: &[OverlapSegment],
    ) -> Self {
        let first_ranges = ranges_of(first);
        let second_ranges = ranges_of(second);
        let mut all = first_ranges.clone();
        all.extend(second_ranges.iter().copied());
        let combined = merge_ranges(all);

        let overlap_ranges = merge_ranges(
            overlaps
                .iter()
                .map(|segment| (segment.start_date, segment.end_date))
                .collect(),
        );

        let coverage_end = combined
            .iter()
            .find(|(start, end)| *start <= birth_date && birth_date < *end)
            .map(|(_, end)| *end)
            .unwrap_or(birth_date);

        let latest_return = combined.iter().map(|(_, end)| *end).max();
        let gap_days = match latest_return {
            Some(last) if last > birth_date => {
                let clipped: i64 = combined
                    .iter()
                    .map(|(start, end)| {
                        let start = (*start).max(birth_date);
                        if start < *end {
                            (*end - start).num_days()
                        } else {
                            0
                        }
                    })
                    .sum();
                (last - birth_date).num_days() - clipped
            }
            _ => 0,
        };

        Self {
            first_leave_days: total_days(&merge_ranges(first_ranges)),
            second_leave_days: total_days(&merge_ranges(second_ranges)),
            overlap_days: total_days(&overlap_ranges),
            covered_days: total_days(&combined),
            coverage_end,
            gap_days,
            latest_return,
        }
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("first={}d", self.first_leave_days));
        parts.push(format!("second={}d", self.second_leave_days));
        parts.push(format!("overlap={}d", self.overlap_days));
        parts.push(format!("covered={}d", self.covered_days));
        parts.push(format!("continuous_until={}", self.coverage_end));
        if self.gap_days > 0 {
            parts.push(format!("gaps={}d", self.gap_days));
        }
        if let Some(date) = self.latest_return {
            parts.push(format!("last_return={date}"));
        }
        parts.join(" ")
    }
}

fn ranges_of(timeline: &Timeline) -> Vec<(NaiveDate, NaiveDate)> {
    timeline
        .effective_intervals()
        .into_iter()
        .map(|interval| (interval.start_date, interval.end_date))
        .collect()
}

/// Union of half-open ranges, sorted, with touching ranges joined and empty
/// ranges dropped.
pub fn merge_ranges(mut ranges: Vec<(NaiveDate, NaiveDate)>) -> Vec<(NaiveDate, NaiveDate)> {
    ranges.retain(|(start, end)| start < end);
    ranges.sort();
    let mut merged: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => {
                if end > last.1 {
                    last.1 = end;
                }
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn total_days(ranges: &[(NaiveDate, NaiveDate)]) -> i64 {
    ranges
        .iter()
        .map(|(start, end)| (*end - *start).num_days())
        .sum()
}
