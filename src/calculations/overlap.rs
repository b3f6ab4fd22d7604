use crate::timeline::Timeline;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifies the block a segment came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub index: usize,
    pub label: String,
}

/// A range of days on which both caregivers are on leave.
/// Derived on every render; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapSegment {
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
    pub first: BlockRef,
    pub second: BlockRef,
}

impl OverlapSegment {
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn duration_weeks(&self) -> f64 {
        self.duration_days() as f64 / 7.0
    }

    pub fn label(&self) -> String {
        format!("{} ∩ {}", self.first.label, self.second.label)
    }

    /// The same segment seen from the other timeline.
    pub fn swapped(&self) -> Self {
        Self {
            start_date: self.start_date,
            end_date: self.end_date,
            first: self.second.clone(),
            second: self.first.clone(),
        }
    }
}

/// Pairwise intersection of every block of `a` with every block of `b`.
///
/// O(|a| * |b|); timelines hold a handful of blocks. Result is sorted by
/// start date, then by the block index in `a`, then in `b`.
pub fn compute_overlaps(a: &Timeline, b: &Timeline) -> Vec<OverlapSegment> {
    let intervals_b = b.effective_intervals();
    let mut segments = Vec::new();

    for ia in a.effective_intervals() {
        for ib in &intervals_b {
            let start = ia.start_date.max(ib.start_date);
            let end = ia.end_date.min(ib.end_date);
            // half-open ranges: one shared day means start + 1 == end
            if start < end {
                segments.push(OverlapSegment {
                    start_date: start,
                    end_date: end,
                    first: BlockRef {
                        index: ia.index,
                        label: ia.label.clone(),
                    },
                    second: BlockRef {
                        index: ib.index,
                        label: ib.label.clone(),
                    },
                });
            }
        }
    }

    segments.sort_by(|x, y| {
        x.start_date
            .cmp(&y.start_date)
            .then(x.first.index.cmp(&y.first.index))
            .then(x.second.index.cmp(&y.second.index))
    });
    segments
}
