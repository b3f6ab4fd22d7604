use crate::block::{Block, BlockMode, CaregiverSlot, MANDATORY_WEEKS};
use crate::calendar::HolidayEvent;
use crate::error::{PlanError, PlanResult};
use chrono::{Days, NaiveDate};

const EPSILON: f64 = 1e-9;

fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Whole, non-negative weeks only. Returns the integral week count.
pub fn validate_duration_weeks(weeks: f64) -> PlanResult<u32> {
    if !weeks.is_finite() {
        return Err(PlanError::validation(format!(
            "duration_weeks must be a finite number (got {weeks})"
        )));
    }
    if weeks < 0.0 {
        return Err(PlanError::validation(format!(
            "duration_weeks must not be negative (got {weeks})"
        )));
    }
    let whole = weeks.round();
    if !approx_equal(weeks, whole) {
        return Err(PlanError::validation(format!(
            "duration_weeks must be a whole number of weeks (got {weeks})"
        )));
    }
    if whole > f64::from(u32::MAX) {
        return Err(PlanError::validation(format!(
            "duration_weeks {weeks} is out of range"
        )));
    }
    Ok(whole as u32)
}

pub fn end_after_weeks(start: NaiveDate, weeks: u32) -> PlanResult<NaiveDate> {
    start
        .checked_add_days(Days::new(u64::from(weeks) * 7))
        .ok_or_else(|| {
            PlanError::validation(format!(
                "{weeks} weeks after {start} is outside the supported calendar"
            ))
        })
}

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> PlanResult<()> {
    if end < start {
        return Err(PlanError::validation(format!(
            "end_date {end} is before start_date {start}"
        )));
    }
    Ok(())
}

/// The first block of a timeline is pinned to the birth date and six weeks;
/// only its label may differ.
pub fn validate_mandatory(block: &Block, birth_date: NaiveDate) -> PlanResult<()> {
    if !block.is_mandatory() {
        return Err(PlanError::immutable(
            "the first block must stay mandatory",
        ));
    }
    if block.start_date() != birth_date {
        return Err(PlanError::immutable(format!(
            "the mandatory block must start on the birth date {birth_date} (got {})",
            block.start_date()
        )));
    }
    if block.mode() != BlockMode::Duration || block.duration_weeks() != Some(MANDATORY_WEEKS) {
        return Err(PlanError::immutable(format!(
            "the mandatory block is fixed at {MANDATORY_WEEKS} weeks"
        )));
    }
    Ok(())
}

pub fn validate_optional_block(block: &Block, index: usize) -> PlanResult<()> {
    if block.is_mandatory() {
        return Err(PlanError::validation(format!(
            "block {index} cannot be mandatory; only the first block is"
        )));
    }
    Ok(())
}

pub fn validate_block_collection(
    blocks: &[Block],
    slot: CaregiverSlot,
    birth_date: NaiveDate,
) -> PlanResult<()> {
    let Some(first) = blocks.first() else {
        return Err(PlanError::validation(format!(
            "{slot} timeline has no blocks"
        )));
    };
    validate_mandatory(first, birth_date)?;
    for (idx, block) in blocks.iter().enumerate() {
        if block.caregiver() != slot {
            return Err(PlanError::validation(format!(
                "block {idx} belongs to {} but sits in the {slot} timeline",
                block.caregiver()
            )));
        }
        if idx > 0 {
            validate_optional_block(block, idx)?;
        }
    }
    Ok(())
}

pub fn validate_holiday(event: &HolidayEvent) -> PlanResult<()> {
    if event.end_date < event.start_date {
        return Err(PlanError::validation(format!(
            "holiday '{}' ends {} before it starts {}",
            event.label, event.end_date, event.start_date
        )));
    }
    Ok(())
}
