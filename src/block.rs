use crate::block_validation;
use crate::error::{PlanError, PlanResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of the mandatory first block of every timeline.
pub const MANDATORY_WEEKS: u32 = 6;

/// Length given to a block created with "Add block".
pub const DEFAULT_FOLLOWING_WEEKS: u32 = 1;

pub const MANDATORY_LABEL: &str = "Block 1 (Mandatory)";

/// Which of the two caregivers a timeline (and its blocks) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaregiverSlot {
    First,
    Second,
}

impl CaregiverSlot {
    pub const ALL: [CaregiverSlot; 2] = [CaregiverSlot::First, CaregiverSlot::Second];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaregiverSlot::First => "first",
            CaregiverSlot::Second => "second",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            CaregiverSlot::First => CaregiverSlot::Second,
            CaregiverSlot::Second => CaregiverSlot::First,
        }
    }
}

impl fmt::Display for CaregiverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaregiverSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "a" | "1" => Ok(CaregiverSlot::First),
            "second" | "b" | "2" => Ok(CaregiverSlot::Second),
            other => Err(format!("unknown caregiver '{other}' (use first|second)")),
        }
    }
}

/// Which field of a block is the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockMode {
    /// `duration_weeks` is stored, `end_date` derived.
    Duration,
    /// `end_date` is stored, weeks derived for display only.
    EndDate,
}

impl BlockMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockMode::Duration => "duration",
            BlockMode::EndDate => "end_date",
        }
    }
}

/// Raw, unvalidated block input as a form would collect it.
///
/// `duration_weeks` is a float on purpose: fractional input must reach
/// [`Block::resolve`] so it can be rejected there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDraft {
    pub label: String,
    pub mode: BlockMode,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_mandatory: bool,
    pub caregiver: CaregiverSlot,
}

impl BlockDraft {
    pub fn with_weeks(
        caregiver: CaregiverSlot,
        label: impl Into<String>,
        start_date: NaiveDate,
        weeks: f64,
    ) -> Self {
        Self {
            label: label.into(),
            mode: BlockMode::Duration,
            start_date,
            duration_weeks: Some(weeks),
            end_date: None,
            is_mandatory: false,
            caregiver,
        }
    }

    pub fn with_end_date(
        caregiver: CaregiverSlot,
        label: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            label: label.into(),
            mode: BlockMode::EndDate,
            start_date,
            duration_weeks: None,
            end_date: Some(end_date),
            is_mandatory: false,
            caregiver,
        }
    }
}

/// One leave interval of one caregiver, covering `[start_date, end_date)`.
///
/// Blocks are values: edits go through [`Block::to_draft`] and
/// [`Block::resolve`] and replace the old block wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    label: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration_weeks: Option<u32>,
    mode: BlockMode,
    is_mandatory: bool,
    caregiver: CaregiverSlot,
}

impl Block {
    pub fn create_mandatory(caregiver: CaregiverSlot, birth_date: NaiveDate) -> PlanResult<Self> {
        let end_date = block_validation::end_after_weeks(birth_date, MANDATORY_WEEKS)?;
        Ok(Self {
            label: MANDATORY_LABEL.to_string(),
            start_date: birth_date,
            end_date,
            duration_weeks: Some(MANDATORY_WEEKS),
            mode: BlockMode::Duration,
            is_mandatory: true,
            caregiver,
        })
    }

    /// New block starting the day after the previous block's last leave day,
    /// which is the previous block's (exclusive) `end_date`.
    pub fn create_following(
        caregiver: CaregiverSlot,
        previous_end_date: NaiveDate,
        index: usize,
    ) -> PlanResult<Self> {
        Self::create_following_with_weeks(
            caregiver,
            previous_end_date,
            index,
            DEFAULT_FOLLOWING_WEEKS,
        )
    }

    pub fn create_following_with_weeks(
        caregiver: CaregiverSlot,
        previous_end_date: NaiveDate,
        index: usize,
        weeks: u32,
    ) -> PlanResult<Self> {
        let end_date = block_validation::end_after_weeks(previous_end_date, weeks)?;
        Ok(Self {
            label: format!("Block {index}"),
            start_date: previous_end_date,
            end_date,
            duration_weeks: Some(weeks),
            mode: BlockMode::Duration,
            is_mandatory: false,
            caregiver,
        })
    }

    /// Validate raw input and derive whichever field the mode does not store.
    pub fn resolve(draft: BlockDraft) -> PlanResult<Self> {
        let BlockDraft {
            label,
            mode,
            start_date,
            duration_weeks,
            end_date,
            is_mandatory,
            caregiver,
        } = draft;

        let (end_date, duration_weeks) = match mode {
            BlockMode::Duration => {
                let weeks = duration_weeks.ok_or_else(|| {
                    PlanError::validation("duration mode requires duration_weeks")
                })?;
                let weeks = block_validation::validate_duration_weeks(weeks)?;
                let end = block_validation::end_after_weeks(start_date, weeks)?;
                (end, Some(weeks))
            }
            BlockMode::EndDate => {
                let end = end_date.ok_or_else(|| {
                    PlanError::validation("end_date mode requires end_date")
                })?;
                block_validation::validate_range(start_date, end)?;
                (end, None)
            }
        };

        Ok(Self {
            label,
            start_date,
            end_date,
            duration_weeks,
            mode,
            is_mandatory,
            caregiver,
        })
    }

    pub fn to_draft(&self) -> BlockDraft {
        BlockDraft {
            label: self.label.clone(),
            mode: self.mode,
            start_date: self.start_date,
            duration_weeks: self.duration_weeks.map(f64::from),
            end_date: match self.mode {
                BlockMode::Duration => None,
                BlockMode::EndDate => Some(self.end_date),
            },
            is_mandatory: self.is_mandatory,
            caregiver: self.caregiver,
        }
    }

    /// Same block moved by `days` (negative moves it earlier).
    pub(crate) fn shifted(&self, days: chrono::Duration) -> PlanResult<Self> {
        let start_date = self.start_date.checked_add_signed(days);
        let end_date = self.end_date.checked_add_signed(days);
        match (start_date, end_date) {
            (Some(start_date), Some(end_date)) => Ok(Self {
                start_date,
                end_date,
                ..self.clone()
            }),
            _ => Err(PlanError::validation(format!(
                "moving '{}' by {} days leaves the supported calendar",
                self.label,
                days.num_days()
            ))),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// First day after the block (exclusive bound).
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Last leave day, or `None` for a zero-length block.
    pub fn last_day(&self) -> Option<NaiveDate> {
        if self.end_date > self.start_date {
            self.end_date.pred_opt()
        } else {
            None
        }
    }

    /// Stored weeks; `None` in end-date mode.
    pub fn duration_weeks(&self) -> Option<u32> {
        self.duration_weeks
    }

    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Possibly fractional weeks, for display in either mode.
    pub fn duration_weeks_display(&self) -> f64 {
        self.duration_days() as f64 / 7.0
    }

    pub fn mode(&self) -> BlockMode {
        self.mode
    }

    pub fn is_mandatory(&self) -> bool {
        self.is_mandatory
    }

    pub fn caregiver(&self) -> CaregiverSlot {
        self.caregiver
    }
}
