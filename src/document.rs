//! Plain-data shape of a plan, as stored in the "last plan" file and
//! exchanged over the HTTP API.

use crate::block::{Block, BlockDraft, BlockMode, CaregiverSlot};
use crate::block_validation;
use crate::calendar::HolidayEvent;
use crate::error::{PlanError, PlanResult};
use crate::plan::PlanModel;
use crate::timeline::Timeline;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub birth_date: NaiveDate,
    pub caregivers: Vec<CaregiverRecord>,
    #[serde(default)]
    pub holidays: Vec<HolidayEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaregiverRecord {
    pub name: String,
    pub blocks: Vec<BlockRecord>,
}

/// A stored block carries exactly the field its mode designates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub label: String,
    pub mode: BlockMode,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub is_mandatory: bool,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        let (duration_weeks, end_date) = match block.mode() {
            BlockMode::Duration => (block.duration_weeks(), None),
            BlockMode::EndDate => (None, Some(block.end_date())),
        };
        Self {
            label: block.label().to_string(),
            mode: block.mode(),
            start_date: block.start_date(),
            duration_weeks,
            end_date,
            is_mandatory: block.is_mandatory(),
        }
    }
}

impl BlockRecord {
    fn into_block(self, slot: CaregiverSlot, position: usize) -> PlanResult<Block> {
        match (self.mode, self.duration_weeks, self.end_date) {
            (BlockMode::Duration, Some(_), None) | (BlockMode::EndDate, None, Some(_)) => {}
            (mode, _, _) => {
                return Err(PlanError::deserialization(format!(
                    "{slot} block {position} in {} mode must store exactly {}",
                    mode.as_str(),
                    match mode {
                        BlockMode::Duration => "duration_weeks",
                        BlockMode::EndDate => "end_date",
                    }
                )));
            }
        }
        let draft = BlockDraft {
            label: self.label,
            mode: self.mode,
            start_date: self.start_date,
            duration_weeks: self.duration_weeks.map(f64::from),
            end_date: self.end_date,
            is_mandatory: self.is_mandatory,
            caregiver: slot,
        };
        Block::resolve(draft).map_err(|err| {
            PlanError::deserialization(format!("{slot} block {position}: {err}"))
        })
    }
}

impl PlanDocument {
    pub fn from_plan(plan: &PlanModel) -> Self {
        let caregivers = plan
            .timelines()
            .into_iter()
            .map(|timeline| CaregiverRecord {
                name: timeline.caregiver_name().to_string(),
                blocks: timeline.blocks().iter().map(BlockRecord::from).collect(),
            })
            .collect();
        Self {
            birth_date: plan.birth_date(),
            caregivers,
            holidays: plan.holidays().to_vec(),
        }
    }

    /// Rebuild and fully validate a plan. Any structural problem is reported
    /// as [`PlanError::Deserialization`].
    pub fn into_plan(self) -> PlanResult<PlanModel> {
        let Self {
            birth_date,
            caregivers,
            holidays,
        } = self;

        let [first, second]: [CaregiverRecord; 2] = caregivers.try_into().map_err(
            |records: Vec<CaregiverRecord>| {
                PlanError::deserialization(format!(
                    "expected exactly 2 caregivers, found {}",
                    records.len()
                ))
            },
        )?;

        let first = Self::timeline_from_record(first, CaregiverSlot::First, birth_date)?;
        let second = Self::timeline_from_record(second, CaregiverSlot::Second, birth_date)?;

        for event in &holidays {
            block_validation::validate_holiday(event)
                .map_err(|err| PlanError::deserialization(err.to_string()))?;
        }

        Ok(PlanModel::from_parts(birth_date, first, second, holidays))
    }

    fn timeline_from_record(
        record: CaregiverRecord,
        slot: CaregiverSlot,
        birth_date: NaiveDate,
    ) -> PlanResult<Timeline> {
        let blocks = record
            .blocks
            .into_iter()
            .enumerate()
            .map(|(position, block)| block.into_block(slot, position))
            .collect::<PlanResult<Vec<_>>>()?;
        Timeline::from_blocks(record.name, slot, birth_date, blocks)
            .map_err(|err| PlanError::deserialization(format!("{slot} caregiver: {err}")))
    }
}
