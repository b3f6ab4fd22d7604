use crate::block::{Block, BlockDraft, CaregiverSlot};
use crate::block_validation;
use crate::calculations::overlap::{self, OverlapSegment};
use crate::calendar::HolidayEvent;
use crate::document::PlanDocument;
use crate::error::{PlanError, PlanResult};
use crate::timeline::Timeline;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How [`PlanModel::set_birth_date_with`] treats blocks after the mandatory one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthDatePolicy {
    /// Re-anchor only the mandatory blocks; reject the change if a later
    /// block would then start inside its timeline's mandatory block.
    #[default]
    AnchorMandatory,
    /// Move every block of both timelines by the same number of days.
    ShiftAll,
}

/// One planning session: the shared birth date, both caregivers' timelines
/// and any imported holidays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanModel {
    birth_date: NaiveDate,
    first: Timeline,
    second: Timeline,
    holidays: Vec<HolidayEvent>,
}

impl PlanModel {
    pub fn new(
        birth_date: NaiveDate,
        first_name: impl Into<String>,
        second_name: impl Into<String>,
    ) -> PlanResult<Self> {
        Ok(Self {
            birth_date,
            first: Timeline::new(first_name, CaregiverSlot::First, birth_date)?,
            second: Timeline::new(second_name, CaregiverSlot::Second, birth_date)?,
            holidays: Vec::new(),
        })
    }

    pub(crate) fn from_parts(
        birth_date: NaiveDate,
        first: Timeline,
        second: Timeline,
        holidays: Vec<HolidayEvent>,
    ) -> Self {
        Self {
            birth_date,
            first,
            second,
            holidays,
        }
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn timeline(&self, slot: CaregiverSlot) -> &Timeline {
        match slot {
            CaregiverSlot::First => &self.first,
            CaregiverSlot::Second => &self.second,
        }
    }

    pub fn timelines(&self) -> [&Timeline; 2] {
        [&self.first, &self.second]
    }

    pub fn holidays(&self) -> &[HolidayEvent] {
        &self.holidays
    }

    fn replace_timeline(&mut self, timeline: Timeline) {
        match timeline.slot() {
            CaregiverSlot::First => self.first = timeline,
            CaregiverSlot::Second => self.second = timeline,
        }
    }

    pub fn rename_caregiver(&mut self, slot: CaregiverSlot, name: impl Into<String>) {
        let renamed = self.timeline(slot).rename(name);
        self.replace_timeline(renamed);
    }

    pub fn add_block(&mut self, slot: CaregiverSlot, after_index: usize) -> PlanResult<()> {
        let updated = self.timeline(slot).add_block(after_index)?;
        self.replace_timeline(updated);
        Ok(())
    }

    pub fn add_block_with_weeks(
        &mut self,
        slot: CaregiverSlot,
        after_index: usize,
        weeks: u32,
    ) -> PlanResult<()> {
        let updated = self.timeline(slot).add_block_with_weeks(after_index, weeks)?;
        self.replace_timeline(updated);
        Ok(())
    }

    pub fn remove_block(&mut self, slot: CaregiverSlot, index: usize) -> PlanResult<()> {
        let updated = self.timeline(slot).remove_block(index)?;
        self.replace_timeline(updated);
        Ok(())
    }

    pub fn update_block(
        &mut self,
        slot: CaregiverSlot,
        index: usize,
        draft: BlockDraft,
    ) -> PlanResult<()> {
        let updated = self.timeline(slot).update_block(index, draft)?;
        self.replace_timeline(updated);
        Ok(())
    }

    /// Move the birth date, re-anchoring both mandatory blocks and leaving
    /// every other block where it is.
    pub fn set_birth_date(&mut self, new_date: NaiveDate) -> PlanResult<()> {
        self.set_birth_date_with(new_date, BirthDatePolicy::AnchorMandatory)
    }

    pub fn set_birth_date_with(
        &mut self,
        new_date: NaiveDate,
        policy: BirthDatePolicy,
    ) -> PlanResult<()> {
        if new_date == self.birth_date {
            return Ok(());
        }
        let first = Self::rebase_timeline(&self.first, self.birth_date, new_date, policy)?;
        let second = Self::rebase_timeline(&self.second, self.birth_date, new_date, policy)?;
        tracing::debug!(from = %self.birth_date, to = %new_date, ?policy, "birth date changed");
        self.birth_date = new_date;
        self.first = first;
        self.second = second;
        Ok(())
    }

    fn rebase_timeline(
        timeline: &Timeline,
        old_date: NaiveDate,
        new_date: NaiveDate,
        policy: BirthDatePolicy,
    ) -> PlanResult<Timeline> {
        let mut blocks: Vec<Block> = Vec::with_capacity(timeline.len());
        match policy {
            BirthDatePolicy::AnchorMandatory => {
                let mandatory = timeline.mandatory_block();
                let mut anchored = Block::create_mandatory(timeline.slot(), new_date)?;
                if mandatory.label() != anchored.label() {
                    let mut draft = anchored.to_draft();
                    draft.label = mandatory.label().to_string();
                    anchored = Block::resolve(draft)?;
                }
                let mandatory_end = anchored.end_date();
                blocks.push(anchored);
                for (index, block) in timeline.blocks().iter().enumerate().skip(1) {
                    if block.start_date() < mandatory_end {
                        tracing::warn!(
                            caregiver = %timeline.slot(),
                            index,
                            "birth date change rejected"
                        );
                        return Err(PlanError::MandatoryBlockConflict {
                            caregiver: timeline.slot(),
                            index,
                            start: block.start_date(),
                            mandatory_end,
                        });
                    }
                    blocks.push(block.clone());
                }
            }
            BirthDatePolicy::ShiftAll => {
                let delta = new_date - old_date;
                for block in timeline.blocks() {
                    blocks.push(block.shifted(delta)?);
                }
            }
        }
        Ok(timeline.with_blocks_unchecked(blocks))
    }

    /// Append imported holidays. Duplicates are kept; nothing is added if
    /// any event is malformed.
    pub fn import_holidays(&mut self, events: Vec<HolidayEvent>) -> PlanResult<()> {
        for event in &events {
            block_validation::validate_holiday(event)?;
        }
        tracing::debug!(count = events.len(), "holidays imported");
        self.holidays.extend(events);
        Ok(())
    }

    pub fn overlaps(&self) -> Vec<OverlapSegment> {
        overlap::compute_overlaps(&self.first, &self.second)
    }

    pub fn to_serializable(&self) -> PlanDocument {
        PlanDocument::from_plan(self)
    }

    pub fn from_serializable(document: PlanDocument) -> PlanResult<Self> {
        document.into_plan()
    }

    pub fn to_json_string(&self) -> PlanResult<String> {
        serde_json::to_string_pretty(&self.to_serializable())
            .map_err(|err| PlanError::Validation(format!("plan could not be encoded: {err}")))
    }

    pub fn from_json_str(input: &str) -> PlanResult<Self> {
        let document: PlanDocument = serde_json::from_str(input)
            .map_err(|err| PlanError::deserialization(err.to_string()))?;
        Self::from_serializable(document)
    }
}
