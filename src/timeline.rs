use crate::block::{Block, BlockDraft, CaregiverSlot};
use crate::block_validation;
use crate::error::{PlanError, PlanResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A block's date range as handed to the overlap engine and renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInterval {
    /// Position of the block in its timeline (entry order).
    pub index: usize,
    pub label: String,
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
}

impl LeaveInterval {
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// The ordered blocks of one caregiver. Index 0 is always the mandatory
/// block; the rest keep the order they were entered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    caregiver_name: String,
    slot: CaregiverSlot,
    blocks: Vec<Block>,
}

impl Timeline {
    pub fn new(
        caregiver_name: impl Into<String>,
        slot: CaregiverSlot,
        birth_date: NaiveDate,
    ) -> PlanResult<Self> {
        Ok(Self {
            caregiver_name: caregiver_name.into(),
            slot,
            blocks: vec![Block::create_mandatory(slot, birth_date)?],
        })
    }

    /// Rebuild a timeline from stored blocks, checking the mandatory-first
    /// invariants against `birth_date`.
    pub fn from_blocks(
        caregiver_name: impl Into<String>,
        slot: CaregiverSlot,
        birth_date: NaiveDate,
        blocks: Vec<Block>,
    ) -> PlanResult<Self> {
        block_validation::validate_block_collection(&blocks, slot, birth_date)?;
        Ok(Self {
            caregiver_name: caregiver_name.into(),
            slot,
            blocks,
        })
    }

    pub fn caregiver_name(&self) -> &str {
        &self.caregiver_name
    }

    pub fn slot(&self) -> CaregiverSlot {
        self.slot
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> PlanResult<&Block> {
        self.blocks.get(index).ok_or(PlanError::InvalidIndex {
            index,
            len: self.blocks.len(),
        })
    }

    pub fn mandatory_block(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn rename(&self, caregiver_name: impl Into<String>) -> Self {
        Self {
            caregiver_name: caregiver_name.into(),
            ..self.clone()
        }
    }

    pub fn add_block(&self, after_index: usize) -> PlanResult<Self> {
        self.add_block_with_weeks(after_index, crate::block::DEFAULT_FOLLOWING_WEEKS)
    }

    /// Append a block chained to the end of the block at `after_index`.
    pub fn add_block_with_weeks(&self, after_index: usize, weeks: u32) -> PlanResult<Self> {
        let anchor = self.block(after_index)?;
        let block = Block::create_following_with_weeks(
            self.slot,
            anchor.end_date(),
            self.next_block_number(),
            weeks,
        )?;
        let mut blocks = self.blocks.clone();
        blocks.push(block);
        tracing::debug!(caregiver = %self.slot, after_index, "block added");
        Ok(Self {
            blocks,
            ..self.clone()
        })
    }

    /// One past the highest `Block N` label in use, so a number freed by a
    /// delete is never handed out again while a later block still holds it.
    fn next_block_number(&self) -> usize {
        let highest = self
            .blocks
            .iter()
            .filter_map(|block| {
                let rest = block.label().strip_prefix("Block ")?;
                let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                digits.parse::<usize>().ok()
            })
            .max()
            .unwrap_or(0);
        highest.max(self.blocks.len()) + 1
    }

    /// Remove a non-mandatory block. Later blocks keep their dates.
    pub fn remove_block(&self, index: usize) -> PlanResult<Self> {
        if index == 0 {
            return Err(PlanError::immutable(
                "the mandatory block cannot be deleted",
            ));
        }
        self.block(index)?;
        let mut blocks = self.blocks.clone();
        blocks.remove(index);
        tracing::debug!(caregiver = %self.slot, index, "block removed");
        Ok(Self {
            blocks,
            ..self.clone()
        })
    }

    /// Replace the block at `index` with the resolved `draft`.
    ///
    /// For the mandatory block only the label may change; the draft's other
    /// fields must match the pinned values.
    pub fn update_block(&self, index: usize, draft: BlockDraft) -> PlanResult<Self> {
        let current = self.block(index)?;
        if draft.caregiver != self.slot {
            return Err(PlanError::validation(format!(
                "block belongs to {} but is being stored in the {} timeline",
                draft.caregiver, self.slot
            )));
        }
        let block = Block::resolve(draft)?;
        if index == 0 {
            block_validation::validate_mandatory(&block, current.start_date())?;
        } else {
            block_validation::validate_optional_block(&block, index)?;
        }
        let mut blocks = self.blocks.clone();
        blocks[index] = block;
        tracing::debug!(caregiver = %self.slot, index, "block updated");
        Ok(Self {
            blocks,
            ..self.clone()
        })
    }

    /// Every block in entry order, unsorted and unmerged.
    pub fn effective_intervals(&self) -> Vec<LeaveInterval> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| LeaveInterval {
                index,
                label: block.label().to_string(),
                start_date: block.start_date(),
                end_date: block.end_date(),
            })
            .collect()
    }

    /// Pairs of this caregiver's own blocks that share at least one day.
    /// Advisory only; overlapping one's own blocks is allowed.
    pub fn self_overlaps(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.blocks.iter().enumerate() {
            for (j, b) in self.blocks.iter().enumerate().skip(i + 1) {
                if a.start_date().max(b.start_date()) < a.end_date().min(b.end_date()) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    pub(crate) fn with_blocks_unchecked(&self, blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..self.clone()
        }
    }
}
