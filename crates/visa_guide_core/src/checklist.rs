//! crates/visa_guide_core/src/checklist.rs
//!
//! The 11-item checklist widget state and its mapping to timeline steps.

use std::collections::{BTreeMap, BTreeSet};

use crate::content::CHECKLIST_ITEMS;
use crate::error::FlowError;
use crate::timeline::StepId;

/// Which checklist item a completed step ticks.
const STEP_TO_CHECKLIST: [(StepId, usize); 6] = [
    (StepId::UnconditionalOffer, 0),
    (StepId::Cas, 0),
    (StepId::Atas, 1),
    (StepId::TbTest, 2),
    (StepId::VisaApplication, 4),
    (StepId::DecisionVisaIssuance, 9),
];

/// The step whose instructions explain a checklist item. Item 3 (financial
/// evidence) has no dedicated step.
const CHECKLIST_TO_STEP: [Option<StepId>; 11] = [
    Some(StepId::Cas),
    Some(StepId::Atas),
    Some(StepId::TbTest),
    None,
    Some(StepId::VisaApplication),
    Some(StepId::VisaApplication),
    Some(StepId::VisaApplication),
    Some(StepId::VisaApplication),
    Some(StepId::DecisionVisaIssuance),
    Some(StepId::DecisionVisaIssuance),
    Some(StepId::DecisionVisaIssuance),
];

pub fn checklist_index_for_step(step: StepId) -> Option<usize> {
    STEP_TO_CHECKLIST
        .iter()
        .find(|(s, _)| *s == step)
        .map(|(_, index)| *index)
}

pub fn step_for_checklist_index(index: usize) -> Option<StepId> {
    CHECKLIST_TO_STEP.get(index).copied().flatten()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistState {
    checked: BTreeSet<usize>,
}

impl ChecklistState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the state from its persisted form, skipping keys that are
    /// not valid indices.
    pub fn from_persisted(map: &BTreeMap<String, bool>) -> Self {
        let checked = map
            .iter()
            .filter(|(_, checked)| **checked)
            .filter_map(|(key, _)| key.parse::<usize>().ok())
            .filter(|index| *index < CHECKLIST_ITEMS.len())
            .collect();
        Self { checked }
    }

    fn ensure_index(index: usize) -> Result<(), FlowError> {
        if index < CHECKLIST_ITEMS.len() {
            Ok(())
        } else {
            Err(FlowError::ChecklistIndexOutOfRange(index))
        }
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.contains(&index)
    }

    /// Returns whether the state changed.
    pub fn set(&mut self, index: usize, checked: bool) -> Result<bool, FlowError> {
        Self::ensure_index(index)?;
        Ok(if checked {
            self.checked.insert(index)
        } else {
            self.checked.remove(&index)
        })
    }

    /// Returns the new checked state of the item.
    pub fn toggle(&mut self, index: usize) -> Result<bool, FlowError> {
        let now_checked = !self.is_checked(index);
        self.set(index, now_checked)?;
        Ok(now_checked)
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    /// Percentage of items checked, rounded to the nearest whole number.
    pub fn progress_percent(&self) -> u8 {
        let ratio = self.checked.len() as f64 / CHECKLIST_ITEMS.len() as f64;
        (ratio * 100.0).round() as u8
    }

    pub fn to_persisted(&self) -> BTreeMap<String, bool> {
        self.checked.iter().map(|index| (index.to_string(), true)).collect()
    }

    /// Items in display order with their checked state.
    pub fn items(&self) -> impl Iterator<Item = (usize, &'static str, bool)> + '_ {
        CHECKLIST_ITEMS
            .iter()
            .enumerate()
            .map(|(index, text)| (index, *text, self.is_checked(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn both_offer_and_cas_tick_the_first_item() {
        assert_eq!(checklist_index_for_step(StepId::UnconditionalOffer), Some(0));
        assert_eq!(checklist_index_for_step(StepId::Cas), Some(0));
        assert_eq!(checklist_index_for_step(StepId::DecisionVisaIssuance), Some(9));
        assert_eq!(checklist_index_for_step(StepId::ProcessingWait), None);
    }

    #[test]
    fn reverse_mapping_covers_every_item() {
        assert_eq!(step_for_checklist_index(3), None);
        assert_eq!(step_for_checklist_index(7), Some(StepId::VisaApplication));
        assert_eq!(step_for_checklist_index(11), None);
    }

    #[test]
    fn toggling_flips_and_reports_state() {
        let mut state = ChecklistState::new();
        assert!(state.toggle(2).unwrap());
        assert!(state.is_checked(2));
        assert!(!state.toggle(2).unwrap());
        assert!(!state.is_checked(2));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut state = ChecklistState::new();
        assert_matches!(state.set(11, true), Err(FlowError::ChecklistIndexOutOfRange(11)));
        assert_eq!(state.checked_count(), 0);
    }

    #[test]
    fn progress_rounds_to_whole_percent() {
        let mut state = ChecklistState::new();
        assert_eq!(state.progress_percent(), 0);
        state.set(0, true).unwrap();
        assert_eq!(state.progress_percent(), 9);
        for i in 0..11 {
            state.set(i, true).unwrap();
        }
        assert_eq!(state.progress_percent(), 100);
    }

    #[test]
    fn persisted_form_skips_garbage_keys() {
        let mut map = BTreeMap::new();
        map.insert("0".to_string(), true);
        map.insert("4".to_string(), false);
        map.insert("99".to_string(), true);
        map.insert("cas".to_string(), true);
        let state = ChecklistState::from_persisted(&map);
        assert_eq!(state.to_persisted().keys().collect::<Vec<_>>(), vec!["0"]);
    }
}
