//! crates/visa_guide_core/src/journey.rs
//!
//! The detail screen's controller. Owns the personalization answers, step
//! completion, checklist and the event channel for one mounted screen.
//! Mutating operations return the progress record to persist; the caller
//! decides whether to await the write.

use chrono::{DateTime, NaiveDate, Utc};

use crate::checklist::{checklist_index_for_step, ChecklistState};
use crate::content::{find_scenario, DetailTab, Scenario};
use crate::domain::{Personalization, ProgressRecord, StepCompletionMap, UserContact};
use crate::error::FlowError;
use crate::events::{ChecklistSync, EventChannel, JourneyEvent};
use crate::export::{assemble, AdditionalDocuments, ChecklistExport, ExportInput};
use crate::timeline::{apply_confirmation_ratchet, derive_timeline, StepId, TimelineEntry};
use crate::validation::validate_confirmation_update;

/// Progress milestones recorded in `ProgressRecord::timestamps`.
pub mod milestones {
    pub const COUNTRY_SELECTION: &str = "countrySelection";
    pub const CAS_STATUS_UPDATED: &str = "casStatusUpdated";
    pub const CAS_AUTO_COMPLETED: &str = "casAutoCompleted";
    pub const STEP_COMPLETED: &str = "stepCompleted";
}

pub struct JourneyController {
    contact: UserContact,
    origin_country: String,
    destination_country: String,
    traveler_type: Option<String>,
    visa_type: Option<String>,
    personalization: Personalization,
    step_completion: StepCompletionMap,
    checklist: ChecklistState,
    events: EventChannel,
    active_tab: DetailTab,
    export_unlocked: bool,
    selected_scenarios: Vec<&'static Scenario>,
}

impl JourneyController {
    pub fn new(
        contact: UserContact,
        origin_country: impl Into<String>,
        destination_country: impl Into<String>,
        traveler_type: Option<String>,
        visa_type: Option<String>,
        personalization: Personalization,
    ) -> Self {
        Self {
            contact,
            origin_country: origin_country.into(),
            destination_country: destination_country.into(),
            traveler_type,
            visa_type,
            personalization,
            step_completion: StepCompletionMap::new(),
            checklist: ChecklistState::new(),
            events: EventChannel::new(),
            active_tab: DetailTab::Overview,
            export_unlocked: false,
            selected_scenarios: Vec::new(),
        }
    }

    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    pub fn personalization(&self) -> &Personalization {
        &self.personalization
    }

    pub fn step_completion(&self) -> &StepCompletionMap {
        &self.step_completion
    }

    pub fn checklist(&self) -> &ChecklistState {
        &self.checklist
    }

    pub fn active_tab(&self) -> DetailTab {
        self.active_tab
    }

    pub fn export_unlocked(&self) -> bool {
        self.export_unlocked
    }

    /// Applies the confirmation ratchet for the answers the screen opened
    /// with. Call after subscribing so the resulting sync events are seen.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<ProgressRecord> {
        self.ratchet()
            .then(|| self.record(milestones::CAS_AUTO_COMPLETED, now))
    }

    /// Adopts the step completion and checklist of a previously saved
    /// record. The answers given on the visa type screen are kept.
    pub fn restore(&mut self, record: &ProgressRecord) {
        if let Some(completion) = &record.step_completion {
            self.step_completion = completion.clone();
        }
        self.checklist = match &record.checklist {
            Some(persisted) => ChecklistState::from_persisted(persisted),
            None => {
                let mut derived = ChecklistState::new();
                for step in StepId::ALL {
                    if self.is_step_completed(step) {
                        if let Some(index) = checklist_index_for_step(step) {
                            let _ = derived.set(index, true);
                        }
                    }
                }
                derived
            }
        };
    }

    pub fn update_confirmation(
        &mut self,
        personalization: Personalization,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, FlowError> {
        validate_confirmation_update(&personalization)?;
        self.personalization = personalization;
        let record = if self.ratchet() {
            self.record(milestones::CAS_STATUS_UPDATED, now)
                .with_timestamp(milestones::CAS_AUTO_COMPLETED, now)
        } else {
            self.record(milestones::CAS_STATUS_UPDATED, now)
        };
        Ok(record)
    }

    /// Marks a step completed. The state update happens first, then the
    /// checklist sync event, and the returned record is written last.
    pub fn complete_step(
        &mut self,
        step_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord, FlowError> {
        let step: StepId = step_id.parse()?;
        self.step_completion.insert(step.as_str().to_string(), true);
        self.sync_checklist_for(step);
        Ok(self.record(milestones::STEP_COMPLETED, now))
    }

    /// Flips a checklist item by hand. Returns its new state.
    pub fn toggle_checklist(&mut self, index: usize) -> Result<bool, FlowError> {
        let checked = self.checklist.toggle(index)?;
        self.events
            .publish(JourneyEvent::ChecklistSync(ChecklistSync { index, checked }));
        Ok(checked)
    }

    pub fn switch_tab(&mut self, tab: DetailTab, anchor: Option<String>) {
        self.active_tab = tab;
        if tab.is_last() {
            self.export_unlocked = true;
        }
        self.events.publish(JourneyEvent::SwitchTab { tab, anchor });
    }

    /// Selects or deselects a special-case scenario. Returns whether it is
    /// now selected.
    pub fn toggle_scenario(&mut self, text: &str) -> Result<bool, FlowError> {
        let scenario =
            find_scenario(text).ok_or_else(|| FlowError::UnknownScenario(text.to_string()))?;
        if let Some(pos) = self
            .selected_scenarios
            .iter()
            .position(|s| s.text == scenario.text)
        {
            self.selected_scenarios.remove(pos);
            Ok(false)
        } else {
            self.selected_scenarios.push(scenario);
            Ok(true)
        }
    }

    pub fn additional_documents(&self) -> Vec<AdditionalDocuments> {
        self.selected_scenarios
            .iter()
            .map(|s| AdditionalDocuments {
                scenario: s.text.to_string(),
                documents: s.documents.iter().map(|d| d.to_string()).collect(),
            })
            .collect()
    }

    pub fn timeline(&self, today: NaiveDate) -> Vec<TimelineEntry> {
        derive_timeline(&self.step_completion, &self.personalization, today)
    }

    /// Builds the checklist document. Locked until the last tab was visited.
    pub fn export(&self, today: NaiveDate) -> Result<ChecklistExport, FlowError> {
        if !self.export_unlocked {
            return Err(FlowError::ExportLocked);
        }
        let additional = self.additional_documents();
        Ok(assemble(&ExportInput {
            contact: Some(&self.contact),
            personalization: &self.personalization,
            checklist: &self.checklist,
            additional_documents: &additional,
            generated_on: today,
        }))
    }

    fn is_step_completed(&self, step: StepId) -> bool {
        self.step_completion
            .get(step.as_str())
            .copied()
            .unwrap_or(false)
    }

    /// True when the ratchet completed anything.
    fn ratchet(&mut self) -> bool {
        let newly = apply_confirmation_ratchet(&self.personalization, &mut self.step_completion);
        for step in &newly {
            self.sync_checklist_for(*step);
        }
        !newly.is_empty()
    }

    fn sync_checklist_for(&mut self, step: StepId) {
        let Some(index) = checklist_index_for_step(step) else {
            return;
        };
        if let Ok(true) = self.checklist.set(index, true) {
            self.events
                .publish(JourneyEvent::ChecklistSync(ChecklistSync {
                    index,
                    checked: true,
                }));
        }
    }

    fn record(&self, milestone: &str, now: DateTime<Utc>) -> ProgressRecord {
        let mut record = ProgressRecord::new(
            self.contact.email.clone(),
            self.origin_country.clone(),
            self.destination_country.clone(),
        )
        .with_timestamp(milestone, now);
        record.user_type = self.traveler_type.clone();
        record.visa_type = self.visa_type.clone();
        record.personalization_data = Some(self.personalization.clone());
        record.checklist = Some(self.checklist.to_persisted());
        record.step_completion = Some(self.step_completion.clone());
        record
    }
}
