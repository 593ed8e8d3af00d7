//! crates/visa_guide_core/src/timeline.rs
//!
//! Derives the display status and the due-by label of every timeline step
//! from the user's confirmation status and their manual completions.
//!
//! Rules, highest priority first:
//! 1. a step marked complete is `Completed`;
//! 2. with a confirmation date, pre-confirmation steps are `Completed`, the
//!    first post-confirmation step is `InProgress`, and the rest are `DueSoon`
//!    when their due date falls within the next seven days, else `Pending`;
//! 3. without one, the first pre-confirmation step is `InProgress` and
//!    everything else is `Pending`.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::content;
use crate::domain::{Personalization, StepCompletionMap};
use crate::error::FlowError;

/// Format of the confirmation date as entered by the user.
pub const CONFIRMATION_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format of a computed due date, e.g. `31 Jan 2025`.
pub const DUE_DATE_LABEL_FORMAT: &str = "%d %b %Y";

/// Days ahead of today in which a pending deadline is flagged.
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// Steps completed automatically once the confirmation is received.
pub const AUTO_COMPLETED_ON_CONFIRMATION: [StepId; 2] =
    [StepId::UnconditionalOffer, StepId::Cas];

pub const LABEL_COMPLETED: &str = "Completed";
pub const LABEL_BEFORE_CONFIRMATION: &str = "Before confirmation";
pub const LABEL_AFTER_OFFER: &str = "After unconditional offer";
pub const LABEL_AFTER_REQUIREMENTS: &str = "After requirements met";
pub const LABEL_AFTER_CONFIRMATION: &str = "After confirmation";
pub const LABEL_TBD: &str = "TBD";

//=========================================================================================
// Step identity
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    UnconditionalOffer,
    Atas,
    TbTest,
    Cas,
    VisaApplication,
    ProcessingWait,
    DecisionVisaIssuance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PreConfirmation,
    PostConfirmation,
}

impl StepId {
    /// Display order of the timeline.
    pub const ALL: [StepId; 7] = [
        StepId::UnconditionalOffer,
        StepId::Atas,
        StepId::TbTest,
        StepId::Cas,
        StepId::VisaApplication,
        StepId::ProcessingWait,
        StepId::DecisionVisaIssuance,
    ];

    pub const FIRST_PRE_CONFIRMATION: StepId = StepId::UnconditionalOffer;
    pub const FIRST_POST_CONFIRMATION: StepId = StepId::VisaApplication;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnconditionalOffer => "unconditional-offer",
            Self::Atas => "atas",
            Self::TbTest => "tb-test",
            Self::Cas => "cas",
            Self::VisaApplication => "visa-application",
            Self::ProcessingWait => "processing-wait",
            Self::DecisionVisaIssuance => "decision-visa-issuance",
        }
    }

    /// The TB test sits third in the display order but belongs to the
    /// post-confirmation phase.
    pub fn phase(self) -> Phase {
        match self {
            Self::UnconditionalOffer | Self::Atas | Self::Cas => Phase::PreConfirmation,
            Self::VisaApplication
            | Self::ProcessingWait
            | Self::TbTest
            | Self::DecisionVisaIssuance => Phase::PostConfirmation,
        }
    }

    /// Offset from the confirmation date to the step's deadline.
    pub fn due_offset(self) -> Option<Duration> {
        match self {
            Self::VisaApplication => Some(Duration::days(30)),
            Self::ProcessingWait => Some(Duration::weeks(8)),
            Self::TbTest => Some(Duration::days(15)),
            Self::DecisionVisaIssuance => Some(Duration::weeks(10)),
            Self::UnconditionalOffer | Self::Atas | Self::Cas => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepId::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| FlowError::UnknownStep(s.to_string()))
    }
}

//=========================================================================================
// Status derivation
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    Completed,
    InProgress,
    Pending,
    DueSoon,
    /// Reserved for steps that cannot start; no rule currently produces it.
    Blocked,
}

/// One rendered row of the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub step_id: StepId,
    pub title: &'static str,
    pub status: StepStatus,
    pub due_by: String,
}

fn manually_completed(step_id: &str, completion: &StepCompletionMap) -> bool {
    completion.get(step_id).copied().unwrap_or(false)
}

/// The step's deadline given the confirmation date, if the step has one.
pub fn due_date(step: StepId, confirmed_on: NaiveDate) -> Option<NaiveDate> {
    step.due_offset().map(|offset| confirmed_on + offset)
}

/// Computes the status of `step_id` as of `today`.
pub fn step_status(
    step_id: &str,
    completion: &StepCompletionMap,
    personalization: &Personalization,
    today: NaiveDate,
) -> StepStatus {
    if manually_completed(step_id, completion) {
        return StepStatus::Completed;
    }
    let Ok(step) = step_id.parse::<StepId>() else {
        return StepStatus::Pending;
    };

    if personalization.is_confirmed() {
        if step.phase() == Phase::PreConfirmation {
            return StepStatus::Completed;
        }
        if step == StepId::FIRST_POST_CONFIRMATION {
            return StepStatus::InProgress;
        }
        // An unparseable date leaves the deadline unknown.
        let due = personalization
            .confirmed_on()
            .and_then(|confirmed_on| due_date(step, confirmed_on));
        return match due {
            Some(due) if due > today && (due - today).num_days() <= DUE_SOON_WINDOW_DAYS => {
                StepStatus::DueSoon
            }
            _ => StepStatus::Pending,
        };
    }

    if step == StepId::FIRST_PRE_CONFIRMATION {
        StepStatus::InProgress
    } else {
        StepStatus::Pending
    }
}

/// Computes the due-by label shown next to `step_id`.
pub fn due_by_label(
    step_id: &str,
    completion: &StepCompletionMap,
    personalization: &Personalization,
) -> String {
    if manually_completed(step_id, completion) {
        return LABEL_COMPLETED.to_string();
    }
    let step = step_id.parse::<StepId>().ok();

    if personalization.is_confirmed() {
        if step.map(StepId::phase) == Some(Phase::PreConfirmation) {
            return LABEL_COMPLETED.to_string();
        }
        let due = match (step, personalization.confirmed_on()) {
            (Some(step), Some(confirmed_on)) => due_date(step, confirmed_on),
            _ => None,
        };
        return match due {
            Some(due) => due.format(DUE_DATE_LABEL_FORMAT).to_string(),
            None => LABEL_AFTER_CONFIRMATION.to_string(),
        };
    }

    match step {
        Some(StepId::UnconditionalOffer) => LABEL_BEFORE_CONFIRMATION,
        Some(StepId::Atas) => LABEL_AFTER_OFFER,
        Some(StepId::Cas) => LABEL_AFTER_REQUIREMENTS,
        Some(_) => LABEL_AFTER_CONFIRMATION,
        None => LABEL_TBD,
    }
    .to_string()
}

/// Derives every row of the timeline in display order.
pub fn derive_timeline(
    completion: &StepCompletionMap,
    personalization: &Personalization,
    today: NaiveDate,
) -> Vec<TimelineEntry> {
    content::timeline_steps()
        .iter()
        .map(|def| {
            let id = def.id.as_str();
            TimelineEntry {
                step_id: def.id,
                title: def.title,
                status: step_status(id, completion, personalization, today),
                due_by: due_by_label(id, completion, personalization),
            }
        })
        .collect()
}

//=========================================================================================
// Auto-completion ratchet
//=========================================================================================

/// Marks the canonical pre-confirmation steps complete once the user holds
/// their confirmation. Returns only the steps that changed.
///
/// The ratchet only ever sets entries to `true`; withdrawing the confirmation
/// later leaves them completed.
pub fn apply_confirmation_ratchet(
    personalization: &Personalization,
    completion: &mut StepCompletionMap,
) -> Vec<StepId> {
    if !personalization.has_confirmation_document {
        return Vec::new();
    }
    let mut newly_completed = Vec::new();
    for step in AUTO_COMPLETED_ON_CONFIRMATION {
        if !manually_completed(step.as_str(), completion) {
            completion.insert(step.as_str().to_string(), true);
            newly_completed.push(step);
        }
    }
    newly_completed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn step_ids_round_trip_through_their_wire_names() {
        for step in StepId::ALL {
            assert_eq!(step.as_str().parse::<StepId>().unwrap(), step);
        }
        assert!("financial-docs".parse::<StepId>().is_err());
    }

    #[test]
    fn phases_partition_the_catalog() {
        let pre = StepId::ALL
            .iter()
            .filter(|s| s.phase() == Phase::PreConfirmation)
            .count();
        assert_eq!(pre, 3);
        assert_eq!(StepId::ALL.len() - pre, 4);
    }

    #[test]
    fn due_dates_follow_the_fixed_offsets() {
        let d = date(2025, 1, 1);
        assert_eq!(due_date(StepId::VisaApplication, d), Some(date(2025, 1, 31)));
        assert_eq!(due_date(StepId::ProcessingWait, d), Some(date(2025, 2, 26)));
        assert_eq!(due_date(StepId::TbTest, d), Some(date(2025, 1, 16)));
        assert_eq!(
            due_date(StepId::DecisionVisaIssuance, d),
            Some(date(2025, 3, 12))
        );
        assert_eq!(due_date(StepId::Cas, d), None);
    }

    #[test]
    fn manual_completion_wins_over_every_rule() {
        let mut completion = StepCompletionMap::new();
        completion.insert("processing-wait".into(), true);
        let p = Personalization::not_received();
        let status = step_status("processing-wait", &completion, &p, date(2025, 1, 1));
        assert_eq!(status, StepStatus::Completed);
        assert_eq!(due_by_label("processing-wait", &completion, &p), "Completed");
    }

    #[test]
    fn without_confirmation_only_the_first_step_is_in_progress() {
        let completion = StepCompletionMap::new();
        let p = Personalization::not_received();
        let today = date(2025, 1, 1);
        for step in StepId::ALL {
            let expected = if step == StepId::UnconditionalOffer {
                StepStatus::InProgress
            } else {
                StepStatus::Pending
            };
            assert_eq!(step_status(step.as_str(), &completion, &p, today), expected);
        }
    }

    #[test]
    fn confirmation_flag_without_date_is_treated_as_not_received() {
        let p = Personalization {
            has_confirmation_document: true,
            confirmation_date: None,
        };
        let completion = StepCompletionMap::new();
        let today = date(2025, 1, 1);
        assert_eq!(
            step_status("unconditional-offer", &completion, &p, today),
            StepStatus::InProgress
        );
        assert_eq!(step_status("cas", &completion, &p, today), StepStatus::Pending);
    }

    #[test]
    fn blank_confirmation_date_is_treated_as_not_received() {
        let p = Personalization::received_on("  ");
        let completion = StepCompletionMap::new();
        let today = date(2025, 1, 2);
        assert_eq!(
            step_status("unconditional-offer", &completion, &p, today),
            StepStatus::InProgress
        );
        assert_eq!(step_status("atas", &completion, &p, today), StepStatus::Pending);
        assert_ne!(due_by_label("atas", &completion, &p), "Completed");
    }

    #[test]
    fn confirmed_user_sees_pre_steps_completed_and_first_post_step_in_progress() {
        let p = Personalization::received_on("01/01/2025");
        let completion = StepCompletionMap::new();
        let today = date(2025, 1, 2);
        assert_eq!(step_status("atas", &completion, &p, today), StepStatus::Completed);
        assert_eq!(step_status("cas", &completion, &p, today), StepStatus::Completed);
        assert_eq!(
            step_status("visa-application", &completion, &p, today),
            StepStatus::InProgress
        );
        assert_eq!(
            step_status("processing-wait", &completion, &p, today),
            StepStatus::Pending
        );
    }

    #[test]
    fn due_soon_window_is_exclusive_of_today_and_inclusive_of_day_seven() {
        // TB test is due on 16 Jan 2025.
        let p = Personalization::received_on("01/01/2025");
        let completion = StepCompletionMap::new();
        let status_on = |today| step_status("tb-test", &completion, &p, today);

        assert_eq!(status_on(date(2025, 1, 8)), StepStatus::Pending);
        assert_eq!(status_on(date(2025, 1, 9)), StepStatus::DueSoon);
        assert_eq!(status_on(date(2025, 1, 15)), StepStatus::DueSoon);
        assert_eq!(status_on(date(2025, 1, 16)), StepStatus::Pending);
        assert_eq!(status_on(date(2025, 2, 1)), StepStatus::Pending);
    }

    #[test]
    fn unknown_step_falls_back_to_pending_and_tbd() {
        let completion = StepCompletionMap::new();
        let p = Personalization::not_received();
        assert_eq!(
            step_status("financial-docs", &completion, &p, date(2025, 1, 1)),
            StepStatus::Pending
        );
        assert_eq!(due_by_label("financial-docs", &completion, &p), "TBD");
    }

    #[test]
    fn labels_render_relative_timing_before_confirmation() {
        let completion = StepCompletionMap::new();
        let p = Personalization::not_received();
        assert_eq!(
            due_by_label("unconditional-offer", &completion, &p),
            LABEL_BEFORE_CONFIRMATION
        );
        assert_eq!(due_by_label("atas", &completion, &p), LABEL_AFTER_OFFER);
        assert_eq!(due_by_label("cas", &completion, &p), LABEL_AFTER_REQUIREMENTS);
        assert_eq!(
            due_by_label("decision-visa-issuance", &completion, &p),
            LABEL_AFTER_CONFIRMATION
        );
    }

    #[test]
    fn labels_render_formatted_dates_after_confirmation() {
        let completion = StepCompletionMap::new();
        let p = Personalization::received_on("01/01/2025");
        assert_eq!(due_by_label("visa-application", &completion, &p), "31 Jan 2025");
        assert_eq!(due_by_label("atas", &completion, &p), "Completed");

        let garbled = Personalization::received_on("sometime in May");
        assert_eq!(
            due_by_label("visa-application", &completion, &garbled),
            LABEL_AFTER_CONFIRMATION
        );
    }

    #[test]
    fn ratchet_is_idempotent() {
        let p = Personalization::received_on("01/01/2025");
        let mut once = StepCompletionMap::new();
        let changed = apply_confirmation_ratchet(&p, &mut once);
        assert_eq!(changed, vec![StepId::UnconditionalOffer, StepId::Cas]);

        let mut twice = once.clone();
        assert!(apply_confirmation_ratchet(&p, &mut twice).is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn ratchet_never_reverts_completion() {
        let mut completion = StepCompletionMap::new();
        apply_confirmation_ratchet(&Personalization::received_on("01/01/2025"), &mut completion);
        let withdrawn = Personalization::not_received();
        assert!(apply_confirmation_ratchet(&withdrawn, &mut completion).is_empty());
        assert_eq!(completion.get("cas"), Some(&true));
        assert_eq!(
            step_status("cas", &completion, &withdrawn, date(2025, 6, 1)),
            StepStatus::Completed
        );
    }

    #[test]
    fn derived_timeline_follows_catalog_order() {
        let rows = derive_timeline(
            &StepCompletionMap::new(),
            &Personalization::not_received(),
            date(2025, 1, 1),
        );
        let ids: Vec<StepId> = rows.iter().map(|r| r.step_id).collect();
        assert_eq!(ids, StepId::ALL.to_vec());
    }
}
