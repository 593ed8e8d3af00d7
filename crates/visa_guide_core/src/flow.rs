//! crates/visa_guide_core/src/flow.rs
//!
//! The wizard's single source of truth: the current step, the accumulated
//! selections, and which screen is shown for them.
//!
//! The controller validates nothing itself; screens validate their payload
//! before calling `advance`.

use serde::Serialize;

use crate::catalog::{country_name, is_supported_route};
use crate::domain::{FlowState, Personalization, UserContact};
use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Countries,
    TravelerType,
    VisaType,
    Details,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::Countries;
    pub const LAST: WizardStep = WizardStep::Details;

    /// 1-based position.
    pub fn number(self) -> u8 {
        match self {
            Self::Countries => 1,
            Self::TravelerType => 2,
            Self::VisaType => 3,
            Self::Details => 4,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Countries => Self::TravelerType,
            Self::TravelerType => Self::VisaType,
            Self::VisaType | Self::Details => Self::Details,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Countries | Self::TravelerType => Self::Countries,
            Self::VisaType => Self::TravelerType,
            Self::Details => Self::VisaType,
        }
    }
}

/// The data a screen hands over when the user moves forward.
#[derive(Debug, Clone, PartialEq)]
pub enum StepPayload {
    Countries {
        origin: String,
        destination: String,
        contact: UserContact,
    },
    TravelerType(String),
    VisaType {
        visa_type: String,
        personalization: Personalization,
    },
}

/// The screen to render for the current position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    SelectCountries,
    SelectTravelerType,
    SelectVisaType,
    VisaDetails,
    /// Placeholder for routes without a detail experience. The names are for
    /// display only.
    ComingSoon {
        origin_name: String,
        destination_name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowController {
    step: WizardStep,
    state: FlowState,
    contact: Option<UserContact>,
    personalization: Option<Personalization>,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            step: WizardStep::FIRST,
            state: FlowState::default(),
            contact: None,
            personalization: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn contact(&self) -> Option<&UserContact> {
        self.contact.as_ref()
    }

    pub fn personalization(&self) -> Option<&Personalization> {
        self.personalization.as_ref()
    }

    /// Fails unless the wizard is currently on `expected`.
    pub fn expect_step(&self, expected: WizardStep) -> Result<(), FlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(FlowError::WrongStep {
                expected: expected.number(),
                actual: self.step.number(),
            })
        }
    }

    /// Exchanges origin and destination. Either side may still be unset.
    pub fn swap_countries(&mut self) {
        let state = &mut self.state;
        std::mem::swap(&mut state.origin_country, &mut state.destination_country);
    }

    /// Records the countries picked so far without submitting the screen.
    pub fn draft_countries(&mut self, origin: Option<String>, destination: Option<String>) {
        self.state.origin_country = origin;
        self.state.destination_country = destination;
    }

    /// Merges `payload` and moves one step forward, never past the last.
    pub fn advance(&mut self, payload: StepPayload) -> WizardStep {
        match payload {
            StepPayload::Countries {
                origin,
                destination,
                contact,
            } => {
                self.state.origin_country = Some(origin);
                self.state.destination_country = Some(destination);
                self.contact = Some(contact);
            }
            StepPayload::TravelerType(traveler_type) => {
                self.state.traveler_type = Some(traveler_type);
            }
            StepPayload::VisaType {
                visa_type,
                personalization,
            } => {
                self.state.visa_type = Some(visa_type);
                self.personalization = Some(personalization);
            }
        }
        self.step = self.step.next();
        self.step
    }

    /// Moves one step back, never before the first. Entered data is kept.
    pub fn retreat(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn route(&self) -> Option<(&str, &str)> {
        match (&self.state.origin_country, &self.state.destination_country) {
            (Some(origin), Some(destination)) => Some((origin.as_str(), destination.as_str())),
            _ => None,
        }
    }

    pub fn is_supported_route(&self) -> bool {
        self.route()
            .map(|(origin, destination)| is_supported_route(origin, destination))
            .unwrap_or(false)
    }

    pub fn screen(&self) -> Screen {
        match self.step {
            WizardStep::Countries => Screen::SelectCountries,
            WizardStep::TravelerType => Screen::SelectTravelerType,
            WizardStep::VisaType => Screen::SelectVisaType,
            WizardStep::Details if self.is_supported_route() => Screen::VisaDetails,
            WizardStep::Details => Screen::ComingSoon {
                origin_name: self
                    .state
                    .origin_country
                    .as_deref()
                    .map(country_name)
                    .unwrap_or_default(),
                destination_name: self
                    .state
                    .destination_country
                    .as_deref()
                    .map(country_name)
                    .unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> UserContact {
        UserContact {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha@example.in".into(),
            mobile: "9876543210".into(),
            dialing_code: "+91".into(),
        }
    }

    fn walk_to_details(flow: &mut FlowController, origin: &str, destination: &str) {
        flow.advance(StepPayload::Countries {
            origin: origin.into(),
            destination: destination.into(),
            contact: contact(),
        });
        flow.advance(StepPayload::TravelerType("student".into()));
        flow.advance(StepPayload::VisaType {
            visa_type: "student-visa".into(),
            personalization: Personalization::not_received(),
        });
    }

    #[test]
    fn advancing_merges_payload_and_moves_forward() {
        let mut flow = FlowController::new();
        let step = flow.advance(StepPayload::Countries {
            origin: "IN".into(),
            destination: "GB".into(),
            contact: contact(),
        });
        assert_eq!(step, WizardStep::TravelerType);
        assert_eq!(flow.state().origin_country.as_deref(), Some("IN"));
        assert_eq!(flow.contact().map(|c| c.email.as_str()), Some("asha@example.in"));
        assert_eq!(flow.screen(), Screen::SelectTravelerType);
    }

    #[test]
    fn step_pointer_is_capped_at_details() {
        let mut flow = FlowController::new();
        walk_to_details(&mut flow, "IN", "GB");
        assert_eq!(flow.step(), WizardStep::Details);
        flow.advance(StepPayload::TravelerType("worker".into()));
        assert_eq!(flow.step(), WizardStep::Details);
        assert_eq!(flow.step().number(), 4);
    }

    #[test]
    fn retreat_is_floored_and_keeps_selections() {
        let mut flow = FlowController::new();
        walk_to_details(&mut flow, "IN", "GB");
        flow.retreat();
        flow.retreat();
        flow.retreat();
        assert_eq!(flow.retreat(), WizardStep::Countries);
        assert_eq!(flow.state().traveler_type.as_deref(), Some("student"));
        assert!(flow.contact().is_some());
    }

    #[test]
    fn reset_clears_everything() {
        let mut flow = FlowController::new();
        walk_to_details(&mut flow, "IN", "GB");
        flow.reset();
        assert_eq!(flow, FlowController::new());
        assert_eq!(flow.screen(), Screen::SelectCountries);
    }

    #[test]
    fn supported_route_renders_the_detail_screen() {
        let mut flow = FlowController::new();
        walk_to_details(&mut flow, "IN", "GB");
        assert_eq!(flow.screen(), Screen::VisaDetails);
    }

    #[test]
    fn every_other_route_renders_the_placeholder() {
        let routes = [("IN", "US"), ("IN", "CA"), ("NG", "GB"), ("GB", "IN"), ("IN", "AU")];
        for (origin, destination) in routes {
            let mut flow = FlowController::new();
            walk_to_details(&mut flow, origin, destination);
            let screen = flow.screen();
            assert!(
                matches!(screen, Screen::ComingSoon { .. }),
                "{origin}->{destination} rendered {screen:?}"
            );
        }

        let mut flow = FlowController::new();
        walk_to_details(&mut flow, "IN", "US");
        assert_eq!(
            flow.screen(),
            Screen::ComingSoon {
                origin_name: "India".into(),
                destination_name: "United States".into(),
            }
        );
    }

    #[test]
    fn swap_exchanges_the_draft_countries() {
        let mut flow = FlowController::new();
        flow.draft_countries(Some("IN".into()), None);
        flow.swap_countries();
        assert_eq!(flow.state().origin_country, None);
        assert_eq!(flow.state().destination_country.as_deref(), Some("IN"));
    }

    #[test]
    fn payloads_for_another_step_are_refused() {
        let flow = FlowController::new();
        assert!(flow.expect_step(WizardStep::Countries).is_ok());
        assert!(matches!(
            flow.expect_step(WizardStep::VisaType),
            Err(FlowError::WrongStep {
                expected: 3,
                actual: 1
            })
        ));
    }
}
