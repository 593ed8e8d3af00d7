//! services/api/src/web/session.rs
//!
//! Applies one client message to a wizard session. The socket loop owns the
//! I/O; this module only turns messages into state changes, replies and the
//! progress records that need persisting.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{info, warn};
use visa_guide_core::catalog::{country_name, TravelerKind};
use visa_guide_core::events::JourneyEvent;
use visa_guide_core::flow::{Screen, StepPayload, WizardStep};
use visa_guide_core::journey::milestones;
use visa_guide_core::validation::{
    validate_contact, validate_country_selection, validate_personalization,
};
use visa_guide_core::{
    FlowError, JourneyController, Personalization, ProgressRecord, UserContact, ValidationErrors,
};

use crate::web::protocol::{ChecklistItemView, ClientMessage, ServerMessage};
use crate::web::state::SessionState;

/// The effects of handling one client message.
#[derive(Default)]
pub struct Reply {
    pub messages: Vec<ServerMessage>,
    /// Records to write once the replies are on their way.
    pub to_persist: Vec<ProgressRecord>,
    /// A subscription to a detail screen opened by this message, taken
    /// before any of its events were published.
    pub opened_journey: Option<broadcast::Receiver<JourneyEvent>>,
}

impl Reply {
    fn message(message: ServerMessage) -> Self {
        Self {
            messages: vec![message],
            ..Self::default()
        }
    }
}

impl From<FlowError> for Reply {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Validation(errors) => Reply::message(ServerMessage::ValidationFailed { errors }),
            other => Reply::message(ServerMessage::Error {
                message: other.to_string(),
            }),
        }
    }
}

impl SessionState {
    /// The screen message for the wizard's current position.
    pub fn screen_message(&self) -> ServerMessage {
        ServerMessage::Screen {
            step: self.flow.step(),
            view: self.flow.screen(),
        }
    }

    pub async fn handle(&mut self, message: ClientMessage, now: DateTime<Utc>) -> Reply {
        match self.dispatch(message, now).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Client message rejected");
                e.into()
            }
        }
    }

    async fn dispatch(&mut self, message: ClientMessage, now: DateTime<Utc>) -> Result<Reply, FlowError> {
        match message {
            ClientMessage::SelectCountries {
                origin,
                destination,
                contact,
            } => self.select_countries(origin, destination, contact, now).await,
            ClientMessage::SwapCountries {
                origin,
                destination,
            } => {
                self.flow.expect_step(WizardStep::Countries)?;
                self.flow.draft_countries(origin, destination);
                self.flow.swap_countries();
                let state = self.flow.state();
                Ok(Reply::message(ServerMessage::CountriesSwapped {
                    origin: state.origin_country.clone(),
                    destination: state.destination_country.clone(),
                }))
            }
            ClientMessage::SelectTravelerType { traveler_type } => {
                self.flow.expect_step(WizardStep::TravelerType)?;
                let kind = TravelerKind::from_id(&traveler_type).ok_or_else(|| {
                    let mut errors = ValidationErrors::default();
                    errors.push("travelerType", "Please select a traveler type");
                    FlowError::Validation(errors)
                })?;
                self.flow
                    .advance(StepPayload::TravelerType(kind.id().to_string()));
                Ok(Reply::message(self.screen_message()))
            }
            ClientMessage::SelectVisaType {
                visa_type,
                personalization,
            } => self.select_visa_type(visa_type, personalization, now).await,
            ClientMessage::Back => {
                self.journey = None;
                self.flow.retreat();
                Ok(Reply::message(self.screen_message()))
            }
            ClientMessage::Restart => {
                self.journey = None;
                self.flow.reset();
                Ok(Reply::message(self.screen_message()))
            }
            ClientMessage::UpdateConfirmation { personalization } => {
                let journey = self.journey.as_mut().ok_or(FlowError::NoActiveJourney)?;
                let record = journey.update_confirmation(personalization, now)?;
                Ok(Reply {
                    messages: vec![timeline_message(journey, now)],
                    to_persist: vec![record],
                    opened_journey: None,
                })
            }
            ClientMessage::CompleteStep { step_id } => {
                let journey = self.journey.as_mut().ok_or(FlowError::NoActiveJourney)?;
                let record = journey.complete_step(&step_id, now)?;
                info!(%step_id, "Step marked completed");
                Ok(Reply {
                    messages: vec![timeline_message(journey, now)],
                    to_persist: vec![record],
                    opened_journey: None,
                })
            }
            ClientMessage::ToggleChecklist { index } => {
                let journey = self.journey.as_mut().ok_or(FlowError::NoActiveJourney)?;
                journey.toggle_checklist(index)?;
                Ok(Reply::default())
            }
            ClientMessage::SwitchTab { tab, anchor } => {
                let journey = self.journey.as_mut().ok_or(FlowError::NoActiveJourney)?;
                journey.switch_tab(tab, anchor);
                Ok(Reply::default())
            }
            ClientMessage::SelectScenario { text } => {
                let journey = self.journey.as_mut().ok_or(FlowError::NoActiveJourney)?;
                journey.toggle_scenario(&text)?;
                Ok(Reply::message(ServerMessage::AdditionalDocuments {
                    documents: journey.additional_documents(),
                }))
            }
            ClientMessage::ExportChecklist => {
                let journey = self.journey.as_ref().ok_or(FlowError::NoActiveJourney)?;
                let export = journey.export(now.date_naive())?;
                Ok(Reply::message(ServerMessage::Export {
                    content: export.render_text(),
                    filename: export.filename,
                }))
            }
        }
    }

    async fn select_countries(
        &mut self,
        origin: String,
        destination: String,
        contact: UserContact,
        now: DateTime<Utc>,
    ) -> Result<Reply, FlowError> {
        self.flow.expect_step(WizardStep::Countries)?;

        let mut errors = ValidationErrors::default();
        for result in [
            validate_country_selection(Some(origin.as_str()), Some(destination.as_str())),
            validate_contact(&contact),
        ] {
            if let Err(e) = result {
                errors.0.extend(e.0);
            }
        }
        errors.into_result()?;

        let record = ProgressRecord::new(contact.email.clone(), origin.clone(), destination.clone())
            .with_timestamp(milestones::COUNTRY_SELECTION, now);

        let supported = self
            .app_state
            .catalog
            .route_supported(&origin, &destination)
            .await;
        if !supported {
            info!(%origin, %destination, "Route not supported yet");
            let reply = ServerMessage::ComingSoon {
                origin_name: country_name(&origin),
                destination_name: country_name(&destination),
            };
            self.flow.draft_countries(Some(origin), Some(destination));
            return Ok(Reply {
                messages: vec![reply],
                to_persist: vec![record],
                opened_journey: None,
            });
        }

        self.flow.advance(StepPayload::Countries {
            origin,
            destination,
            contact,
        });
        Ok(Reply {
            messages: vec![self.screen_message()],
            to_persist: vec![record],
            opened_journey: None,
        })
    }

    async fn select_visa_type(
        &mut self,
        visa_type: String,
        personalization: Personalization,
        now: DateTime<Utc>,
    ) -> Result<Reply, FlowError> {
        self.flow.expect_step(WizardStep::VisaType)?;
        validate_personalization(&personalization)?;

        self.flow.advance(StepPayload::VisaType {
            visa_type: visa_type.clone(),
            personalization: personalization.clone(),
        });

        let screen = self.screen_message();
        let ServerMessage::Screen {
            view: Screen::VisaDetails,
            ..
        } = &screen
        else {
            return Ok(Reply::message(screen));
        };

        let (Some(contact), Some((origin, destination))) = (self.flow.contact(), self.flow.route())
        else {
            return Err(FlowError::NoActiveJourney);
        };
        let mut journey = JourneyController::new(
            contact.clone(),
            origin,
            destination,
            self.flow.state().traveler_type.clone(),
            Some(visa_type),
            personalization,
        );
        if let Some(saved) = self.app_state.progress.load(&contact.email).await {
            info!(email = %contact.email, "Resuming saved progress");
            journey.restore(&saved);
        }

        let events = journey.events().subscribe();
        let to_persist = journey.start(now).into_iter().collect();
        let timeline = timeline_message(&journey, now);
        self.journey = Some(journey);

        Ok(Reply {
            messages: vec![screen, timeline],
            to_persist,
            opened_journey: Some(events),
        })
    }
}

fn timeline_message(journey: &JourneyController, now: DateTime<Utc>) -> ServerMessage {
    ServerMessage::Timeline {
        entries: journey.timeline(now.date_naive()),
        checklist: journey
            .checklist()
            .items()
            .map(|(index, text, checked)| ChecklistItemView {
                index,
                text,
                checked,
            })
            .collect(),
        progress_percent: journey.checklist().progress_percent(),
    }
}
