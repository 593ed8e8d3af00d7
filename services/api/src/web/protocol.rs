//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the visa guide wizard.

use serde::{Deserialize, Serialize};
use visa_guide_core::content::DetailTab;
use visa_guide_core::export::AdditionalDocuments;
use visa_guide_core::flow::{Screen, WizardStep};
use visa_guide_core::{Personalization, TimelineEntry, UserContact, ValidationErrors};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submits the country selection screen together with the contact form.
    SelectCountries {
        origin: String,
        destination: String,
        contact: UserContact,
    },

    /// Exchanges the countries currently picked on the country screen.
    SwapCountries {
        origin: Option<String>,
        destination: Option<String>,
    },

    SelectTravelerType { traveler_type: String },

    /// Submits the visa type together with the confirmation answers.
    SelectVisaType {
        visa_type: String,
        personalization: Personalization,
    },

    /// Goes back one step, keeping what was entered.
    Back,

    /// Clears everything and returns to the first step.
    Restart,

    UpdateConfirmation { personalization: Personalization },

    CompleteStep { step_id: String },

    ToggleChecklist { index: usize },

    SwitchTab {
        tab: DetailTab,
        #[serde(default)]
        anchor: Option<String>,
    },

    /// Selects or deselects a special-case scenario by its text.
    SelectScenario { text: String },

    ExportChecklist,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItemView {
    pub index: usize,
    pub text: &'static str,
    pub checked: bool,
}

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The screen to render and the wizard step it belongs to.
    Screen { step: WizardStep, view: Screen },

    CountriesSwapped {
        origin: Option<String>,
        destination: Option<String>,
    },

    /// Inline form errors; the wizard did not move.
    ValidationFailed { errors: ValidationErrors },

    /// The chosen route has no detail experience yet; the wizard stays on
    /// the country screen.
    ComingSoon {
        origin_name: String,
        destination_name: String,
    },

    /// The derived timeline and checklist of the open detail screen.
    Timeline {
        entries: Vec<TimelineEntry>,
        checklist: Vec<ChecklistItemView>,
        progress_percent: u8,
    },

    ChecklistUpdated { index: usize, checked: bool },

    TabSwitched {
        tab: DetailTab,
        anchor: Option<String>,
    },

    /// Sent shortly after `TabSwitched` once the tab content is in place.
    ScrollToAnchor { anchor: String },

    AdditionalDocuments { documents: Vec<AdditionalDocuments> },

    Export { filename: String, content: String },

    /// Reports an error to the client, which should display an error message.
    Error { message: String },
}
