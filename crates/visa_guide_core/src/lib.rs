pub mod catalog;
pub mod checklist;
pub mod content;
pub mod domain;
pub mod error;
pub mod events;
pub mod export;
pub mod flow;
pub mod gateway;
pub mod journey;
pub mod ports;
pub mod timeline;
pub mod validation;

pub use domain::{
    Country, FlowState, Personalization, ProgressRecord, StepCompletionMap, UserContact,
    VisaTypeSummary,
};
pub use error::{FieldError, FlowError, ValidationErrors};
pub use flow::{FlowController, Screen, StepPayload, WizardStep};
pub use gateway::{ProgressGateway, ResilientCatalog, SaveOutcome, SaveSource};
pub use journey::JourneyController;
pub use ports::{CatalogService, PortError, PortResult, ProgressStore};
pub use timeline::{StepId, StepStatus, TimelineEntry};
